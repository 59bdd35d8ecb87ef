//! `canopy init` command implementation.
//!
//! Creates the database schema and, with `--seed`, inserts a small default
//! content set so a fresh install renders something: a homepage with a hero
//! and a features section, plus starter products and solutions. Seeding is
//! idempotent per kind: a kind that already has entities is left alone.

use std::path::PathBuf;
use std::sync::Arc;

use canopy_config::{CliSettings, Config};
use canopy_engine::{ContentEngine, TreeView};
use canopy_model::{EntityDraft, EntityKind, ItemDraft, SectionDraft};
use canopy_store::{ContentStore, SqliteStore};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the init command.
#[derive(Args)]
pub(crate) struct InitArgs {
    /// Path to configuration file (default: auto-discover canopy.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Insert default content after creating the schema.
    #[arg(long)]
    seed: bool,
}

impl InitArgs {
    /// Execute the init command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the database cannot be
    /// created.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: None,
            port: None,
            database: self.database,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let path = config.database_resolved.path.clone();

        let store = SqliteStore::connect(&path).await?;
        store.migrate().await?;
        output.success(&format!("Database ready: {}", path.display()));

        if self.seed {
            let engine = ContentEngine::new(Arc::new(store) as Arc<dyn ContentStore>);
            seed_defaults(&engine, &output).await?;
        }

        Ok(())
    }
}

fn entity(name: &str, description: &str, category: &str, route: &str) -> EntityDraft {
    EntityDraft {
        name: name.to_owned(),
        description: description.to_owned(),
        category: category.to_owned(),
        route: route.to_owned(),
        is_visible: true,
    }
}

/// Insert the default content set, skipping kinds that already have content.
async fn seed_defaults(engine: &ContentEngine, output: &Output) -> Result<(), CliError> {
    seed_homepage(engine, output).await?;
    seed_products(engine, output).await?;
    seed_solutions(engine, output).await?;
    Ok(())
}

async fn seed_homepage(engine: &ContentEngine, output: &Output) -> Result<(), CliError> {
    if !engine
        .list_entities(EntityKind::Pages, TreeView::Admin)
        .await?
        .is_empty()
    {
        output.warning("Pages already present, skipping homepage seed");
        return Ok(());
    }

    let home = engine
        .create_entity(
            EntityKind::Pages,
            entity("Homepage", "Landing page", "landing", "/"),
        )
        .await?;

    engine
        .create_section(
            EntityKind::Pages,
            home.id,
            SectionDraft {
                section_type: "hero".to_owned(),
                title: "Start building on the cloud today".to_owned(),
                body: "Compute power, storage, databases, and content delivery \
                       to build sophisticated applications with flexibility and \
                       reliability."
                    .to_owned(),
                is_visible: true,
            },
        )
        .await?;

    let why = engine
        .create_section(
            EntityKind::Pages,
            home.id,
            SectionDraft {
                section_type: "features".to_owned(),
                title: "Why build with us".to_owned(),
                body: String::new(),
                is_visible: true,
            },
        )
        .await?;

    let cards = [
        (
            "Broadest set of capabilities",
            "The widest variety of compute instances, storage classes, and \
             databases, purpose-built for the best cost and performance.",
        ),
        (
            "Largest community",
            "Millions of active customers and a global partner network across \
             every industry and region.",
        ),
        (
            "Security you can trust",
            "Architected to be the most flexible and secure cloud computing \
             environment available today.",
        ),
        (
            "Proven operational expertise",
            "Unmatched experience, reliability, and performance your business \
             can depend on.",
        ),
    ];
    for (title, description) in cards {
        engine
            .create_item(
                EntityKind::Pages,
                home.id,
                why.id,
                ItemDraft {
                    item_type: "feature_card".to_owned(),
                    title: title.to_owned(),
                    description: description.to_owned(),
                    payload: None,
                    is_visible: true,
                },
            )
            .await?;
    }

    output.success("Seeded homepage");
    Ok(())
}

async fn seed_products(engine: &ContentEngine, output: &Output) -> Result<(), CliError> {
    if !engine
        .list_entities(EntityKind::Products, TreeView::Admin)
        .await?
        .is_empty()
    {
        output.warning("Products already present, skipping product seed");
        return Ok(());
    }

    let products = [
        (
            "Elastic Compute",
            "Virtual servers in the cloud",
            "Compute",
            "/products/elastic-compute",
        ),
        (
            "Object Storage",
            "Object storage built to retrieve any amount of data from anywhere",
            "Storage",
            "/products/object-storage",
        ),
        (
            "Managed Databases",
            "Fully managed relational and key-value databases",
            "Databases",
            "/products/managed-databases",
        ),
        (
            "Container Service",
            "Run and scale containerized workloads",
            "Compute",
            "/products/container-service",
        ),
    ];
    for (name, description, category, route) in products {
        engine
            .create_entity(
                EntityKind::Products,
                entity(name, description, category, route),
            )
            .await?;
    }

    output.success("Seeded products");
    Ok(())
}

async fn seed_solutions(engine: &ContentEngine, output: &Output) -> Result<(), CliError> {
    if !engine
        .list_entities(EntityKind::Solutions, TreeView::Admin)
        .await?
        .is_empty()
    {
        output.warning("Solutions already present, skipping solution seed");
        return Ok(());
    }

    let solutions = [
        (
            "Financial services",
            "Enable security and compliance at scale",
            "Industry",
            "/solutions/financial-services",
        ),
        (
            "Healthcare and life sciences",
            "Innovate faster for clinicians and patients",
            "Industry",
            "/solutions/healthcare",
        ),
        (
            "Retail",
            "Create exceptional experiences built for the future of retail",
            "Industry",
            "/solutions/retail",
        ),
        (
            "Migration and modernization",
            "Plan migrations and modernize applications",
            "Technology",
            "/solutions/migration",
        ),
    ];
    for (name, description, category, route) in solutions {
        engine
            .create_entity(
                EntityKind::Solutions,
                entity(name, description, category, route),
            )
            .await?;
    }

    output.success("Seeded solutions");
    Ok(())
}
