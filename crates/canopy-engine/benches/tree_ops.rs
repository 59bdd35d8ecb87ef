//! Benchmarks for the pure tree operations.

use canopy_engine::{duplicate, order};
use canopy_model::{Entity, EntityKind, EntityTree, Item, NodeId, Section, SectionTree};
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};

/// Build an entity tree with `sections` sections of `items` items each.
fn build_tree(sections: usize, items: usize) -> EntityTree {
    let now = Utc::now();
    let entity = Entity {
        id: NodeId::new(),
        kind: EntityKind::Products,
        name: "Compute".to_owned(),
        description: "Virtual servers".to_owned(),
        category: "Compute".to_owned(),
        route: "/products/compute".to_owned(),
        is_visible: true,
        position: 0,
        created_at: now,
        updated_at: now,
    };

    let sections = (0..sections)
        .map(|s| {
            let section = Section {
                id: NodeId::new(),
                entity_id: entity.id,
                section_type: "features".to_owned(),
                title: format!("Section {s}"),
                body: "body".to_owned(),
                is_visible: true,
                position: s as i64,
                created_at: now,
                updated_at: now,
            };
            let items = (0..items)
                .map(|i| Item {
                    id: NodeId::new(),
                    section_id: section.id,
                    item_type: "feature_card".to_owned(),
                    title: format!("Item {i}"),
                    description: String::new(),
                    payload: None,
                    is_visible: true,
                    position: i as i64,
                    created_at: now,
                    updated_at: now,
                })
                .collect();
            SectionTree { section, items }
        })
        .collect();

    EntityTree { entity, sections }
}

fn bench_clone_entity_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone_entity_tree");

    for (sections, items) in [(5, 4), (20, 10), (50, 20)] {
        let tree = build_tree(sections, items);
        group.bench_function(format!("{sections}x{items}"), |b| {
            b.iter(|| {
                duplicate::clone_entity_tree(
                    &tree,
                    "Copy".to_owned(),
                    "/products/copy".to_owned(),
                    1,
                )
            })
        });
    }

    group.finish();
}

fn bench_move_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_plan");

    for len in [10, 100, 1000] {
        let ids: Vec<NodeId> = (0..len).map(|_| NodeId::new()).collect();
        group.bench_function(format!("len_{len}"), |b| {
            b.iter(|| order::move_plan(&ids, len - 1, 0))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clone_entity_tree, bench_move_plan);
criterion_main!(benches);
