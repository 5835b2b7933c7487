use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ree_flow::builder::build;
use ree_flow::config::LayoutConfig;
use ree_flow::layout::{compute_layout, route};
use ree_flow::model::FlowRow;
use ree_flow::overrides::{EndPlacement, LinkEnd, LinkOffsets};

fn dense_row() -> FlowRow {
    FlowRow::from_pairs([
        ("domestic-ore", 104.0),
        ("domestic-concentrate", 64.0),
        ("domestic-metal", 33.0),
        ("metal-to-other-semi", 21.0),
        ("magnet-to-wind-turbine", 21.0),
        ("magnet-to-other-final", 9.0),
        ("other-semi-to-final", 16.0),
        ("wind-turbine-outflow", 4.0),
        ("other-final-outflow", 8.0),
        ("eol-loss", 10.0),
        ("export-ore", 24.0),
        ("export-concentrate", 15.0),
        ("export-metal", 7.0),
        ("export-magnet", 2.5),
        ("loss-ore", 15.0),
        ("loss-concentrate", 10.5),
        ("loss-metal", 9.0),
        ("loss-magnet", 1.4),
    ])
}

fn bench_build(c: &mut Criterion) {
    let row = dense_row();
    c.bench_function("build_graph", |b| b.iter(|| build(black_box(&row))));
}

fn bench_layout_and_route(c: &mut Criterion) {
    let row = dense_row();
    let graph = build(&row);
    let config = LayoutConfig::default();
    let offsets = LinkOffsets::new();

    c.bench_function("compute_layout", |b| {
        b.iter(|| compute_layout(black_box(&graph), &config, (960.0, 600.0)).unwrap())
    });

    c.bench_function("route", |b| {
        let layout = compute_layout(&graph, &config, (960.0, 600.0)).unwrap();
        b.iter(|| {
            let mut routed = layout.clone();
            route(&mut routed, black_box(&offsets));
            routed
        })
    });

    c.bench_function("route_with_manual_offsets", |b| {
        let layout = compute_layout(&graph, &config, (960.0, 600.0)).unwrap();
        let mut manual = LinkOffsets::new();
        manual.set_end(
            "ore-export",
            LinkEnd::Target,
            EndPlacement {
                side: ree_flow::model::Side::Bottom,
                offset: 24.0,
            },
        );
        b.iter(|| {
            let mut routed = layout.clone();
            route(&mut routed, black_box(&manual));
            routed
        })
    });
}

criterion_group!(benches, bench_build, bench_layout_and_route);
criterion_main!(benches);
