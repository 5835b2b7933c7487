//! Graph builder: maps one input row to the fixed node vocabulary and a
//! set of value-weighted, typed links.

use crate::model::{FlowGraph, FlowLink, FlowNode, FlowRow, LinkKind, StageId};

/// Flows at or below this magnitude (kt) are omitted unless force-visible.
pub const VISIBILITY_EPSILON: f64 = 0.001;
/// Layout floor for force-visible links so a conceptually-present flow
/// never collapses to an invisible line. `real_value` is never floored.
pub const DISPLAY_FLOOR: f64 = 0.25;

struct Transition {
    source: StageId,
    target: StageId,
    kind: LinkKind,
    /// Canonical field name first, then backward-compatibility aliases.
    /// Independent contributions (e.g. export + trade columns) sum.
    fields: &'static [&'static str],
    force_visible: bool,
}

const fn flow(
    source: StageId,
    target: StageId,
    kind: LinkKind,
    fields: &'static [&'static str],
) -> Transition {
    Transition {
        source,
        target,
        kind,
        fields,
        force_visible: false,
    }
}

const fn forced(
    source: StageId,
    target: StageId,
    kind: LinkKind,
    fields: &'static [&'static str],
) -> Transition {
    Transition {
        source,
        target,
        kind,
        fields,
        force_visible: true,
    }
}

/// The complete registry of domain transitions. `export` aggregates all
/// outward trade regardless of originating stage; `loss` aggregates all
/// loss flows.
static TRANSITIONS: &[Transition] = &[
    // domestic processing chain
    flow(
        StageId::Ore,
        StageId::Concentrate,
        LinkKind::Domestic,
        &["domestic-ore", "Ore production"],
    ),
    flow(
        StageId::Concentrate,
        StageId::Metal,
        LinkKind::Domestic,
        &["domestic-concentrate", "Concentrate refined"],
    ),
    flow(
        StageId::Metal,
        StageId::Magnet,
        LinkKind::Domestic,
        &["domestic-metal", "Magnet production"],
    ),
    flow(
        StageId::Metal,
        StageId::OtherSemi,
        LinkKind::Domestic,
        &["metal-to-other-semi", "Other semi-finished production"],
    ),
    flow(
        StageId::Magnet,
        StageId::WindTurbine,
        LinkKind::Domestic,
        &["magnet-to-wind-turbine", "Wind Turbine inflow"],
    ),
    flow(
        StageId::Magnet,
        StageId::OtherFinal,
        LinkKind::Domestic,
        &["magnet-to-other-final"],
    ),
    flow(
        StageId::OtherSemi,
        StageId::OtherFinal,
        LinkKind::Domestic,
        &["other-semi-to-final"],
    ),
    // end-of-life stage stays visually present even at zero flow
    forced(
        StageId::WindTurbine,
        StageId::Eol,
        LinkKind::Domestic,
        &["wind-turbine-outflow", "Wind Turbine outflow"],
    ),
    forced(
        StageId::OtherFinal,
        StageId::Eol,
        LinkKind::Domestic,
        &["other-final-outflow", "Other products outflow"],
    ),
    forced(
        StageId::Eol,
        StageId::Loss,
        LinkKind::Loss,
        &["eol-loss", "End-of-life loss"],
    ),
    // outward trade, per originating stage
    flow(
        StageId::Ore,
        StageId::Export,
        LinkKind::Trade,
        &["export-ore", "trade-ore"],
    ),
    flow(
        StageId::Concentrate,
        StageId::Export,
        LinkKind::Trade,
        &["export-concentrate", "trade-concentrate"],
    ),
    flow(
        StageId::Metal,
        StageId::Export,
        LinkKind::Trade,
        &["export-metal", "trade-metal"],
    ),
    flow(
        StageId::Magnet,
        StageId::Export,
        LinkKind::Trade,
        &["export-magnet", "trade-magnet"],
    ),
    // stage losses
    flow(
        StageId::Ore,
        StageId::Loss,
        LinkKind::Loss,
        &["loss-ore"],
    ),
    flow(
        StageId::Concentrate,
        StageId::Loss,
        LinkKind::Loss,
        &["loss-concentrate"],
    ),
    flow(
        StageId::Metal,
        StageId::Loss,
        LinkKind::Loss,
        &["loss-metal", "Loss at metal stage"],
    ),
    flow(
        StageId::Magnet,
        StageId::Loss,
        LinkKind::Loss,
        &["loss-magnet"],
    ),
];

/// Build the working graph for one row. Always produces the full node
/// vocabulary; a link is emitted only if its magnitude clears
/// [`VISIBILITY_EPSILON`] or the transition is force-visible. Never fails:
/// absent fields are zero, signs are discarded.
pub fn build(row: &FlowRow) -> FlowGraph {
    let nodes = StageId::ALL.iter().copied().map(FlowNode::new).collect();

    let mut links = Vec::new();
    for transition in TRANSITIONS {
        let real_value: f64 = transition
            .fields
            .iter()
            .map(|field| row.get(field).abs())
            .sum();
        if real_value <= VISIBILITY_EPSILON && !transition.force_visible {
            continue;
        }
        let value = if transition.force_visible && real_value < DISPLAY_FLOOR {
            DISPLAY_FLOOR
        } else {
            real_value
        };
        links.push(FlowLink {
            source: transition.source,
            target: transition.target,
            kind: transition.kind,
            value,
            real_value,
        });
    }

    log::debug!(
        "built graph: {} nodes, {} visible links",
        StageId::ALL.len(),
        links.len()
    );
    FlowGraph { nodes, links }
}
