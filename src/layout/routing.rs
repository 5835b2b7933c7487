//! Routing engine: resolves each link end onto a node rectangle edge and
//! assigns non-overlapping on-edge offsets per attachment bucket.

use std::collections::BTreeMap;

use crate::model::{Side, StageId};
use crate::overrides::{LinkEnd, LinkOffsets};

use super::types::{DiagramLayout, LinkEndpoint, NodeLayout};

/// Heuristic attachment side when no manual override exists: a wide
/// rectangle attaches on top/bottom, a tall one on left/right, picked by
/// where the opposing endpoint's center lies relative to this node.
pub(super) fn infer_side(node: &NodeLayout, other_center: (f32, f32)) -> Side {
    let (cx, cy) = node.center();
    if node.is_wide() {
        if other_center.1 < cy {
            Side::Top
        } else {
            Side::Bottom
        }
    } else if other_center.0 < cx {
        Side::Left
    } else {
        Side::Right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum FlowDir {
    Outgoing,
    Incoming,
}

struct BucketEntry {
    link_idx: usize,
    end: LinkEnd,
    /// Cross-axis position of the other endpoint's center; bucket sort key.
    cross: f32,
    key: String,
    /// Saved manual center offset, if any.
    manual: Option<f32>,
}

/// Resolve endpoint coordinates for every link. Deterministic for a given
/// (layout, offsets) pair; safe to re-run on every state change.
///
/// Auto-positioned links in one bucket are laid end-to-end and never
/// overlap; a manually offset link is clamped onto the edge but does not
/// advance the auto cursor, so manual and automatic placements may
/// overlap.
pub fn route(layout: &mut DiagramLayout, offsets: &LinkOffsets) {
    let mut buckets: BTreeMap<(StageId, Side, FlowDir), Vec<BucketEntry>> = BTreeMap::new();

    for (link_idx, link) in layout.links.iter().enumerate() {
        let (Some(source_node), Some(target_node)) =
            (layout.nodes.get(&link.source), layout.nodes.get(&link.target))
        else {
            continue;
        };
        let key = link.key();

        for (end, node, other) in [
            (LinkEnd::Source, source_node, target_node),
            (LinkEnd::Target, target_node, source_node),
        ] {
            let saved = offsets.end(&key, end);
            let side = saved
                .map(|placement| placement.side)
                .unwrap_or_else(|| infer_side(node, other.center()));
            let dir = match end {
                LinkEnd::Source => FlowDir::Outgoing,
                LinkEnd::Target => FlowDir::Incoming,
            };
            let cross = if side.is_horizontal_edge() {
                other.center().0
            } else {
                other.center().1
            };
            buckets.entry((node.id, side, dir)).or_default().push(BucketEntry {
                link_idx,
                end,
                cross,
                key: key.clone(),
                manual: saved.map(|placement| placement.offset),
            });
        }
    }

    // Per bucket: deterministic crossing-minimizing order, then offsets.
    let mut resolved: Vec<(usize, LinkEnd, Side, f32, bool)> = Vec::new();
    for ((node_id, side, _dir), mut entries) in buckets {
        let node = &layout.nodes[&node_id];
        let edge_length = node.edge_length(side);
        entries.sort_by(|a, b| a.cross.total_cmp(&b.cross).then_with(|| a.key.cmp(&b.key)));

        let auto_total: f32 = entries
            .iter()
            .filter(|entry| entry.manual.is_none())
            .map(|entry| layout.links[entry.link_idx].thickness)
            .sum();
        let mut cursor = ((edge_length - auto_total) / 2.0).max(0.0);

        for entry in entries {
            let thickness = layout.links[entry.link_idx].thickness;
            let center = match entry.manual {
                Some(offset) => {
                    let start = (offset - thickness / 2.0)
                        .clamp(0.0, (edge_length - thickness).max(0.0));
                    start + thickness / 2.0
                }
                None => {
                    let start = cursor;
                    cursor += thickness;
                    start + thickness / 2.0
                }
            };
            resolved.push((entry.link_idx, entry.end, side, center, entry.manual.is_some()));
        }
    }

    for (link_idx, end, side, center, manual) in resolved {
        let node_id = match end {
            LinkEnd::Source => layout.links[link_idx].source,
            LinkEnd::Target => layout.links[link_idx].target,
        };
        let point = layout.nodes[&node_id].edge_point(side, center);
        let endpoint = LinkEndpoint {
            side,
            offset: center,
            point,
            control: point,
            manual,
        };
        match end {
            LinkEnd::Source => layout.links[link_idx].source_end = endpoint,
            LinkEnd::Target => layout.links[link_idx].target_end = endpoint,
        }
    }

    // Control points project outward along each attachment side by half
    // the endpoint distance, giving perpendicular entry/exit.
    for link in &mut layout.links {
        let (sx, sy) = link.source_end.point;
        let (tx, ty) = link.target_end.point;
        let distance = ((tx - sx).powi(2) + (ty - sy).powi(2)).sqrt();
        let reach = distance / 2.0;
        let (snx, sny) = link.source_end.side.normal();
        let (tnx, tny) = link.target_end.side.normal();
        link.source_end.control = (sx + snx * reach, sy + sny * reach);
        link.target_end.control = (tx + tnx * reach, ty + tny * reach);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{FlowRow, Rect};
    use crate::overrides::EndPlacement;

    fn full_row() -> FlowRow {
        FlowRow::from_pairs([
            ("domestic-ore", 100.0),
            ("domestic-concentrate", 60.0),
            ("domestic-metal", 30.0),
            ("metal-to-other-semi", 20.0),
            ("magnet-to-wind-turbine", 18.0),
            ("magnet-to-other-final", 8.0),
            ("other-semi-to-final", 15.0),
            ("wind-turbine-outflow", 5.0),
            ("other-final-outflow", 9.0),
            ("eol-loss", 12.0),
            ("export-ore", 30.0),
            ("export-concentrate", 25.0),
            ("export-metal", 6.0),
            ("export-magnet", 2.0),
            ("loss-ore", 15.0),
            ("loss-concentrate", 9.0),
            ("loss-metal", 10.0),
            ("loss-magnet", 1.0),
        ])
    }

    fn routed(offsets: &LinkOffsets) -> DiagramLayout {
        let graph = build(&full_row());
        let mut layout = compute_layout(&graph, &LayoutConfig::default(), (960.0, 600.0)).unwrap();
        route(&mut layout, offsets);
        layout
    }

    #[test]
    fn infer_side_follows_orientation_and_position() {
        let tall = NodeLayout {
            id: StageId::Metal,
            name: "Metal".to_string(),
            category: StageId::Metal.category(),
            rect: Rect::new(100.0, 100.0, 126.0, 230.0),
            rotated: false,
        };
        assert_eq!(infer_side(&tall, (300.0, 160.0)), Side::Right);
        assert_eq!(infer_side(&tall, (10.0, 160.0)), Side::Left);

        let wide = NodeLayout {
            id: StageId::Export,
            name: "Export".to_string(),
            category: StageId::Export.category(),
            rect: Rect::new(80.0, 24.0, 840.0, 52.0),
            rotated: false,
        };
        assert_eq!(infer_side(&wide, (400.0, 300.0)), Side::Bottom);
        assert_eq!(infer_side(&wide, (400.0, 0.0)), Side::Top);
    }

    #[test]
    fn routing_is_deterministic() {
        let offsets = LinkOffsets::new();
        let first = routed(&offsets);
        let second = routed(&offsets);
        for (a, b) in first.links.iter().zip(second.links.iter()) {
            assert_eq!(a.source_end, b.source_end, "{}", a.key());
            assert_eq!(a.target_end, b.target_end, "{}", a.key());
        }
    }

    #[test]
    fn auto_links_in_one_bucket_never_overlap() {
        let layout = routed(&LinkOffsets::new());
        // export receives four incoming links on its bottom edge
        let mut bands: Vec<(f32, f32)> = layout
            .links
            .iter()
            .filter(|link| link.target == StageId::Export && !link.target_end.manual)
            .map(|link| {
                assert_eq!(link.target_end.side, Side::Bottom);
                let start = link.target_end.offset - link.thickness / 2.0;
                (start, start + link.thickness)
            })
            .collect();
        assert_eq!(bands.len(), 4);
        bands.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in bands.windows(2) {
            assert!(pair[0].1 <= pair[1].0 + 1e-4);
        }
    }

    #[test]
    fn auto_bucket_is_centered_on_the_edge() {
        let layout = routed(&LinkOffsets::new());
        let export = &layout.nodes[&StageId::Export];
        let edge = export.edge_length(Side::Bottom);
        let incoming: Vec<_> = layout
            .links
            .iter()
            .filter(|link| link.target == StageId::Export)
            .collect();
        let total: f32 = incoming.iter().map(|link| link.thickness).sum();
        let min_start = incoming
            .iter()
            .map(|link| link.target_end.offset - link.thickness / 2.0)
            .fold(f32::INFINITY, f32::min);
        assert!((min_start - (edge - total) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn manual_offset_is_respected_and_clamped() {
        let mut offsets = LinkOffsets::new();
        offsets.set_end(
            "ore-concentrate",
            LinkEnd::Source,
            EndPlacement {
                side: Side::Right,
                offset: 15.0,
            },
        );
        let layout = routed(&offsets);
        let link = layout.link(StageId::Ore, StageId::Concentrate).unwrap();
        assert!(link.source_end.manual);
        assert_eq!(link.source_end.side, Side::Right);
        // thickness may push the clamped center off the requested offset
        // only when the band would leave the edge
        let edge = layout.nodes[&StageId::Ore].edge_length(Side::Right);
        let half = link.thickness / 2.0;
        let expected = 15.0f32.clamp(half, (edge - half).max(half));
        assert!((link.source_end.offset - expected).abs() < 1e-3);

        // far out-of-range offsets clamp onto the edge
        offsets.set_end(
            "ore-concentrate",
            LinkEnd::Source,
            EndPlacement {
                side: Side::Right,
                offset: 10_000.0,
            },
        );
        let layout = routed(&offsets);
        let link = layout.link(StageId::Ore, StageId::Concentrate).unwrap();
        assert!(link.source_end.offset + link.thickness / 2.0 <= edge + 1e-3);
    }

    #[test]
    fn manual_links_are_excluded_from_the_auto_accumulation() {
        let mut offsets = LinkOffsets::new();
        offsets.set_end(
            "ore-export",
            LinkEnd::Target,
            EndPlacement {
                side: Side::Bottom,
                offset: 5.0,
            },
        );
        let pinned = routed(&offsets);
        let export = &pinned.nodes[&StageId::Export];
        let edge = export.edge_length(Side::Bottom);

        let autos: Vec<_> = pinned
            .links
            .iter()
            .filter(|link| link.target == StageId::Export && !link.target_end.manual)
            .collect();
        assert_eq!(autos.len(), 3);
        // the remaining auto links re-center over their own total width
        let total: f32 = autos.iter().map(|link| link.thickness).sum();
        let min_start = autos
            .iter()
            .map(|link| link.target_end.offset - link.thickness / 2.0)
            .fold(f32::INFINITY, f32::min);
        assert!((min_start - (edge - total) / 2.0).abs() < 1e-3);

        // the pinned link sits at its own offset, clamped onto the edge,
        // regardless of where the auto cursor is
        let pinned_link = pinned.link(StageId::Ore, StageId::Export).unwrap();
        let half = pinned_link.thickness / 2.0;
        assert!((pinned_link.target_end.offset - 5.0f32.max(half)).abs() < 1e-3);
    }

    #[test]
    fn endpoints_lie_on_their_edges_with_perpendicular_controls() {
        let layout = routed(&LinkOffsets::new());
        for link in &layout.links {
            let node = &layout.nodes[&link.source];
            let (px, py) = link.source_end.point;
            match link.source_end.side {
                Side::Top => assert!((py - node.rect.y0).abs() < 1e-4),
                Side::Bottom => assert!((py - node.rect.y1).abs() < 1e-4),
                Side::Left => assert!((px - node.rect.x0).abs() < 1e-4),
                Side::Right => assert!((px - node.rect.x1).abs() < 1e-4),
            }
            // the control point leaves the edge along its normal
            let (nx, ny) = link.source_end.side.normal();
            let (cx, cy) = link.source_end.control;
            let along_normal = (cx - px) * nx + (cy - py) * ny;
            let across = ((cx - px) - along_normal * nx).abs() + ((cy - py) - along_normal * ny).abs();
            assert!(along_normal >= 0.0);
            assert!(across < 1e-4);
        }
    }
}
