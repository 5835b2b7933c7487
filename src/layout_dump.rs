//! Serializable view of a positioned graph, handed to the external
//! renderer. The core emits geometry and colors; it draws no pixels.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::DiagramLayout;
use crate::model::{CustomLabel, LinkKind, NodeCategory, Side};
use crate::theme::Theme;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub font_family: String,
    pub font_size: f32,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub category: NodeCategory,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub rotated: bool,
    pub fill: String,
}

#[derive(Debug, Serialize)]
pub struct EndDump {
    pub side: Side,
    pub offset: f32,
    pub point: [f32; 2],
    pub control: [f32; 2],
    pub manual: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
    /// True magnitude for labels/tooltips, even when the drawn width was
    /// floored for visibility.
    pub real_value: f64,
    pub value: f64,
    pub thickness: f32,
    pub color: String,
    pub source_end: EndDump,
    pub target_end: EndDump,
    /// Cubic path `M source C c1 c2 target` as coordinate pairs.
    pub path: [[f32; 2]; 4],
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub id: u64,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &DiagramLayout, theme: &Theme, labels: &[CustomLabel]) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.as_str().to_string(),
                name: node.name.clone(),
                category: node.category,
                x0: node.rect.x0,
                y0: node.rect.y0,
                x1: node.rect.x1,
                y1: node.rect.y1,
                rotated: node.rotated,
                fill: theme.node_fill(node.category).to_string(),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| {
                let source_end = EndDump {
                    side: link.source_end.side,
                    offset: link.source_end.offset,
                    point: [link.source_end.point.0, link.source_end.point.1],
                    control: [link.source_end.control.0, link.source_end.control.1],
                    manual: link.source_end.manual,
                };
                let target_end = EndDump {
                    side: link.target_end.side,
                    offset: link.target_end.offset,
                    point: [link.target_end.point.0, link.target_end.point.1],
                    control: [link.target_end.control.0, link.target_end.control.1],
                    manual: link.target_end.manual,
                };
                let path = [
                    source_end.point,
                    source_end.control,
                    target_end.control,
                    target_end.point,
                ];
                LinkDump {
                    source: link.source.as_str().to_string(),
                    target: link.target.as_str().to_string(),
                    kind: link.kind,
                    real_value: link.real_value,
                    value: link.value,
                    thickness: link.thickness,
                    color: theme.link_color(link.kind).to_string(),
                    source_end,
                    target_end,
                    path,
                }
            })
            .collect();

        let labels = labels
            .iter()
            .map(|label| LabelDump {
                id: label.id,
                text: label.text.clone(),
                x: label.x,
                y: label.y,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            background: theme.background.clone(),
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            nodes,
            links,
            labels,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &DiagramLayout,
    theme: &Theme,
    labels: &[CustomLabel],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, theme, labels);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::LayoutConfig;
    use crate::layout::{compute_layout, route};
    use crate::model::FlowRow;
    use crate::overrides::LinkOffsets;

    #[test]
    fn dump_carries_geometry_and_true_values() {
        let graph = build(&FlowRow::from_pairs([
            ("domestic-ore", 100.0),
            ("wind-turbine-outflow", 0.0),
        ]));
        let mut layout = compute_layout(&graph, &LayoutConfig::default(), (960.0, 600.0)).unwrap();
        route(&mut layout, &LinkOffsets::new());
        let dump = LayoutDump::from_layout(&layout, &Theme::reference(), &[]);

        assert_eq!(dump.nodes.len(), 10);
        let forced = dump
            .links
            .iter()
            .find(|link| link.source == "wind_turbine" && link.target == "eol")
            .unwrap();
        assert_eq!(forced.real_value, 0.0);
        assert!(forced.value >= 0.25);
        let json = serde_json::to_string(&dump).unwrap();
        assert!(json.contains("\"wind_turbine\""));
        assert!(json.contains("\"path\""));
    }
}
