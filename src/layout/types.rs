use std::collections::BTreeMap;

use crate::model::{LinkKind, NodeCategory, Rect, Side, StageId, link_key};

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: StageId,
    pub name: String,
    pub category: NodeCategory,
    pub rect: Rect,
    /// Swaps the rectangle's orientation semantics for the renderer
    /// (label direction). Toggled by the rotate interaction.
    pub rotated: bool,
}

impl NodeLayout {
    /// Orientation used by side inference and endpoint-drag axis choice.
    pub fn is_wide(&self) -> bool {
        self.rect.width() >= self.rect.height()
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect.center()
    }

    /// Length of the given edge: top/bottom run along x, left/right along y.
    pub fn edge_length(&self, side: Side) -> f32 {
        if side.is_horizontal_edge() {
            self.rect.width()
        } else {
            self.rect.height()
        }
    }

    /// Point on the given edge at `offset` from the edge origin
    /// (left end for top/bottom, top end for left/right).
    pub fn edge_point(&self, side: Side, offset: f32) -> (f32, f32) {
        match side {
            Side::Top => (self.rect.x0 + offset, self.rect.y0),
            Side::Bottom => (self.rect.x0 + offset, self.rect.y1),
            Side::Left => (self.rect.x0, self.rect.y0 + offset),
            Side::Right => (self.rect.x1, self.rect.y0 + offset),
        }
    }
}

/// One resolved link end: the attachment side, the center offset along
/// that edge, the projected point, and the cubic control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEndpoint {
    pub side: Side,
    /// Distance from the edge origin to the link's center line.
    pub offset: f32,
    pub point: (f32, f32),
    pub control: (f32, f32),
    /// True when the side/offset came from a saved manual override.
    pub manual: bool,
}

impl Default for LinkEndpoint {
    fn default() -> Self {
        Self {
            side: Side::Top,
            offset: 0.0,
            point: (0.0, 0.0),
            control: (0.0, 0.0),
            manual: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkLayout {
    pub source: StageId,
    pub target: StageId,
    pub kind: LinkKind,
    pub value: f64,
    pub real_value: f64,
    /// On-canvas width, px: `value` times the layout's value scale.
    pub thickness: f32,
    pub source_end: LinkEndpoint,
    pub target_end: LinkEndpoint,
}

impl LinkLayout {
    pub fn key(&self) -> String {
        link_key(self.source, self.target)
    }
}

/// Fully positioned graph handed to the external renderer.
#[derive(Debug, Clone)]
pub struct DiagramLayout {
    pub width: f32,
    pub height: f32,
    /// Pixels per kilotonne, from the proportional pass. Retained so
    /// interactions can re-derive link thickness.
    pub scale: f32,
    pub nodes: BTreeMap<StageId, NodeLayout>,
    pub links: Vec<LinkLayout>,
}

impl DiagramLayout {
    pub fn node(&self, id: StageId) -> Option<&NodeLayout> {
        self.nodes.get(&id)
    }

    pub fn link(&self, source: StageId, target: StageId) -> Option<&LinkLayout> {
        self.links
            .iter()
            .find(|link| link.source == source && link.target == target)
    }
}
