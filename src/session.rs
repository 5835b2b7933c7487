//! Editor session: owns the working graph for the selected year and the
//! mutable interaction state (override store, link-offset table, labels).
//!
//! Every interaction event derives a new layout snapshot from the previous
//! one plus the event's delta, re-routes it, and only then swaps it in, so
//! a render never observes a half-updated (graph, offsets) pair.

use crate::builder::build;
use crate::config::Config;
use crate::layout::{DiagramLayout, LayoutError, NodeLayout, compute_layout, route};
use crate::model::{CustomLabel, FlowGraph, FlowRow, Rect, Side, StageId};
use crate::overrides::{EndPlacement, LayoutOverrides, LinkEnd, LinkOffsets};

/// Smallest node extent reachable through the resize interaction, units.
pub const MIN_NODE_SIZE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct EditorSession {
    config: Config,
    row: FlowRow,
    graph: FlowGraph,
    layout: DiagramLayout,
    overrides: LayoutOverrides,
    offsets: LinkOffsets,
    labels: Vec<CustomLabel>,
    next_label_id: u64,
}

impl EditorSession {
    pub fn new(row: FlowRow, config: Config) -> Result<Self, LayoutError> {
        let overrides = LayoutOverrides::default();
        let (graph, layout, offsets) = recompute(&row, &config, &overrides)?;
        Ok(Self {
            config,
            row,
            graph,
            layout,
            overrides,
            offsets,
            labels: Vec::new(),
            next_label_id: 1,
        })
    }

    pub fn layout(&self) -> &DiagramLayout {
        &self.layout
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn overrides(&self) -> &LayoutOverrides {
        &self.overrides
    }

    pub fn offsets(&self) -> &LinkOffsets {
        &self.offsets
    }

    pub fn labels(&self) -> &[CustomLabel] {
        &self.labels
    }

    fn canvas(&self) -> (f32, f32) {
        self.config.render.canvas()
    }

    /// Rebuild the working graph from a new row (e.g. switching years),
    /// reapplying the saved overrides. On layout failure the previous
    /// working graph is retained and the error reported.
    pub fn rebuild(&mut self, row: FlowRow) -> Result<(), LayoutError> {
        let (graph, layout, offsets) = recompute(&row, &self.config, &self.overrides)?;
        self.row = row;
        self.graph = graph;
        self.layout = layout;
        self.offsets = offsets;
        Ok(())
    }

    /// Load an entirely new dataset: the saved overrides are cleared
    /// before the rebuild. Custom labels are independent and survive.
    pub fn load_dataset(&mut self, row: FlowRow) -> Result<(), LayoutError> {
        let cleared = LayoutOverrides::default();
        let (graph, layout, offsets) = recompute(&row, &self.config, &cleared)?;
        self.overrides = cleared;
        self.row = row;
        self.graph = graph;
        self.layout = layout;
        self.offsets = offsets;
        Ok(())
    }

    /// Replace the override store (e.g. from persisted storage) and
    /// rebuild the current row against it.
    pub fn load_overrides(&mut self, overrides: LayoutOverrides) -> Result<(), LayoutError> {
        let (graph, layout, offsets) = recompute(&self.row, &self.config, &overrides)?;
        self.overrides = overrides;
        self.graph = graph;
        self.layout = layout;
        self.offsets = offsets;
        Ok(())
    }

    pub fn set_config(&mut self, config: Config) -> Result<(), LayoutError> {
        let (graph, layout, offsets) = recompute(&self.row, &config, &self.overrides)?;
        self.config = config;
        self.graph = graph;
        self.layout = layout;
        self.offsets = offsets;
        Ok(())
    }

    /// Snapshot the current node geometry and the full link-offset table
    /// into the override store, superseding earlier entries for anything
    /// present in the current graph. Returns the updated snapshot.
    pub fn save_layout(&mut self) -> LayoutOverrides {
        self.overrides.absorb(&self.layout, &self.offsets);
        log::debug!(
            "saved layout: {} node overrides, {} link overrides",
            self.overrides.nodes.len(),
            self.overrides.links.len()
        );
        self.overrides.clone()
    }

    /// Derive the next layout snapshot from the current one, re-route,
    /// then swap it in.
    fn with_layout(&mut self, mutate: impl FnOnce(&mut DiagramLayout)) {
        let mut next = self.layout.clone();
        mutate(&mut next);
        route(&mut next, &self.offsets);
        self.layout = next;
    }

    /// Translate a node, clamped so its rectangle stays fully on canvas.
    pub fn drag_node(&mut self, id: StageId, dx: f32, dy: f32) {
        let (w, h) = self.canvas();
        self.with_layout(|layout| {
            if let Some(node) = layout.nodes.get_mut(&id) {
                node.rect = node.rect.translated(dx, dy).clamped_within(w, h);
            }
        });
    }

    /// Resize anchored at the top-left corner: the pointer (clamped to the
    /// canvas) sets the opposite corner, never below the minimum extent.
    pub fn resize_node(&mut self, id: StageId, pointer: (f32, f32)) {
        let (w, h) = self.canvas();
        let px = pointer.0.clamp(0.0, w);
        let py = pointer.1.clamp(0.0, h);
        self.with_layout(|layout| {
            if let Some(node) = layout.nodes.get_mut(&id) {
                node.rect.x1 = px.max(node.rect.x0 + MIN_NODE_SIZE);
                node.rect.y1 = py.max(node.rect.y0 + MIN_NODE_SIZE);
            }
        });
    }

    /// Swap the rectangle's extents around its center and toggle the
    /// rotation flag.
    pub fn rotate_node(&mut self, id: StageId) {
        self.with_layout(|layout| {
            if let Some(node) = layout.nodes.get_mut(&id) {
                let (cx, cy) = node.rect.center();
                let half_w = node.rect.height() / 2.0;
                let half_h = node.rect.width() / 2.0;
                node.rect = Rect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h);
                node.rotated = !node.rotated;
            }
        });
    }

    /// Reassign a link end from a pointer position over its owning node:
    /// the side comes from the pointer relative to the node's center along
    /// the orientation axis, the offset is clamped onto the edge. Written
    /// straight into the offset table the routing engine reads.
    pub fn drag_link_end(
        &mut self,
        source: StageId,
        target: StageId,
        end: LinkEnd,
        pointer: (f32, f32),
    ) {
        let Some(link) = self.layout.link(source, target) else {
            return;
        };
        let owner = match end {
            LinkEnd::Source => link.source,
            LinkEnd::Target => link.target,
        };
        let Some(node) = self.layout.nodes.get(&owner) else {
            return;
        };
        let placement = placement_for_pointer(node, pointer);
        self.offsets
            .set_end(&crate::model::link_key(source, target), end, placement);
        self.with_layout(|_| {});
    }

    pub fn add_label(&mut self, text: &str, position: (f32, f32)) -> u64 {
        let id = self.next_label_id;
        self.next_label_id += 1;
        self.labels.push(CustomLabel {
            id,
            text: text.to_string(),
            x: position.0,
            y: position.1,
        });
        id
    }

    pub fn edit_label(&mut self, id: u64, text: &str) -> bool {
        match self.labels.iter_mut().find(|label| label.id == id) {
            Some(label) => {
                label.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_label(&mut self, id: u64) -> bool {
        let before = self.labels.len();
        self.labels.retain(|label| label.id != id);
        self.labels.len() != before
    }

    /// Move a label, clamped to canvas bounds.
    pub fn move_label(&mut self, id: u64, position: (f32, f32)) -> bool {
        let (w, h) = self.canvas();
        match self.labels.iter_mut().find(|label| label.id == id) {
            Some(label) => {
                label.x = position.0.clamp(0.0, w);
                label.y = position.1.clamp(0.0, h);
                true
            }
            None => false,
        }
    }
}

fn recompute(
    row: &FlowRow,
    config: &Config,
    overrides: &LayoutOverrides,
) -> Result<(FlowGraph, DiagramLayout, LinkOffsets), LayoutError> {
    let graph = build(row);
    let mut layout = compute_layout(&graph, &config.layout, config.render.canvas())?;
    let mut offsets = LinkOffsets::new();
    overrides.apply(&mut layout, &mut offsets);
    route(&mut layout, &offsets);
    Ok((graph, layout, offsets))
}

/// Pointer-to-attachment mapping for the endpoint drag: the orientation
/// axis picks top/bottom vs left/right, the pointer's position along the
/// edge becomes the offset.
fn placement_for_pointer(node: &NodeLayout, pointer: (f32, f32)) -> EndPlacement {
    let (cx, cy) = node.center();
    if node.is_wide() {
        let side = if pointer.1 < cy { Side::Top } else { Side::Bottom };
        let offset = (pointer.0 - node.rect.x0).clamp(0.0, node.rect.width());
        EndPlacement { side, offset }
    } else {
        let side = if pointer.0 < cx { Side::Left } else { Side::Right };
        let offset = (pointer.1 - node.rect.y0).clamp(0.0, node.rect.height());
        EndPlacement { side, offset }
    }
}
