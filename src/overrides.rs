//! Persisted manual-layout store and the in-memory per-link offset table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::DiagramLayout;
use crate::model::{Rect, Side, StageId};

/// Which end of a link an override refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkEnd {
    Source,
    Target,
}

/// A manually chosen attachment: side plus center offset along that edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndPlacement {
    pub side: Side,
    pub offset: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkOverride {
    #[serde(default)]
    pub source: Option<EndPlacement>,
    #[serde(default)]
    pub target: Option<EndPlacement>,
}

impl LinkOverride {
    pub fn end(&self, end: LinkEnd) -> Option<EndPlacement> {
        match end {
            LinkEnd::Source => self.source,
            LinkEnd::Target => self.target,
        }
    }

    pub fn set_end(&mut self, end: LinkEnd, placement: EndPlacement) {
        match end {
            LinkEnd::Source => self.source = Some(placement),
            LinkEnd::Target => self.target = Some(placement),
        }
    }
}

/// The routing engine's single source of truth for manual attachments,
/// keyed by the `"{source}-{target}"` link identity string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkOffsets {
    #[serde(default)]
    entries: BTreeMap<String, LinkOverride>,
}

impl LinkOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end(&self, key: &str, end: LinkEnd) -> Option<EndPlacement> {
        self.entries.get(key).and_then(|entry| entry.end(end))
    }

    pub fn set_end(&mut self, key: &str, end: LinkEnd, placement: EndPlacement) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .set_end(end, placement);
    }

    pub fn seed(&mut self, key: String, entry: LinkOverride) {
        self.entries.insert(key, entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LinkOverride)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeOverride {
    pub rect: Rect,
    pub rotated: bool,
}

/// Persisted map from stable node/link identity to manually edited
/// geometry. Keys are plain strings so a snapshot saved against one
/// dataset can be applied to another; entries that match nothing in the
/// current graph are silently ignored and never pruned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeOverride>,
    #[serde(default)]
    pub links: BTreeMap<String, LinkOverride>,
}

impl LayoutOverrides {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Full snapshot of the working graph plus the complete offset table.
    pub fn snapshot(layout: &DiagramLayout, offsets: &LinkOffsets) -> Self {
        let mut overrides = Self::default();
        overrides.absorb(layout, offsets);
        overrides
    }

    /// Record the current graph's geometry, superseding earlier entries
    /// for nodes/links present in it. Entries for anything else stay
    /// untouched.
    pub fn absorb(&mut self, layout: &DiagramLayout, offsets: &LinkOffsets) {
        for node in layout.nodes.values() {
            self.nodes.insert(
                node.id.as_str().to_string(),
                NodeOverride {
                    rect: node.rect,
                    rotated: node.rotated,
                },
            );
        }
        for (key, entry) in offsets.iter() {
            self.links.insert(key.clone(), entry.clone());
        }
    }

    /// Overwrite matched node geometry and pre-seed the routing engine's
    /// offset table. Runs once per graph (re)build, after automatic
    /// layout. Unmatched entries are skipped.
    pub fn apply(&self, layout: &mut DiagramLayout, offsets: &mut LinkOffsets) {
        for (key, node_override) in &self.nodes {
            let Some(id) = StageId::from_token(key) else {
                continue;
            };
            if let Some(node) = layout.nodes.get_mut(&id) {
                node.rect = node_override.rect;
                node.rotated = node_override.rotated;
            }
        }
        for (key, link_override) in &self.links {
            offsets.seed(key.clone(), link_override.clone());
        }
    }
}
