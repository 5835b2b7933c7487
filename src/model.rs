use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed stage vocabulary of the material-flow diagram. Exactly one node
/// per id exists in any diagram instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Ore,
    Concentrate,
    Metal,
    Magnet,
    OtherSemi,
    WindTurbine,
    OtherFinal,
    Loss,
    Export,
    Eol,
}

impl StageId {
    pub const ALL: [StageId; 10] = [
        StageId::Ore,
        StageId::Concentrate,
        StageId::Metal,
        StageId::Magnet,
        StageId::OtherSemi,
        StageId::WindTurbine,
        StageId::OtherFinal,
        StageId::Loss,
        StageId::Export,
        StageId::Eol,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Ore => "ore",
            StageId::Concentrate => "concentrate",
            StageId::Metal => "metal",
            StageId::Magnet => "magnet",
            StageId::OtherSemi => "other_semi",
            StageId::WindTurbine => "wind_turbine",
            StageId::OtherFinal => "other_final",
            StageId::Loss => "loss",
            StageId::Export => "export",
            StageId::Eol => "eol",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        StageId::ALL.iter().copied().find(|id| id.as_str() == token)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StageId::Ore => "Ore",
            StageId::Concentrate => "Concentrate",
            StageId::Metal => "Metal",
            StageId::Magnet => "Magnets",
            StageId::OtherSemi => "Other semi-finished",
            StageId::WindTurbine => "Wind turbines",
            StageId::OtherFinal => "Other final products",
            StageId::Loss => "Loss",
            StageId::Export => "Export",
            StageId::Eol => "End of life",
        }
    }

    pub fn category(self) -> NodeCategory {
        match self {
            StageId::Export => NodeCategory::Trade,
            StageId::Loss => NodeCategory::Loss,
            StageId::Eol => NodeCategory::EndOfLife,
            _ => NodeCategory::Process,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Process,
    Trade,
    Loss,
    EndOfLife,
}

/// Link color/semantics class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Domestic,
    Trade,
    Loss,
}

/// Rectangle edge a link attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Outward unit normal of the edge.
    pub fn normal(self) -> (f32, f32) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
        }
    }

    /// Top/bottom edges run along x, left/right edges along y.
    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Axis-aligned rectangle stored as corner extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Translate so the rectangle lies fully inside `0..w` x `0..h`.
    /// A rectangle larger than the canvas is pinned to the origin edge.
    pub fn clamped_within(&self, w: f32, h: f32) -> Self {
        let dx = if self.x0 < 0.0 {
            -self.x0
        } else if self.x1 > w {
            (w - self.x1).min(0.0).max(-self.x0)
        } else {
            0.0
        };
        let dy = if self.y0 < 0.0 {
            -self.y0
        } else if self.y1 > h {
            (h - self.y1).min(0.0).max(-self.y0)
        } else {
            0.0
        };
        self.translated(dx, dy)
    }

    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x0 * sx, self.y0 * sy, self.x1 * sx, self.y1 * sy)
    }
}

/// One year's record of named flow volumes in kilotonnes. Lookup by any
/// field name; absent fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowRow {
    fields: BTreeMap<String, f64>,
}

impl FlowRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self { fields }
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> f64 {
        self.fields.get(name).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decode a year-keyed table of rows, the shape an external spreadsheet
/// loader hands over: `{"2020": {"domestic-ore": 100.0, ...}, ...}`.
pub fn rows_from_json(input: &str) -> anyhow::Result<BTreeMap<i32, FlowRow>> {
    let raw: BTreeMap<String, FlowRow> = serde_json::from_str(input)?;
    let mut rows = BTreeMap::new();
    for (year, row) in raw {
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid year key: {year:?}"))?;
        rows.insert(year, row);
    }
    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct FlowNode {
    pub id: StageId,
    pub name: String,
    pub category: NodeCategory,
}

impl FlowNode {
    pub fn new(id: StageId) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            category: id.category(),
        }
    }
}

/// A value-weighted directed flow between two stages. At most one link
/// exists per (source, target) pair.
#[derive(Debug, Clone)]
pub struct FlowLink {
    pub source: StageId,
    pub target: StageId,
    pub kind: LinkKind,
    /// Magnitude used for layout sizing; floored for force-visible links.
    pub value: f64,
    /// True magnitude, always shown in labels even when `value` was floored.
    pub real_value: f64,
}

impl FlowLink {
    /// Stable identity string, also the override-store key.
    pub fn key(&self) -> String {
        link_key(self.source, self.target)
    }
}

pub fn link_key(source: StageId, target: StageId) -> String {
    format!("{}-{}", source.as_str(), target.as_str())
}

/// Unpositioned working graph produced by the builder.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    pub fn link(&self, source: StageId, target: StageId) -> Option<&FlowLink> {
        self.links
            .iter()
            .find(|link| link.source == source && link.target == target)
    }
}

/// Free-floating annotation, independent of the flow graph. Created and
/// deleted only by user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLabel {
    pub id: u64,
    pub text: String,
    pub x: f32,
    pub y: f32,
}
