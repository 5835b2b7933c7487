use serde::{Deserialize, Serialize};

use crate::model::{LinkKind, NodeCategory};

/// Cosmetic palette consumed only by the external renderer via the dump
/// boundary; layout and routing never read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub label_color: String,
    pub process_fill: String,
    pub trade_fill: String,
    pub loss_fill: String,
    pub eol_fill: String,
    pub domestic_link: String,
    pub trade_link: String,
    pub loss_link: String,
}

impl Theme {
    /// Palette matching the reference figure.
    pub fn reference() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            label_color: "#333333".to_string(),
            process_fill: "#4E79A7".to_string(),
            trade_fill: "#F28E2C".to_string(),
            loss_fill: "#BAB0AB".to_string(),
            eol_fill: "#59A14F".to_string(),
            domestic_link: "#A7C4E2".to_string(),
            trade_link: "#F7C48A".to_string(),
            loss_link: "#D5CFCB".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            label_color: "#1C2430".to_string(),
            process_fill: "#5B8DEF".to_string(),
            trade_fill: "#F0A35E".to_string(),
            loss_fill: "#AEB4BE".to_string(),
            eol_fill: "#63B179".to_string(),
            domestic_link: "#C3D4F5".to_string(),
            trade_link: "#F8D3AC".to_string(),
            loss_link: "#D9DCE2".to_string(),
        }
    }

    pub fn node_fill(&self, category: NodeCategory) -> &str {
        match category {
            NodeCategory::Process => &self.process_fill,
            NodeCategory::Trade => &self.trade_fill,
            NodeCategory::Loss => &self.loss_fill,
            NodeCategory::EndOfLife => &self.eol_fill,
        }
    }

    pub fn link_color(&self, kind: LinkKind) -> &str {
        match kind {
            LinkKind::Domestic => &self.domestic_link,
            LinkKind::Trade => &self.trade_link,
            LinkKind::Loss => &self.loss_link,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::reference()
    }
}
