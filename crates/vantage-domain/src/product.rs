//! Which product the insights are for, and which competitor it is measured against

use serde::{Deserialize, Serialize};

/// Product context woven into every analysis prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductContext {
    /// Our own product
    pub name: String,

    /// The competing product under observation
    pub competitor: String,
}

impl Default for ProductContext {
    fn default() -> Self {
        Self {
            name: "AEROCHAMBER PLUS* FLOW-VU* Chamber".to_string(),
            competitor: "Philips Respironics OptiChamber Diamond".to_string(),
        }
    }
}

impl ProductContext {
    /// Context for an arbitrary product pair
    pub fn new(name: impl Into<String>, competitor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            competitor: competitor.into(),
        }
    }
}
