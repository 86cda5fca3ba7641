//! Role-set records: terminology for the two partner roles

use serde::{Deserialize, Serialize};

use super::serde_helpers::{lenient_text, text_or_empty};

/// Terms for each role; any key may be missing
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMapping {
    #[serde(rename = "P1", default, deserialize_with = "lenient_text")]
    pub p1: Option<String>,
    #[serde(rename = "P2", default, deserialize_with = "lenient_text")]
    pub p2: Option<String>,
    #[serde(rename = "P1S", alias = "P1s", default, deserialize_with = "lenient_text")]
    pub p1s: Option<String>,
    #[serde(rename = "P2S", alias = "P2s", default, deserialize_with = "lenient_text")]
    pub p2s: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub id: String,
    #[serde(default, alias = "name", deserialize_with = "text_or_empty")]
    pub label: String,
    #[serde(default)]
    pub mapping: Option<RoleMapping>,
}

impl RoleSet {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}
