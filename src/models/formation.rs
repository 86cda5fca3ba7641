//! Formation records (longways set, circle, sets of four...)

use serde::{Deserialize, Serialize};

use super::serde_helpers::{lenient_text, text_or_empty};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    /// Markup; may contain role tokens
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub diagram_image: Option<String>,
}

impl Formation {
    /// Name to show, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
