//! Render projection
//!
//! Flattens the current dance into the strings the host page drops into the
//! DOM. All role references are already rewritten for the active role set.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::models::Dance;
use crate::roles::{render_markup, render_text, RoleTerms};

pub const EMPTY_TITLE: &str = "No dance matches these filters";
pub const NO_CALLS: &str = "No calls defined for this dance.";
pub const NO_DIAGRAM: &str = "No formation image added yet.";
pub const NO_FIGURE: &str = "No dance illustration added yet.";

/// Something to show in an illustration slot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Illustration {
    Markup { html: String },
    Image { src: String, alt: String },
    Placeholder { text: String },
}

impl Illustration {
    fn placeholder(text: &str) -> Self {
        Illustration::Placeholder {
            text: text.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRow {
    pub part: String,
    pub bars: String,
    pub call_html: String,
}

/// Everything the dance panel displays
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DanceView {
    pub dance_id: Option<String>,
    pub title: String,
    pub formation_label: String,
    pub formation_description_html: String,
    pub diagram: Option<Illustration>,
    pub structure: String,
    pub speed: String,
    pub music_type: String,
    pub difficulty: String,
    pub notes: String,
    pub info_html: String,
    pub instructions_html: String,
    pub figure: Option<Illustration>,
    pub calls: Vec<CallRow>,
    /// Shown instead of the calls table when there are no calls
    pub calls_placeholder: Option<String>,
}

impl DanceView {
    /// View for "nothing selected"
    pub fn empty() -> Self {
        Self {
            dance_id: None,
            title: EMPTY_TITLE.to_string(),
            formation_label: String::new(),
            formation_description_html: String::new(),
            diagram: None,
            structure: String::new(),
            speed: String::new(),
            music_type: String::new(),
            difficulty: String::new(),
            notes: String::new(),
            info_html: String::new(),
            instructions_html: String::new(),
            figure: None,
            calls: Vec::new(),
            calls_placeholder: None,
        }
    }

    pub fn build(dance: &Dance, catalog: &CatalogIndex, terms: &RoleTerms) -> Self {
        let formation = catalog.resolve_formation(dance);
        let formation_label = catalog.formation_label(dance).unwrap_or_default();

        let diagram = match formation.and_then(|f| f.diagram_image.as_deref()) {
            Some(src) => Illustration::Image {
                src: src.to_string(),
                alt: if formation_label.is_empty() {
                    "Formation diagram".to_string()
                } else {
                    formation_label.clone()
                },
            },
            None => Illustration::placeholder(NO_DIAGRAM),
        };

        let figure = match (&dance.figure_html, &dance.figure_image) {
            (Some(html), _) => Illustration::Markup {
                html: render_markup(html, terms),
            },
            (None, Some(src)) => Illustration::Image {
                src: src.clone(),
                alt: format!("{} illustration", dance.display_title()),
            },
            (None, None) => Illustration::placeholder(NO_FIGURE),
        };

        let calls: Vec<CallRow> = dance
            .calls
            .iter()
            .map(|c| CallRow {
                part: c.part.clone(),
                bars: c.bars.clone(),
                call_html: render_markup(&c.call, terms),
            })
            .collect();

        let markup = |html: &Option<String>| {
            html.as_deref()
                .map(|h| render_markup(h, terms))
                .unwrap_or_default()
        };

        Self {
            dance_id: Some(dance.id.clone()),
            title: dance.display_title().to_string(),
            formation_description_html: markup(&formation.and_then(|f| f.description.clone())),
            formation_label,
            diagram: Some(diagram),
            structure: dance.structure_line(),
            speed: dance.speed.clone().unwrap_or_default(),
            music_type: dance.music_type.clone().unwrap_or_default(),
            difficulty: dance.difficulty.map(|d| d.to_string()).unwrap_or_default(),
            notes: dance
                .notes
                .as_deref()
                .map(|n| render_text(n, terms))
                .unwrap_or_default(),
            info_html: markup(&dance.info_html),
            instructions_html: markup(&dance.instructions_html),
            figure: Some(figure),
            calls_placeholder: calls.is_empty().then(|| NO_CALLS.to_string()),
            calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Call, Formation, RoleMapping, RoleSet, Structure};

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(
            vec![],
            vec![Formation {
                id: "longways".to_string(),
                name: "Longways set".to_string(),
                description: Some("<p>[P1s] on the left</p>".to_string()),
                diagram_image: Some("img/longways.svg".to_string()),
            }],
        )
    }

    fn terms() -> RoleTerms {
        RoleTerms::from_role_set(Some(&RoleSet {
            id: "gl".to_string(),
            label: "Gents / Ladies".to_string(),
            mapping: Some(RoleMapping {
                p1: Some("Gent".to_string()),
                p2: Some("Lady".to_string()),
                p1s: None,
                p2s: Some("Ladies".to_string()),
            }),
        }))
    }

    #[test]
    fn test_view_renders_roles_everywhere() {
        let dance = Dance {
            id: "virginia-reel".to_string(),
            title: "Virginia Reel".to_string(),
            formation_id: Some("longways".to_string()),
            structure: Some(Structure {
                bars_per_part: Some(32),
                parts: vec!["A".to_string(), "B".to_string()],
            }),
            difficulty: Some(1),
            notes: Some("Robins start".to_string()),
            calls: vec![Call {
                part: "A1".to_string(),
                bars: "1-8".to_string(),
                call: "<b>[P2s]</b> forward and back".to_string(),
            }],
            ..Default::default()
        };

        let view = DanceView::build(&dance, &catalog(), &terms());

        assert_eq!(view.formation_label, "Longways set");
        assert_eq!(view.formation_description_html, "<p>Gents on the left</p>");
        assert_eq!(view.structure, "32 bars: A, B");
        assert_eq!(view.difficulty, "1");
        assert_eq!(view.notes, "Ladies start");
        assert_eq!(view.calls[0].call_html, "<b>Ladies</b> forward and back");
        assert_eq!(view.calls_placeholder, None);
        assert_eq!(
            view.diagram,
            Some(Illustration::Image {
                src: "img/longways.svg".to_string(),
                alt: "Longways set".to_string(),
            })
        );
        assert_eq!(view.figure, Some(Illustration::placeholder(NO_FIGURE)));
    }

    #[test]
    fn test_view_for_sparse_dance() {
        let dance = Dance {
            id: "mystery".to_string(),
            formation_name: Some("Couples anywhere".to_string()),
            figure_image: Some("img/mystery.png".to_string()),
            ..Default::default()
        };

        let view = DanceView::build(&dance, &catalog(), &RoleTerms::neutral());

        assert_eq!(view.title, "mystery");
        assert_eq!(view.formation_label, "Couples anywhere");
        assert_eq!(view.diagram, Some(Illustration::placeholder(NO_DIAGRAM)));
        assert_eq!(view.calls_placeholder.as_deref(), Some(NO_CALLS));
        assert_eq!(
            view.figure,
            Some(Illustration::Image {
                src: "img/mystery.png".to_string(),
                alt: "mystery illustration".to_string(),
            })
        );
    }
}
