//! Role-set substitution engine
//!
//! Rewrites role references in two strictly ordered passes:
//!
//! 1. Normalize: `[P1]`, `[P1s]`, `[P2]`, `[P2s]` and the legacy words
//!    Lark(s)/Robin(s) become the canonical placeholders
//!    "Person 1", "Person 1s", "Person 2", "Person 2s".
//! 2. Project: canonical placeholders become the terms of the selected
//!    role set.
//!
//! Each pass is a single `replace_all`, so no text is rewritten twice within
//! a pass. Legacy words match whole and capitalised only: "Larkspur" and
//! "off on a lark" are left alone.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::markup::MarkupTree;
use crate::models::{RoleMapping, RoleSet};

static ROLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[Pp]([12])([sS]?)\]|\b(?:(Lark)|(Robin))(s?)\b")
        .expect("role reference pattern is valid")
});

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bPerson ([12])(s?)\b").expect("placeholder pattern is valid"));

/// One of the two partner roles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    One,
    Two,
}

impl Role {
    fn from_digit(digit: &str) -> Self {
        if digit == "2" {
            Role::Two
        } else {
            Role::One
        }
    }

    fn neutral(self, plural: bool) -> &'static str {
        match (self, plural) {
            (Role::One, false) => "Person 1",
            (Role::One, true) => "Person 1s",
            (Role::Two, false) => "Person 2",
            (Role::Two, true) => "Person 2s",
        }
    }
}

/// Where a role term may come from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermSource {
    /// The role set's own key (`P1`, `P1S`, ...)
    Mapped,
    /// The mapped singular with an "s" appended (plural lookups only)
    PluralisedSingular,
    /// The canonical "Person 1"/"Person 2" wording
    Neutral,
}

/// Precedence for singular terms
pub const SINGULAR_SOURCES: [TermSource; 2] = [TermSource::Mapped, TermSource::Neutral];

/// Precedence for plural terms
pub const PLURAL_SOURCES: [TermSource; 3] = [
    TermSource::Mapped,
    TermSource::PluralisedSingular,
    TermSource::Neutral,
];

fn mapped(mapping: &RoleMapping, role: Role, plural: bool) -> Option<&str> {
    let term = match (role, plural) {
        (Role::One, false) => &mapping.p1,
        (Role::One, true) => &mapping.p1s,
        (Role::Two, false) => &mapping.p2,
        (Role::Two, true) => &mapping.p2s,
    };
    term.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Resolve one term by trying `sources` in order
pub fn resolve_term(
    mapping: Option<&RoleMapping>,
    role: Role,
    plural: bool,
    sources: &[TermSource],
) -> Option<String> {
    sources.iter().find_map(|source| match source {
        TermSource::Mapped => mapping.and_then(|m| mapped(m, role, plural)).map(str::to_string),
        TermSource::PluralisedSingular if plural => mapping
            .and_then(|m| mapped(m, role, false))
            .map(|singular| format!("{}s", singular)),
        TermSource::PluralisedSingular => None,
        TermSource::Neutral => Some(role.neutral(plural).to_string()),
    })
}

/// The four resolved terms for the active role set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleTerms {
    pub p1: String,
    pub p2: String,
    pub p1s: String,
    pub p2s: String,
}

impl Default for RoleTerms {
    fn default() -> Self {
        Self::neutral()
    }
}

impl RoleTerms {
    /// Terms used when no role set is selected
    pub fn neutral() -> Self {
        Self {
            p1: Role::One.neutral(false).to_string(),
            p2: Role::Two.neutral(false).to_string(),
            p1s: Role::One.neutral(true).to_string(),
            p2s: Role::Two.neutral(true).to_string(),
        }
    }

    pub fn from_role_set(role_set: Option<&RoleSet>) -> Self {
        let mapping = role_set.and_then(|set| set.mapping.as_ref());
        let term = |role, plural| {
            let sources: &[TermSource] = if plural { &PLURAL_SOURCES } else { &SINGULAR_SOURCES };
            resolve_term(mapping, role, plural, sources)
                .unwrap_or_else(|| role.neutral(plural).to_string())
        };

        Self {
            p1: term(Role::One, false),
            p2: term(Role::Two, false),
            p1s: term(Role::One, true),
            p2s: term(Role::Two, true),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }

    pub fn term(&self, role: Role, plural: bool) -> &str {
        match (role, plural) {
            (Role::One, false) => &self.p1,
            (Role::One, true) => &self.p1s,
            (Role::Two, false) => &self.p2,
            (Role::Two, true) => &self.p2s,
        }
    }

    /// Copy with every term escaped for insertion into markup text
    pub fn escaped(&self) -> Self {
        let escape = |term: &str| quick_xml::escape::escape(term).into_owned();
        Self {
            p1: escape(&self.p1),
            p2: escape(&self.p2),
            p1s: escape(&self.p1s),
            p2s: escape(&self.p2s),
        }
    }
}

/// Pass 1: rewrite tokens and legacy words to canonical placeholders
pub fn normalise_roles(text: &str) -> Cow<'_, str> {
    ROLE_REFERENCE.replace_all(text, |caps: &Captures| {
        let (role, plural) = if let Some(digit) = caps.get(1) {
            (Role::from_digit(digit.as_str()), caps.get(2).map_or(false, |m| !m.is_empty()))
        } else {
            let role = if caps.get(3).is_some() { Role::One } else { Role::Two };
            (role, caps.get(5).map_or(false, |m| !m.is_empty()))
        };
        role.neutral(plural)
    })
}

/// Pass 2: rewrite canonical placeholders to the given terms
pub fn project_roles<'t>(text: &'t str, terms: &RoleTerms) -> Cow<'t, str> {
    if terms.is_neutral() {
        return Cow::Borrowed(text);
    }
    PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let role = Role::from_digit(&caps[1]);
        let plural = !caps[2].is_empty();
        terms.term(role, plural).to_string()
    })
}

/// Run both passes over plain text
pub fn render_text(text: &str, terms: &RoleTerms) -> String {
    let normalised = normalise_roles(text);
    project_roles(&normalised, terms).into_owned()
}

/// Run both passes over the text leaves of a markup fragment
///
/// Tags, attributes and comments pass through untouched.
pub fn render_markup(markup: &str, terms: &RoleTerms) -> String {
    let escaped = terms.escaped();
    let mut tree = MarkupTree::parse_lenient(markup);
    tree.map_text(|text| render_text(text, &escaped));
    tree.to_markup()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn larks_robins() -> RoleSet {
        RoleSet {
            id: "larks-robins".to_string(),
            label: "Larks / Robins".to_string(),
            mapping: Some(RoleMapping {
                p1: Some("Lark".to_string()),
                p2: Some("Robin".to_string()),
                p1s: Some("Larks".to_string()),
                p2s: Some("Robins".to_string()),
            }),
        }
    }

    fn gents_ladies() -> RoleSet {
        RoleSet {
            id: "gents-ladies".to_string(),
            label: "Gents / Ladies".to_string(),
            mapping: Some(RoleMapping {
                p1: Some("Gent".to_string()),
                p2: Some("Lady".to_string()),
                p1s: None,
                p2s: Some("Ladies".to_string()),
            }),
        }
    }

    #[test]
    fn test_tokens_without_role_set() {
        let terms = RoleTerms::neutral();
        assert_eq!(
            render_text("[P1] crosses to [P2s]", &terms),
            "Person 1 crosses to Person 2s"
        );
    }

    #[test]
    fn test_tokens_with_role_set() {
        let terms = RoleTerms::from_role_set(Some(&larks_robins()));
        assert_eq!(render_text("[P1] crosses to [P2s]", &terms), "Lark crosses to Robins");
    }

    #[test]
    fn test_legacy_words_are_projected() {
        let terms = RoleTerms::from_role_set(Some(&gents_ladies()));
        assert_eq!(
            render_text("Larks cast, Robin turns the Lark", &terms),
            "Gents cast, Lady turns the Gent"
        );
    }

    #[test]
    fn test_lowercase_legacy_words_are_prose() {
        let terms = RoleTerms::from_role_set(Some(&gents_ladies()));
        assert_eq!(
            render_text("Off on a lark, the robins sing", &terms),
            "Off on a lark, the robins sing"
        );
        assert_eq!(render_text("Lark and robin", &terms), "Gent and robin");
    }

    #[test]
    fn test_markup_with_literal_less_than() {
        let terms = RoleTerms::from_role_set(Some(&gents_ladies()));
        assert_eq!(render_markup("[P1] <3 [P2]", &terms), "Gent <3 Lady");
        assert_eq!(render_markup("[P1] < [P2]", &terms), "Gent < Lady");
        assert_eq!(render_markup("[P1] and [P2]", &RoleTerms::neutral()), "Person 1 and Person 2");
    }

    #[test]
    fn test_plural_falls_back_to_singular_plus_s() {
        let terms = RoleTerms::from_role_set(Some(&gents_ladies()));
        assert_eq!(terms.p1s, "Gents");
        assert_eq!(terms.p2s, "Ladies");
    }

    #[test]
    fn test_missing_mapping_is_neutral() {
        let set = RoleSet {
            id: "plain".to_string(),
            label: "Plain".to_string(),
            mapping: None,
        };
        assert!(RoleTerms::from_role_set(Some(&set)).is_neutral());
    }

    #[test]
    fn test_word_boundaries_protect_longer_words() {
        let terms = RoleTerms::from_role_set(Some(&gents_ladies()));
        assert_eq!(
            render_text("Larkspur and Robinson meet Personnel", &terms),
            "Larkspur and Robinson meet Personnel"
        );
    }

    #[test]
    fn test_token_is_not_substituted_twice() {
        // Role set maps P1 onto the wording of a legacy P2 word
        let swapped = RoleSet {
            id: "swapped".to_string(),
            label: "Swapped".to_string(),
            mapping: Some(RoleMapping {
                p1: Some("Robin".to_string()),
                p2: Some("Lark".to_string()),
                p1s: None,
                p2s: None,
            }),
        };
        let terms = RoleTerms::from_role_set(Some(&swapped));
        assert_eq!(render_text("[P1] and [P2]", &terms), "Robin and Lark");
    }

    #[test]
    fn test_render_twice_is_a_no_op() {
        for set in [larks_robins(), gents_ladies()] {
            let terms = RoleTerms::from_role_set(Some(&set));
            let once = render_text("[P1s] set to [P2]; Larks turn Robins; Person 2 leads", &terms);
            assert_eq!(render_text(&once, &terms), once);
        }
    }

    #[test]
    fn test_resolve_term_precedence() {
        let mapping = RoleMapping {
            p1: Some("Lead".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_term(Some(&mapping), Role::One, true, &PLURAL_SOURCES).as_deref(),
            Some("Leads")
        );
        assert_eq!(
            resolve_term(Some(&mapping), Role::Two, true, &PLURAL_SOURCES).as_deref(),
            Some("Person 2s")
        );
        assert_eq!(
            resolve_term(Some(&mapping), Role::One, true, &[TermSource::Mapped]),
            None
        );
    }

    #[test]
    fn test_markup_keeps_tags_and_attributes() {
        let terms = RoleTerms::from_role_set(Some(&larks_robins()));
        let html = r#"<p class="Lark">[P1] <em>turns</em> [P2s]<br>&nbsp;done</p>"#;
        assert_eq!(
            render_markup(html, &terms),
            r#"<p class="Lark">Lark <em>turns</em> Robins<br>&nbsp;done</p>"#
        );
    }

    #[test]
    fn test_markup_escapes_inserted_terms() {
        let set = RoleSet {
            id: "amp".to_string(),
            label: "Amp".to_string(),
            mapping: Some(RoleMapping {
                p1: Some("Lead & Co".to_string()),
                ..Default::default()
            }),
        };
        let terms = RoleTerms::from_role_set(Some(&set));
        assert_eq!(render_markup("<b>[P1]</b>", &terms), "<b>Lead &amp; Co</b>");
        assert_eq!(render_text("[P1]", &terms), "Lead & Co");
    }
}
