//! Markup tree for text-leaf transforms
//!
//! Parses an HTML-ish fragment into a tree of nodes, lets callers rewrite the
//! text leaves, and serializes it back. Every node keeps its exact source
//! slice, so an untouched tree serializes byte-for-byte to its input.
//!
//! Fragments are authored by hand and are not always well-formed XML: void
//! elements (`<br>`), mismatched end tags and HTML entities are all tolerated.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { position: usize, message: String },
}

/// A node of a parsed fragment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupNode {
    /// Element with its raw start tag and, if present, its raw end tag
    Element {
        name: String,
        open: String,
        children: Vec<MarkupNode>,
        close: Option<String>,
    },
    /// Self-closing element, e.g. `<img src="..."/>`
    Empty(String),
    /// Raw (still escaped) character data
    Text(String),
    /// Comments, CDATA, processing instructions, stray end tags
    Verbatim(String),
}

impl MarkupNode {
    fn map_text<F: FnMut(&str) -> String>(&mut self, f: &mut F) {
        match self {
            MarkupNode::Element { children, .. } => {
                for child in children {
                    child.map_text(f);
                }
            }
            MarkupNode::Text(text) => {
                let rewritten = f(text.as_str());
                *text = rewritten;
            }
            MarkupNode::Empty(_) | MarkupNode::Verbatim(_) => {}
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            MarkupNode::Element {
                open,
                children,
                close,
                ..
            } => {
                out.push_str(open);
                for child in children {
                    child.write_to(out);
                }
                if let Some(close) = close {
                    out.push_str(close);
                }
            }
            MarkupNode::Empty(raw) | MarkupNode::Text(raw) | MarkupNode::Verbatim(raw) => {
                out.push_str(raw)
            }
        }
    }
}

/// Element still waiting for its end tag during parsing
struct OpenElement {
    name: String,
    open: String,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn finish(self, close: Option<String>) -> MarkupNode {
        MarkupNode::Element {
            name: self.name,
            open: self.open,
            children: self.children,
            close,
        }
    }
}

/// A parsed markup fragment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupTree {
    nodes: Vec<MarkupNode>,
}

impl MarkupTree {
    pub fn nodes(&self) -> &[MarkupNode] {
        &self.nodes
    }

    /// Parse a fragment into a tree
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(markup);
        reader.trim_text(false);
        reader.check_end_names(false);

        let mut roots: Vec<MarkupNode> = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        loop {
            let start = reader.buffer_position();
            let event = reader.read_event().map_err(|e| MarkupError::Malformed {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;
            let end = reader.buffer_position();
            let slice = |to: usize| {
                markup
                    .get(start..to)
                    .map(str::to_string)
                    .ok_or_else(|| MarkupError::Malformed {
                        position: start,
                        message: "event does not fall on a character boundary".to_string(),
                    })
            };
            let raw = || slice(end);

            let node = match event {
                Event::Eof => break,
                Event::Start(e) => {
                    stack.push(OpenElement {
                        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        open: raw()?,
                        children: Vec::new(),
                    });
                    continue;
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match stack
                        .iter()
                        .rposition(|open| open.name.eq_ignore_ascii_case(&name))
                    {
                        Some(matched) => {
                            // Anything opened after the match was never closed (`<br>`, `<li>`)
                            while stack.len() > matched + 1 {
                                if let Some(unclosed) = stack.pop() {
                                    push_node(&mut stack, &mut roots, unclosed.finish(None));
                                }
                            }
                            match stack.pop() {
                                Some(element) => element.finish(Some(raw()?)),
                                None => continue,
                            }
                        }
                        None => MarkupNode::Verbatim(raw()?),
                    }
                }
                Event::Empty(_) => MarkupNode::Empty(raw()?),
                // The reader position lags by a byte after text that runs to the end of
                // input, so text is sliced by its own length
                Event::Text(text) => MarkupNode::Text(slice(start + text.len())?),
                Event::CData(_)
                | Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => MarkupNode::Verbatim(raw()?),
            };

            push_node(&mut stack, &mut roots, node);
        }

        while let Some(unclosed) = stack.pop() {
            push_node(&mut stack, &mut roots, unclosed.finish(None));
        }

        Ok(Self { nodes: roots })
    }

    /// Parse a fragment, degrading to a flat tag/text split on error
    ///
    /// The fallback treats every `<...>` run as opaque and everything else as
    /// text, which is enough to keep attributes out of text transforms.
    pub fn parse_lenient(markup: &str) -> Self {
        match Self::parse(markup) {
            Ok(tree) => tree,
            Err(e) => {
                log::warn!("Falling back to flat markup scan: {}", e);
                Self::scan(markup)
            }
        }
    }

    fn scan(markup: &str) -> Self {
        let mut nodes: Vec<MarkupNode> = Vec::new();
        let mut text = String::new();
        let mut rest = markup;

        while let Some(i) = rest.find('<') {
            text.push_str(&rest[..i]);
            rest = &rest[i..];

            // A `<` not followed by a name, `/`, `!` or `?` is literal text ("a < b", "<3")
            let opens_tag = rest[1..]
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
            if !opens_tag {
                text.push('<');
                rest = &rest[1..];
                continue;
            }

            if !text.is_empty() {
                nodes.push(MarkupNode::Text(std::mem::take(&mut text)));
            }
            let tag_end = rest.find('>').map_or(rest.len(), |i| i + 1);
            nodes.push(MarkupNode::Verbatim(rest[..tag_end].to_string()));
            rest = &rest[tag_end..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            nodes.push(MarkupNode::Text(text));
        }

        Self { nodes }
    }

    /// Rewrite every text leaf in document order
    pub fn map_text<F: FnMut(&str) -> String>(&mut self, mut f: F) {
        for node in &mut self.nodes {
            node.map_text(&mut f);
        }
    }

    /// Serialize back to markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_tree_round_trips_exactly() {
        let inputs = [
            "plain text",
            r#"<p class="call">Set <b>twice</b></p>"#,
            "<ul><li>one<li>two</ul>",
            "line<br>break<br/>end",
            "<!-- note -->&amp; <i>x</i>",
            "</b>stray",
            "a < b",
        ];
        for input in inputs {
            let tree = MarkupTree::parse_lenient(input);
            assert_eq!(tree.to_markup(), input);
        }
    }

    #[test]
    fn test_void_element_does_not_swallow_end_tag() {
        let tree = MarkupTree::parse("<p>a<br>b</p>").unwrap();
        match &tree.nodes()[0] {
            MarkupNode::Element { name, close, .. } => {
                assert_eq!(name, "p");
                assert_eq!(close.as_deref(), Some("</p>"));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_map_text_leaves_tags_alone() {
        let mut tree = MarkupTree::parse(r#"<a title="swing">swing</a> and swing"#).unwrap();
        tree.map_text(|t| t.replace("swing", "SWING"));
        assert_eq!(tree.to_markup(), r#"<a title="swing">SWING</a> and SWING"#);
    }

    #[test]
    fn test_trailing_text_is_kept_whole() {
        for input in ["abc", "<b>x</b>tail", "[P1] and [P2]"] {
            let tree = MarkupTree::parse(input).unwrap();
            assert_eq!(tree.to_markup(), input);
        }

        let tree = MarkupTree::parse("<b>x</b>tail").unwrap();
        assert_eq!(tree.nodes().last(), Some(&MarkupNode::Text("tail".to_string())));
    }

    #[test]
    fn test_scan_keeps_literal_less_than_in_text() {
        let mut tree = MarkupTree::scan("turn <3 <i>twice</i> < once");
        tree.map_text(|t| t.to_uppercase());
        assert_eq!(tree.to_markup(), "TURN <3 <i>TWICE</i> < ONCE");
    }

    #[test]
    fn test_lenient_parse_of_broken_markup() {
        let mut tree = MarkupTree::parse_lenient("<p class=\"x\">turn <unterminated");
        tree.map_text(|t| t.to_uppercase());
        assert!(tree.to_markup().starts_with("<p class=\"x\">TURN "));
    }
}
