//! Cosmetic "pretty" rendering of canonical sentence text.
//!
//! Pretty text is derived from canonical text by deleting spaces next to
//! punctuation tokens and nothing else. [`super::resolve_offset_to_word_index`]
//! relies on that: any renderer producing pretty text must only delete.

/// Opening and closing punctuation tokens.
///
/// Opening tokens (e.g. `(`) lose the space that follows them; closing
/// tokens (e.g. `,` or `)`) lose the space that precedes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Punctuation {
    pub opening: Vec<String>,
    pub closing: Vec<String>,
}

impl Default for Punctuation {
    fn default() -> Self {
        Self {
            opening: vec!["(".to_string()],
            closing: [",", ".", ")", ";", ":"]
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
        }
    }
}

impl Punctuation {
    pub fn is_opening(&self, token: &str) -> bool {
        self.opening.iter().any(|p| p == token)
    }

    pub fn is_closing(&self, token: &str) -> bool {
        self.closing.iter().any(|p| p == token)
    }
}

/// Render canonical text the way it is displayed.
pub fn prettify(canonical: &str, punctuation: &Punctuation) -> String {
    let mut text = canonical.to_string();
    for mark in punctuation.opening.iter().filter(|m| !m.is_empty()) {
        let spaced = format!("{mark} ");
        while text.contains(&spaced) {
            text = text.replace(&spaced, mark);
        }
    }
    for mark in punctuation.closing.iter().filter(|m| !m.is_empty()) {
        let spaced = format!(" {mark}");
        while text.contains(&spaced) {
            text = text.replace(&spaced, mark);
        }
    }
    text
}
