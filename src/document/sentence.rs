//! Core document types.

use crate::spans::Interval;

/// One tokenized sentence (a "line" of the paper).
///
/// Tokens are split on single spaces by whoever supplied the text; the
/// canonical form is always the tokens joined back with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sentence {
    words: Vec<String>,
}

impl Sentence {
    /// Split canonical text into tokens.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split(' ').map(ToOwned::to_owned).collect(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// The tokens of this sentence.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Token at `index`, if any.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Canonical text: the tokens joined by single spaces.
    pub fn canonical(&self) -> String {
        self.words.join(" ")
    }

    /// Text covered by `interval`, joined by single spaces.
    ///
    /// Returns `None` when the interval runs past the last token.
    pub fn slice(&self, interval: Interval) -> Option<String> {
        self.words
            .get(interval.start..=interval.end)
            .map(|words| words.join(" "))
    }

    /// Whether `interval` addresses tokens that exist in this sentence.
    pub fn holds(&self, interval: Interval) -> bool {
        interval.start <= interval.end && interval.end < self.words.len()
    }
}

/// A word-aligned occurrence of a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub line: usize,
    pub interval: Interval,
}

/// The loaded paper: an ordered list of immutable sentences.
#[derive(Debug, Clone, Default)]
pub struct Paper {
    /// Collaborator-side identifier of the paper
    pub id: String,
    /// Display title
    pub title: String,
    /// Lines at which a new section starts
    pub sections: Vec<usize>,
    sentences: Vec<Sentence>,
}

impl Paper {
    /// Create a paper from canonical sentence strings.
    pub fn new(id: impl Into<String>, title: impl Into<String>, sentences: &[String]) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sections: Vec::new(),
            sentences: sentences.iter().map(|s| Sentence::from_text(s)).collect(),
        }
    }

    #[must_use]
    pub fn with_sections(mut self, sections: Vec<usize>) -> Self {
        self.sections = sections;
        self
    }

    pub fn line_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn sentence(&self, line: usize) -> Option<&Sentence> {
        self.sentences.get(line)
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Every exact, case-sensitive, word-aligned occurrence of `text`.
    ///
    /// `text` is split on single spaces, the same way sentences are. Results
    /// are ordered by line, then by start index. Overlapping occurrences are
    /// all reported.
    pub fn find_phrase(&self, text: &str) -> Vec<Occurrence> {
        let needle: Vec<&str> = text.split(' ').collect();
        let mut found = Vec::new();
        for (line, sentence) in self.sentences.iter().enumerate() {
            let words = sentence.words();
            if needle.len() > words.len() {
                continue;
            }
            for start in 0..=(words.len() - needle.len()) {
                let matches = needle
                    .iter()
                    .zip(&words[start..])
                    .all(|(want, have)| *want == have.as_str());
                if matches {
                    found.push(Occurrence {
                        line,
                        interval: Interval::new(start, start + needle.len() - 1),
                    });
                }
            }
        }
        found
    }
}
