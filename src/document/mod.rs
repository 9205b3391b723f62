//! Tokenized paper text.
//!
//! This module handles:
//! - Sentences as immutable token sequences (one per line)
//! - The cosmetic "pretty" rendering of a sentence
//! - Mapping cursor offsets in pretty text back to canonical word indices
//! - Word-aligned phrase search

mod offsets;
mod pretty;
mod sentence;

pub use offsets::{Snap, resolve_offset_to_word_index};
pub use pretty::{Punctuation, prettify};
pub use sentence::{Occurrence, Paper, Sentence};
