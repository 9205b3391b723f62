//! Mapping display offsets back to canonical word indices.

/// Which word boundaries a cursor offset may snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Snap {
    /// The closest boundary on either side (left wins ties).
    #[default]
    Nearest,
    /// Only the closest boundary to the left of the cursor.
    ///
    /// Used when a raw selection lies inside a single word, so the snap does
    /// not jump across that word.
    LeftOnly,
}

/// Resolve a character offset in `pretty` to the index of the word that
/// immediately follows the nearest word boundary in `canonical`.
///
/// `pretty` must be `canonical` with some characters deleted (see
/// [`super::prettify`]). The result lies in `0..=word_count`: it equals the
/// word count when the boundary is the very end of the sentence. Right-edge
/// callers that need an inclusive end index subtract one; start-index
/// callers use the value as is.
pub fn resolve_offset_to_word_index(
    canonical: &str,
    pretty: &str,
    offset: usize,
    snap: Snap,
) -> usize {
    let raw: Vec<char> = canonical.chars().collect();
    let mut working: Vec<char> = pretty.chars().collect();
    let mut offset = offset.min(working.len());

    // Re-insert whatever the pretty text dropped. Offsets count characters
    // before the cursor, so a reinsertion at `idx` shifts every offset > idx.
    for (idx, &ch) in raw.iter().enumerate() {
        if working.get(idx) != Some(&ch) {
            working.insert(idx, ch);
            if offset > idx {
                offset += 1;
            }
        }
    }

    let boundary = nearest_boundary(&working, offset, snap);
    if boundary == 0 {
        return 0;
    }
    working[..boundary].iter().filter(|&&c| c == ' ').count() + 1
}

fn nearest_boundary(text: &[char], offset: usize, snap: Snap) -> usize {
    let len = text.len();
    if offset == 0 {
        return 0;
    }
    if offset >= len && snap == Snap::Nearest {
        return len;
    }

    let mut prev = offset.min(len) - 1;
    let mut next = prev;
    loop {
        if prev == 0 || text[prev] == ' ' {
            return prev;
        }
        prev -= 1;

        if snap == Snap::Nearest && (next >= len || text[next] == ' ') {
            return next;
        }
        next += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Punctuation, prettify};

    const CANONICAL: &str = "p53 activates BAX ( in the cytoplasm ) .";

    fn pretty() -> String {
        prettify(CANONICAL, &Punctuation::default())
    }

    #[test]
    fn test_offset_zero_is_first_word() {
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty(), 0, Snap::Nearest), 0);
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty(), 0, Snap::LeftOnly), 0);
    }

    #[test]
    fn test_offset_at_end_is_word_count() {
        let pretty = pretty();
        let end = pretty.chars().count();
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty, end, Snap::Nearest), 9);
    }

    #[test]
    fn test_offset_at_end_left_only_snaps_before_last_word() {
        let pretty = pretty();
        let end = pretty.chars().count();
        // Canonical spaces are restored first, so the last boundary on the
        // left is the one before ".".
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty, end, Snap::LeftOnly), 8);
    }

    #[test]
    fn test_offset_inside_word_snaps_to_closer_side() {
        // "p53 activates": offset 5 sits after "p53 a", closer to the left.
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty(), 5, Snap::Nearest), 1);
        // offset 12 sits after "p53 activate", closer to the right.
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty(), 12, Snap::Nearest), 2);
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty(), 12, Snap::LeftOnly), 1);
    }

    #[test]
    fn test_offset_after_collapsed_paren_maps_to_canonical_word() {
        let pretty = pretty();
        // Pretty: "p53 activates BAX (in the cytoplasm).". Offset 20 sits
        // after the "i" of "in", which is canonical word 4.
        assert_eq!(&pretty[..20], "p53 activates BAX (i");
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty, 20, Snap::Nearest), 4);
        // Right after "(" the restored space and the space before "(" are
        // equally close; the left one wins.
        assert_eq!(resolve_offset_to_word_index(CANONICAL, &pretty, 19, Snap::Nearest), 3);
    }

    #[test]
    fn test_comma_collapse() {
        // "a, b": offset 3 is right before "b".
        assert_eq!(resolve_offset_to_word_index("a , b", "a, b", 3, Snap::Nearest), 2);
    }

    #[test]
    fn test_identical_text_counts_words_before_boundary() {
        let text = "one two three";
        assert_eq!(resolve_offset_to_word_index(text, text, 4, Snap::Nearest), 1);
        assert_eq!(resolve_offset_to_word_index(text, text, 8, Snap::Nearest), 2);
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let text = "one two";
        assert_eq!(resolve_offset_to_word_index(text, text, 99, Snap::Nearest), 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn sentence() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(
                prop_oneof![
                    "[a-z0-9]{1,6}",
                    Just("(".to_string()),
                    Just(")".to_string()),
                    Just(",".to_string()),
                    Just(".".to_string()),
                ],
                1..12,
            )
        }

        proptest! {
            #[test]
            fn index_stays_within_word_count(words in sentence(), pick in 0..200usize, left in any::<bool>()) {
                let canonical = words.join(" ");
                let pretty = prettify(&canonical, &Punctuation::default());
                let offset = pick % (pretty.chars().count() + 1);
                let snap = if left { Snap::LeftOnly } else { Snap::Nearest };
                let index = resolve_offset_to_word_index(&canonical, &pretty, offset, snap);
                prop_assert!(index <= words.len());
            }

            #[test]
            fn resolution_is_idempotent(words in sentence(), pick in 0..200usize) {
                let canonical = words.join(" ");
                let pretty = prettify(&canonical, &Punctuation::default());
                let offset = pick % (pretty.chars().count() + 1);
                let first = resolve_offset_to_word_index(&canonical, &pretty, offset, Snap::Nearest);
                let second = resolve_offset_to_word_index(&canonical, &pretty, offset, Snap::Nearest);
                prop_assert_eq!(first, second);
            }
        }
    }
}
