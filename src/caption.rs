pub(crate) const SENTENCE_TERMINATOR: char = '。';
pub(crate) const FRAGMENT_SEPARATOR: char = '，';

/// Splits a caption into ordered fragments after dropping terminators at
/// either end.
pub fn split_fragments(caption: &str) -> Vec<String> {
    caption
        .trim_matches(SENTENCE_TERMINATOR)
        .split(FRAGMENT_SEPARATOR)
        .map(|fragment| fragment.to_string())
        .collect()
}

/// Longest fragment by character count. Ties keep the earliest fragment.
pub(crate) fn longest_fragment(fragments: &[String]) -> Option<&str> {
    let mut best: Option<&str> = None;
    let mut best_len = 0usize;
    for fragment in fragments {
        let len = fragment.chars().count();
        if best.is_none() || len > best_len {
            best = Some(fragment.as_str());
            best_len = len;
        }
    }
    best
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_terminator_and_splits_on_fullwidth_comma() {
        assert_eq!(split_fragments("你好，世界。"), vec!["你好", "世界"]);
    }

    #[test]
    fn strips_terminators_at_both_ends() {
        assert_eq!(split_fragments("。。你好，世界。"), vec!["你好", "世界"]);
        assert_eq!(split_fragments("你好。世界"), vec!["你好。世界"]);
    }

    #[test]
    fn keeps_ascii_commas_inside_fragments() {
        assert_eq!(
            split_fragments("one, two，three"),
            vec!["one, two", "three"]
        );
    }

    #[test]
    fn empty_fragments_are_preserved_in_order() {
        assert_eq!(split_fragments("a，，b。。"), vec!["a", "", "b"]);
    }

    #[test]
    fn longest_fragment_counts_chars_not_bytes() {
        let fragments = split_fragments("abcd，你好世界吗");
        assert_eq!(longest_fragment(&fragments), Some("你好世界吗"));
    }

    #[test]
    fn longest_fragment_prefers_first_on_tie() {
        let fragments = split_fragments("ab，cd，e");
        assert_eq!(longest_fragment(&fragments), Some("ab"));
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x "));
    }
}
