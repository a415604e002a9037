use std::sync::LazyLock;

use regex::Regex;

/// Maximum length (in characters) of a generated excerpt, before the ellipsis.
pub const EXCERPT_LENGTH: usize = 160;

/// Reading speed used for `read_time`.
pub const WORDS_PER_MINUTE: usize = 200;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static BACKTICKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`+").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Builds a plain-text summary from markdown.
///
/// Heading markers, `*`/`**` emphasis and backticks are dropped, links keep
/// their text and lose the URL, newlines become spaces. The result is trimmed
/// and cut to [`EXCERPT_LENGTH`] characters with a trailing `...` when cut.
pub fn generate_excerpt(content: &str) -> String {
    let text = HEADING.replace_all(content, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = BACKTICKS.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = NEWLINES.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > EXCERPT_LENGTH {
        let mut cut: String = text.chars().take(EXCERPT_LENGTH).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Estimated reading time in whole minutes, never less than one.
pub fn read_time(content: &str) -> i64 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_heading_and_bold() {
        assert_eq!(generate_excerpt("# Hi **there**"), "Hi there");
    }

    #[test]
    fn keeps_link_text_and_drops_url() {
        assert_eq!(
            generate_excerpt("See [the docs](https://example.com/docs) for `cargo` usage"),
            "See the docs for cargo usage"
        );
    }

    #[test]
    fn collapses_newlines_and_trims() {
        let md = "## Title\n\nFirst *line*\nSecond line\n";
        assert_eq!(generate_excerpt(md), "Title First line Second line");
    }

    #[test]
    fn hash_inside_a_sentence_is_kept() {
        assert_eq!(generate_excerpt("Notes on C# generics"), "Notes on C# generics");
    }

    #[test]
    fn truncates_long_text_with_ellipsis() {
        let md = "a".repeat(200);
        let excerpt = generate_excerpt(&md);
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn exactly_160_chars_is_not_truncated() {
        let md = "b".repeat(EXCERPT_LENGTH);
        assert_eq!(generate_excerpt(&md), md);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let md = "é".repeat(170);
        let excerpt = generate_excerpt(&md);
        assert!(excerpt.starts_with(&"é".repeat(EXCERPT_LENGTH)));
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH + 3);
    }

    #[test]
    fn read_time_of_empty_content_is_one() {
        assert_eq!(read_time(""), 1);
        assert_eq!(read_time("   \n "), 1);
    }

    #[test]
    fn read_time_rounds_up() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(read_time(&words(200)), 1);
        assert_eq!(read_time(&words(201)), 2);
        assert_eq!(read_time(&words(1000)), 5);
    }
}
