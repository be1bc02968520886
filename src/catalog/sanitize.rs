//! Blocklist-based input cleaning.
//!
//! This removes a few well known script injection constructs from user text.
//! It is not an HTML sanitizer: any other markup (`<b>`, `<img>`, ...) passes
//! through untouched and must be escaped by whatever renders it.

use std::sync::LazyLock;

use regex::Regex;

use super::series::{SeriesDraft, SeriesField};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid script pattern"));
static IFRAME_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b.*?</iframe>").expect("valid iframe pattern"));
static JAVASCRIPT_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid uri pattern"));
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid handler pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Strip script/iframe blocks, `javascript:` prefixes and inline event
/// handlers, then trim.
///
/// Removing one fragment can join its neighbours into a new one
/// (`<scr<script></script>ipt>`), so the passes repeat until the text is
/// stable. The result is therefore a fixed point: sanitizing it again is a
/// no-op.
pub fn sanitize_text(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_once(input: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(input, "");
    let text = IFRAME_BLOCK.replace_all(&text, "");
    let text = JAVASCRIPT_URI.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    text.trim().to_string()
}

/// Apply [`sanitize_text`] to every field of a draft.
///
/// Drafts only carry top-level text fields, so this is shallow by
/// construction.
pub fn sanitize_draft(draft: &SeriesDraft) -> SeriesDraft {
    let mut clean = SeriesDraft::default();
    for field in SeriesField::ALL {
        clean.set(field, sanitize_text(draft.get(field)));
    }
    clean
}

/// Sanitize an e-mail address and return it only if it looks like
/// `local@domain.tld`.
pub fn sanitize_email(value: &str) -> Option<String> {
    let clean = sanitize_text(value);
    EMAIL.is_match(&clean).then_some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_removes_script_blocks() {
        assert_eq!(sanitize_text("<script>alert(1)</script>Foo"), "Foo");
        assert_eq!(
            sanitize_text("a<SCRIPT type=\"x\">\nbad()\n</ScRiPt>b"),
            "ab"
        );
    }

    #[test]
    fn test_script_removal_is_non_greedy() {
        assert_eq!(
            sanitize_text("<script>x</script>keep<script>y</script>"),
            "keep"
        );
    }

    #[test]
    fn test_removes_iframes_uris_and_handlers() {
        assert_eq!(sanitize_text("<iframe src=\"x\"></iframe>Title"), "Title");
        assert_eq!(sanitize_text("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_text("<img onerror=alert(1)>"), "<img alert(1)>");
        assert_eq!(sanitize_text("<a onClick = go()>"), "<a  go()>");
    }

    #[test]
    fn test_other_markup_passes_through() {
        assert_eq!(sanitize_text("  <b>Bold</b> Title  "), "<b>Bold</b> Title");
        assert_eq!(sanitize_text("Breaking Bad"), "Breaking Bad");
    }

    #[test]
    fn test_spliced_fragments_are_removed() {
        assert_eq!(sanitize_text("<scr<script></script>ipt>x</script>ok"), "ok");
        assert_eq!(sanitize_text("javajavascript:script:go"), "go");
    }

    #[test]
    fn test_sanitize_draft_touches_every_field() {
        let draft = SeriesDraft {
            title: " <script>x</script>Lost ".to_string(),
            number_of_seasons: " 6 ".to_string(),
            release_date: "2004-09-22".to_string(),
            director: "J. J. Abrams onload=".to_string(),
            production_company: "ABC".to_string(),
            category: "Drama".to_string(),
            date_watched: "2020-01-01 ".to_string(),
        };

        let clean = sanitize_draft(&draft);
        assert_eq!(clean.title, "Lost");
        assert_eq!(clean.number_of_seasons, "6");
        assert_eq!(clean.director, "J. J. Abrams");
        assert_eq!(clean.date_watched, "2020-01-01");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(
            sanitize_email("  user@example.com "),
            Some("user@example.com".to_string())
        );
        assert_eq!(sanitize_email("user@example"), None);
        assert_eq!(sanitize_email("us er@example.com"), None);
        assert_eq!(sanitize_email("a@b@c.com"), None);
    }

    proptest! {
        #[test]
        fn prop_sanitize_text_is_idempotent(input in ".{0,64}") {
            let once = sanitize_text(&input);
            prop_assert_eq!(sanitize_text(&once), once);
        }

        #[test]
        fn prop_sanitize_draft_is_idempotent(
            title in "(<script>|</script>|on[a-z]{1,3}=|javascript:| |[a-zA-Z]){0,12}",
            director in ".{0,24}",
        ) {
            let draft = SeriesDraft { title, director, ..SeriesDraft::default() };
            let once = sanitize_draft(&draft);
            prop_assert_eq!(sanitize_draft(&once), once);
        }
    }
}
