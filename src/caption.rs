/// Caption limit of the chat platform's photo messages.
pub const DEFAULT_CAPTION_LIMIT: usize = 1024;

const SEPARATOR: &str = "\n\n";
const ELLIPSIS: &str = "...";

/// Joins title and description as `"<title>\n\n<description>"`, shortening
/// the description so the result never exceeds `max` characters.
///
/// If the title fits but leaves no room for the separator and ellipsis, the
/// title is returned alone. Only a title longer than `max` is itself cut.
pub fn format_caption(title: &str, description: &str, max: usize) -> String {
    let title_len = title.chars().count();
    let full_len = title_len + SEPARATOR.len() + description.chars().count();
    if full_len <= max {
        return format!("{}{}{}", title, SEPARATOR, description);
    }

    let overhead = title_len + SEPARATOR.len() + ELLIPSIS.len();
    if overhead > max {
        if title_len <= max {
            return title.to_string();
        }
        let keep = max.saturating_sub(ELLIPSIS.len());
        let mut short: String = title.chars().take(keep).collect();
        if max >= ELLIPSIS.len() {
            short.push_str(ELLIPSIS);
        }
        return short;
    }

    let cutoff = max - overhead;
    let shortened: String = description.chars().take(cutoff).collect();
    format!("{}{}{}{}", title, SEPARATOR, shortened, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_caption_unchanged() {
        assert_eq!(
            format_caption("Dune", "A desert planet.", DEFAULT_CAPTION_LIMIT),
            "Dune\n\nA desert planet."
        );
    }

    #[test]
    fn test_exactly_at_budget_unchanged() {
        let description = "x".repeat(DEFAULT_CAPTION_LIMIT - 6);
        let caption = format_caption("Dune", &description, DEFAULT_CAPTION_LIMIT);
        assert_eq!(caption.chars().count(), DEFAULT_CAPTION_LIMIT);
        assert!(!caption.ends_with("..."));
    }

    #[test]
    fn test_long_description_truncated_to_budget() {
        let description = "word ".repeat(400);
        let caption = format_caption("Dune", &description, DEFAULT_CAPTION_LIMIT);
        assert_eq!(caption.chars().count(), DEFAULT_CAPTION_LIMIT);
        assert!(caption.starts_with("Dune\n\nword"));
        assert!(caption.ends_with("..."));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let description = "é".repeat(2000);
        let caption = format_caption("Ünïcode", &description, DEFAULT_CAPTION_LIMIT);
        assert_eq!(caption.chars().count(), DEFAULT_CAPTION_LIMIT);
        assert!(caption.starts_with("Ünïcode\n\n"));
    }

    #[test]
    fn test_oversized_title_is_cut() {
        let title = "t".repeat(50);
        let caption = format_caption(&title, "desc", 20);
        assert_eq!(caption, format!("{}...", "t".repeat(17)));
    }

    #[test]
    fn test_title_that_fits_alone_is_kept_whole() {
        let title = "a".repeat(1022);
        let caption = format_caption(&title, &"b".repeat(100), DEFAULT_CAPTION_LIMIT);
        assert_eq!(caption, title);

        let title = "a".repeat(DEFAULT_CAPTION_LIMIT);
        assert_eq!(format_caption(&title, "desc", DEFAULT_CAPTION_LIMIT), title);
    }

    #[test]
    fn test_bound_holds_for_many_shapes() {
        for title_len in [0, 1, 10, 500, 1018, 1019, 1020, 1021, 1022, 1023, 1024, 1025, 2000] {
            for desc_len in [0, 1, 3, 100, 1000, 5000] {
                let title = "a".repeat(title_len);
                let description = "b".repeat(desc_len);
                let caption = format_caption(&title, &description, DEFAULT_CAPTION_LIMIT);
                assert!(caption.chars().count() <= DEFAULT_CAPTION_LIMIT);
                if title_len <= DEFAULT_CAPTION_LIMIT {
                    assert!(caption.starts_with(&title));
                }
            }
        }
    }
}
