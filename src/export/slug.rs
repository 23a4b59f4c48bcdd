//! Display-name slugification.

use std::sync::OnceLock;

use regex::Regex;

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("strip pattern"))
}

fn collapse_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("collapse pattern"))
}

/// Normalizes a display name into a filesystem-safe slug: lowercased, with
/// everything outside word characters, whitespace, and hyphens removed,
/// runs of whitespace and hyphens collapsed to one hyphen, and leading or
/// trailing hyphens trimmed.
///
/// Idempotent, so a name that is already a slug maps to itself.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip_re().replace_all(&lowered, "");
    let collapsed = collapse_re().replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_hyphenates() {
        assert_eq!(slugify("Dark Reader"), "dark-reader");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(slugify("GitHub: PR Helper (v2)!"), "github-pr-helper-v2");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("a  -  b --- c"), "a-b-c");
    }

    #[test]
    fn test_trims_edge_hyphens() {
        assert_eq!(slugify("--edge case--"), "edge-case");
    }

    #[test]
    fn test_identifier_passes_through() {
        assert_eq!(
            slugify("550e8400-e29b-41d4-a716-446655440000"),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_symbols_only_yields_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_idempotent() {
        for name in ["Dark Reader", "GitHub: PR Helper (v2)!", "--edge case--"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once);
        }
    }
}
