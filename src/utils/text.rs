//! Text matching and truncation helpers
//!
//! Both work on characters rather than bytes so that multi-byte labels
//! (street names, accented place names) behave.

use unicase::UniCase;

/// Case-insensitive substring test on Unicode folded case, so "ß" matches
/// "SS". An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack_folded = UniCase::new(haystack).to_folded_case();
    let needle_folded = UniCase::new(needle).to_folded_case();
    haystack_folded.contains(&needle_folded)
}

/// Truncate a string to a maximum length, handling multi-byte characters properly.
/// Appends "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Pothole on Main Street", "pothole"));
        assert!(contains_ignore_case("Pothole on Main Street", "MAIN"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Broken Water Main", "pothole"));
        assert!(contains_ignore_case("Café Plaza", "CAFÉ"));
    }

    #[test]
    fn test_contains_ignore_case_folds_sharp_s() {
        assert!(contains_ignore_case("Hauptstraße 12", "STRASSE"));
        assert!(contains_ignore_case("HAUPTSTRASSE 12", "straße"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("Overflowing Trash Containers", 12), "Overflowi...");
        assert_eq!(truncate_string("abcdef", 3), "abc");
        assert_eq!(truncate_string("Ünïcödé text", 8), "Ünïcö...");
    }
}
