//! Display name deduplication.
//!
//! When a duplicated or updated applet would collide with an existing name,
//! a numeric suffix is appended: "Survey" becomes "Survey (1)", and further
//! copies count up from the highest suffix already taken.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMBER_SUFFIX: Regex = Regex::new(r"\((\d+)\)$").expect("valid regex");
}

/// Extracts the trailing "(N)" counter from a name, if present.
fn latest_number(name: &str) -> Option<u32> {
    NUMBER_SUFFIX
        .captures(name.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Picks a display name that does not collide with `existing`.
///
/// `existing` holds the names already taken that match `name` or
/// `"{name} (N)"`, gathered case-insensitively by the caller. Any match at
/// all is a collision: a lone `"Survey (1)"` still forces `"Survey"` to
/// become `"Survey (2)"`. Returns `name` unchanged only when the set is
/// empty, otherwise `"{name} (N)"` with N one above the highest counter in
/// use.
pub fn unique_display_name(name: &str, existing: &[String]) -> String {
    if existing.is_empty() {
        return name.to_string();
    }
    let greatest = existing.iter().filter_map(|n| latest_number(n)).max().unwrap_or(0);
    format!("{} ({})", name, greatest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_free_name_unchanged() {
        assert_eq!(unique_display_name("Survey", &[]), "Survey");
    }

    #[test]
    fn test_first_collision_gets_one() {
        assert_eq!(
            unique_display_name("Survey", &names(&["Survey"])),
            "Survey (1)"
        );
    }

    #[test]
    fn test_suffixed_match_alone_is_a_collision() {
        // The bare base being free does not matter once a counted copy
        // exists.
        assert_eq!(
            unique_display_name("Survey", &names(&["Survey (1)"])),
            "Survey (2)"
        );
    }

    #[test]
    fn test_counts_above_highest_suffix() {
        let existing = names(&["Survey", "Survey (1)", "Survey (3)"]);
        assert_eq!(unique_display_name("Survey", &existing), "Survey (4)");
    }

    #[test]
    fn test_collision_is_case_insensitive() {
        assert_eq!(
            unique_display_name("survey", &names(&["SURVEY"])),
            "survey (1)"
        );
    }

    #[test]
    fn test_suffix_only_at_end() {
        // "(2) Survey" carries no trailing counter.
        let existing = names(&["Survey", "(2) Survey"]);
        assert_eq!(unique_display_name("Survey", &existing), "Survey (1)");
    }

    #[test]
    fn test_result_never_collides() {
        let mut existing = names(&["Report"]);
        for _ in 0..5 {
            let fresh = unique_display_name("Report", &existing);
            assert!(!existing.contains(&fresh));
            existing.push(fresh);
        }
    }
}
