//! Section-name category matching.

/// Split a section name such as `macos-terminal` into its categories.
#[must_use]
pub fn parse_section(name: &str) -> Vec<String> {
    name.split('-')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// A section applies when every one of its categories is active.
///
/// ```
/// use envsetup::config::category_matcher::matches;
///
/// let section = vec!["linux".to_string(), "terminal".to_string()];
/// assert!(!matches(&section, &["base".to_string(), "linux".to_string()]));
/// assert!(matches(&section, &["linux".to_string(), "terminal".to_string()]));
/// ```
#[must_use]
pub fn matches(section_categories: &[String], active_categories: &[String]) -> bool {
    section_categories
        .iter()
        .all(|cat| active_categories.contains(cat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_section_splits_on_dash() {
        assert_eq!(parse_section("macos-terminal"), cats(&["macos", "terminal"]));
        assert_eq!(parse_section("base"), cats(&["base"]));
    }

    #[test]
    fn parse_section_normalises_case_and_blanks() {
        assert_eq!(parse_section("Linux--Terminal"), cats(&["linux", "terminal"]));
    }

    #[test]
    fn every_category_must_be_active() {
        let section = cats(&["linux", "terminal"]);
        assert!(matches(&section, &cats(&["linux", "terminal"])));
        assert!(!matches(&section, &cats(&["linux"])));
    }

    #[test]
    fn empty_section_always_applies() {
        assert!(matches(&[], &cats(&["base"])));
    }

    #[test]
    fn headless_profile_skips_terminal_sections() {
        let active = cats(&["base", "linux"]);
        assert!(!matches(&parse_section("terminal"), &active));
        assert!(matches(&parse_section("base"), &active));
    }
}
