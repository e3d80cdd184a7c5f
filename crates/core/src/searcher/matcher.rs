use once_cell::sync::Lazy;
use regex_lite::{NoExpand, Regex};
use tracing::debug;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Separator pattern that also absorbs zero padding (`ABC-0123`).
const FLEXIBLE_SEPARATOR: &str = r"\s*[-\s0]*\s*";

/// Decides whether a search hit's title refers to an item identity.
///
/// The identity is used as a case-insensitive, unanchored pattern in which
/// every run of hyphens or whitespace may be written as any mix of
/// separators and leading zeros. Identities that do not form a valid
/// pattern disable the filter.
#[derive(Debug, Clone)]
pub struct IdentityMatcher {
    pattern: Option<Regex>,
}

impl IdentityMatcher {
    pub fn new(id: &str) -> Self {
        let source = format!(
            "(?i){}",
            SEPARATORS.replace_all(id, NoExpand(FLEXIBLE_SEPARATOR))
        );
        let pattern = match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!(item = %id, error = %e, "Identity is not a valid pattern, accepting all titles");
                None
            }
        };
        Self { pattern }
    }

    pub fn matches(&self, title: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(title))
    }

    /// True when the identity could not be turned into a filter.
    pub fn accepts_all(&self) -> bool {
        self.pattern.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_and_padding_variants_match() {
        let matcher = IdentityMatcher::new("ABC-123");
        assert!(matcher.matches("abc123"));
        assert!(matcher.matches("ABC-0123"));
        assert!(matcher.matches("abc 123"));
        assert!(matcher.matches("[group] ABC - 123 (1080p).mp4"));
        assert!(!matcher.matches("XYZ-123"));
        assert!(!matcher.matches("ABC-124"));
        assert!(!matcher.accepts_all());
    }

    #[test]
    fn test_whitespace_identity() {
        let matcher = IdentityMatcher::new("ABC  123");
        assert!(matcher.matches("abc-00123"));
    }

    #[test]
    fn test_invalid_pattern_accepts_everything() {
        let matcher = IdentityMatcher::new("ABC(123");
        assert!(matcher.accepts_all());
        assert!(matcher.matches("completely unrelated"));
        assert!(matcher.matches(""));
    }

    #[test]
    fn test_identity_metacharacters_are_live() {
        // "." in an identity matches any character, as a pattern would.
        let matcher = IdentityMatcher::new("A.C-1");
        assert!(matcher.matches("ABC-1"));
    }
}
