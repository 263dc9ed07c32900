//! Turning store paths into environment variable names.
//!
//! A leaf at `/config/global/a/b-c` read from the tier directory
//! `/config/global` becomes `a/b-c` after prefix stripping, `a_b-c` after
//! flattening, and `A_B_C` once sanitized and upper-cased.

/// Options controlling [`transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOptions {
    /// Replace characters outside `[A-Za-z0-9_]` with `_`
    pub sanitize: bool,
    /// ASCII upper-case the result
    pub upcase: bool,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            upcase: true,
        }
    }
}

impl KeyOptions {
    /// Apply these options to a flattened key.
    pub fn apply(&self, raw: &str) -> String {
        transform(raw, self.sanitize, self.upcase)
    }
}

/// Sanitize then upcase `raw`, each step only when enabled.
pub fn transform(raw: &str, sanitize: bool, upcase: bool) -> String {
    let key = if sanitize {
        sanitize_key(raw)
    } else {
        raw.to_string()
    };

    if upcase {
        key.to_ascii_uppercase()
    } else {
        key
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with a single `_`.
///
/// Runs are not collapsed: `a--b` becomes `a__b`.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Strip leading slashes and join the remaining path segments with `_`.
pub fn flatten(relative: &str) -> String {
    relative.trim_start_matches('/').replace('/', "_")
}

/// Key of `node_key` relative to the tier directory `dir`, flattened.
///
/// Returns `None` when nothing is left, i.e. the leaf sits at the tier
/// directory itself.
pub fn relative_key(node_key: &str, dir: &str) -> Option<String> {
    let relative = node_key.strip_prefix(dir).unwrap_or(node_key);
    let flat = flatten(relative);
    if flat.is_empty() {
        None
    } else {
        Some(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_replaces_each_char() {
        assert_eq!(sanitize_key("weird-key"), "weird_key");
        assert_eq!(sanitize_key("a--b"), "a__b");
        assert_eq!(sanitize_key("pörk.chop"), "p_rk_chop");
        assert_eq!(sanitize_key("OK_123"), "OK_123");
    }

    #[test]
    fn test_upcase_leaves_non_ascii() {
        assert_eq!(transform("straße", false, true), "STRAßE");
    }

    #[test]
    fn test_transform_order() {
        assert_eq!(transform("a_b_c", true, true), "A_B_C");
        assert_eq!(transform("weird-key", false, false), "weird-key");
        assert_eq!(transform("weird-key", true, false), "weird_key");
        assert_eq!(transform("weird-key", false, true), "WEIRD-KEY");
    }

    #[test]
    fn test_flatten() {
        assert_eq!(flatten("/a/b/c"), "a_b_c");
        assert_eq!(flatten("//a"), "a");
        assert_eq!(flatten(""), "");
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key("/config/global/a/b/c", "/config/global"),
            Some("a_b_c".to_string())
        );
        assert_eq!(relative_key("/config/global", "/config/global"), None);
        assert_eq!(relative_key("/config/global/", "/config/global"), None);
    }

    #[test]
    fn test_key_options_default() {
        let opts = KeyOptions::default();
        assert_eq!(opts.apply("db/host-name"), "DB_HOST_NAME");
    }

    proptest! {
        #[test]
        fn prop_sanitized_upcased_charset(raw in ".*") {
            let key = transform(&raw, true, true);
            prop_assert!(key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn prop_transform_idempotent(raw in ".*", sanitize: bool, upcase: bool) {
            let once = transform(&raw, sanitize, upcase);
            prop_assert_eq!(transform(&once, sanitize, upcase), once);
        }

        #[test]
        fn prop_sanitize_preserves_char_count(raw in ".*") {
            prop_assert_eq!(sanitize_key(&raw).chars().count(), raw.chars().count());
        }
    }
}
