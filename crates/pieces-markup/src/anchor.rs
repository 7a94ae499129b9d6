//! Deterministic anchor identifiers.

/// Convert text to an anchor-safe identifier.
///
/// Converts to lowercase, collapses every run of non-alphanumeric characters
/// into a single dash and trims dashes from both ends. Returns `"id"` when
/// nothing alphanumeric remains.
#[must_use]
pub fn make_id(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "id".to_owned()
    } else {
        result
    }
}

/// Anchor for an object registered under `taxonomy:kind`.
///
/// Depends only on its inputs, so an object keeps its anchor across rebuilds.
#[must_use]
pub fn object_anchor(taxonomy: &str, kind: &str, name: &str) -> String {
    make_id(&format!("{taxonomy}-{kind}-{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id() {
        assert_eq!(make_id("Hello World"), "hello-world");
        assert_eq!(make_id("What's New?"), "what-s-new");
        assert_eq!(make_id("  Spaces  "), "spaces");
        assert_eq!(make_id("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(make_id("snake_case"), "snake-case");
        assert_eq!(make_id("a::b"), "a-b");
    }

    #[test]
    fn test_make_id_empty_falls_back() {
        assert_eq!(make_id(""), "id");
        assert_eq!(make_id("?!"), "id");
    }

    #[test]
    fn test_make_id_unicode() {
        assert_eq!(make_id("Größe"), "größe");
    }

    #[test]
    fn test_object_anchor() {
        assert_eq!(
            object_anchor("unit", "parameter", "MyParam"),
            "unit-parameter-myparam"
        );
        assert_eq!(
            object_anchor("unit", "parameter", "MyParam"),
            object_anchor("unit", "parameter", "MyParam")
        );
    }
}
