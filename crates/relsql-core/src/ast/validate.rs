//! Whitelist validation for the two places where caller text becomes
//! unquoted SQL: function names and cast type names.

use std::sync::LazyLock;

use regex::Regex;

static FUNCTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap_or_else(|e| panic!("invalid function-name regex: {e}"))
});

static TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_ (),]+$").unwrap_or_else(|e| panic!("invalid type-name regex: {e}"))
});

/// Returns true if `name` only contains letters, digits and `_`.
#[must_use]
pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}

/// Returns true if `name` only contains letters, digits, `_`, space,
/// `(`, `)` and `,`.
#[must_use]
pub fn is_valid_type_name(name: &str) -> bool {
    TYPE_NAME.is_match(name)
}

/// Panics unless `name` is a valid function name.
///
/// # Panics
///
/// On any character outside the function-name whitelist. This is a
/// programmer error: function names are never user input.
pub fn assert_function_name(name: &str) {
    assert!(
        is_valid_function_name(name),
        "invalid SQL function name {name:?}: only letters, digits and '_' are allowed"
    );
}

/// Panics unless `name` is a valid SQL type name.
///
/// # Panics
///
/// On any character outside the type-name whitelist.
pub fn assert_type_name(name: &str) {
    assert!(
        is_valid_type_name(name),
        "invalid SQL type name {name:?}: only letters, digits, '_', ' ', '(', ')' and ',' are allowed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names() {
        assert!(is_valid_function_name("COALESCE"));
        assert!(is_valid_function_name("jsonb_build_object"));
        assert!(is_valid_function_name("f2"));
        assert!(!is_valid_function_name(""));
        assert!(!is_valid_function_name("pg_sleep(10); --"));
        assert!(!is_valid_function_name("a b"));
        assert!(!is_valid_function_name("schema.func"));
    }

    #[test]
    fn test_type_names() {
        assert!(is_valid_type_name("integer"));
        assert!(is_valid_type_name("numeric(10, 2)"));
        assert!(is_valid_type_name("double precision"));
        assert!(is_valid_type_name("VARCHAR(255)"));
        assert!(!is_valid_type_name(""));
        assert!(!is_valid_type_name("text); DROP TABLE x; --"));
        assert!(!is_valid_type_name("int[]"));
    }

    #[test]
    #[should_panic(expected = "invalid SQL function name")]
    fn test_assert_function_name_panics() {
        assert_function_name("now()");
    }

    #[test]
    #[should_panic(expected = "invalid SQL type name")]
    fn test_assert_type_name_panics() {
        assert_type_name("text'");
    }
}
