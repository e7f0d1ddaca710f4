//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// An unset variable returns `default` silently; a set-but-unparseable value
/// logs a warning instead of being silently swallowed.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
                default
            },
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_value() {
        let var = "HAVEN_TEST_ENV_VALID_41523";
        unsafe { std::env::set_var(var, "7") };
        let parsed: u32 = env_parse_with_default(var, 3);
        assert_eq!(parsed, 7);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn falls_back_on_garbage() {
        let var = "HAVEN_TEST_ENV_GARBAGE_41524";
        unsafe { std::env::set_var(var, "not-a-number") };
        let parsed: u32 = env_parse_with_default(var, 3);
        assert_eq!(parsed, 3);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn falls_back_when_unset() {
        let var = "HAVEN_TEST_ENV_MISSING_41525";
        unsafe { std::env::remove_var(var) };
        let parsed: i64 = env_parse_with_default(var, 24);
        assert_eq!(parsed, 24);
    }
}
