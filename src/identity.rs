//! Resource identity
//!
//! An identity is `<kind>_<natural key>`. It depends on nothing but those
//! two strings, so the same resource always gets the same id and existing
//! remote resources can be imported by id.

/// Identity of the `kind` resource keyed by `natural_key`
pub fn identity(kind: &str, natural_key: &str) -> String {
    format!("{kind}_{natural_key}")
}

/// Recover the natural key from an identity of `kind`
///
/// Returns `None` when `id` belongs to another kind or has an empty key.
pub fn parse_identity<'a>(kind: &str, id: &'a str) -> Option<&'a str> {
    id.strip_prefix(kind)?
        .strip_prefix('_')
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        let first = identity("cpu_limits", "abc123");
        let second = identity("cpu_limits", "abc123");
        assert_eq!(first, "cpu_limits_abc123");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_round_trip() {
        let id = identity("snmp", "node-7");
        assert_eq!(parse_identity("snmp", &id), Some("node-7"));
    }

    #[test]
    fn test_parse_kind_with_underscores() {
        assert_eq!(parse_identity("cpu_limits", "cpu_limits_abc_1"), Some("abc_1"));
    }

    #[test]
    fn test_parse_rejects_other_kind() {
        assert_eq!(parse_identity("snmp", "node_abc"), None);
        assert_eq!(parse_identity("io_limits", "cpu_limits_abc"), None);
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert_eq!(parse_identity("node", "node_"), None);
        assert_eq!(parse_identity("node", "node"), None);
        assert_eq!(parse_identity("node", "nodeabc"), None);
    }
}
