//! Security code and accounting standard normalization.

use std::collections::BTreeMap;

/// Normalizes an EDINET security code.
///
/// A five-character code ending in `0` loses the trailing check digit
/// (`72030` becomes `7203`); anything else is returned trimmed.
#[must_use]
pub fn normalize_security_code(raw: &str) -> String {
    let code = raw.trim();
    if code.chars().count() == 5 && code.ends_with('0') {
        code[..code.len() - 1].to_string()
    } else {
        code.to_string()
    }
}

/// Normalizes an accounting standard through an alias table.
///
/// Blank input yields `None`; unknown spellings pass through trimmed.
#[must_use]
pub fn normalize_accounting_standard(
    raw: Option<&str>,
    aliases: &BTreeMap<String, String>,
) -> Option<String> {
    let value = raw.map(str::trim).filter(|s| !s.is_empty())?;
    Some(aliases.get(value).map_or_else(|| value.to_string(), Clone::clone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbrl_core::CanonicalKeys;

    #[test]
    fn test_security_code() {
        assert_eq!(normalize_security_code("72030"), "7203");
        assert_eq!(normalize_security_code(" 72030 "), "7203");
        assert_eq!(normalize_security_code("72035"), "72035");
        assert_eq!(normalize_security_code("7203"), "7203");
        assert_eq!(normalize_security_code("130A0"), "130A");
        assert_eq!(normalize_security_code("720300"), "720300");
    }

    #[test]
    fn test_accounting_standard_aliases() {
        let aliases = CanonicalKeys::default().accounting_standard_mapping;
        let norm = |s| normalize_accounting_standard(Some(s), &aliases);
        assert_eq!(norm("Japan GAAP").as_deref(), Some("JGAAP"));
        assert_eq!(norm("日本基準").as_deref(), Some("JGAAP"));
        assert_eq!(norm(" US GAAP ").as_deref(), Some("US-GAAP"));
        assert_eq!(norm("IFRS").as_deref(), Some("IFRS"));
        assert_eq!(norm("Other").as_deref(), Some("Other"));
        assert_eq!(norm("  "), None);
        assert_eq!(normalize_accounting_standard(None, &aliases), None);
    }
}
