//! Tag and context-ref predicates.
//!
//! Tags are matched on their local name with exact equality. Substring
//! matching would let `CurrentPortionOfLongTermLoansPayable` satisfy a rule for
//! `LongTermLoansPayable`, merging two different balance-sheet lines.

/// Context-ref token marking standalone (parent-only) figures.
pub const NON_CONSOLIDATED_MARKER: &str = "NonConsolidated";

const NON_CONSOLIDATED_MEMBER: &str = "NonConsolidatedMember";

/// Returns the local part of a qualified tag name.
///
/// Handles both `prefix:Local` and Clark notation `{namespace}Local`.
#[must_use]
pub fn local_name(tag: &str) -> &str {
    let tag = tag.rsplit_once('}').map_or(tag, |(_, local)| local);
    tag.rsplit_once(':').map_or(tag, |(_, local)| local)
}

/// Returns true if the tag's local name equals `keyword`.
#[must_use]
pub fn matches(tag: &str, keyword: &str) -> bool {
    local_name(tag) == keyword
}

/// Returns true if the context ref denotes consolidated figures.
#[must_use]
pub fn is_consolidated_context(context_ref: &str) -> bool {
    !context_ref.contains(NON_CONSOLIDATED_MARKER)
}

/// Returns true if the context ref carries a segment or other dimensional
/// member.
///
/// The non-consolidated member is a consolidation marker, not a breakdown, and
/// does not count.
#[must_use]
pub fn has_member_dimension(context_ref: &str) -> bool {
    if !context_ref.contains("Member") || context_ref.ends_with("_NonConsolidatedMember") {
        return false;
    }
    context_ref
        .split('_')
        .skip(1)
        .any(|part| part.contains("Member") && part != NON_CONSOLIDATED_MEMBER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("jppfs_cor:NetSales"), "NetSales");
        assert_eq!(local_name("NetSales"), "NetSales");
        assert_eq!(
            local_name("{http://disclosure.edinet-fsa.go.jp/taxonomy/jppfs/cor}NetSales"),
            "NetSales"
        );
    }

    #[test]
    fn test_exact_match_rejects_substrings() {
        assert!(matches(
            "jppfs_cor:LongTermLoansPayable",
            "LongTermLoansPayable"
        ));
        assert!(!matches(
            "jppfs_cor:CurrentPortionOfLongTermLoansPayable",
            "LongTermLoansPayable"
        ));
        assert!(!matches(
            "jppfs_cor:LongTermLoansPayable",
            "CurrentPortionOfLongTermLoansPayable"
        ));
        assert!(!matches("jppfs_cor:TotalAssetsSPF", "TotalAssets"));
    }

    #[test]
    fn test_consolidated_context() {
        assert!(is_consolidated_context("CurrentYearDuration"));
        assert!(!is_consolidated_context(
            "CurrentYearDuration_NonConsolidatedMember"
        ));
    }

    #[test]
    fn test_member_dimension() {
        assert!(!has_member_dimension("CurrentYearInstant"));
        assert!(!has_member_dimension(
            "CurrentYearInstant_NonConsolidatedMember"
        ));
        assert!(has_member_dimension(
            "CurrentYearDuration_ReportableSegmentsMember"
        ));
        assert!(has_member_dimension(
            "CurrentYearDuration_NonConsolidatedMember_ShareholdersEquityMember"
        ));
        // "Member" only in the leading period token is not a dimension
        assert!(!has_member_dimension("MemberYearDuration"));
    }
}
