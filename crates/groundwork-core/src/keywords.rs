//! Keyword list parsing.

/// Parse a comma-separated keyword list.
///
/// Entries are trimmed and blank entries dropped; order and duplicates are
/// preserved. `None` parses to an empty list.
///
/// ```rust
/// use groundwork_core::keywords::parse_keyword_list;
///
/// assert_eq!(parse_keyword_list(Some(" eks, ,weeks ")), vec!["eks", "weeks"]);
/// assert!(parse_keyword_list(None).is_empty());
/// ```
pub fn parse_keyword_list(input: Option<&str>) -> Vec<String> {
    input
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}
