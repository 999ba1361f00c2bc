//! Parsing of delimited version lists

/// Separator used by the issue tracker when it joins multi-valued version fields
pub const VERSION_SEPARATOR: char = ',';

/// Parse a delimited version list such as `"4.18.z, 4.17.z"`.
///
/// Entries are trimmed, empty entries are dropped and only the first
/// occurrence of a repeated version is kept, so the result preserves
/// declaration order.
pub fn parse_versions(raw: &str) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();
    for entry in raw.split(VERSION_SEPARATOR) {
        let entry = entry.trim();
        // A repeated version is kept once, at its first position
        if entry.is_empty() || versions.iter().any(|v| v == entry) {
            continue;
        }
        versions.push(entry.to_string());
    }
    versions
}

/// Join versions back into the tracker's display form
pub fn join_versions(versions: &[String]) -> String {
    versions.join(", ")
}
