//! Hardware address matching
//!
//! Host BLE stacks report addresses in different textual forms
//! (`E9:C6:DD:63:48:D2`, `e9-c6-dd-63-48-d2`, `e9c6dd6348d2`). Matching
//! ignores case and delimiters.

/// Strip delimiters and lowercase an address
pub fn normalize(address: &str) -> String {
    address
        .chars()
        .filter(|c| !matches!(c, ':' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Check whether a reported address refers to the target appliance
pub fn matches(target: &str, reported: &str) -> bool {
    let target = normalize(target);
    !target.is_empty() && target == normalize(reported)
}
