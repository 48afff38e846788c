//! Small helpers shared by the ClosePulse crates

/// Case-fold text for substring matching
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Whether `haystack` contains the already case-folded `needle`
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    folded_needle.is_empty() || haystack.to_lowercase().contains(folded_needle)
}

/// Share of `part` in `total` as a whole percentage, rounded half up
///
/// Returns 0 for an empty total and never exceeds 100.
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total);
    let rounded = (part * 100 + total / 2) / total;
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
