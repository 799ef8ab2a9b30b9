/// Percentage of a transfer, rounded to the nearest integer.
///
/// An unknown or zero expected size yields 0 rather than dividing by
/// zero; values past the expected size clamp at 100.
pub fn percent(written: u64, expected: Option<u64>) -> u8 {
    match expected {
        Some(total) if total > 0 => {
            let pct = (written as f64 / total as f64 * 100.0).round();
            pct.min(100.0) as u8
        }
        _ => 0,
    }
}
