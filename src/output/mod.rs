pub mod csv;
pub mod json;
pub mod table;

/// Minor currency units rendered with two decimals.
pub fn format_price(minor_units: u64) -> String {
    format!("{}.{:02}", minor_units / 100, minor_units % 100)
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
