const MAX_VALUE_LEN: usize = 120;

/// Truncates long tag values for table display.
pub fn truncate_value(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_LEN {
        let mut truncated = value.chars().take(MAX_VALUE_LEN).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        value.to_string()
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}

pub fn format_ratio(current: usize, total: usize) -> String {
    format!("{current}/{total}")
}
