//! Utility functions and types

pub mod data_loader;

pub use data_loader::{DataLoader, FileInfo};

/// Format a value with thousands separators and no decimals, e.g. `1234567.4` -> `1,234,567`
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format a price as whole dollars, e.g. `$425,000`
pub fn format_currency(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", format_thousands(-value))
    } else {
        format!("${}", format_thousands(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(-45210.0), "-45,210");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(425000.0), "$425,000");
        assert_eq!(format_currency(-1500.0), "-$1,500");
    }
}
