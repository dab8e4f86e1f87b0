/// Extract a short type name from the full module path.
///
/// Given `"my_crate::some_module::MyType"`, returns `"MyType"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Division that yields 0 instead of NaN or infinity.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    finite_or_zero(numerator / denominator)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Format a dollar amount with thousands separators: `$5,355.50`.
pub fn format_dollars(amount: f64) -> String {
    let amount = finite_or_zero(amount);
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let s = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_strips_path() {
        assert_eq!(short_type_name("dormancy_pipeline::components::DormancyFilter"), "DormancyFilter");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn ratio_guards_division_by_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert!((ratio(1.0, 4.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn format_dollars_groups_thousands() {
        assert_eq!(format_dollars(5355.5), "$5,355.50");
        assert_eq!(format_dollars(999.999), "$1,000.00");
        assert_eq!(format_dollars(12.3), "$12.30");
        assert_eq!(format_dollars(-1234567.0), "-$1,234,567.00");
        assert_eq!(format_dollars(f64::NAN), "$0.00");
    }
}
