//! Display formatting for amounts, axis labels, rates and year counts.
//!
//! Amounts use one fixed convention: Brazilian real, `.` for thousands and `,` for
//! decimals (`R$ 1.234,56`).

const ZERO_AMOUNT: &str = "R$ 0,00";

pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return ZERO_AMOUNT.to_string();
    }

    let cents = (value.abs() * 100.0).round();
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    let cents = cents as u128;
    format!(
        "{sign}R$ {},{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Compact label for the chart's value axis.
pub fn format_axis_value(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{rate:.0}%")
    } else {
        format!("{rate:.1}%")
    }
}

pub fn format_years(years: f64) -> String {
    if years.is_finite() {
        format!("{years:.1}")
    } else {
        "N/A".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_and_uses_decimal_comma() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(5.5), "R$ 5,50");
        assert_eq!(format_currency(999.999), "R$ 1.000,00");
        assert_eq!(format_currency(1_234.56), "R$ 1.234,56");
        assert_eq!(format_currency(1_500_000.0), "R$ 1.500.000,00");
        assert_eq!(format_currency(123_456_789.01), "R$ 123.456.789,01");
    }

    #[test]
    fn currency_keeps_sign_for_negative_amounts() {
        assert_eq!(format_currency(-2_500.75), "-R$ 2.500,75");
        assert_eq!(format_currency(-0.001), "R$ 0,00");
    }

    #[test]
    fn non_finite_amounts_display_as_zero() {
        assert_eq!(format_currency(f64::NAN), "R$ 0,00");
        assert_eq!(format_currency(f64::INFINITY), "R$ 0,00");
        assert_eq!(format_currency(f64::NEG_INFINITY), "R$ 0,00");
    }

    #[test]
    fn axis_values_are_compact() {
        assert_eq!(format_axis_value(0.0), "0");
        assert_eq!(format_axis_value(950.0), "950");
        assert_eq!(format_axis_value(250_000.0), "250k");
        assert_eq!(format_axis_value(1_650_000.0), "1.6M");
        assert_eq!(format_axis_value(2_000_000_000.0), "2.0B");
    }

    #[test]
    fn rates_and_years() {
        assert_eq!(format_rate(7.0), "7%");
        assert_eq!(format_rate(2.7), "2.7%");
        assert_eq!(format_years(19.836), "19.8");
        assert_eq!(format_years(f64::INFINITY), "N/A");
    }
}
