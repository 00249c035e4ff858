//! Short-scale number formatting for display (e.g. 1500 → "1.50K").

const SUFFIXES: &[&str] = &["", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "De"];

/// Format a magnitude with a short-scale suffix.
///
/// Below 1000 integers print bare and fractions with one decimal. Above,
/// the mantissa keeps roughly three significant digits.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let abs = n.abs();
    if abs < 1000.0 {
        if (n - n.trunc()).abs() < 1e-6 {
            return format!("{}", n.trunc() as i64);
        }
        return format!("{n:.1}");
    }

    let mut magnitude = 0;
    while magnitude + 1 < SUFFIXES.len() && abs >= 1000f64.powi(magnitude as i32 + 1) {
        magnitude += 1;
    }
    let value = n / 1000f64.powi(magnitude as i32);
    let suffix = SUFFIXES[magnitude];
    if value.abs() >= 100.0 {
        format!("{value:.0}{suffix}")
    } else if value.abs() >= 10.0 {
        format!("{value:.1}{suffix}")
    } else {
        format!("{value:.2}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_integers_print_bare() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn small_fractions_keep_one_decimal() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(12.34), "12.3");
    }

    #[test]
    fn thousands_and_up() {
        assert_eq!(format_number(1_000.0), "1.00K");
        assert_eq!(format_number(1_500.0), "1.50K");
        assert_eq!(format_number(12_345.0), "12.3K");
        assert_eq!(format_number(123_456.0), "123K");
        assert_eq!(format_number(1_000_000.0), "1.00M");
        assert_eq!(format_number(2.5e9), "2.50B");
        assert_eq!(format_number(4.2e12), "4.20T");
        assert_eq!(format_number(1e15), "1.00Qa");
    }

    #[test]
    fn suffix_table_caps_at_decillion() {
        assert_eq!(format_number(1e36), "1000De");
    }

    #[test]
    fn negatives_keep_sign() {
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-1_500.0), "-1.50K");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_number(f64::NAN), "0");
        assert_eq!(format_number(f64::INFINITY), "∞");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_format_number_no_panic(n in proptest::num::f64::ANY) {
            let _ = format_number(n);
        }

        #[test]
        fn prop_integers_below_thousand_print_exactly(n in 0u32..1000) {
            prop_assert_eq!(format_number(n as f64), n.to_string());
        }

        #[test]
        fn prop_large_values_are_short(n in 1_000.0f64..1e30) {
            let s = format_number(n);
            prop_assert!(s.len() <= 7, "got: {}", s);
            prop_assert!(s.chars().last().is_some_and(|c| c.is_ascii_alphabetic()), "got: {}", s);
        }

        #[test]
        fn prop_nonnegative_has_no_minus(n in 0.0f64..1e30) {
            prop_assert!(!format_number(n).starts_with('-'));
        }
    }
}
