/// Digits a national phone number carries after the country code.
const NATIONAL_DIGITS: usize = 10;

/// Reduces a raw phone value to its canonical digit string: every non-digit
/// character is stripped, and when more than ten digits remain only the
/// trailing ten are kept (leading country-code digits are dropped).
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() > NATIONAL_DIGITS {
        digits[digits.len() - NATIONAL_DIGITS..].to_string()
    } else {
        digits
    }
}

/// Renders exactly ten digits as `"(AAA) BBB-CCCC"`. Inputs of any other
/// length are returned unchanged rather than sliced positionally.
pub fn format_national(digits: &str) -> String {
    if digits.len() != NATIONAL_DIGITS || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return digits.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::{format_national, normalize_phone};

    #[test]
    fn normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("(302) 555-0199"), "3025550199");
        assert_eq!(normalize_phone("302.555.0199"), "3025550199");
    }

    #[test]
    fn normalize_phone_keeps_trailing_ten_digits() {
        assert_eq!(normalize_phone("+1 (302) 555-0199"), "3025550199");
        assert_eq!(normalize_phone("0013025550199"), "3025550199");
    }

    #[test]
    fn normalize_phone_leaves_short_values_alone() {
        assert_eq!(normalize_phone("555-0199"), "5550199");
        assert_eq!(normalize_phone("no digits"), "");
    }

    #[test]
    fn format_national_renders_ten_digits() {
        assert_eq!(format_national("3025550199"), "(302) 555-0199");
    }

    #[test]
    fn format_national_passes_other_lengths_through() {
        assert_eq!(format_national("5550199"), "5550199");
        assert_eq!(format_national(""), "");
    }

    #[test]
    fn normalize_then_format_round_trip() {
        let formatted = format_national(&normalize_phone("+1 (302) 555-0199"));
        assert_eq!(formatted, "(302) 555-0199");
        // Re-normalizing a formatted value is stable.
        assert_eq!(format_national(&normalize_phone(&formatted)), formatted);
    }
}
