//! Permissive integer coercion.

/// Parse an optional sign followed by leading digits, ignoring leading
/// whitespace and anything after the digits. Non-numeric input yields 0.
pub fn coerce_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }

    // Saturate instead of wrapping on absurdly long digit runs.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int("42"), 42);
        assert_eq!(coerce_int(" 7"), 7);
        assert_eq!(coerce_int("-3"), -3);
        assert_eq!(coerce_int("+5"), 5);
        assert_eq!(coerce_int("12abc"), 12);
        assert_eq!(coerce_int("3.9"), 3);
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("-"), 0);
    }

    #[test]
    fn test_coerce_int_saturates() {
        assert_eq!(coerce_int("99999999999999999999999"), i64::MAX);
    }
}
