//! Rendering of allocated sequence numbers.

/// Render `value` as `prefix` followed by the value zero-padded to `padding` digits.
///
/// Values wider than `padding` are rendered in full, never truncated.
pub fn format_sequence(prefix: &str, padding: i64, value: i64) -> String {
    let width = usize::try_from(padding).unwrap_or(0);
    format!("{prefix}{value:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_width() {
        assert_eq!(format_sequence("SO", 8, 1), "SO00000001");
        assert_eq!(format_sequence("PO-", 4, 123), "PO-0123");
    }

    #[test]
    fn test_length_is_prefix_plus_padding() {
        for value in [1, 9, 10, 99_999, 12_345_678] {
            let out = format_sequence("INV", 8, value);
            assert_eq!(out.len(), "INV".len() + 8, "value {value}");
            assert_eq!(out[3..].parse::<i64>().expect("numeric suffix"), value);
        }
    }

    #[test]
    fn test_overflowing_value_is_not_truncated() {
        assert_eq!(format_sequence("X", 2, 12345), "X12345");
    }

    #[test]
    fn test_zero_and_negative_padding() {
        assert_eq!(format_sequence("A", 0, 7), "A7");
        assert_eq!(format_sequence("A", -3, 7), "A7");
    }
}
