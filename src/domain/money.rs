/// Balances and transfer amounts are whole currency units.
pub type Amount = i64;

/// Format an amount the way the console shows it.
/// Example: 40 -> "$40", -5 -> "-$5"
pub fn format_amount(amount: Amount) -> String {
    if amount < 0 {
        format!("-${}", amount.unsigned_abs())
    } else {
        format!("${}", amount)
    }
}

/// Parse an operator-typed amount. Surrounding whitespace is ignored.
pub fn parse_amount(input: &str) -> Result<Amount, std::num::ParseIntError> {
    input.trim().trim_start_matches('$').parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(40), "$40");
        assert_eq!(format_amount(0), "$0");
        assert_eq!(format_amount(-5), "-$5");
        assert_eq!(format_amount(i64::MIN), "-$9223372036854775808");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("40"), Ok(40));
        assert_eq!(parse_amount(" $100 "), Ok(100));
        assert_eq!(parse_amount("-3"), Ok(-3));
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("").is_err());
    }
}
