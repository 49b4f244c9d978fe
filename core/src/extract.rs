use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ORDER_REF: Regex = Regex::new(r"(?i)ORD[- ]?([0-9]+)").expect("valid regex");
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]{3,}").expect("valid regex");
}

/// Find an order identifier the user typed explicitly, normalized to
/// `ORD-<digits>`. A bare run of three or more digits is treated as the
/// numeric part of an identifier. Only ASCII digits count.
pub fn extract_order_id(query: &str) -> Option<String> {
    if let Some(caps) = ORDER_REF.captures(query) {
        return Some(format!("ORD-{}", &caps[1]));
    }
    DIGIT_RUN.find(query).map(|m| format!("ORD-{}", m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_prefix_variants() {
        assert_eq!(extract_order_id("status of ord 1002?").as_deref(), Some("ORD-1002"));
        assert_eq!(extract_order_id("ord1005").as_deref(), Some("ORD-1005"));
        assert_eq!(extract_order_id("Ord-1003 please").as_deref(), Some("ORD-1003"));
    }

    #[test]
    fn idempotent_on_normalized_form() {
        let once = extract_order_id("ORD-1002").unwrap();
        assert_eq!(extract_order_id(&once).as_deref(), Some("ORD-1002"));
    }

    #[test]
    fn falls_back_to_first_digit_run() {
        assert_eq!(extract_order_id("where is 42 or 1004 or 2001").as_deref(), Some("ORD-1004"));
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(extract_order_id("ord ١٠٠٢"), None);
        assert_eq!(extract_order_id("order ١٢٣٤"), None);
    }

    #[test]
    fn short_numbers_are_not_identifiers() {
        assert_eq!(extract_order_id("Where is my MacBook order?"), None);
        assert_eq!(extract_order_id("I bought 2 phones"), None);
    }
}
