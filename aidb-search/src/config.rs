//! Result-count limits for search requests.
//!
//! [`SearchLimits`] fixes the default and maximum number of records a search
//! returns. Client-supplied limits are never an error: anything that is not
//! an integer inside `0..=max` silently becomes the default.

use crate::error::SearchError;

/// Number of results returned when the client gives no usable limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Largest limit a client may request.
pub const MAX_SEARCH_LIMIT: usize = 20;

/// Bounds applied to a client-supplied result limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Limit used when the request omits one or supplies an invalid value.
    pub default: usize,
    /// Inclusive upper bound on accepted limits.
    pub max: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default: DEFAULT_SEARCH_LIMIT,
            max: MAX_SEARCH_LIMIT,
        }
    }
}

impl SearchLimits {
    /// Validates these limits.
    ///
    /// The default must itself be an accepted value, i.e. `default <= max`.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.default > self.max {
            return Err(SearchError::Config(
                "default limit must be <= max limit".into(),
            ));
        }
        Ok(())
    }

    /// Resolve a raw `limit` query value into a usable count.
    ///
    /// The leading integer of the trimmed input is used (`"10abc"` is 10).
    /// Absent, non-numeric, negative or larger-than-max values resolve to
    /// the default.
    pub fn parse(&self, raw: Option<&str>) -> usize {
        let Some(raw) = raw else {
            return self.default;
        };
        match leading_integer(raw) {
            Some(n) if n >= 0 && (n as u128) <= self.max as u128 => n as usize,
            _ => self.default,
        }
    }
}

/// Resolve a raw limit with the fixed default bounds.
pub fn parse_limit(raw: Option<&str>) -> usize {
    SearchLimits::default().parse(raw)
}

/// Parse an optionally signed run of ASCII digits at the start of `raw`
/// (after leading whitespace). Returns `None` when no digit is present.
fn leading_integer(raw: &str) -> Option<i128> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Anything longer than 30 digits is out of range regardless of sign.
    let value: i128 = digits[..end.min(30)].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = SearchLimits::default();
        assert_eq!(limits.default, 5);
        assert_eq!(limits.max, 20);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn default_above_max_rejected() {
        let limits = SearchLimits { default: 30, max: 20 };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("default limit"));
    }

    #[test]
    fn absent_limit_uses_default() {
        assert_eq!(parse_limit(None), 5);
        assert_eq!(parse_limit(Some("")), 5);
    }

    #[test]
    fn invalid_limits_fall_back_to_default() {
        assert_eq!(parse_limit(Some("-1")), 5);
        assert_eq!(parse_limit(Some("abc")), 5);
        assert_eq!(parse_limit(Some("999")), 5);
        assert_eq!(parse_limit(Some("21")), 5);
        assert_eq!(parse_limit(Some("99999999999999999999999999999999999999")), 5);
    }

    #[test]
    fn in_range_limits_pass_through() {
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some("0")), 0);
        assert_eq!(parse_limit(Some("20")), 20);
        assert_eq!(parse_limit(Some("+3")), 3);
    }

    #[test]
    fn leading_integer_prefix_is_used() {
        assert_eq!(parse_limit(Some("10abc")), 10);
        assert_eq!(parse_limit(Some("  7")), 7);
        assert_eq!(parse_limit(Some("8.9")), 8);
    }

    #[test]
    fn custom_limits() {
        let limits = SearchLimits { default: 2, max: 3 };
        assert_eq!(limits.parse(Some("3")), 3);
        assert_eq!(limits.parse(Some("4")), 2);
    }
}
