//! Canonical column names shared by readers, the alignment engine and the
//! feature transform.

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const CLOSE: &str = "Close";
pub const RATE_LEVEL: &str = "Interest Rate_Old";
pub const RATE_CHANGE: &str = "Interest Rate_Change";

/// Prefix shared by all one-hot instrument indicator columns.
pub const INDICATOR_PREFIX: &str = "Index_";

/// Close `offset` trading days before the announcement, e.g. `Close_t-1`.
pub fn trailing_close(offset: usize) -> String {
    format!("Close_t-{}", offset)
}

/// Close `offset` trading days after the announcement, e.g. `Close_t+1`.
pub fn leading_close(offset: usize) -> String {
    format!("Close_t+{}", offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_column_names() {
        assert_eq!(trailing_close(14), "Close_t-14");
        assert_eq!(trailing_close(1), "Close_t-1");
        assert_eq!(leading_close(3), "Close_t+3");
    }
}
