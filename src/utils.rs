//! Utility functions for the ranking service

use crate::error::RankingError;
use crate::types::ItemId;
use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Validate that an identifier could reference a stored movie
pub fn validate_item_id(item_id: ItemId) -> Result<ItemId, RankingError> {
    if item_id <= 0 {
        return Err(RankingError::invalid(format!(
            "Movie id must be positive, got {}",
            item_id
        )));
    }
    Ok(item_id)
}

/// Parse a previously shown pair given as `"3,7"`
pub fn parse_pair(raw: &str) -> Result<(ItemId, ItemId), RankingError> {
    let mut parts = raw.split(',').map(str::trim);

    let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RankingError::invalid(format!(
            "Expected two comma separated ids, got '{}'",
            raw
        )));
    };

    let parse = |value: &str| {
        value
            .parse::<ItemId>()
            .map_err(|_| RankingError::invalid(format!("Malformed movie id '{}'", value)))
            .and_then(validate_item_id)
    };

    Ok((parse(first)?, parse(second)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id() {
        assert_eq!(validate_item_id(7).unwrap(), 7);
        assert!(validate_item_id(0).is_err());
        assert!(validate_item_id(-3).is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("3,7").unwrap(), (3, 7));
        assert_eq!(parse_pair(" 12 , 4 ").unwrap(), (12, 4));
    }

    #[test]
    fn test_parse_pair_rejects_malformed() {
        assert!(parse_pair("").is_err());
        assert!(parse_pair("3").is_err());
        assert!(parse_pair("3,7,9").is_err());
        assert!(parse_pair("a,7").is_err());
        assert!(parse_pair("0,7").is_err());
    }
}
