use std::fmt;

use crate::domain::{Amount, UnixMillis};
use crate::utils::errors::AuctionError;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        FieldError { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates the price and window of a create or (merged) update request.
/// Collects all failures instead of stopping at the first.
pub fn validate_auction_fields(
    starting_price: Amount,
    start_time: UnixMillis,
    end_time: UnixMillis,
) -> Result<(), AuctionError> {
    let mut errors = Vec::new();

    if starting_price < 0 {
        errors.push(FieldError::new(
            "startingPrice",
            "Starting price cannot be negative",
        ));
    }
    if end_time <= start_time {
        errors.push(FieldError::new(
            "endTime",
            "End time must be after start time",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuctionError::Validation(errors))
    }
}

/// A bid amount must be strictly positive before any ledger comparison runs.
pub fn validate_bid_amount(amount: Amount) -> Result<(), AuctionError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(AuctionError::Validation(vec![FieldError::new(
            "amount",
            "Amount must be greater than zero",
        )]))
    }
}
