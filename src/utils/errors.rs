use thiserror::Error;

use crate::core::validation::FieldError;
use crate::db::errors::DatabaseError;
use crate::domain::AuctionStatus;

/// Stable classification of a rejection. Each error maps to exactly one kind,
/// which a transport layer can translate into a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    Forbidden,
    Conflict,
    Internal,
}

/// A set of possible errors that can occur in the auction workflow.
#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("Auction not found")]
    AuctionNotFound,

    #[error("Car not found")]
    CarNotFound,

    #[error("User not found")]
    ActorNotFound,

    #[error("No bids found for this auction")]
    NoBids,

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Bid amount must be greater than starting price")]
    BelowStartingPrice,

    #[error("Bid amount must be greater than previous bid")]
    BelowLeadingBid,

    #[error("Cannot start auction that is already in {0} status")]
    NotStartable(AuctionStatus),

    #[error("Cannot start auction with end time in the past")]
    WindowPassed,

    #[error("Cannot update auction that has already started")]
    NotEditable(AuctionStatus),

    #[error("Cannot cancel auction in {0} status")]
    NotCancellable(AuctionStatus),

    #[error("Auction is not active")]
    AuctionNotActive(AuctionStatus),

    #[error("Auction has already ended")]
    AuctionEnded,

    #[error("Only dealers can place bids")]
    NotADealer,

    #[error("This car is already in an active or upcoming auction")]
    CarAlreadyInAuction,

    #[error("Bid lost race with a concurrent higher bid, please resubmit")]
    BidRaceLost,

    #[error("Unexpected storage failure")]
    Storage(#[from] DatabaseError),
}

impl AuctionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuctionNotFound | Self::CarNotFound | Self::ActorNotFound | Self::NoBids => {
                ErrorKind::NotFound
            }
            Self::Validation(_) | Self::BelowStartingPrice | Self::BelowLeadingBid => {
                ErrorKind::InvalidArgument
            }
            Self::NotStartable(_)
            | Self::WindowPassed
            | Self::NotEditable(_)
            | Self::NotCancellable(_)
            | Self::AuctionNotActive(_)
            | Self::AuctionEnded => ErrorKind::InvalidState,
            Self::NotADealer => ErrorKind::Forbidden,
            Self::CarAlreadyInAuction | Self::BidRaceLost => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_error_has_a_single_kind() {
        assert_eq!(AuctionError::AuctionNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            AuctionError::BelowStartingPrice.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(AuctionError::AuctionEnded.kind(), ErrorKind::InvalidState);
        assert_eq!(AuctionError::NotADealer.kind(), ErrorKind::Forbidden);
        assert_eq!(AuctionError::BidRaceLost.kind(), ErrorKind::Conflict);
        assert_eq!(
            AuctionError::Storage(DatabaseError::Other("boom".to_string())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_message_joins_fields() {
        let err = AuctionError::Validation(vec![
            FieldError::new("startingPrice", "Starting price cannot be negative"),
            FieldError::new("endTime", "End time must be after start time"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("Starting price cannot be negative"));
        assert!(msg.contains("End time must be after start time"));
    }
}
