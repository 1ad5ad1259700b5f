use crate::domain::{AuctionStatus, UnixMillis};
use crate::utils::errors::AuctionError;

/// Resolves the status a draft auction moves to when started at `now`.
///
/// Within the window the auction goes straight to `active`; before the window
/// it becomes `upcoming`. A window that has already passed cannot be started
/// and the auction stays in `draft`.
pub fn start_transition(
    now: UnixMillis,
    start_time: UnixMillis,
    end_time: UnixMillis,
) -> Result<AuctionStatus, AuctionError> {
    if now > end_time {
        Err(AuctionError::WindowPassed)
    } else if now < start_time {
        Ok(AuctionStatus::Upcoming)
    } else {
        Ok(AuctionStatus::Active)
    }
}

/// Lazy-expiry observation: an `active` auction whose end time has passed must
/// be flipped to `ended` by whichever caller notices first. The flip itself is
/// an idempotent status compare-and-swap, so concurrent observers are safe.
pub fn is_expired(status: AuctionStatus, now: UnixMillis, end_time: UnixMillis) -> bool {
    status == AuctionStatus::Active && now > end_time
}

/// Only draft auctions may have their price or window edited.
pub fn ensure_editable(status: AuctionStatus) -> Result<(), AuctionError> {
    if status == AuctionStatus::Draft {
        Ok(())
    } else {
        Err(AuctionError::NotEditable(status))
    }
}

/// Cancellation is allowed from any non-terminal status.
pub fn ensure_cancellable(status: AuctionStatus) -> Result<(), AuctionError> {
    if status.is_terminal() {
        Err(AuctionError::NotCancellable(status))
    } else {
        Ok(())
    }
}
