use std::sync::Arc;

use tracing::{info, warn};

use crate::core::validation;
use crate::db::errors::DatabaseError;
use crate::domain::{
    ActorRole, ActorStore, Amount, AppendOutcome, Auction, AuctionRepository, AuctionStatus,
    BidLedger, BidView, NewBid,
};
use crate::utils::errors::AuctionError;
use crate::utils::helpers::current_unix_ms;

/// How many times a bid is re-validated and re-attempted after losing the
/// optimistic race before the caller sees a conflict.
const MAX_ADMISSION_ATTEMPTS: u32 = 3;

/// The single authoritative gate for bid admission.
///
/// Many request handlers race through here for the same auction. There is no
/// in-process serialization; correctness rests on the conditional ledger
/// append, which commits only if the auction version is unchanged since the
/// head was read. Losing racers re-read and re-validate before retrying.
pub struct AdmissionEngine {
    auctions: Arc<dyn AuctionRepository>,
    actors: Arc<dyn ActorStore>,
    ledger: Arc<dyn BidLedger>,
}

impl AdmissionEngine {
    pub fn new(
        auctions: Arc<dyn AuctionRepository>,
        actors: Arc<dyn ActorStore>,
        ledger: Arc<dyn BidLedger>,
    ) -> Self {
        AdmissionEngine {
            auctions,
            actors,
            ledger,
        }
    }

    /// Validates and admits a bid, returning it enriched with dealer and
    /// predecessor summaries.
    pub async fn place_bid(
        &self,
        auction_id: &str,
        actor_id: &str,
        amount: Amount,
    ) -> Result<BidView, AuctionError> {
        validation::validate_bid_amount(amount)?;

        for attempt in 0..MAX_ADMISSION_ATTEMPTS {
            match self.try_admit(auction_id, actor_id, amount).await? {
                AppendOutcome::Committed(bid) => {
                    info!(
                        auction_id,
                        bid_id = bid.id,
                        dealer_id = %bid.dealer_id,
                        amount,
                        "bid admitted"
                    );
                    return self
                        .ledger
                        .detail(bid.id)
                        .await?
                        .ok_or_else(|| missing_detail(bid.id));
                }
                AppendOutcome::VersionConflict => {
                    warn!(auction_id, attempt, "bid lost optimistic race, retrying");
                }
            }
        }

        Err(AuctionError::BidRaceLost)
    }

    /// One admission attempt: load, validate, and conditionally append.
    async fn try_admit(
        &self,
        auction_id: &str,
        actor_id: &str,
        amount: Amount,
    ) -> Result<AppendOutcome, AuctionError> {
        let auction = self
            .auctions
            .get(auction_id)
            .await?
            .ok_or(AuctionError::AuctionNotFound)?;

        if auction.status != AuctionStatus::Active {
            return Err(AuctionError::AuctionNotActive(auction.status));
        }

        let actor = self
            .actors
            .find_actor(actor_id)
            .await?
            .ok_or(AuctionError::ActorNotFound)?;
        if actor.role != ActorRole::Dealer {
            return Err(AuctionError::NotADealer);
        }

        if amount <= auction.starting_price {
            return Err(AuctionError::BelowStartingPrice);
        }

        let head = self.ledger.head(auction_id).await?;
        if let Some(last) = &head {
            // Strict inequality: an equal bid never supersedes the head.
            if amount <= last.amount {
                return Err(AuctionError::BelowLeadingBid);
            }
        }

        // The clock check runs after the price checks, so a bid that is both
        // too low and too late is reported as too low.
        let now = current_unix_ms();
        if now > auction.end_time {
            self.expire(&auction).await?;
            return Err(AuctionError::AuctionEnded);
        }

        let new_bid = NewBid {
            auction_id: auction.id.clone(),
            dealer_id: actor.id,
            amount,
            previous_bid_id: head.map(|b| b.id),
        };

        Ok(self.ledger.append(new_bid, auction.version).await?)
    }

    async fn expire(&self, auction: &Auction) -> Result<(), AuctionError> {
        let flipped = self
            .auctions
            .set_status(&auction.id, AuctionStatus::Active, AuctionStatus::Ended)
            .await?;
        if flipped {
            info!(auction_id = %auction.id, "auction expired during bid admission");
        }
        Ok(())
    }

    /// Returns the amount-maximal bid for the auction.
    pub async fn winner_bid(&self, auction_id: &str) -> Result<BidView, AuctionError> {
        self.auctions
            .get(auction_id)
            .await?
            .ok_or(AuctionError::AuctionNotFound)?;

        let winner = self
            .ledger
            .winner(auction_id)
            .await?
            .ok_or(AuctionError::NoBids)?;

        self.ledger
            .detail(winner.id)
            .await?
            .ok_or_else(|| missing_detail(winner.id))
    }
}

/// An admitted bid that cannot be read back is a storage inconsistency, not a
/// business rejection.
fn missing_detail(bid_id: i64) -> AuctionError {
    AuctionError::Storage(DatabaseError::Other(format!(
        "bid {} missing from ledger",
        bid_id
    )))
}
