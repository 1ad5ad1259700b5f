use std::sync::Arc;

use crate::core::AdmissionEngine;
use crate::domain::{ActorStore, Amount, AuctionRepository, BidLedger, BidView};
use crate::utils::errors::AuctionError;

/// Thin orchestration over the admission engine. No business rules of its
/// own; the engine is the single authority on admission.
pub struct BidService {
    engine: AdmissionEngine,
}

impl BidService {
    pub fn new(
        auctions: Arc<dyn AuctionRepository>,
        actors: Arc<dyn ActorStore>,
        ledger: Arc<dyn BidLedger>,
    ) -> Self {
        BidService {
            engine: AdmissionEngine::new(auctions, actors, ledger),
        }
    }

    pub async fn place_bid(
        &self,
        auction_id: &str,
        dealer_id: &str,
        amount: Amount,
    ) -> Result<BidView, AuctionError> {
        self.engine.place_bid(auction_id, dealer_id, amount).await
    }

    pub async fn winner_bid(&self, auction_id: &str) -> Result<BidView, AuctionError> {
        self.engine.winner_bid(auction_id).await
    }
}
