use std::sync::Arc;

use tracing::info;

use crate::core::{lifecycle, validation};
use crate::db::errors::DatabaseError;
use crate::domain::{
    Amount, Auction, AuctionFilter, AuctionPatch, AuctionRepository, AuctionStatus, AuctionView,
    CarId, CarStore, UnixMillis,
};
use crate::utils::errors::AuctionError;
use crate::utils::helpers::current_unix_ms;

/// Parameters for creating a draft auction.
#[derive(Debug, Clone)]
pub struct CreateAuction {
    pub car_id: CarId,
    pub starting_price: Amount,
    pub start_time: UnixMillis,
    pub end_time: UnixMillis,
}

/// Orchestrates auction lifecycle operations. All state rules live in
/// `core::lifecycle`; this layer composes them with storage and the car
/// collaborator.
pub struct AuctionService {
    auctions: Arc<dyn AuctionRepository>,
    cars: Arc<dyn CarStore>,
}

impl AuctionService {
    pub fn new(auctions: Arc<dyn AuctionRepository>, cars: Arc<dyn CarStore>) -> Self {
        AuctionService { auctions, cars }
    }

    /// Creates a new auction in draft status.
    pub async fn create_auction(&self, request: CreateAuction) -> Result<AuctionView, AuctionError> {
        validation::validate_auction_fields(
            request.starting_price,
            request.start_time,
            request.end_time,
        )?;

        let car = self
            .cars
            .find_car(&request.car_id)
            .await?
            .ok_or(AuctionError::CarNotFound)?;

        if self
            .auctions
            .find_live_for_car(&request.car_id)
            .await?
            .is_some()
        {
            return Err(AuctionError::CarAlreadyInAuction);
        }

        let auction = Auction::new(
            request.car_id,
            request.starting_price,
            request.start_time,
            request.end_time,
            current_unix_ms(),
        );

        // The partial unique index on live auctions closes the window between
        // the check above and this insert.
        match self.auctions.create(&auction).await {
            Ok(()) => {}
            Err(DatabaseError::UniqueViolation(_)) => {
                return Err(AuctionError::CarAlreadyInAuction)
            }
            Err(e) => return Err(e.into()),
        }

        info!(auction_id = %auction.id, car_id = %auction.car_id, "auction created in draft");
        Ok(AuctionView { auction, car })
    }

    /// Starts a draft auction, moving it to `upcoming` or `active` depending
    /// on the wall clock relative to the window.
    pub async fn start_auction(&self, auction_id: &str) -> Result<AuctionView, AuctionError> {
        let auction = self.load(auction_id).await?;

        if auction.status != AuctionStatus::Draft {
            return Err(AuctionError::NotStartable(auction.status));
        }

        let target =
            lifecycle::start_transition(current_unix_ms(), auction.start_time, auction.end_time)?;

        let flipped = self
            .auctions
            .set_status(auction_id, AuctionStatus::Draft, target)
            .await?;
        if !flipped {
            // Lost a race with another start or a cancellation.
            let current = self.load(auction_id).await?;
            return Err(AuctionError::NotStartable(current.status));
        }

        info!(auction_id, status = %target, "auction started");
        self.view(auction_id).await
    }

    /// Applies a partial patch to a draft auction and re-validates the merged
    /// fields.
    pub async fn update_auction(
        &self,
        auction_id: &str,
        patch: AuctionPatch,
    ) -> Result<AuctionView, AuctionError> {
        let auction = self.load(auction_id).await?;
        lifecycle::ensure_editable(auction.status)?;

        let starting_price = patch.starting_price.unwrap_or(auction.starting_price);
        let start_time = patch.start_time.unwrap_or(auction.start_time);
        let end_time = patch.end_time.unwrap_or(auction.end_time);
        validation::validate_auction_fields(starting_price, start_time, end_time)?;

        let updated = self
            .auctions
            .update_draft(auction_id, starting_price, start_time, end_time)
            .await?;
        if !updated {
            let current = self.load(auction_id).await?;
            return Err(AuctionError::NotEditable(current.status));
        }

        info!(auction_id, "draft auction updated");
        self.view(auction_id).await
    }

    /// Cancels an auction from any non-terminal status.
    pub async fn cancel_auction(&self, auction_id: &str) -> Result<AuctionView, AuctionError> {
        let auction = self.load(auction_id).await?;
        lifecycle::ensure_cancellable(auction.status)?;

        let flipped = self
            .auctions
            .set_status(auction_id, auction.status, AuctionStatus::Cancelled)
            .await?;
        if !flipped {
            let current = self.load(auction_id).await?;
            return Err(AuctionError::NotCancellable(current.status));
        }

        info!(auction_id, "auction cancelled");
        self.view(auction_id).await
    }

    /// Fetches a single auction with its car, applying lazy expiry.
    pub async fn get_auction(&self, auction_id: &str) -> Result<AuctionView, AuctionError> {
        let mut auction = self.load(auction_id).await?;

        if lifecycle::is_expired(auction.status, current_unix_ms(), auction.end_time) {
            self.auctions
                .set_status(auction_id, AuctionStatus::Active, AuctionStatus::Ended)
                .await?;
            info!(auction_id, "auction expired on read");
            auction.status = AuctionStatus::Ended;
        }

        let car = self
            .cars
            .find_car(&auction.car_id)
            .await?
            .ok_or(AuctionError::CarNotFound)?;

        Ok(AuctionView { auction, car })
    }

    /// Lists auctions matching the filter. A pure read with no side effects.
    pub async fn list_auctions(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, AuctionError> {
        Ok(self.auctions.list(filter).await?)
    }

    async fn load(&self, auction_id: &str) -> Result<Auction, AuctionError> {
        self.auctions
            .get(auction_id)
            .await?
            .ok_or(AuctionError::AuctionNotFound)
    }

    async fn view(&self, auction_id: &str) -> Result<AuctionView, AuctionError> {
        let auction = self.load(auction_id).await?;
        let car = self
            .cars
            .find_car(&auction.car_id)
            .await?
            .ok_or(AuctionError::CarNotFound)?;
        Ok(AuctionView { auction, car })
    }
}
