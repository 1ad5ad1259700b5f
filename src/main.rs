use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gavel::db::pool::DbPool;
use gavel::db::repositories::{
    SqliteActorStore, SqliteAuctionRepository, SqliteBidLedger, SqliteCarStore,
};
use gavel::domain::{Actor, ActorRole, ActorStore, Car, CarStatus, CarStore};
use gavel::services::{AuctionService, BidService, CreateAuction};
use gavel::utils::helpers::current_unix_ms;

/// Demo flow: seed a car and a dealer, run one auction end to end.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_pool = match std::env::var("DATABASE_URL") {
        Ok(url) => DbPool::new(&url).await?,
        Err(_) => DbPool::new_in_memory().await?,
    };

    let cars = Arc::new(SqliteCarStore::new(db_pool.clone()));
    let actors = Arc::new(SqliteActorStore::new(db_pool.clone()));
    let auctions = Arc::new(SqliteAuctionRepository::new(db_pool.clone()));
    let ledger = Arc::new(SqliteBidLedger::new(db_pool));

    cars.insert(&Car {
        id: "car-demo".to_string(),
        make: "Honda".to_string(),
        model: "NSX".to_string(),
        year: 1992,
        price: 90_000,
        owner_id: "owner-demo".to_string(),
        status: CarStatus::Available,
    })
    .await?;
    actors
        .insert(&Actor {
            id: "dealer-demo".to_string(),
            name: "Demo Dealer".to_string(),
            email: "dealer@demo.example".to_string(),
            role: ActorRole::Dealer,
        })
        .await?;

    let auction_service = AuctionService::new(auctions.clone(), cars.clone());
    let bid_service = BidService::new(auctions, actors, ledger);

    let now = current_unix_ms();
    let view = auction_service
        .create_auction(CreateAuction {
            car_id: "car-demo".to_string(),
            starting_price: 20_000,
            start_time: now - 1_000,
            end_time: now + 60_000,
        })
        .await?;
    let auction_id = view.auction.id.clone();

    auction_service.start_auction(&auction_id).await?;

    bid_service
        .place_bid(&auction_id, "dealer-demo", 21_000)
        .await?;
    bid_service
        .place_bid(&auction_id, "dealer-demo", 22_000)
        .await?;

    let winner = bid_service.winner_bid(&auction_id).await?;
    info!(
        auction_id = %auction_id,
        amount = winner.bid.amount,
        dealer = %winner.dealer.name,
        "current winning bid"
    );

    Ok(())
}
