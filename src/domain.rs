use std::fmt;

use async_trait::async_trait;

use crate::db::errors::DatabaseError;
use crate::utils::helpers::compute_hash;

// ------------------------------------------------------------------------
// Type aliases
// ------------------------------------------------------------------------

pub type AuctionId = String;
pub type CarId = String;
pub type ActorId = String;
pub type BidId = i64;
pub type Amount = i64;
pub type UnixMillis = i64;

// ------------------------------------------------------------------------
// Entities
// ------------------------------------------------------------------------

/// Lifecycle status of an auction. Transitions are one-directional:
/// `draft -> upcoming/active -> ended`, with `cancelled` reachable from any
/// non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum AuctionStatus {
    Draft,
    Upcoming,
    Active,
    Ended,
    Cancelled,
}

impl AuctionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }

    /// A live auction blocks the creation of another auction for the same car.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            AuctionStatus::Draft | AuctionStatus::Upcoming | AuctionStatus::Active
        )
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuctionStatus::Draft => "draft",
            AuctionStatus::Upcoming => "upcoming",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum CarStatus {
    Available,
    InAuction,
    Sold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Dealer,
}

/// A car listed for sale. Owned and mutated by the car-management
/// collaborator; this core only reads it to validate auction creation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub price: Amount,
    pub owner_id: ActorId,
    pub status: CarStatus,
}

/// A registered user. Only actors with the `dealer` role may place bids.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub role: ActorRole,
}

/// An auction over a single car. `highest_bid` and `leading_bid_id` are a
/// denormalized cache of the bid ledger head; the bids table is the source of
/// truth. `version` increases with every admitted bid and backs the
/// compare-and-swap on admission.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Auction {
    pub id: AuctionId,
    pub car_id: CarId,
    pub starting_price: Amount,
    pub start_time: UnixMillis,
    pub end_time: UnixMillis,
    pub status: AuctionStatus,
    pub highest_bid: Option<Amount>,
    pub leading_bid_id: Option<BidId>,
    pub version: i64,
    pub created_at: UnixMillis,
}

impl Auction {
    /// Creates a new draft auction. The id is a SHA-256 hash of the
    /// identifying fields, hex-encoded.
    pub fn new(
        car_id: CarId,
        starting_price: Amount,
        start_time: UnixMillis,
        end_time: UnixMillis,
        created_at: UnixMillis,
    ) -> Self {
        Auction {
            id: compute_hash(&[
                car_id.as_bytes(),
                starting_price.to_be_bytes().as_ref(),
                start_time.to_be_bytes().as_ref(),
                end_time.to_be_bytes().as_ref(),
                created_at.to_be_bytes().as_ref(),
            ]),
            car_id,
            starting_price,
            start_time,
            end_time,
            status: AuctionStatus::Draft,
            highest_bid: None,
            leading_bid_id: None,
            version: 0,
            created_at,
        }
    }
}

/// An admitted bid. Immutable once created; the ledger is append-only.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub dealer_id: ActorId,
    pub amount: Amount,
    pub previous_bid_id: Option<BidId>,
    pub created_at: UnixMillis,
}

/// A bid proposed for admission. The `previous_bid_id` linkage is produced by
/// the admission engine from the ledger head it validated against.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub auction_id: AuctionId,
    pub dealer_id: ActorId,
    pub amount: Amount,
    pub previous_bid_id: Option<BidId>,
}

// ------------------------------------------------------------------------
// Value objects
// ------------------------------------------------------------------------

/// Partial update applied to a draft auction. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct AuctionPatch {
    pub starting_price: Option<Amount>,
    pub start_time: Option<UnixMillis>,
    pub end_time: Option<UnixMillis>,
}

/// Explicit filter for auction listings, translated into SQL by the storage
/// adapter.
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub car_id: Option<CarId>,
    pub min_price: Option<Amount>,
    pub max_price: Option<Amount>,
}

// ------------------------------------------------------------------------
// Read-only projections
// ------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DealerSummary {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub role: ActorRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviousBidSummary {
    pub id: BidId,
    pub dealer_id: ActorId,
    pub amount: Amount,
    pub created_at: UnixMillis,
}

/// A bid enriched with dealer and predecessor summaries for presentation.
#[derive(Debug, Clone)]
pub struct BidView {
    pub bid: Bid,
    pub dealer: DealerSummary,
    pub previous: Option<PreviousBidSummary>,
}

/// An auction enriched with its car for presentation.
#[derive(Debug, Clone)]
pub struct AuctionView {
    pub auction: Auction,
    pub car: Car,
}

/// Result of a conditional ledger append.
#[derive(Debug)]
pub enum AppendOutcome {
    /// The bid was committed and the auction's leading-bid cache updated.
    Committed(Bid),
    /// The auction version moved since it was read; nothing was written.
    VersionConflict,
}

// ------------------------------------------------------------------------
// Repository traits
// ------------------------------------------------------------------------

#[async_trait]
pub trait AuctionRepository: Send + Sync {
    async fn create(&self, auction: &Auction) -> Result<(), DatabaseError>;
    async fn get(&self, auction_id: &str) -> Result<Option<Auction>, DatabaseError>;
    async fn list(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, DatabaseError>;
    async fn find_live_for_car(&self, car_id: &str) -> Result<Option<Auction>, DatabaseError>;
    /// Compare-and-swap on status. Returns `false` when the auction was not in
    /// the `from` status, which makes redundant transitions idempotent.
    async fn set_status(
        &self,
        auction_id: &str,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, DatabaseError>;
    /// Writes the merged draft fields. Returns `false` when the auction is no
    /// longer in `draft` status.
    async fn update_draft(
        &self,
        auction_id: &str,
        starting_price: Amount,
        start_time: UnixMillis,
        end_time: UnixMillis,
    ) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait BidLedger: Send + Sync {
    /// The most recently admitted bid for the auction, if any.
    async fn head(&self, auction_id: &str) -> Result<Option<Bid>, DatabaseError>;
    /// The amount-maximal bid for the auction. Kept as an order-independent
    /// lookup even though it coincides with the head under the strict-increase
    /// rule.
    async fn winner(&self, auction_id: &str) -> Result<Option<Bid>, DatabaseError>;
    /// Appends a bid and refreshes the auction's leading-bid cache in one
    /// transaction, conditioned on the auction version being unchanged.
    async fn append(&self, bid: NewBid, expected_version: i64)
        -> Result<AppendOutcome, DatabaseError>;
    /// Bid with dealer and predecessor summaries.
    async fn detail(&self, bid_id: BidId) -> Result<Option<BidView>, DatabaseError>;
    /// Full chain for the auction in ledger order.
    async fn list(&self, auction_id: &str) -> Result<Vec<Bid>, DatabaseError>;
}

#[async_trait]
pub trait CarStore: Send + Sync {
    async fn find_car(&self, car_id: &str) -> Result<Option<Car>, DatabaseError>;
    async fn insert(&self, car: &Car) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ActorStore: Send + Sync {
    async fn find_actor(&self, actor_id: &str) -> Result<Option<Actor>, DatabaseError>;
    async fn insert(&self, actor: &Actor) -> Result<(), DatabaseError>;
}
