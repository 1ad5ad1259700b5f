pub mod actor;
pub mod auction;
pub mod bid;
pub mod car;

pub use actor::SqliteActorStore;
pub use auction::SqliteAuctionRepository;
pub use bid::SqliteBidLedger;
pub use car::SqliteCarStore;
