pub mod auction;
pub mod bid;

pub use auction::{AuctionService, CreateAuction};
pub use bid::BidService;
