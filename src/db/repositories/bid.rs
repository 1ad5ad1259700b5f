use async_trait::async_trait;

use crate::db::errors::DatabaseError;
use crate::db::pool::DbPool;
use crate::domain::{
    ActorRole, AppendOutcome, Bid, BidId, BidLedger, BidView, DealerSummary, NewBid,
    PreviousBidSummary,
};
use crate::utils::helpers::current_unix_ms;

const BID_COLUMNS: &str = "id, auction_id, dealer_id, amount, previous_bid_id, created_at";

pub struct SqliteBidLedger {
    db_pool: DbPool,
}

impl SqliteBidLedger {
    pub fn new(db_pool: DbPool) -> Self {
        SqliteBidLedger { db_pool }
    }
}

/// Flat row for the detail projection; assembled into a `BidView`.
#[derive(sqlx::FromRow)]
struct BidDetailRow {
    id: BidId,
    auction_id: String,
    dealer_id: String,
    amount: i64,
    previous_bid_id: Option<BidId>,
    created_at: i64,
    dealer_name: String,
    dealer_email: String,
    dealer_role: ActorRole,
    prev_dealer_id: Option<String>,
    prev_amount: Option<i64>,
    prev_created_at: Option<i64>,
}

impl From<BidDetailRow> for BidView {
    fn from(row: BidDetailRow) -> Self {
        let previous = match (row.previous_bid_id, &row.prev_dealer_id) {
            (Some(id), Some(dealer_id)) => Some(PreviousBidSummary {
                id,
                dealer_id: dealer_id.clone(),
                amount: row.prev_amount.unwrap_or_default(),
                created_at: row.prev_created_at.unwrap_or_default(),
            }),
            _ => None,
        };

        BidView {
            bid: Bid {
                id: row.id,
                auction_id: row.auction_id,
                dealer_id: row.dealer_id.clone(),
                amount: row.amount,
                previous_bid_id: row.previous_bid_id,
                created_at: row.created_at,
            },
            dealer: DealerSummary {
                id: row.dealer_id,
                name: row.dealer_name,
                email: row.dealer_email,
                role: row.dealer_role,
            },
            previous,
        }
    }
}

#[async_trait]
impl BidLedger for SqliteBidLedger {
    async fn head(&self, auction_id: &str) -> Result<Option<Bid>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM bids WHERE auction_id = ? ORDER BY id DESC LIMIT 1",
            BID_COLUMNS
        );

        let bid = sqlx::query_as::<_, Bid>(&query)
            .bind(auction_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(bid)
    }

    async fn winner(&self, auction_id: &str) -> Result<Option<Bid>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM bids WHERE auction_id = ? ORDER BY amount DESC, id LIMIT 1",
            BID_COLUMNS
        );

        let bid = sqlx::query_as::<_, Bid>(&query)
            .bind(auction_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(bid)
    }

    async fn append(
        &self,
        bid: NewBid,
        expected_version: i64,
    ) -> Result<AppendOutcome, DatabaseError> {
        let created_at = current_unix_ms();
        let mut tx = self.db_pool.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO bids (auction_id, dealer_id, amount, previous_bid_id, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(&bid.auction_id)
        .bind(&bid.dealer_id)
        .bind(bid.amount)
        .bind(bid.previous_bid_id)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
        let bid_id = inserted.last_insert_rowid();

        // The cache refresh doubles as the compare-and-swap: it only lands if
        // no other bid was admitted since the caller read the auction.
        let updated = sqlx::query(
            r#"
            UPDATE auctions SET highest_bid = ?, leading_bid_id = ?, version = version + 1
            WHERE id = ? AND version = ?
        "#,
        )
        .bind(bid.amount)
        .bind(bid_id)
        .bind(&bid.auction_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(AppendOutcome::VersionConflict);
        }

        tx.commit().await?;

        Ok(AppendOutcome::Committed(Bid {
            id: bid_id,
            auction_id: bid.auction_id,
            dealer_id: bid.dealer_id,
            amount: bid.amount,
            previous_bid_id: bid.previous_bid_id,
            created_at,
        }))
    }

    async fn detail(&self, bid_id: BidId) -> Result<Option<BidView>, DatabaseError> {
        let query = r#"
            SELECT b.id, b.auction_id, b.dealer_id, b.amount, b.previous_bid_id, b.created_at,
                   a.name AS dealer_name, a.email AS dealer_email, a.role AS dealer_role,
                   p.dealer_id AS prev_dealer_id, p.amount AS prev_amount,
                   p.created_at AS prev_created_at
            FROM bids b
            JOIN actors a ON a.id = b.dealer_id
            LEFT JOIN bids p ON p.id = b.previous_bid_id
            WHERE b.id = ?
        "#;

        let row = sqlx::query_as::<_, BidDetailRow>(query)
            .bind(bid_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(row.map(BidView::from))
    }

    async fn list(&self, auction_id: &str) -> Result<Vec<Bid>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM bids WHERE auction_id = ? ORDER BY id",
            BID_COLUMNS
        );

        let bids = sqlx::query_as::<_, Bid>(&query)
            .bind(auction_id)
            .fetch_all(&self.db_pool.pool)
            .await?;

        Ok(bids)
    }
}
