use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::db::errors::DatabaseError;
use crate::db::pool::DbPool;
use crate::domain::{Amount, Auction, AuctionFilter, AuctionRepository, AuctionStatus, UnixMillis};

const AUCTION_COLUMNS: &str = "id, car_id, starting_price, start_time, end_time, status, \
     highest_bid, leading_bid_id, version, created_at";

pub struct SqliteAuctionRepository {
    db_pool: DbPool,
}

impl SqliteAuctionRepository {
    pub fn new(db_pool: DbPool) -> Self {
        SqliteAuctionRepository { db_pool }
    }
}

#[async_trait]
impl AuctionRepository for SqliteAuctionRepository {
    async fn create(&self, auction: &Auction) -> Result<(), DatabaseError> {
        let query = r#"
            INSERT INTO auctions (id, car_id, starting_price, start_time, end_time, status,
                                  highest_bid, leading_bid_id, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&auction.id)
            .bind(&auction.car_id)
            .bind(auction.starting_price)
            .bind(auction.start_time)
            .bind(auction.end_time)
            .bind(auction.status)
            .bind(auction.highest_bid)
            .bind(auction.leading_bid_id)
            .bind(auction.version)
            .bind(auction.created_at)
            .execute(&self.db_pool.pool)
            .await?;

        Ok(())
    }

    async fn get(&self, auction_id: &str) -> Result<Option<Auction>, DatabaseError> {
        let query = format!("SELECT {} FROM auctions WHERE id = ?", AUCTION_COLUMNS);

        let auction = sqlx::query_as::<_, Auction>(&query)
            .bind(auction_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(auction)
    }

    async fn list(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, DatabaseError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM auctions WHERE 1 = 1",
            AUCTION_COLUMNS
        ));

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(car_id) = &filter.car_id {
            builder.push(" AND car_id = ").push_bind(car_id.clone());
        }
        if let Some(min_price) = filter.min_price {
            builder.push(" AND starting_price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            builder.push(" AND starting_price <= ").push_bind(max_price);
        }
        builder.push(" ORDER BY created_at");

        let auctions = builder
            .build_query_as::<Auction>()
            .fetch_all(&self.db_pool.pool)
            .await?;

        Ok(auctions)
    }

    async fn find_live_for_car(&self, car_id: &str) -> Result<Option<Auction>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM auctions
             WHERE car_id = ? AND status IN ('draft', 'upcoming', 'active')
             LIMIT 1",
            AUCTION_COLUMNS
        );

        let auction = sqlx::query_as::<_, Auction>(&query)
            .bind(car_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(auction)
    }

    async fn set_status(
        &self,
        auction_id: &str,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE auctions SET status = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(auction_id)
            .bind(from)
            .execute(&self.db_pool.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_draft(
        &self,
        auction_id: &str,
        starting_price: Amount,
        start_time: UnixMillis,
        end_time: UnixMillis,
    ) -> Result<bool, DatabaseError> {
        let query = r#"
            UPDATE auctions SET starting_price = ?, start_time = ?, end_time = ?
            WHERE id = ? AND status = 'draft'
        "#;

        let result = sqlx::query(query)
            .bind(starting_price)
            .bind(start_time)
            .bind(end_time)
            .bind(auction_id)
            .execute(&self.db_pool.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::repositories::car::SqliteCarStore;
    use crate::domain::{Car, CarStatus, CarStore};

    async fn setup_test_db() -> DbPool {
        DbPool::new_in_memory()
            .await
            .expect("failed to set up in-memory database")
    }

    async fn seed_car(db_pool: &DbPool, car_id: &str) {
        let cars = SqliteCarStore::new(db_pool.clone());
        cars.insert(&Car {
            id: car_id.to_string(),
            make: "Toyota".to_string(),
            model: "Supra".to_string(),
            year: 1998,
            price: 45_000,
            owner_id: "owner-1".to_string(),
            status: CarStatus::Available,
        })
        .await
        .expect("failed to seed car");
    }

    fn draft_auction(car_id: &str, created_at: i64) -> Auction {
        Auction::new(car_id.to_string(), 20_000, 1_000, 6_000, created_at)
    }

    #[tokio::test]
    async fn test_create_and_get_auction() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        let auction = draft_auction("car-1", 1);
        repo.create(&auction).await?;

        let fetched = repo.get(&auction.id).await?;
        assert_eq!(fetched, Some(auction));

        let missing = repo.get("no-such-auction").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_second_live_auction_for_car_is_rejected() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        repo.create(&draft_auction("car-1", 1)).await?;

        let result = repo.create(&draft_auction("car-1", 2)).await;
        match result {
            Err(DatabaseError::UniqueViolation(msg)) => {
                assert!(msg.contains("UNIQUE constraint failed"));
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_ended_auction_frees_the_car() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        let first = draft_auction("car-1", 1);
        repo.create(&first).await?;
        repo.set_status(&first.id, AuctionStatus::Draft, AuctionStatus::Cancelled)
            .await?;

        // The partial unique index only covers live statuses.
        repo.create(&draft_auction("car-1", 2)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_set_status_is_a_compare_and_swap() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        let auction = draft_auction("car-1", 1);
        repo.create(&auction).await?;

        let flipped = repo
            .set_status(&auction.id, AuctionStatus::Draft, AuctionStatus::Active)
            .await?;
        assert!(flipped);

        // Second identical transition observes the wrong source status.
        let flipped_again = repo
            .set_status(&auction.id, AuctionStatus::Draft, AuctionStatus::Active)
            .await?;
        assert!(!flipped_again);

        let fetched = repo.get(&auction.id).await?.unwrap();
        assert_eq!(fetched.status, AuctionStatus::Active);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_draft_only_touches_drafts() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        let auction = draft_auction("car-1", 1);
        repo.create(&auction).await?;

        let updated = repo.update_draft(&auction.id, 25_000, 2_000, 7_000).await?;
        assert!(updated);
        let fetched = repo.get(&auction.id).await?.unwrap();
        assert_eq!(fetched.starting_price, 25_000);
        assert_eq!(fetched.start_time, 2_000);
        assert_eq!(fetched.end_time, 7_000);

        repo.set_status(&auction.id, AuctionStatus::Draft, AuctionStatus::Active)
            .await?;
        let updated = repo.update_draft(&auction.id, 30_000, 3_000, 8_000).await?;
        assert!(!updated);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_with_filters() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        seed_car(&db_pool, "car-2").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        let cheap = Auction::new("car-1".to_string(), 5_000, 1_000, 6_000, 1);
        let pricey = Auction::new("car-2".to_string(), 50_000, 1_000, 6_000, 2);
        repo.create(&cheap).await?;
        repo.create(&pricey).await?;
        repo.set_status(&pricey.id, AuctionStatus::Draft, AuctionStatus::Active)
            .await?;

        let all = repo.list(&AuctionFilter::default()).await?;
        assert_eq!(all.len(), 2);

        let drafts = repo
            .list(&AuctionFilter {
                status: Some(AuctionStatus::Draft),
                ..Default::default()
            })
            .await?;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, cheap.id);

        let by_car = repo
            .list(&AuctionFilter {
                car_id: Some("car-2".to_string()),
                ..Default::default()
            })
            .await?;
        assert_eq!(by_car.len(), 1);
        assert_eq!(by_car[0].id, pricey.id);

        let mid_range = repo
            .list(&AuctionFilter {
                min_price: Some(10_000),
                max_price: Some(60_000),
                ..Default::default()
            })
            .await?;
        assert_eq!(mid_range.len(), 1);
        assert_eq!(mid_range[0].id, pricey.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_live_for_car_ignores_terminal() -> Result<(), DatabaseError> {
        let db_pool = setup_test_db().await;
        seed_car(&db_pool, "car-1").await;
        let repo = SqliteAuctionRepository::new(db_pool.clone());

        assert!(repo.find_live_for_car("car-1").await?.is_none());

        let auction = draft_auction("car-1", 1);
        repo.create(&auction).await?;
        assert!(repo.find_live_for_car("car-1").await?.is_some());

        repo.set_status(&auction.id, AuctionStatus::Draft, AuctionStatus::Cancelled)
            .await?;
        assert!(repo.find_live_for_car("car-1").await?.is_none());

        Ok(())
    }
}
