use async_trait::async_trait;

use crate::db::errors::DatabaseError;
use crate::db::pool::DbPool;
use crate::domain::{Car, CarStore};

pub struct SqliteCarStore {
    db_pool: DbPool,
}

impl SqliteCarStore {
    pub fn new(db_pool: DbPool) -> Self {
        SqliteCarStore { db_pool }
    }
}

#[async_trait]
impl CarStore for SqliteCarStore {
    async fn find_car(&self, car_id: &str) -> Result<Option<Car>, DatabaseError> {
        let query = "SELECT id, make, model, year, price, owner_id, status FROM cars WHERE id = ?";

        let car = sqlx::query_as::<_, Car>(query)
            .bind(car_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(car)
    }

    async fn insert(&self, car: &Car) -> Result<(), DatabaseError> {
        let query = r#"
            INSERT INTO cars (id, make, model, year, price, owner_id, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&car.id)
            .bind(&car.make)
            .bind(&car.model)
            .bind(car.year)
            .bind(car.price)
            .bind(&car.owner_id)
            .bind(car.status)
            .execute(&self.db_pool.pool)
            .await?;

        Ok(())
    }
}
