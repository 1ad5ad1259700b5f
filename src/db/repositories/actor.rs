use async_trait::async_trait;

use crate::db::errors::DatabaseError;
use crate::db::pool::DbPool;
use crate::domain::{Actor, ActorStore};

pub struct SqliteActorStore {
    db_pool: DbPool,
}

impl SqliteActorStore {
    pub fn new(db_pool: DbPool) -> Self {
        SqliteActorStore { db_pool }
    }
}

#[async_trait]
impl ActorStore for SqliteActorStore {
    async fn find_actor(&self, actor_id: &str) -> Result<Option<Actor>, DatabaseError> {
        let query = "SELECT id, name, email, role FROM actors WHERE id = ?";

        let actor = sqlx::query_as::<_, Actor>(query)
            .bind(actor_id)
            .fetch_optional(&self.db_pool.pool)
            .await?;

        Ok(actor)
    }

    async fn insert(&self, actor: &Actor) -> Result<(), DatabaseError> {
        let query = "INSERT INTO actors (id, name, email, role) VALUES (?, ?, ?, ?)";

        sqlx::query(query)
            .bind(&actor.id)
            .bind(&actor.name)
            .bind(&actor.email)
            .bind(actor.role)
            .execute(&self.db_pool.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActorRole;

    #[tokio::test]
    async fn test_insert_and_find_actor() {
        let db_pool = DbPool::new_in_memory().await.unwrap();
        let store = SqliteActorStore::new(db_pool);

        let actor = Actor {
            id: "dealer-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@dealers.example".to_string(),
            role: ActorRole::Dealer,
        };
        store.insert(&actor).await.unwrap();

        let fetched = store.find_actor("dealer-1").await.unwrap();
        assert_eq!(fetched, Some(actor));
        assert!(store.find_actor("nobody").await.unwrap().is_none());
    }
}
