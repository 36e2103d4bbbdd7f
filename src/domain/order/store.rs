use async_trait::async_trait;
use sea_orm::entity::prelude::DateTime;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, info};

use super::entity::{self, OrderStatus};
use crate::config::establish_connection;
use crate::utils::AppError;

/// 주문 저장소 (읽기 전용)
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// PENDING/PROCESSING orders created before `cutoff`, oldest first
    async fn find_unfinished_created_before(
        &self,
        cutoff: DateTime,
    ) -> Result<Vec<entity::Model>, AppError>;

    /// Close the underlying connection
    async fn release(&self) -> Result<(), AppError>;
}

/// 모니터링 패스마다 저장소 연결을 새로 획득
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn acquire(&self, database_url: &str) -> Result<Box<dyn OrderStore>, AppError>;
}

/// sea-orm 기반 구현체
#[derive(Clone)]
pub struct SeaOrmOrderStore {
    db: DatabaseConnection,
}

impl SeaOrmOrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for SeaOrmOrderStore {
    async fn find_unfinished_created_before(
        &self,
        cutoff: DateTime,
    ) -> Result<Vec<entity::Model>, AppError> {
        let orders = entity::Entity::find()
            .filter(entity::Column::Status.is_in(OrderStatus::UNFINISHED))
            .filter(entity::Column::CreatedAt.lt(cutoff))
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await?;

        debug!(count = orders.len(), cutoff = %cutoff, "Queried unfinished orders");
        Ok(orders)
    }

    async fn release(&self) -> Result<(), AppError> {
        self.db.clone().close().await?;
        info!("Database connection released");
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SeaOrmConnector;

#[async_trait]
impl StoreConnector for SeaOrmConnector {
    async fn acquire(&self, database_url: &str) -> Result<Box<dyn OrderStore>, AppError> {
        let db = establish_connection(database_url).await?;
        Ok(Box::new(SeaOrmOrderStore::new(db)))
    }
}
