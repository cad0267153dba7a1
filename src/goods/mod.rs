//! 상품(goods) 카탈로그: 저장소 트레이트와 구현체, 카탈로그 서비스

pub mod catalog;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod queries;

pub use catalog::{Catalog, Pagination};
pub use model::{Item, ItemInput, ItemList, ItemRecord, DEFAULT_PICTURE};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid page range: offset {offset}, limit {limit}")]
    InvalidRange { offset: i64, limit: i64 },
}

/// 상품 저장소
/// update / delete 는 영향받은 행 수를, insert 는 한 행이 등록된 경우 부여된 itemid 를 돌려준다.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Item>, RepositoryError>;
    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Item>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
    async fn find(&self, itemid: i64) -> Result<Option<Item>, RepositoryError>;
    async fn insert(&self, item: ItemRecord) -> Result<Option<i64>, RepositoryError>;
    async fn update(&self, itemid: i64, changes: ItemRecord) -> Result<u64, RepositoryError>;
    async fn delete(&self, itemid: i64) -> Result<u64, RepositoryError>;
}
