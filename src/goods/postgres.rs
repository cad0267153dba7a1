// region:    --- Imports
use super::model::{Item, ItemRecord};
use super::{queries, ItemRepository, RepositoryError};
use crate::database::DatabaseManager;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Postgres Repository
pub struct PostgresItemRepository {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresItemRepository {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    /// 전체 상품 조회
    async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        info!("{:<12} --> 전체 상품 조회", "Query");
        let items = sqlx::query_as::<_, Item>(queries::GET_ALL_ITEMS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(items)
    }

    /// 페이지 조회
    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Item>, RepositoryError> {
        info!(
            "{:<12} --> 페이지 조회 offset: {}, limit: {}",
            "Query", offset, limit
        );
        let items = sqlx::query_as::<_, Item>(queries::GET_ITEM_PAGE)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(items)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(queries::COUNT_ITEMS)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(count)
    }

    /// 상품 상세 조회
    async fn find(&self, itemid: i64) -> Result<Option<Item>, RepositoryError> {
        info!("{:<12} --> 상품 상세 조회 id: {}", "Query", itemid);
        let item = sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(itemid)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(item)
    }

    /// 상품 등록
    /// 테이블 잠금 후 max(itemid) + 1 을 읽고 같은 트랜잭션에서 등록한다.
    async fn insert(&self, item: ItemRecord) -> Result<Option<i64>, RepositoryError> {
        info!("{:<12} --> 상품 등록: {}", "Command", item.itemname);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(queries::LOCK_GOODS).execute(&mut **tx).await?;

                    let itemid = sqlx::query_scalar::<_, i64>(queries::NEXT_ITEM_ID)
                        .fetch_one(&mut **tx)
                        .await?;

                    let result = sqlx::query(queries::INSERT_ITEM)
                        .bind(itemid)
                        .bind(&item.itemname)
                        .bind(item.price)
                        .bind(&item.description)
                        .bind(&item.pictureurl)
                        .bind(item.updatedate)
                        .execute(&mut **tx)
                        .await?;

                    Ok::<_, RepositoryError>((result.rows_affected() == 1).then_some(itemid))
                })
            })
            .await
    }

    /// 상품 수정
    async fn update(&self, itemid: i64, changes: ItemRecord) -> Result<u64, RepositoryError> {
        info!("{:<12} --> 상품 수정 id: {}", "Command", itemid);
        let result = sqlx::query(queries::UPDATE_ITEM)
            .bind(&changes.itemname)
            .bind(changes.price)
            .bind(&changes.description)
            .bind(&changes.pictureurl)
            .bind(changes.updatedate)
            .bind(itemid)
            .execute(self.db_manager.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// 상품 삭제 (이미지 파일은 남겨둔다)
    async fn delete(&self, itemid: i64) -> Result<u64, RepositoryError> {
        info!("{:<12} --> 상품 삭제 id: {}", "Command", itemid);
        let result = sqlx::query(queries::DELETE_ITEM)
            .bind(itemid)
            .execute(self.db_manager.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
// endregion: --- Postgres Repository

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::DEFAULT_PICTURE;
    use chrono::NaiveDate;
    use sqlx::postgres::PgConnectOptions;

    // DATABASE_URL=postgres://... cargo test -- --ignored

    async fn setup() -> PostgresItemRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options: PgConnectOptions = url.parse().expect("invalid DATABASE_URL");
        let db_manager = DatabaseManager::connect(options, 1).await.expect("connect failed");
        db_manager.initialize_database().await.expect("schema failed");
        sqlx::query("DELETE FROM goods")
            .execute(db_manager.pool())
            .await
            .expect("cleanup failed");
        PostgresItemRepository::new(Arc::new(db_manager))
    }

    fn new_item(name: &str) -> ItemRecord {
        ItemRecord {
            itemname: name.to_string(),
            description: Some("설명".to_string()),
            price: 1500.0,
            pictureurl: DEFAULT_PICTURE.to_string(),
            updatedate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_assigns_max_plus_one() {
        let repo = setup().await;

        assert_eq!(repo.insert(new_item("사과")).await.unwrap(), Some(1));
        assert_eq!(repo.insert(new_item("배")).await.unwrap(), Some(2));
        assert_eq!(repo.delete(1).await.unwrap(), 1);
        assert_eq!(repo.insert(new_item("감")).await.unwrap(), Some(3));

        let item = repo.find(3).await.unwrap().expect("item 3 exists");
        assert_eq!(item.itemname, "감");
        assert_eq!(item.updatedate, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(repo.find(1).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn page_is_ordered_by_itemid_desc() {
        let repo = setup().await;
        for i in 1..=12 {
            repo.insert(new_item(&format!("상품 {}", i))).await.unwrap();
        }

        let page = repo.list_page(5, 5).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|item| item.itemid).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert_eq!(repo.count().await.unwrap(), 12);
        assert!(repo.list_page(-5, 5).await.is_err());
    }
}
