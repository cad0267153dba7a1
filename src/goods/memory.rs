use super::model::{Item, ItemRecord};
use super::{ItemRepository, RepositoryError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// 메모리 상품 저장소 (테스트 및 로컬 실행용)
#[derive(Default)]
pub struct MemoryItemRepository {
    items: Mutex<BTreeMap<i64, Item>>,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let items = self.items.lock().await;
        Ok(items.values().rev().cloned().collect())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Item>, RepositoryError> {
        // PostgreSQL 과 같이 음수 범위는 거부
        if offset < 0 || limit < 0 {
            return Err(RepositoryError::InvalidRange { offset, limit });
        }
        let items = self.items.lock().await;
        Ok(items
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.items.lock().await.len() as i64)
    }

    async fn find(&self, itemid: i64) -> Result<Option<Item>, RepositoryError> {
        Ok(self.items.lock().await.get(&itemid).cloned())
    }

    async fn insert(&self, item: ItemRecord) -> Result<Option<i64>, RepositoryError> {
        let mut items = self.items.lock().await;
        let itemid = items.keys().next_back().map_or(1, |max| max + 1);
        items.insert(itemid, item.into_item(itemid));
        Ok(Some(itemid))
    }

    async fn update(&self, itemid: i64, changes: ItemRecord) -> Result<u64, RepositoryError> {
        let mut items = self.items.lock().await;
        match items.get_mut(&itemid) {
            Some(item) => {
                *item = changes.into_item(itemid);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, itemid: i64) -> Result<u64, RepositoryError> {
        let removed = self.items.lock().await.remove(&itemid);
        Ok(u64::from(removed.is_some()))
    }
}
