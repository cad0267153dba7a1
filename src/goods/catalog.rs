// region:    --- Imports
use super::model::{Item, ItemInput, ItemList};
use super::{ItemRepository, RepositoryError};
use crate::tracker::UpdateTracker;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Pagination
/// 페이지 요청 (pageno 는 1부터)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub pageno: i64,
    pub size: i64,
}

impl Pagination {
    pub const DEFAULT_SIZE: i64 = 5;

    /// 쿼리 문자열 값으로부터 생성 (없거나 숫자가 아니면 기본값)
    /// 범위 검사는 하지 않는다. 음수 offset/limit 은 저장소가 거부한다.
    pub fn from_query(pageno: Option<&str>, count: Option<&str>) -> Self {
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<i64>().ok());
        Self {
            pageno: parse(pageno).unwrap_or(1),
            size: parse(count).unwrap_or(Self::DEFAULT_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.pageno.saturating_sub(1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            pageno: 1,
            size: Self::DEFAULT_SIZE,
        }
    }
}
// endregion: --- Pagination

// region:    --- Catalog
/// 상품 카탈로그 서비스
/// 변경 작업이 정확히 한 행에 반영되면 변경 시각을 기록한다.
#[derive(Clone)]
pub struct Catalog {
    repository: Arc<dyn ItemRepository>,
    tracker: Arc<UpdateTracker>,
}

impl Catalog {
    pub fn new(repository: Arc<dyn ItemRepository>, tracker: Arc<UpdateTracker>) -> Self {
        Self {
            repository,
            tracker,
        }
    }

    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// 전체 상품 조회
    pub async fn list_all(&self) -> Result<ItemList, RepositoryError> {
        let list = self.repository.list_all().await?;
        let count = self.repository.count().await?;
        Ok(ItemList { count, list })
    }

    /// 페이지 조회 (count 는 전체 개수)
    pub async fn list_page(&self, page: Pagination) -> Result<ItemList, RepositoryError> {
        let list = self
            .repository
            .list_page(page.offset(), page.limit())
            .await?;
        let count = self.repository.count().await?;
        Ok(ItemList { count, list })
    }

    pub async fn detail(&self, itemid: i64) -> Result<Option<Item>, RepositoryError> {
        self.repository.find(itemid).await
    }

    /// 상품 등록
    pub async fn insert(&self, input: ItemInput) -> Result<bool, RepositoryError> {
        let now = Local::now().naive_local();
        match self.repository.insert(input.stamped(now.date())).await? {
            Some(itemid) => {
                info!("{:<12} --> 상품 등록 완료 id: {}", "Catalog", itemid);
                self.mark_updated(now).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 상품 수정
    pub async fn update(&self, itemid: i64, input: ItemInput) -> Result<bool, RepositoryError> {
        let now = Local::now().naive_local();
        let affected = self.repository.update(itemid, input.stamped(now.date())).await?;
        self.finish_mutation(affected, now).await
    }

    /// 상품 삭제
    pub async fn delete(&self, itemid: i64) -> Result<bool, RepositoryError> {
        let now = Local::now().naive_local();
        let affected = self.repository.delete(itemid).await?;
        self.finish_mutation(affected, now).await
    }

    async fn finish_mutation(&self, affected: u64, now: NaiveDateTime) -> Result<bool, RepositoryError> {
        if affected == 1 {
            self.mark_updated(now).await;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // 변경은 이미 커밋되었으므로 기록 실패는 로그만 남긴다
    async fn mark_updated(&self, now: NaiveDateTime) {
        if let Err(e) = self.tracker.record(now).await {
            error!(
                "{:<12} --> 변경 시각 기록 실패 ({}): {}",
                "Catalog",
                self.tracker.path().display(),
                e
            );
        }
    }
}
// endregion: --- Catalog

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::memory::MemoryItemRepository;
    use crate::goods::DEFAULT_PICTURE;

    fn input(name: &str) -> ItemInput {
        ItemInput {
            itemname: name.to_string(),
            description: Some("desc".to_string()),
            price: 3000.0,
            pictureurl: DEFAULT_PICTURE.to_string(),
        }
    }

    fn catalog(dir: &tempfile::TempDir) -> Catalog {
        Catalog::new(
            Arc::new(MemoryItemRepository::new()),
            Arc::new(UpdateTracker::new(dir.path().join("update.txt"))),
        )
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::from_query(None, None), Pagination::default());
        assert_eq!(
            Pagination::from_query(Some("abc"), Some("x")),
            Pagination::default()
        );
        let page = Pagination::from_query(Some("3"), Some("10"));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_pagination_passes_negative_values_through() {
        let page = Pagination::from_query(Some("0"), Some("5"));
        assert_eq!(page.offset(), -5);
        let page = Pagination::from_query(Some("2"), Some("-1"));
        assert_eq!(page.limit(), -1);
    }

    #[tokio::test]
    async fn test_list_page_reports_total_count() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(&dir);
        for i in 1..=12 {
            assert!(catalog.insert(input(&format!("item {}", i))).await.unwrap());
        }

        let page = catalog
            .list_page(Pagination::from_query(Some("2"), Some("5")))
            .await
            .unwrap();
        assert_eq!(page.count, 12);
        let ids: Vec<i64> = page.list.iter().map(|item| item.itemid).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_touch_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(&dir);

        assert!(!catalog.delete(99).await.unwrap());
        assert!(!catalog.update(99, input("none")).await.unwrap());
        assert!(catalog.tracker().read().await.is_err());

        assert!(catalog.insert(input("first")).await.unwrap());
        let stamp = catalog.tracker().read().await.unwrap();
        assert_eq!(stamp.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[tokio::test]
    async fn test_update_stamps_current_date() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(&dir);
        catalog.insert(input("before")).await.unwrap();

        let mut changed = input("after");
        changed.pictureurl = "new.png".to_string();
        assert!(catalog.update(1, changed).await.unwrap());

        let item = catalog.detail(1).await.unwrap().unwrap();
        assert_eq!(item.itemname, "after");
        assert_eq!(item.pictureurl, "new.png");
        assert_eq!(item.updatedate, Local::now().date_naive());
    }
}
