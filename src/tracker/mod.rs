//! 마지막 변경 시각 기록기
//! 상품 등록/수정/삭제가 성공할 때마다 파일 하나에 시각을 덮어쓴다.
// region:    --- Imports
use chrono::NaiveDateTime;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

// endregion: --- Imports

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// region:    --- Update Tracker
pub struct UpdateTracker {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UpdateTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 변경 시각 기록
    /// 임시 파일에 쓴 뒤 rename 으로 교체하므로 읽는 쪽은 항상 완전한 값을 본다.
    pub async fn record(&self, now: NaiveDateTime) -> io::Result<()> {
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        let _guard = self.write_lock.lock().await;

        let temp = self.temp_path();
        tokio::fs::write(&temp, stamp.as_bytes()).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!("{:<12} --> 변경 시각 기록: {}", "Tracker", stamp);
        Ok(())
    }

    /// 마지막 변경 시각 읽기 (파일이 없으면 에러)
    pub async fn read(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "update.txt".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
// endregion: --- Update Tracker

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_overwrites_with_padded_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = UpdateTracker::new(dir.path().join("update.txt"));

        tracker.record(at(9, 5, 3)).await.unwrap();
        assert_eq!(tracker.read().await.unwrap(), "2024-03-07 09:05:03");

        tracker.record(at(23, 59, 59)).await.unwrap();
        assert_eq!(tracker.read().await.unwrap(), "2024-03-07 23:59:59");
        assert!(!dir.path().join("update.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = UpdateTracker::new(dir.path().join("update.txt"));
        let err = tracker.read().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_records_leave_a_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = std::sync::Arc::new(UpdateTracker::new(dir.path().join("update.txt")));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let tracker = std::sync::Arc::clone(&tracker);
                tokio::spawn(async move { tracker.record(at(10, i, 0)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let value = tracker.read().await.unwrap();
        assert_eq!(value.len(), "2024-03-07 10:00:00".len());
        assert!(value.starts_with("2024-03-07 10:"));
    }
}
