// region:    --- Imports
use super::UploadError;
use axum::extract::multipart::Field;
use chrono::Utc;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

/// 파일 하나의 최대 크기 (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 저장 파일 이름: <원본 이름><epoch 밀리초>-<임의 8자리><원본 확장자>
/// 클라이언트가 보낸 경로는 버리고 마지막 구성 요소만 쓴다.
pub fn stored_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original);
    let path = Path::new(base);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("upload");
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let unique = Uuid::new_v4().simple().to_string();

    format!(
        "{}{}-{}{}",
        stem,
        Utc::now().timestamp_millis(),
        &unique[..8],
        ext
    )
}

// region:    --- Image Store
/// 업로드 이미지 저장소 (정적 루트 아래 img 디렉토리)
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// 저장소 열기 (디렉토리가 없으면 생성)
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        if tokio::fs::metadata(&dir).await.is_err() {
            info!(
                "{:<12} --> 이미지 디렉토리 생성: {}",
                "Upload",
                dir.display()
            );
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 업로드 파일 저장
    /// 파일 이름이 없거나 내용이 비어 있으면 None (업로드 없음으로 처리)
    pub async fn save(&self, mut field: Field<'_>) -> Result<Option<String>, UploadError> {
        let original = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Ok(None),
        };
        let stored = stored_file_name(&original);
        let path = self.dir.join(&stored);

        let mut file = File::create(&path).await?;
        let mut written = 0usize;
        let result = async {
            while let Some(chunk) = field.chunk().await? {
                written += chunk.len();
                if written > MAX_UPLOAD_BYTES {
                    return Err(UploadError::TooLarge {
                        limit: MAX_UPLOAD_BYTES,
                    });
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<(), UploadError>(())
        }
        .await;
        drop(file);

        match result {
            Ok(()) if written == 0 => {
                self.remove(&stored).await;
                Ok(None)
            }
            Ok(()) => {
                info!(
                    "{:<12} --> 파일 저장: {} -> {} ({} bytes)",
                    "Upload", original, stored, written
                );
                Ok(Some(stored))
            }
            Err(e) => {
                warn!("{:<12} --> 파일 저장 실패: {}: {}", "Upload", original, e);
                self.remove(&stored).await;
                Err(e)
            }
        }
    }

    /// 저장된 파일 삭제 (실패는 무시)
    pub async fn remove(&self, stored: &str) {
        if let Some(path) = self.image_path(stored) {
            let _ = tokio::fs::remove_file(path).await;
        }
    }

    /// 파일 이름을 저장소 경로로 변환
    /// 단일 일반 이름만 허용한다 ("..", 하위 경로 등은 None).
    pub fn image_path(&self, fileid: &str) -> Option<PathBuf> {
        let mut components = Path::new(fileid).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.dir.join(name)),
            _ => None,
        }
    }

    /// 다운로드용 파일 열기 (없으면 None)
    pub async fn open_image(&self, fileid: &str) -> io::Result<Option<(File, u64)>> {
        let Some(path) = self.image_path(fileid) else {
            return Ok(None);
        };
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }
        Ok(Some((file, metadata.len())))
    }
}
// endregion: --- Image Store

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_stored_name_keeps_stem_and_extension() {
        let name = stored_file_name("photo.png");
        assert!(name.starts_with("photo"));
        assert!(name.ends_with(".png"));

        let middle = &name["photo".len()..name.len() - ".png".len()];
        let (millis, random) = middle.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(random.len(), 8);
    }

    #[test]
    fn test_stored_name_is_unique() {
        assert_ne!(stored_file_name("a.jpg"), stored_file_name("a.jpg"));
    }

    #[test]
    fn test_stored_name_drops_client_paths() {
        let name = stored_file_name("../../etc/passwd.txt");
        assert!(name.starts_with("passwd"));
        assert!(!name.contains('/'));

        let name = stored_file_name("C:\\Users\\me\\cat.jpeg");
        assert!(name.starts_with("cat"));
        assert!(name.ends_with(".jpeg"));

        let name = stored_file_name("README");
        assert!(name.starts_with("README"));
        assert!(!name.contains('.'));
    }

    #[tokio::test]
    async fn test_image_path_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("img")).await.unwrap();

        assert!(store.image_path("cat.png").is_some());
        assert!(store.image_path("..").is_none());
        assert!(store.image_path("../update.txt").is_none());
        assert!(store.image_path("/etc/passwd").is_none());
        assert!(store.image_path("").is_none());
    }

    #[tokio::test]
    async fn test_open_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("img")).await.unwrap();
        assert!(store.dir().is_dir());

        tokio::fs::write(store.dir().join("dog.gif"), b"GIF89a")
            .await
            .unwrap();
        let (mut file, len) = store.open_image("dog.gif").await.unwrap().unwrap();
        assert_eq!(len, 6);
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes, b"GIF89a");

        assert!(store.open_image("missing.gif").await.unwrap().is_none());
    }
}
