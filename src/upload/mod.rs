//! 상품 등록/수정 폼 처리와 이미지 저장

pub mod store;

pub use store::{stored_file_name, ImageStore, MAX_UPLOAD_BYTES};

use axum::extract::multipart::{Multipart, MultipartError};
use std::collections::HashMap;
use thiserror::Error;

/// 이미지 파일 필드 이름
pub const PICTURE_FIELD: &str = "pictureurl";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("uploaded file exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("only one file may be uploaded per request")]
    UnexpectedFile,

    #[error("malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// multipart 폼 (텍스트 필드 + 저장된 이미지 이름)
#[derive(Debug, Default)]
pub struct ItemForm {
    fields: HashMap<String, String>,
    pub picture: Option<String>,
}

impl ItemForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// multipart 요청 읽기
/// pictureurl 필드의 파일은 최대 한 개만 받는다.
pub async fn read_item_form(
    mut multipart: Multipart,
    store: &ImageStore,
) -> Result<ItemForm, UploadError> {
    let mut form = ItemForm::default();
    let mut file_seen = false;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == PICTURE_FIELD && field.file_name().is_some() {
            if file_seen {
                if let Some(stored) = form.picture.take() {
                    store.remove(&stored).await;
                }
                return Err(UploadError::UnexpectedFile);
            }
            file_seen = true;
            let saved = store.save(field).await;
            if let Err(UploadError::TooLarge { .. }) = &saved {
                drain(&mut multipart).await;
            }
            form.picture = saved?;
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

// 남은 본문을 읽어 버려 연결을 재사용할 수 있게 한다 (전체 크기는 DefaultBodyLimit 이 제한)
async fn drain(multipart: &mut Multipart) {
    while let Ok(Some(mut field)) = multipart.next_field().await {
        while let Ok(Some(_)) = field.chunk().await {}
    }
}
