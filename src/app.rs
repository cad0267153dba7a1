// region:    --- Imports
use crate::goods::Catalog;
use crate::handlers;
use crate::upload::{ImageStore, MAX_UPLOAD_BYTES};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, get_service, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

// endregion: --- Imports

/// 이미지 외 폼 필드를 위한 여유 크기
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub images: Arc<ImageStore>,
}

/// 라우터 설정
/// public_dir 은 정적 파일 루트 (업로드 이미지는 public_dir/img)
pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get_service(ServeFile::new(public_dir.join("index.html"))),
        )
        .route("/item/all", get(handlers::handle_all))
        .route("/item/list", get(handlers::handle_list))
        .route("/item/detail", get(handlers::handle_detail))
        .route("/item/date", get(handlers::handle_date))
        .route(
            "/item/insert",
            get_service(ServeFile::new(public_dir.join("insert.html")))
                .post(handlers::handle_insert),
        )
        .route(
            "/item/update",
            get_service(ServeFile::new(public_dir.join("update.html")))
                .post(handlers::handle_update),
        )
        .route("/item/delete", post(handlers::handle_delete))
        .route("/img/:fileid", get(handlers::handle_image))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
