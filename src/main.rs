// region:    --- Imports
use goods_service::app::{build_router, AppState};
use goods_service::config::Config;
use goods_service::database::DatabaseManager;
use goods_service::goods::postgres::PostgresItemRepository;
use goods_service::goods::Catalog;
use goods_service::tracker::UpdateTracker;
use goods_service::upload::ImageStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
// endregion: --- Imports

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화 (RUST_LOG 가 없으면 info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // 설정 읽기
    let config = Config::from_env()?;
    if config.cookie_secret.is_none() {
        warn!("{:<12} --> COOKIE_SECRET 이 설정되지 않았습니다", "Main");
    }

    // DatabaseManager 생성
    let db_manager = Arc::new(
        DatabaseManager::connect(config.database.connect_options()?, config.connect_retries)
            .await?,
    );

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 연결 상태 감시
    db_manager.spawn_health_check(HEALTH_CHECK_INTERVAL);

    // 이미지 디렉토리 준비
    let images = Arc::new(ImageStore::open(config.image_dir()).await?);

    let repository = Arc::new(PostgresItemRepository::new(Arc::clone(&db_manager)));
    let tracker = Arc::new(UpdateTracker::new(&config.update_file));
    let state = AppState {
        catalog: Catalog::new(repository, tracker),
        images,
    };

    // 라우터 설정
    let routes_all = build_router(state, &config.public_dir);

    // 리스너 생성
    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    info!("{:<12} --> Server shutdown complete", "Main");
    Ok(())
}
// endregion: --- Main

/// Ctrl+C 또는 SIGTERM 대기
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("{:<12} --> Ctrl+C 핸들러 설치 실패: {}", "Main", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("{:<12} --> SIGTERM 핸들러 설치 실패: {}", "Main", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
