// region:    --- Imports
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::{error, info, warn};

// endregion: --- Imports

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// 재시도 횟수에 따른 대기 시간 (500ms 부터 두 배씩, 최대 30초)
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    BACKOFF_BASE.saturating_mul(factor).min(BACKOFF_MAX)
}

// region:    --- Database Manager
pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 연결 (실패 시 백오프 후 재시도)
    pub async fn connect(options: PgConnectOptions, max_attempts: u32) -> Result<Self, sqlx::Error> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .test_before_acquire(true)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => {
                    info!("{:<12} --> 데이터베이스 연결 성공 (시도 {})", "Database", attempt);
                    return Ok(Self::from_pool(pool));
                }
                Err(e) if attempt < max_attempts => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "{:<12} --> 데이터베이스 연결 실패 (시도 {}/{}), {:?} 후 재시도: {}",
                        "Database", attempt, max_attempts, delay, e
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!("{:<12} --> 데이터베이스 연결 포기: {}", "Database", e);
                    return Err(e);
                }
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// 데이터베이스 풀 가져오기
    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// 데이터베이스 초기화 (goods 테이블이 없으면 생성)
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }

    /// 연결 상태 주기적 확인
    /// 끊긴 연결은 풀이 다음 acquire 시 새로 연결하고, 실패가 이어지면 백오프한다.
    pub fn spawn_health_check(&self, every: Duration) -> JoinHandle<()> {
        let pool = self.get_pool();
        tokio::spawn(async move {
            let mut ticker = interval(every);
            let mut failures = 0;
            loop {
                ticker.tick().await;
                match sqlx::query("SELECT 1").execute(&*pool).await {
                    Ok(_) => {
                        if failures > 0 {
                            info!("{:<12} --> 데이터베이스 연결 복구", "HealthCheck");
                        }
                        failures = 0;
                    }
                    Err(e) => {
                        failures += 1;
                        let delay = backoff_delay(failures);
                        warn!(
                            "{:<12} --> 데이터베이스 응답 없음 ({}회), {:?} 후 재확인: {}",
                            "HealthCheck", failures, delay, e
                        );
                        sleep(delay).await;
                    }
                }
            }
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
// endregion: --- Database Manager
