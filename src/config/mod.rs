// region:    --- Imports
use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(#[from] sqlx::Error),
}
// endregion: --- Config Error

// region:    --- Config
/// 데이터베이스 접속 정보
#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl DatabaseConfig {
    /// sqlx 접속 옵션으로 변환
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            DatabaseConfig::Url(url) => Ok(PgConnectOptions::from_str(url)?),
            DatabaseConfig::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

/// 서버 설정 (환경 변수 기반)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    pub cookie_secret: Option<String>,
    pub public_dir: PathBuf,
    pub update_file: PathBuf,
    pub connect_retries: u32,
}

impl Config {
    /// .env 파일과 환경 변수에서 설정 읽기
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 생성
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => DatabaseConfig::Parts {
                host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(&lookup, "DB_PORT", 5432)?,
                user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                database: lookup("DB_NAME").unwrap_or_else(|| "goods".to_string()),
            },
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database,
            cookie_secret: lookup("COOKIE_SECRET"),
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            update_file: lookup("UPDATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("update.txt")),
            connect_retries: parse_or(&lookup, "DB_CONNECT_RETRIES", 5)?,
        })
    }

    /// 리스너 주소
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// 업로드 이미지 디렉토리
    pub fn image_dir(&self) -> PathBuf {
        self.public_dir.join("img")
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
// endregion: --- Config

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.image_dir(), PathBuf::from("public").join("img"));
        assert_eq!(config.update_file, PathBuf::from("update.txt"));
        assert_eq!(config.connect_retries, 5);
        assert!(config.cookie_secret.is_none());
        assert!(matches!(
            config.database,
            DatabaseConfig::Parts { port: 5432, .. }
        ));
    }

    #[test]
    fn database_url_takes_precedence() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://u:p@db:5433/shop"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();
        assert!(matches!(config.database, DatabaseConfig::Url(_)));
        assert!(config.database.connect_options().is_ok());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }
}
