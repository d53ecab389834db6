use std::{env, path::PathBuf};

use chrono::{FixedOffset, TimeDelta};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// Directory for the JSON mirrors of users, products and sales. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Offset used for calendar arithmetic in reports (day, week, month boundaries).
    pub utc_offset_minutes: i32,
    pub currency: String,
    pub seed_demo_catalog: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(12);
        let data_dir = Some(
            env::var("POS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        );
        let utc_offset_minutes = match env::var("POS_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw.parse::<i32>()?,
            Err(_) => 0,
        };
        let currency = env::var("POS_CURRENCY").unwrap_or_else(|_| "Tsh.".to_string());
        let seed_demo_catalog = env::var("POS_SEED_DEMO_CATALOG")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let config = Self {
            database_url,
            host,
            port,
            jwt_secret,
            session_ttl_hours,
            data_dir,
            utc_offset_minutes,
            currency,
            seed_demo_catalog,
        };
        config.utc_offset()?;
        Ok(config)
    }

    /// In-memory configuration with the demo catalog and a throwaway secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            session_ttl_hours: 1,
            data_dir: None,
            utc_offset_minutes: 0,
            currency: "Tsh.".to_string(),
            seed_demo_catalog: true,
        }
    }

    /// How long a login session and its token stay valid.
    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::try_hours(self.session_ttl_hours).unwrap_or(TimeDelta::MAX)
    }

    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!(
                "POS_UTC_OFFSET_MINUTES out of range: {}",
                self.utc_offset_minutes
            )
        })
    }
}
