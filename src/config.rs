use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::env;

/// Working hours used to derive daily timesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSchedule {
    pub morning_start: NaiveTime,
    pub lunch_start: NaiveTime,
    pub lunch_end: NaiveTime,
    pub afternoon_end: NaiveTime,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            morning_start: hm(8, 30),
            lunch_start: hm(12, 0),
            lunch_end: hm(13, 0),
            afternoon_end: hm(17, 30),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origin: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub notification_stream_timeout_secs: u64,
    pub notification_buffer: usize,
    pub template_cache_ttl_secs: u64,
    pub work_schedule: WorkSchedule,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let defaults = WorkSchedule::default();

        let work_schedule = WorkSchedule {
            morning_start: time_var("WORK_MORNING_START", defaults.morning_start)?,
            lunch_start: time_var("WORK_LUNCH_START", defaults.lunch_start)?,
            lunch_end: time_var("WORK_LUNCH_END", defaults.lunch_end)?,
            afternoon_end: time_var("WORK_AFTERNOON_END", defaults.afternoon_end)?,
        };

        if !(work_schedule.morning_start < work_schedule.lunch_start
            && work_schedule.lunch_start <= work_schedule.lunch_end
            && work_schedule.lunch_end < work_schedule.afternoon_end)
        {
            anyhow::bail!("Work schedule times must be in increasing order");
        }

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://hrms.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            jwt_expiration_days: env::var("JWT_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()
                .unwrap_or(10 * 1024 * 1024),
            notification_stream_timeout_secs: env::var("NOTIFICATION_STREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800),
            notification_buffer: env::var("NOTIFICATION_BUFFER")
                .unwrap_or_else(|_| "32".to_string())
                .parse()
                .unwrap_or(32),
            template_cache_ttl_secs: env::var("TEMPLATE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            work_schedule,
        })
    }

    /// Fixed configuration for tests; the database lives wherever the caller points it.
    pub fn test_config() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            upload_dir: env::temp_dir().join("hrms-test-uploads").display().to_string(),
            max_upload_bytes: 1024 * 1024,
            notification_stream_timeout_secs: 5,
            notification_buffer: 8,
            template_cache_ttl_secs: 60,
            work_schedule: WorkSchedule::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn time_var(name: &str, default: NaiveTime) -> Result<NaiveTime> {
    match env::var(name) {
        Ok(value) => NaiveTime::parse_from_str(&value, "%H:%M")
            .with_context(|| format!("{} must be formatted as HH:MM, got {}", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_ordered() {
        let schedule = WorkSchedule::default();
        assert!(schedule.morning_start < schedule.lunch_start);
        assert!(schedule.lunch_end < schedule.afternoon_end);
        assert_eq!(schedule.morning_start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn server_address_joins_host_and_port() {
        let mut config = Config::test_config();
        config.port = 9000;
        assert_eq!(config.server_address(), "127.0.0.1:9000");
    }
}
