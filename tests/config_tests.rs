use chrono::NaiveTime;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

use hrms::config::{Config, WorkSchedule};

mod common;

const KEYS: [&str; 15] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "UPLOAD_DIR",
    "MAX_UPLOAD_BYTES",
    "NOTIFICATION_STREAM_TIMEOUT_SECS",
    "NOTIFICATION_BUFFER",
    "TEMPLATE_CACHE_TTL_SECS",
    "WORK_MORNING_START",
    "WORK_LUNCH_START",
    "WORK_LUNCH_END",
    "WORK_AFTERNOON_END",
];

/// Clears every config variable for the duration of `f`, then restores them.
fn with_clean_env<F: FnOnce()>(f: F) {
    common::setup_test_env();

    let original: Vec<(&str, Option<String>)> =
        KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }

    f();

    for (key, value) in original {
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite://hrms.db");
        assert_eq!(config.jwt_expiration_days, 30);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.upload_dir, "uploads");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.notification_stream_timeout_secs, 1800);
        assert_eq!(config.notification_buffer, 32);
        assert_eq!(config.template_cache_ttl_secs, 300);
        assert_eq!(config.work_schedule, WorkSchedule::default());
        assert!(config.is_development());
    });
}

#[test]
#[serial]
fn test_config_custom_values() {
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "sqlite://custom.db");
            env::set_var("JWT_EXPIRATION_DAYS", "7");
            env::set_var("PORT", "3000");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("NOTIFICATION_BUFFER", "4");
            env::set_var("WORK_MORNING_START", "09:00");
            env::set_var("WORK_AFTERNOON_END", "18:00");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite://custom.db");
        assert_eq!(config.jwt_expiration_days, 7);
        assert_eq!(config.port, 3000);
        assert_eq!(config.notification_buffer, 4);
        assert!(config.is_production());
        assert_eq!(
            config.work_schedule.morning_start,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            config.work_schedule.afternoon_end,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
    });
}

#[test]
#[serial]
fn test_unparseable_numbers_fall_back_to_defaults() {
    with_clean_env(|| {
        unsafe {
            env::set_var("PORT", "not-a-port");
            env::set_var("TEMPLATE_CACHE_TTL_SECS", "soon");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.template_cache_ttl_secs, 300);
    });
}

#[test]
#[serial]
fn test_malformed_schedule_time_is_an_error() {
    with_clean_env(|| {
        unsafe {
            env::set_var("WORK_LUNCH_START", "noon");
        }

        let err = Config::from_env_only().unwrap_err();
        assert!(err.to_string().contains("WORK_LUNCH_START"));
    });
}

#[test]
#[serial]
fn test_out_of_order_schedule_is_an_error() {
    with_clean_env(|| {
        unsafe {
            env::set_var("WORK_LUNCH_END", "11:00");
        }

        assert!(Config::from_env_only().is_err());
    });
}
