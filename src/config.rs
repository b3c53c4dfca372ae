// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::services::scoring::UnmatchedQuestionPolicy;

/// Advisory per-question time budget handed to clients. Not enforced server-side.
pub const TIME_PER_QUESTION_SECS: u32 = 30;

pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
pub const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub quiz_default_limit: i64,
    pub quiz_max_limit: i64,
    pub unmatched_question_policy: UnmatchedQuestionPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let quiz_default_limit = parse_or("QUIZ_DEFAULT_LIMIT", 10_i64).max(1);
        let quiz_max_limit = parse_or("QUIZ_MAX_LIMIT", 50_i64).max(quiz_default_limit);

        Self {
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400),
            rust_log,
            server_port: parse_or("SERVER_PORT", 3000),
            cors_origins,
            quiz_default_limit,
            quiz_max_limit,
            unmatched_question_policy: parse_or(
                "UNMATCHED_QUESTION_POLICY",
                UnmatchedQuestionPolicy::default(),
            ),
        }
    }

    /// Clamps a requested quiz length into `[1, quiz_max_limit]`.
    pub fn quiz_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.quiz_default_limit)
            .clamp(1, self.quiz_max_limit)
    }
}

/// Reads an optional variable, falling back to `default` when it is unset or unparsable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/quiz".to_string(),
            database_max_connections: 1,
            jwt_secret: "secret".to_string(),
            jwt_expiration: 60,
            rust_log: "error".to_string(),
            server_port: 0,
            cors_origins: Vec::new(),
            quiz_default_limit: 10,
            quiz_max_limit: 50,
            unmatched_question_policy: UnmatchedQuestionPolicy::Skip,
        }
    }

    #[test]
    fn quiz_limit_defaults_and_clamps() {
        let config = config();
        assert_eq!(config.quiz_limit(None), 10);
        assert_eq!(config.quiz_limit(Some(25)), 25);
        assert_eq!(config.quiz_limit(Some(0)), 1);
        assert_eq!(config.quiz_limit(Some(-5)), 1);
        assert_eq!(config.quiz_limit(Some(500)), 50);
    }
}
