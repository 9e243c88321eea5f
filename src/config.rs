// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;

use crate::error::AppError;

/// Length of a mock exam, in seconds (45 minutes).
pub const EXAM_DURATION_SECONDS: u32 = 45 * 60;

/// Number of subject-matter questions drawn into a mock exam.
pub const TOPIC_QUESTION_COUNT: usize = 28;

/// Number of situational questions drawn into a mock exam.
pub const SITUATION_QUESTION_COUNT: usize = 12;

/// Topic banks that feed the subject-matter part of a mock exam.
pub const TOPIC_FILES: [&str; 5] = ["values", "institutions", "rights", "history", "society"];

/// Reserved topic tag for practical-scenario questions.
pub const SITUATION_TOPIC_ID: &str = "situation";

/// Topic recorded for a daily-drill mistake whose question carries no topic.
pub const DAILY_PRACTICE_TOPIC_ID: &str = "daily-practice";

/// Minimum percentage needed to pass a mock exam.
pub const PASSING_SCORE_PERCENTAGE: u32 = 80;

/// Upper bound on how many times a single mistake is repeated in a sprint queue.
pub const MAX_SPRINT_WEIGHT: u32 = 5;

/// Remaining seconds at which the exam clock turns to a warning.
pub const WARNING_SECONDS: u32 = 5 * 60;

/// Remaining seconds at which the exam clock turns critical.
pub const CRITICAL_SECONDS: u32 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Root of the question banks: `topics/<slug>.json` and `situation.json`.
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://civique.db?mode=rwc".to_string());

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| AppError::InternalServerError(format!("Invalid BIND_ADDR: {}", e)))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            data_dir,
            bind_addr,
            rust_log,
        })
    }
}
