// src/utils/time.rs

use serde::Serialize;

use crate::config::{CRITICAL_SECONDS, WARNING_SECONDS};

/// How urgently the exam clock should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerLevel {
    Normal,
    Warning,
    Critical,
}

impl TimerLevel {
    pub fn for_remaining(seconds: u32) -> Self {
        if seconds <= CRITICAL_SECONDS {
            TimerLevel::Critical
        } else if seconds <= WARNING_SECONDS {
            TimerLevel::Warning
        } else {
            TimerLevel::Normal
        }
    }
}

/// `MM:SS` countdown display.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Spoken-style duration used on the result screen.
pub fn format_duration(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    match (mins, secs) {
        (0, s) => format!("{} secondes", s),
        (m, 0) => format!("{} minutes", m),
        (m, s) => format!("{} min {} sec", m, s),
    }
}
