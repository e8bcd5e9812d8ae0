use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::detect::ChangeScore;
use crate::notify::Notifier;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Built only when a score crosses the alert threshold. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub score: ChangeScore,
    pub scene_id: String,
    pub task_label: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    pub threshold: f64,
}

impl AlertPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.alert.threshold)
    }

    /// Pure decision: `Some` only when `score` is strictly above the
    /// threshold.
    pub fn decide(
        &self,
        score: ChangeScore,
        scene_id: &str,
        task_label: &str,
        now: DateTime<Utc>,
    ) -> Option<AlertRecord> {
        (score.value > self.threshold).then(|| AlertRecord {
            score,
            scene_id: scene_id.to_string(),
            task_label: task_label.to_string(),
            timestamp: now,
        })
    }
}

/// `{prefix}_YYYYMMDD_HHMM` in UTC.
pub fn task_label(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}_{}", now.format("%Y%m%d_%H%M"))
}

pub fn format_message(
    site: &str,
    alert: &AlertRecord,
    threshold: f64,
    time_span: &str,
    link: Option<&str>,
) -> String {
    let mut msg = format!(
        "[{site}] change detected\n\
         score: {} (threshold {threshold})\n\
         {time_span}\n\
         scene: {}\n\
         task: {}",
        alert.score, alert.scene_id, alert.task_label
    );
    if let Some(link) = link {
        msg.push_str("\nartifact: ");
        msg.push_str(link);
    }
    msg
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AlertPayload {
    Text { message: String },
    Photo { png: Vec<u8>, caption: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Send `payload` through `notifier`. Transport failures are logged and
/// reported in the returned [`Delivery`]; they never propagate.
pub fn dispatch(notifier: &dyn Notifier, payload: &AlertPayload) -> Delivery {
    let result = match payload {
        AlertPayload::Text { message } => notifier.send_message(message),
        AlertPayload::Photo { png, caption } => notifier.send_photo(png, caption),
    };
    match result {
        Ok(()) => {
            tracing::info!("alert dispatched");
            Delivery::Sent
        }
        Err(e) => {
            tracing::warn!(error = %e, "alert dispatch failed");
            Delivery::Failed {
                reason: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
