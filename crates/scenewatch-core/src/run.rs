//! Run Coordinator.
//!
//! One pass is: open the imagery session, read state, discover the newest
//! primary scene, gate on idempotency, detect, decide, dispatch, export, and
//! finally advance state. Each pass handles at most one scene.
//!
//! Only failures at or before detection completion leave the state alone.
//! Dispatch and export are best-effort: once a score exists the scene is
//! considered processed, even when the alert could not be delivered.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::{self, AlertPayload, AlertPolicy, AlertRecord, Delivery};
use crate::composite;
use crate::config::Config;
use crate::detect::{ChangeDetector, ChangeScore, DetectionParams, DetectionReport};
use crate::error::{Result, WatchError};
use crate::export::{ArtifactStore, ExportRequest, ExportTicket};
use crate::notify::Notifier;
use crate::provider::{ImageryProvider, SceneQuery};
use crate::state::StateStore;
use crate::types::{SceneReference, TimeWindow};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Submitted(ExportTicket),
    Failed { reason: String },
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scene_id: String,
    pub radar_scene_id: String,
    pub time_span: String,
    pub score: ChangeScore,
    pub fused: bool,
    pub alert: Option<AlertRecord>,
    pub delivery: Option<Delivery>,
    pub export: Option<ExportOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing matched the discovery query.
    NoScene,
    /// The newest scene equals the last processed one.
    AlreadyProcessed { scene_id: String },
    /// Inputs were not yet available; the scene will be retried next run.
    Deferred { scene_id: String, reason: String },
    Processed(RunSummary),
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct Coordinator<'a> {
    config: &'a Config,
    provider: &'a dyn ImageryProvider,
    state: &'a StateStore,
    notifier: &'a dyn Notifier,
    store: &'a dyn ArtifactStore,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        config: &'a Config,
        provider: &'a dyn ImageryProvider,
        state: &'a StateStore,
        notifier: &'a dyn Notifier,
        store: &'a dyn ArtifactStore,
    ) -> Self {
        Self {
            config,
            provider,
            state,
            notifier,
            store,
        }
    }

    pub fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let cfg = self.config;

        let session = self.provider.open_session()?;
        tracing::debug!("imagery session opened");

        let state = self.state.load()?;

        let window = TimeWindow::trailing(now, cfg.discovery.lookback_days);
        let query = SceneQuery {
            area: cfg.site.aoi,
            window,
            modality: cfg.discovery.modality,
            filters: cfg.discovery.filters.clone(),
        };
        let Some(scene) = session.latest(&query)? else {
            tracing::info!(
                modality = %cfg.discovery.modality,
                window = %window.label(),
                "no scene found"
            );
            return Ok(RunOutcome::NoScene);
        };

        if state.is_processed(&scene.scene_id) {
            tracing::info!(scene_id = %scene.scene_id, "scene already processed");
            return Ok(RunOutcome::AlreadyProcessed {
                scene_id: scene.scene_id,
            });
        }
        tracing::info!(
            scene_id = %scene.scene_id,
            previous = state.last_processed_scene_id.as_deref().unwrap_or("-"),
            "new scene"
        );

        let params = DetectionParams::from_config(cfg);
        let report = match ChangeDetector::new(&*session, &params).detect(now, Some(&scene)) {
            Ok(report) => report,
            Err(WatchError::InsufficientData(reason)) => {
                tracing::warn!(scene_id = %scene.scene_id, %reason, "detection deferred");
                return Ok(RunOutcome::Deferred {
                    scene_id: scene.scene_id,
                    reason,
                });
            }
            Err(e) => {
                tracing::error!(scene_id = %scene.scene_id, error = %e, "detection failed");
                return Err(e);
            }
        };

        let summary = self.act(&scene, report, now);

        self.state.save(&scene.scene_id)?;
        tracing::info!(scene_id = %scene.scene_id, "state advanced");
        Ok(RunOutcome::Processed(summary))
    }

    /// Decision, dispatch, and export. Nothing here can fail the run.
    fn act(
        &self,
        scene: &SceneReference,
        report: DetectionReport,
        now: DateTime<Utc>,
    ) -> RunSummary {
        let cfg = self.config;
        let label = alert::task_label(&cfg.alert.task_prefix, now);
        let policy = AlertPolicy::from_config(cfg);
        let time_span = report.time_span_label();

        let mut summary = RunSummary {
            scene_id: scene.scene_id.clone(),
            radar_scene_id: report.current_radar.scene_id.clone(),
            time_span: time_span.clone(),
            score: report.score,
            fused: report.fused,
            alert: None,
            delivery: None,
            export: None,
        };

        let Some(record) = policy.decide(report.score, &scene.scene_id, &label, now) else {
            tracing::info!(
                scene_id = %scene.scene_id,
                score = report.score.value,
                threshold = policy.threshold,
                "score below alert threshold"
            );
            return summary;
        };
        tracing::info!(
            scene_id = %scene.scene_id,
            score = report.score.value,
            task = %record.task_label,
            "alert raised"
        );

        let asset_id = cfg.export.asset_id(&record.task_label);
        let link = cfg.export.enabled.then(|| cfg.export.link_for(&asset_id));
        let message = alert::format_message(
            &cfg.site.name,
            &record,
            policy.threshold,
            &time_span,
            link.as_deref(),
        );

        let delivery = match self.payload(&report, message) {
            Ok(payload) => alert::dispatch(self.notifier, &payload),
            Err(e) => {
                tracing::warn!(error = %e, "alert composite failed");
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let export = if cfg.export.enabled {
            let request = ExportRequest {
                task_label: record.task_label.clone(),
                asset_id,
                scene_id: scene.scene_id.clone(),
                scale_m: cfg.export_scale_m(),
                region: cfg.site.aoi,
                score: report.score,
                mask: &report.mask,
            };
            match self.store.submit(&request) {
                Ok(ticket) => {
                    tracing::info!(
                        asset_id = %ticket.asset_id,
                        job_id = %ticket.job_id,
                        "export submitted"
                    );
                    ExportOutcome::Submitted(ticket)
                }
                Err(e) => {
                    tracing::warn!(asset_id = %request.asset_id, error = %e, "export failed");
                    ExportOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        } else {
            ExportOutcome::Disabled
        };

        summary.alert = Some(record);
        summary.delivery = Some(delivery);
        summary.export = Some(export);
        summary
    }

    fn payload(&self, report: &DetectionReport, message: String) -> Result<AlertPayload> {
        if !self.config.alert.attach_composite {
            return Ok(AlertPayload::Text { message });
        }
        let img = composite::render_composite(
            &report.background,
            &report.mask,
            self.config.alert.overlay_opacity,
        )
        .map_err(|e| WatchError::Dispatch(e.to_string()))?;
        let png = composite::encode_png(&img).map_err(|e| WatchError::Dispatch(e.to_string()))?;
        Ok(AlertPayload::Photo {
            png,
            caption: message,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
