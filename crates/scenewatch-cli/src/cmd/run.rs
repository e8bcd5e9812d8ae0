use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use scenewatch_core::{
    config::{Config, WarnLevel},
    export::LocalAssetStore,
    lock::RunLock,
    notify::{LogNotifier, Notifier, TelegramNotifier},
    paths,
    provider::LocalArchive,
    run::{Coordinator, ExportOutcome, RunOutcome},
    state::StateStore,
};
use std::path::Path;
use std::time::Duration;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .collect();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("[error] {}", e.message);
        }
        anyhow::bail!(
            "config has {} error(s); see `scenewatch config validate`",
            errors.len()
        );
    }

    let stale_after = Duration::from_secs(u64::from(config.lock.stale_after_minutes) * 60);
    let _lock = RunLock::acquire(&paths::lock_path(root), stale_after)
        .context("failed to acquire run lock")?;

    let notifier: Box<dyn Notifier> = match &config.notify {
        Some(notify) => Box::new(
            TelegramNotifier::from_env(notify).context("failed to configure notifier")?,
        ),
        None => Box::new(LogNotifier),
    };
    let archive = LocalArchive::new(config.archive.resolve(root));
    let state = StateStore::at_root(root);
    let store = LocalAssetStore::new(paths::assets_dir(root));

    let coordinator = Coordinator::new(&config, &archive, &state, notifier.as_ref(), &store);
    let outcome = match coordinator.run(Utc::now()) {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.blocks_state_advance() {
                tracing::warn!("state unchanged; the scene will be retried on the next run");
            }
            return Err(anyhow::Error::new(e).context("run failed"));
        }
    };

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    match &outcome {
        RunOutcome::NoScene => println!("No scene found."),
        RunOutcome::AlreadyProcessed { scene_id } => {
            println!("Already processed: {scene_id}");
        }
        RunOutcome::Deferred { scene_id, reason } => {
            println!("Deferred {scene_id}: {reason}");
        }
        RunOutcome::Processed(summary) => {
            println!("Processed: {}", summary.scene_id);
            println!("  radar:  {}", summary.radar_scene_id);
            println!("  span:   {}", summary.time_span);
            println!(
                "  score:  {}{}",
                summary.score,
                if summary.fused { " (fused)" } else { "" }
            );
            match &summary.alert {
                None => println!("  alert:  none"),
                Some(alert) => {
                    let delivery = match &summary.delivery {
                        Some(d) if d.is_sent() => "sent".to_string(),
                        Some(scenewatch_core::alert::Delivery::Failed { reason }) => {
                            format!("not sent ({reason})")
                        }
                        _ => "-".to_string(),
                    };
                    println!("  alert:  {} [{delivery}]", alert.task_label);
                }
            }
            match &summary.export {
                Some(ExportOutcome::Submitted(ticket)) => {
                    println!("  export: {} (job {})", ticket.asset_id, ticket.job_id);
                }
                Some(ExportOutcome::Failed { reason }) => println!("  export: failed ({reason})"),
                Some(ExportOutcome::Disabled) | None => {}
            }
        }
    }
    Ok(())
}
