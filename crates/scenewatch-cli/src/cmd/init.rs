use crate::output::print_json;
use anyhow::Context;
use scenewatch_core::{config::Config, io, paths, provider::LocalArchive};
use std::path::Path;

pub fn run(root: &Path, site: Option<&str>, json: bool) -> anyhow::Result<()> {
    let site_name = site.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "site".to_string())
    });

    let mut created = Vec::new();
    let mut existing = Vec::new();

    for p in [paths::watch_dir(root), paths::assets_dir(root)] {
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config = if paths::config_path(root).exists() {
        existing.push(paths::CONFIG_FILE.to_string());
        Config::load(root).context("failed to load config")?
    } else {
        let cfg = Config::new(&site_name);
        cfg.save(root).context("failed to write config.yaml")?;
        created.push(paths::CONFIG_FILE.to_string());
        cfg
    };

    // The archive location is configurable, so it is created after the
    // config is known.
    let archive_dir = config.archive.resolve(root);
    let archive = LocalArchive::new(&archive_dir);
    let catalog = paths::catalog_path(&archive_dir).display().to_string();
    if archive
        .create()
        .with_context(|| format!("failed to create {catalog}"))?
    {
        created.push(catalog);
    } else {
        existing.push(catalog);
    }

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "site": config.site.name,
            "created": created,
            "existing": existing,
        }))?;
        return Ok(());
    }

    println!("Initialized scenewatch in: {}", root.display());
    for p in &created {
        println!("  created: {p}");
    }
    for p in &existing {
        println!("  exists:  {p}");
    }
    Ok(())
}
