use crate::output::print_json;
use anyhow::Context;
use scenewatch_core::state::StateStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = StateStore::at_root(root);
    let state = store.load().context("failed to load state")?;

    if json {
        print_json(&state)?;
        return Ok(());
    }

    match &state.last_processed_scene_id {
        Some(id) => println!("Last processed scene: {id}"),
        None => println!("No scene processed yet."),
    }
    Ok(())
}
