//! Local document import command.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::services::import_document;
use crate::storage::ScheduleStore;

/// Import a .docx file from disk as the current schedule.
pub async fn cmd_import(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Not a file: {}", file.display()))?;
    let content = tokio::fs::read(file).await?;

    let store = ScheduleStore::new(settings.schedule_path());
    let saved_to = store.path().to_path_buf();
    let name = filename.clone();
    let schedule =
        tokio::task::spawn_blocking(move || import_document(&store, &name, &content)).await??;

    println!(
        "{} Imported {} rows from {}",
        style("✓").green(),
        schedule.len(),
        filename
    );
    println!("  Saved to {}", style(saved_to.display()).dim());
    Ok(())
}
