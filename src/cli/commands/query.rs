//! Group lookup command.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::models::Shift;
use crate::services::{QueryError, ScheduleService};
use crate::storage::ScheduleStore;

/// Print the lessons of a group, as JSON records or as spoken text.
pub async fn cmd_query(
    settings: &Settings,
    group: &str,
    shift: i64,
    text: bool,
) -> anyhow::Result<()> {
    let store = Arc::new(ScheduleStore::new(settings.schedule_path()));
    let service = ScheduleService::new(store);
    let shift = Shift::from_number(shift);
    let group = group.to_string();

    if text {
        let narrative =
            tokio::task::spawn_blocking(move || service.narrative(Some(&group), shift)).await??;
        println!("{}", narrative);
        return Ok(());
    }

    let lessons = tokio::task::spawn_blocking(move || service.lessons(Some(&group), shift)).await?;
    match lessons {
        Ok(lessons) => {
            println!("{}", serde_json::to_string_pretty(&lessons)?);
            Ok(())
        }
        Err(QueryError::NotFound(group)) => {
            println!("{} No lessons found for {}", style("✗").red(), group);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
