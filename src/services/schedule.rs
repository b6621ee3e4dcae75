//! Group schedule lookup.
//!
//! A lookup is a linear scan of the stored snapshot: every cell containing the
//! group text yields a lesson whose cabinet, teacher and time are read off the
//! cell's position in its row.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::models::{Lesson, Row, Shift};
use crate::storage::{ScheduleStore, StoreError};

/// Spoken reply when a group has no lessons.
pub const NO_LESSONS_TEXT: &str = "Уроки для указанной группы не найдены.";

const NARRATIVE_HEADER: &str = "Расписание:";

/// Errors that can occur during a lookup.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("group is missing")]
    MissingGroup,

    #[error("shift is missing")]
    MissingShift,

    #[error("no lessons found for group {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Source of lesson identifiers.
///
/// One counter serves every query for the life of the process, so identifiers
/// never repeat between queries. They are not persisted.
#[derive(Debug)]
pub struct LessonIds(AtomicU64);

impl LessonIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for LessonIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup service over the stored schedule.
pub struct ScheduleService {
    store: Arc<ScheduleStore>,
    ids: LessonIds,
}

impl ScheduleService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self {
            store,
            ids: LessonIds::new(),
        }
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Lessons for a group. No match is an error.
    pub fn lessons(
        &self,
        group: Option<&str>,
        shift: Option<Shift>,
    ) -> Result<Vec<Lesson>, QueryError> {
        let (group, lessons) = self.scan(group, shift)?;
        if lessons.is_empty() {
            return Err(QueryError::NotFound(group.to_string()));
        }
        Ok(lessons)
    }

    /// Lessons for a group as one paragraph of text. No match is not an error.
    pub fn narrative(
        &self,
        group: Option<&str>,
        shift: Option<Shift>,
    ) -> Result<String, QueryError> {
        let (_, lessons) = self.scan(group, shift)?;
        Ok(render_narrative(&lessons))
    }

    fn scan<'g>(
        &self,
        group: Option<&'g str>,
        shift: Option<Shift>,
    ) -> Result<(&'g str, Vec<Lesson>), QueryError> {
        let group = group
            .filter(|g| !g.is_empty())
            .ok_or(QueryError::MissingGroup)?;
        let shift = shift.ok_or(QueryError::MissingShift)?;

        let schedule = self.store.load()?;
        let lessons = find_lessons(&schedule, group, shift, &self.ids);
        tracing::debug!(
            "Scanned {} rows for group {:?}: {} lessons",
            schedule.len(),
            group,
            lessons.len()
        );
        Ok((group, lessons))
    }
}

/// Find every cell containing `group` and derive a lesson from its row.
///
/// The cabinet is the row's first cell and the teacher is the cell just before
/// the match. A match in the first cell takes the row's last cell as teacher.
pub fn find_lessons(rows: &[Row], group: &str, shift: Shift, ids: &LessonIds) -> Vec<Lesson> {
    let mut lessons = Vec::new();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if !cell.contains(group) {
                continue;
            }

            let teacher = match index {
                0 => row.last(),
                _ => row.get(index - 1),
            };

            lessons.push(Lesson {
                id: ids.next_id(),
                group: group.to_string(),
                cabinet: row[0].clone(),
                teacher: teacher.cloned().unwrap_or_default(),
                time: shift.time_slot(index + 1).to_string(),
            });
        }
    }

    lessons
}

/// Spoken form of a lesson list.
pub fn render_narrative(lessons: &[Lesson]) -> String {
    if lessons.is_empty() {
        return NO_LESSONS_TEXT.to_string();
    }

    let mut text = format!("{}\n", NARRATIVE_HEADER);
    for lesson in lessons {
        text.push_str(&lesson.narrative_line());
        text.push('\n');
    }
    text
}
