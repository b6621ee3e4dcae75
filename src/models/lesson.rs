//! Lesson records derived from a schedule scan.

use serde::{Deserialize, Serialize};

/// A lesson matched for a group.
///
/// Lessons are never stored. They only exist as the result of a query, and the
/// `id` is drawn from a counter that lives as long as the process, so it is not
/// a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u64,
    /// The group text as it was queried (not the matched cell's text).
    pub group: String,
    pub cabinet: String,
    pub teacher: String,
    pub time: String,
}

impl Lesson {
    /// Render as one line of the spoken schedule.
    pub fn narrative_line(&self) -> String {
        format!(
            "Группа {}, Кабинет {}, Преподаватель {}, Время {}",
            self.group, self.cabinet, self.teacher, self.time
        )
    }
}
