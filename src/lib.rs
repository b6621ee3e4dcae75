//! Timetable - ingestion and lookup of group schedules.
//!
//! Timetables arrive as .docx documents whose tables hold the week's lessons.
//! The tables are flattened into a single JSON snapshot, and lookups scan that
//! snapshot for a group to report cabinet, teacher and time slot.

pub mod cli;
pub mod config;
pub mod docx;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
