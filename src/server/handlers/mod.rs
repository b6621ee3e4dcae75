//! HTTP request handlers for the web server.

mod api;
mod helpers;
mod schedule;
mod upload;

// Re-export handlers for use by the router
pub use api::health;
pub use schedule::{alice_schedule, group_schedule};
pub use upload::upload_schedule;
