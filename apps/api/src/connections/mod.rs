pub mod affinity;
pub mod handlers;
pub mod limiter;
pub mod suggestions;
