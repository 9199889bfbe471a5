pub mod cache;
pub mod handlers;
pub mod invalidation;
pub mod query;
