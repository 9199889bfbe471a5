pub mod handlers;
pub mod ranker;
pub mod scoring;
pub mod signals;
