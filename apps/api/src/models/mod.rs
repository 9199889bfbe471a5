pub mod feed;
pub mod habit;
pub mod insights;
pub mod journal;
pub mod mood;
pub mod plant;
pub mod social;
pub mod user;
