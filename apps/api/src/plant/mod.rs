pub mod growth;
pub mod handlers;
