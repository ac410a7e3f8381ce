pub mod api;
pub mod cli;
pub mod ingest;
pub mod polygon;
pub mod store;
