pub mod aggregate;
pub mod change;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod projection;
pub mod rank;
pub mod record;
pub mod series;
pub mod source;
pub mod store;
pub mod window;
