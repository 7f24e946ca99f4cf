pub mod dashboard;
pub mod export;
pub mod filters;
pub mod health;
pub mod reload;
