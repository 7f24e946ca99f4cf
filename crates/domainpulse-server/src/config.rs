pub use domainpulse_core::config::{Config, EngineConfig, TieBreak};
