pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod config;
pub mod export;
pub mod fetcher;
pub mod humanize;
pub mod observability;
pub mod platform; // Exposes MockPlatform for tests
pub mod quota;
pub mod regions;
pub mod results;
pub mod scoring;
pub mod session;

pub use session::{Session, SessionError};
