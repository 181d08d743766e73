#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod pool;
pub mod study;

pub use vocab_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, StudyError};
pub use pool::{CardPool, PoolCache, PoolConfig, PoolStats};
pub use study::{
    CardView, FlipAck, PageView, SessionLimits, SessionRegistry, SharedSession, StudyService,
    TrackSummary,
};
