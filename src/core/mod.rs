pub mod config;
pub mod error;
pub mod observer;
pub mod schedule;
pub mod storage;
pub mod time;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
