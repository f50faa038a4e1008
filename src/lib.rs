pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod pose;
pub mod tracker;

pub use error::{PoseError, Result};
