pub mod catalog;
pub mod commands;
pub mod contracts;
pub mod cycle;
pub mod error;
pub mod settings;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult, CycleError, CycleResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
