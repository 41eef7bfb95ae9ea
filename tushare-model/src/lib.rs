//! Tushare Pro
//!
//! request envelope, parameter validation, columnar decoding and
//! endpoint models shared by the async and blocking clients

pub mod bars;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod models;
pub mod params;

pub use crate::bars::*;
pub use crate::config::ClientConfig;
pub use crate::endpoint::{prepare, Endpoint, PreparedCall};
pub use crate::envelope::*;
pub use crate::errors::*;
pub use crate::models::*;
pub use crate::params::{apply_defaults, validate, ParamSpec, Validator};

pub type Result<T> = std::result::Result<T, Error>;
