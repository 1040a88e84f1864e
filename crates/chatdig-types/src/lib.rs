//! Shared entity records and error hierarchy for chatdig.

pub mod error;
pub mod record;
pub mod util;
pub mod value;

pub use error::{ChatdigError, ConfigError};
pub use record::*;
pub use util::{preview, truncate_str};
pub use value::{as_f64, as_i64, is_truthy, truthy};
