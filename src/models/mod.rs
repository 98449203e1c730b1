pub mod enums;
pub mod prediction;
pub mod profile;

pub use prediction::*;
pub use profile::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
