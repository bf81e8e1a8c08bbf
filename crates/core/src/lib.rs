//! Domain types shared by every MoodChat crate.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{require_non_empty, CoreError};
