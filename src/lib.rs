pub mod assembly;
pub mod builder;
pub mod error;
pub mod fragment;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod meshsize;
pub mod regions;

pub use error::{MagmeshError, Result};
