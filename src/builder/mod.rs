//! Primitive emission.
//!
//! Builders turn one geometry description into staged kernel primitives,
//! grouped per semantic part. They never query the model; everything here
//! happens before the first synchronize.

pub mod coil;
pub mod plate;
pub mod ring;
pub mod stack;

pub use stack::{DblShapes, PancakeShapes, StackShapes, TapeShapes};
