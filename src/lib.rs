pub mod catalog;
pub mod error;
pub mod evolution;
pub mod geometry;
pub mod neuro;
pub mod packing;
pub mod render;
pub mod selection;
pub mod vector;

pub use error::Error;
