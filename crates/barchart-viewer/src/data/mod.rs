// src/data/mod.rs
//! Data handling modules for the bar chart viewer.
//!
//! This module provides functionality for:
//! - Turning a bar layout into GPU instances and keeping the buffer in sync.
//! - Defining the data structures for GPU buffers.

pub mod bars;
pub mod types;

// Re-export commonly used types for convenience.
pub use self::types::{BarInstance, BarsGpu, FlatUniformStd140, MeshVertex, SceneUniformStd140};
