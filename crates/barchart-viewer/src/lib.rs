// src/lib.rs
//! Native viewer for the 3D bar chart.
//!
//! Renders the chart with wgpu, overlays the legend and tooltip with egui, and
//! drives AR placement through a simulated XR runtime.

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod renderer;
pub mod ui;
pub mod xr;
