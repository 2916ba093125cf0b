//! Core of the 3D bar chart.
//!
//! Everything here is independent of the rendering host:
//! - CSV records and their loader.
//! - The bar layout (grid of boxes normalised against the global maximum).
//! - Pointer picking and tooltip text.
//! - Desktop / AR presentation mapping and the AR placement state machine.

pub mod context;
pub mod dataset;
pub mod layout;
pub mod picking;
pub mod presentation;
pub mod xr;

pub use context::{ChartContext, ChartEvent, EventQueue, HostCommand};
pub use dataset::{load_csv, parse_csv, CellPolicy, Dataset, LoadError, Record};
pub use layout::{build_layout, BarLayout, LayoutParams};
pub use presentation::{PresentationMode, SceneConfig, AR_SCALE};
pub use xr::{run_frame, XrHost};
