use barchart::{CellPolicy, LayoutParams, AR_SCALE};
use clap::Parser;
use std::path::PathBuf;

/// `barchart-viewer` - 3D bar chart of per-group demographic data.
///
/// Rows of bars are demographic groups, columns are years. Heights share one
/// scale, normalised to the largest value in the file.
#[derive(Parser, Debug, Clone)]
#[command(name = "barchart-viewer", version, about, long_about = None)]
pub struct Config {
    /// CSV with a header row, then `year,value1,value2,...` rows.
    #[arg(long, env = "BARCHART_CSV", default_value = "data/data_groups.csv")]
    pub csv: PathBuf,

    /// Reject non-numeric cells instead of drawing them as empty bars.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Height of the tallest bar, in scene units.
    #[arg(long, default_value_t = 200.0, value_parser = positive_f32)]
    pub max_height: f32,

    /// Chart scale while an AR session is presenting.
    #[arg(long, default_value_t = AR_SCALE, value_parser = positive_f32)]
    pub ar_scale: f32,

    /// Behave as if the runtime had no AR support.
    #[arg(long, default_value_t = false)]
    pub no_xr: bool,
}

impl Config {
    pub fn cell_policy(&self) -> CellPolicy {
        if self.strict {
            CellPolicy::Strict
        } else {
            CellPolicy::Lenient
        }
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            max_height: self.max_height,
            ..LayoutParams::default()
        }
    }
}

/// Sizes and scales must be finite and greater than zero.
fn positive_f32(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("{s:?} must be a finite number greater than 0"))
    }
}
