//! Bar layout: rows are groups (along z), columns are years (along x).
//!
//! Heights are normalised against the global maximum so every row shares one scale.

use crate::dataset::Record;
use glam::Vec3;

/// Cohort names for the six groups of the demographic dataset.
pub const DEFAULT_GROUP_NAMES: [&str; 6] = [
    "1: 0-5",
    "2: 6-14",
    "3: 15-19",
    "4: 20-44",
    "5: 45-64",
    "6: 65+",
];

/// Fixed bar geometry. `Default` gives the chart's standard proportions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub bar_width: f32,
    pub gap: f32,
    /// Thickness of every bar along z.
    pub depth: f32,
    /// Distance between group rows along z.
    pub row_spacing: f32,
    /// Height of the tallest bar.
    pub max_height: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            bar_width: 1.2,
            gap: 1.0,
            depth: 6.0,
            row_spacing: 20.0,
            max_height: 200.0,
        }
    }
}

/// Back-reference from a box to the datum it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarMeta {
    pub year: i32,
    pub value: f64,
    pub group: usize,
}

impl BarMeta {
    /// Two tooltip lines: the year, then group number and value.
    pub fn tooltip_lines(&self) -> (String, String) {
        (
            self.year.to_string(),
            format!(
                "Group: {} - {} persons",
                self.group + 1,
                format_grouped(self.value)
            ),
        )
    }
}

/// One positioned box, in chart-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Box centre; bars stand on y = 0, so `center.y == size.y / 2`.
    pub center: Vec3,
    pub size: Vec3,
    /// sRGB in `[0, 1]`.
    pub color: [f32; 3],
    pub meta: BarMeta,
}

impl Bar {
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub group: usize,
    pub label: String,
    pub color: [f32; 3],
}

/// The full grid of bars for one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarLayout {
    pub global_max: f64,
    pub groups: usize,
    pub years: usize,
    /// Row-major by group: index `group * years + year_index`.
    pub bars: Vec<Bar>,
}

impl BarLayout {
    /// Box for `(group, year_index)`, if inside the grid.
    pub fn get(&self, group: usize, year_index: usize) -> Option<&Bar> {
        if group >= self.groups || year_index >= self.years {
            return None;
        }
        self.bars.get(group * self.years + year_index)
    }

    /// All bars in one group row, ordered by year.
    pub fn row(&self, group: usize) -> &[Bar] {
        if group >= self.groups {
            return &[];
        }
        let start = group * self.years;
        &self.bars[start..start + self.years]
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Axis-aligned bounds of all bars, or `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bars.iter().fold(None, |acc, bar| {
            let (lo, hi) = acc.unwrap_or((bar.min(), bar.max()));
            Some((lo.min(bar.min()), hi.max(bar.max())))
        })
    }
}

/// Maximum over all values, ignoring non-finite values; floored to 1 when it is 0.
pub fn global_max(records: &[Record]) -> f64 {
    let max = records
        .iter()
        .flat_map(|r| r.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f64, |acc, v| if v > acc { v } else { acc });
    if max == 0.0 {
        1.0
    } else {
        max
    }
}

/// Lay out `records` as a grid of boxes. Pure; rerun it whenever the data changes.
pub fn build_layout(records: &[Record], params: &LayoutParams) -> BarLayout {
    let groups = records.first().map_or(0, |r| r.values.len());
    let years = records.len();
    let global_max = global_max(records);

    let pitch = params.bar_width + params.gap;
    let total_width = years as f32 * pitch;
    let start_x = -total_width / 2.0 + pitch / 2.0;

    let mut bars = Vec::with_capacity(groups * years);
    for g in 0..groups {
        let z = (g as f32 - (groups as f32 - 1.0) / 2.0) * params.row_spacing;
        let color = group_color(g, groups);

        for (i, record) in records.iter().enumerate() {
            let value = effective_value(record, g);
            let height = ((value / global_max) * params.max_height as f64) as f32;

            bars.push(Bar {
                center: Vec3::new(start_x + i as f32 * pitch, height / 2.0, z),
                size: Vec3::new(params.bar_width, height, params.depth),
                color,
                meta: BarMeta {
                    year: record.year,
                    value,
                    group: g,
                },
            });
        }
    }

    log::debug!(
        "Built layout: {} groups x {} years, global max {}",
        groups,
        years,
        global_max
    );

    BarLayout {
        global_max,
        groups,
        years,
        bars,
    }
}

/// Missing and non-finite cells count as 0.
fn effective_value(record: &Record, group: usize) -> f64 {
    match record.values.get(group) {
        Some(v) if v.is_finite() => *v,
        _ => 0.0,
    }
}

/// Legend rows for `groups` groups.
pub fn legend(groups: usize) -> Vec<LegendEntry> {
    (0..groups)
        .map(|g| LegendEntry {
            group: g,
            label: group_label(g),
            color: group_color(g, groups),
        })
        .collect()
}

pub fn group_label(group: usize) -> String {
    DEFAULT_GROUP_NAMES
        .get(group)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("group {group}"))
}

/// Hue runs from 0.6 (blue) for the first group down to 0.1 (orange) for the last.
pub fn group_color(group: usize, groups: usize) -> [f32; 3] {
    let span = groups.saturating_sub(1).max(1) as f32;
    let hue = 0.6 - (group as f32 / span) * 0.5;
    hsl_to_rgb(hue, 0.7, 0.5)
}

/// HSL (all components in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// en-US style grouping: `1234567.891` → `1,234,567.891`, at most 3 fraction digits.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "∞".to_string()
        } else {
            "-∞".to_string()
        };
    }

    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new(2000, vec![10.0, 20.0]),
            Record::new(2001, vec![5.0, 40.0]),
        ]
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn heights_are_normalised_to_global_max() {
        let params = LayoutParams::default();
        let layout = build_layout(&sample(), &params);

        assert_eq!(layout.global_max, 40.0);
        assert!(close(layout.get(1, 1).unwrap().height(), params.max_height));
        assert!(close(
            layout.get(0, 1).unwrap().height(),
            params.max_height * 5.0 / 40.0
        ));
    }

    #[test]
    fn grid_index_references_source_cell() {
        let records = sample();
        let layout = build_layout(&records, &LayoutParams::default());
        for g in 0..layout.groups {
            for (i, record) in records.iter().enumerate() {
                let meta = layout.get(g, i).unwrap().meta;
                assert_eq!(meta.group, g);
                assert_eq!(meta.year, record.year);
                assert_eq!(meta.value, record.values[g]);
            }
        }
        assert!(layout.get(2, 0).is_none());
        assert!(layout.get(0, 2).is_none());
        assert_eq!(layout.row(1).len(), 2);
    }

    #[test]
    fn global_max_never_zero() {
        assert_eq!(global_max(&[]), 1.0);
        assert_eq!(global_max(&[Record::new(1, vec![0.0, 0.0])]), 1.0);
        assert_eq!(global_max(&[Record::new(1, vec![f64::NAN, 3.0])]), 3.0);
        assert_eq!(global_max(&[Record::new(1, vec![f64::INFINITY, 3.0])]), 3.0);
    }

    #[test]
    fn infinite_values_draw_as_empty_bars() {
        let records = vec![
            Record::new(2000, vec![f64::INFINITY, 20.0]),
            Record::new(2001, vec![5.0, 40.0]),
        ];
        let layout = build_layout(&records, &LayoutParams::default());
        assert_eq!(layout.global_max, 40.0);
        assert_eq!(layout.get(0, 0).unwrap().height(), 0.0);
        assert!(close(layout.get(1, 1).unwrap().height(), 200.0));
        assert!(layout.bars.iter().all(|b| b.height().is_finite()));
    }

    #[test]
    fn zero_height_only_for_zero_value() {
        let records = vec![
            Record::new(1990, vec![0.0, 1.0, f64::NAN]),
            Record::new(1991, vec![2.0, 0.0]),
        ];
        let layout = build_layout(&records, &LayoutParams::default());
        for bar in &layout.bars {
            assert_eq!(bar.height() == 0.0, bar.meta.value == 0.0);
            assert!(close(bar.center.y, bar.height() / 2.0));
        }
        // Missing and NaN cells count as 0.
        assert_eq!(layout.get(2, 0).unwrap().meta.value, 0.0);
        assert_eq!(layout.get(2, 1).unwrap().meta.value, 0.0);
    }

    #[test]
    fn columns_are_centred_and_rows_spaced() {
        let params = LayoutParams::default();
        let layout = build_layout(&sample(), &params);
        let pitch = params.bar_width + params.gap;

        let x0 = layout.get(0, 0).unwrap().center.x;
        let x1 = layout.get(0, 1).unwrap().center.x;
        assert!(close(x0, -pitch / 2.0));
        assert!(close(x1, pitch / 2.0));

        assert!(close(layout.get(0, 0).unwrap().center.z, -10.0));
        assert!(close(layout.get(1, 0).unwrap().center.z, 10.0));
        assert_eq!(layout.get(0, 0).unwrap().size.z, params.depth);
    }

    #[test]
    fn empty_records_give_empty_layout() {
        let layout = build_layout(&[], &LayoutParams::default());
        assert!(layout.is_empty());
        assert_eq!(layout.global_max, 1.0);
        assert!(layout.bounds().is_none());
    }

    #[test]
    fn group_colors_span_blue_to_orange() {
        let first = group_color(0, 6);
        let last = group_color(5, 6);
        let near = |a: [f32; 3], b: [f32; 3]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(near(first, hsl_to_rgb(0.6, 0.7, 0.5)));
        assert!(near(last, hsl_to_rgb(0.1, 0.7, 0.5)));
        // Blue dominates the first row, red the last.
        assert!(first[2] > first[0]);
        assert!(last[0] > last[2]);
        // A single group does not divide by zero.
        assert_eq!(group_color(0, 1), first);
    }

    #[test]
    fn legend_falls_back_to_generic_names() {
        let entries = legend(8);
        assert_eq!(entries[0].label, "1: 0-5");
        assert_eq!(entries[5].label, "6: 65+");
        assert_eq!(entries[7].label, "group 7");
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1234.0), "1,234");
        assert_eq!(format_grouped(1234567.891), "1,234,567.891");
        assert_eq!(format_grouped(-1500.25), "-1,500.25");
        assert_eq!(format_grouped(0.12349), "0.123");
    }

    #[test]
    fn tooltip_lines_use_one_based_group() {
        let meta = BarMeta {
            year: 2001,
            value: 40000.0,
            group: 1,
        };
        let (title, body) = meta.tooltip_lines();
        assert_eq!(title, "2001");
        assert_eq!(body, "Group: 2 - 40,000 persons");
    }
}
