//! Pixel-space layout of a parallel-coordinates frame.
//!
//! Everything here is pure arithmetic over [`RenderStyle`] and [`RunMetadata`], so the
//! mapping can be checked without rasterizing anything.

use crate::{
    config::RenderStyle,
    foundation::format::{fixed, scientific},
    input::metadata::RunMetadata,
};

/// Magnitude from which scale labels switch to scientific notation.
pub const SCIENTIFIC_THRESHOLD: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTick {
    pub y: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct PlotGeometry {
    width: f64,
    height: f64,
    vert_margin: f64,
    left_margin: f64,
    right_margin: f64,
    bars: Vec<f64>,
    value_min: f64,
    value_max: f64,
}

impl PlotGeometry {
    pub fn new(style: &RenderStyle, meta: &RunMetadata) -> Self {
        let width = f64::from(style.width);
        Self {
            width,
            height: f64::from(style.height),
            vert_margin: style.vert_margin,
            left_margin: style.left_margin,
            right_margin: style.right_margin,
            bars: bar_positions(width, style.left_bar_margin, style.right_margin, meta.n),
            value_min: meta.value_min,
            value_max: meta.value_max,
        }
    }

    /// X position of each dimension's bar, left to right.
    pub fn bars(&self) -> &[f64] {
        &self.bars
    }

    pub fn last_bar(&self) -> f64 {
        self.bars.last().copied().unwrap_or(0.0)
    }

    /// Y pixel of `value`, truncated toward zero. `value_max` maps to the top of the
    /// band, `value_min` to the bottom; values outside the range are not clamped.
    pub fn value_to_y(&self, value: f64) -> f64 {
        let band = self.height * (1.0 - 2.0 * self.vert_margin);
        let frac = (value - self.value_min) / (self.value_max - self.value_min);
        ((1.0 - frac) * band + self.height * self.vert_margin).trunc()
    }

    pub fn band_top(&self) -> f64 {
        self.height * self.vert_margin
    }

    pub fn band_bottom(&self) -> f64 {
        self.height * (1.0 - self.vert_margin)
    }

    /// Common left-edge node every solution line can start from.
    pub fn nest_anchor(&self) -> (f64, f64) {
        (self.left_margin * self.width, self.height / 2.0)
    }

    /// Polyline vertices of one solution, one per dimension.
    pub fn solution_points(&self, values: &[f64]) -> Vec<(f64, f64)> {
        self.bars
            .iter()
            .zip(values)
            .map(|(&x, &v)| (x, self.value_to_y(v)))
            .collect()
    }

    pub fn tick_length(&self) -> f64 {
        0.075 * self.right_margin * self.width
    }

    /// `count` ticks from the bottom of the band (`value_min`) to the top (`value_max`).
    pub fn scale_ticks(&self, count: u32) -> Vec<ScaleTick> {
        let count = count.max(2);
        let bar_length = self.height * (1.0 - 2.0 * self.vert_margin);
        let separation = bar_length / f64::from(count - 1);
        let range = self.value_max - self.value_min;
        (0..count)
            .map(|tick| {
                let offset = f64::from(tick) * separation;
                let y = self.height * self.vert_margin + bar_length - offset;
                let along = 1.0 - (bar_length - offset) / bar_length;
                let value = along * range + self.value_min;
                ScaleTick {
                    y,
                    value,
                    label: scale_label(value, self.value_min, self.value_max),
                }
            })
            .collect()
    }
}

/// Evenly spaced bar x positions; bar 0 sits `left_bar_margin` in from the left edge.
pub fn bar_positions(width: f64, left_bar_margin: f64, right_margin: f64, n: usize) -> Vec<f64> {
    let start = left_bar_margin * width;
    if n < 2 {
        return vec![start; n];
    }
    let span = (1.0 - right_margin) * (width * (1.0 - left_bar_margin));
    (0..n)
        .map(|i| start + i as f64 * span / (n - 1) as f64)
        .collect()
}

pub fn uses_scientific(value_min: f64, value_max: f64) -> bool {
    value_min.abs() >= SCIENTIFIC_THRESHOLD || value_max.abs() >= SCIENTIFIC_THRESHOLD
}

pub fn scale_label(value: f64, value_min: f64, value_max: f64) -> String {
    if uses_scientific(value_min, value_max) {
        scientific(value, 1)
    } else {
        fixed(value, 2)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn meta(n: usize, min: f64, max: f64) -> RunMetadata {
        RunMetadata::new("f", "s", 1, n, min, max, None, Path::new("m.pos")).unwrap()
    }

    #[test]
    fn bounds_map_to_band_edges() {
        let style = RenderStyle::default();
        let g = PlotGeometry::new(&style, &meta(3, 0.0, 10.0));
        let h = f64::from(style.height);
        assert!((g.value_to_y(0.0) - h * (1.0 - style.vert_margin)).abs() < 1.0);
        assert!((g.value_to_y(10.0) - h * style.vert_margin).abs() < 1.0);
        assert_eq!(g.value_to_y(0.0), 336.0);
        assert_eq!(g.value_to_y(10.0), 37.0);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let g = PlotGeometry::new(&RenderStyle::default(), &meta(2, 0.0, 10.0));
        assert!(g.value_to_y(20.0) < g.band_top());
        assert!(g.value_to_y(-5.0) > g.band_bottom());
    }

    #[test]
    fn bars_span_from_left_margin() {
        let bars = bar_positions(1000.0, 0.10, 0.075, 3);
        assert_eq!(bars.len(), 3);
        assert!((bars[0] - 100.0).abs() < 1e-9);
        // span = 0.925 * 900 = 832.5
        assert!((bars[1] - 516.25).abs() < 1e-9);
        assert!((bars[2] - 932.5).abs() < 1e-9);
    }

    #[test]
    fn solution_points_follow_bars() {
        let g = PlotGeometry::new(&RenderStyle::default(), &meta(2, 0.0, 10.0));
        let pts = g.solution_points(&[0.0, 10.0]);
        assert_eq!(pts, vec![(g.bars()[0], 336.0), (g.bars()[1], 37.0)]);
        assert_eq!(g.nest_anchor(), (50.0, 187.0));
    }

    #[test]
    fn scale_ticks_run_bottom_to_top() {
        let g = PlotGeometry::new(&RenderStyle::default(), &meta(2, 0.0, 10.0));
        let ticks = g.scale_ticks(5);
        assert_eq!(ticks.len(), 5);
        assert!((ticks[0].y - g.band_bottom()).abs() < 1e-9);
        assert!((ticks[4].y - g.band_top()).abs() < 1e-9);
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0.00", "2.50", "5.00", "7.50", "10.00"]);
    }

    #[test]
    fn scientific_threshold_applies_to_either_bound() {
        assert!(!uses_scientific(0.0, 999.99));
        assert!(uses_scientific(0.0, 1000.0));
        assert!(uses_scientific(-1000.0, 0.0));
        assert_eq!(scale_label(1500.0, 0.0, 3000.0), "1.5e+03");
        assert_eq!(scale_label(1.5, 0.0, 10.0), "1.50");
    }
}
