use std::path::{Path, PathBuf};

use crate::foundation::error::{PlotError, PlotResult};

pub const DEFAULT_DURATION_SECS: f64 = 5.0;
pub const DEFAULT_STEPPING: usize = 1;

/// Resolved per-invocation options.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    /// Total duration of each GIF/MP4 in seconds.
    pub duration_secs: f64,
    /// Render only every `stepping`-th file of a run.
    pub stepping: usize,
    /// Try to show the `.hv` hypervolume of each generation.
    pub show_hypervolume: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            stepping: DEFAULT_STEPPING,
            show_hypervolume: false,
        }
    }
}

impl RunOptions {
    /// Build options from raw user input. Values that do not parse, or are out of range,
    /// fall back to the defaults with a warning instead of failing.
    pub fn resolve(duration_secs: Option<&str>, stepping: Option<&str>, show_hv: bool) -> Self {
        let mut opts = Self {
            show_hypervolume: show_hv,
            ..Self::default()
        };

        if let Some(raw) = duration_secs {
            match raw.trim().parse::<f64>() {
                Ok(d) if d.is_finite() && d > 0.0 => {
                    opts.duration_secs = d;
                    tracing::info!("media duration set to {d} seconds");
                }
                _ => tracing::warn!(
                    "provided duration '{raw}' is not valid; using default of {DEFAULT_DURATION_SECS}"
                ),
            }
        }

        if let Some(raw) = stepping {
            match raw.trim().parse::<usize>() {
                Ok(s) if s >= 1 => {
                    opts.stepping = s;
                    tracing::info!("file stepping set to {s}");
                }
                _ => tracing::warn!(
                    "provided stepping value '{raw}' is not valid; using default of {DEFAULT_STEPPING}"
                ),
            }
        }

        if show_hv {
            tracing::info!("will show hypervolumes for each run, if provided");
        }
        opts
    }
}

/// Fixed drawing parameters of a frame.
///
/// Every field has a default, so a partial JSON object is a valid style file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderStyle {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    /// Fraction of the height kept free above and below the bars.
    pub vert_margin: f64,
    /// Horizontal position of the nest node, as a fraction of the width.
    pub left_margin: f64,
    pub right_margin: f64,
    pub show_bars: bool,
    /// Distance between the first bar and the left border, as a fraction of the width.
    pub left_bar_margin: f64,
    pub bar_width: f64,
    pub bar_color: [u8; 3],
    pub solution_line_width: f64,
    pub color_best: [u8; 3],
    pub color_worst: [u8; 3],
    /// Connect every solution to a common node left of the first bar.
    pub show_nest_lines: bool,
    pub show_scale: bool,
    /// Number of labelled ticks on the scale.
    pub scale_ticks: u32,
    pub text_color: [u8; 3],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 374,
            background: [0, 0, 0],
            vert_margin: 0.10,
            left_margin: 0.05,
            right_margin: 0.075,
            show_bars: true,
            left_bar_margin: 0.10,
            bar_width: 3.0,
            bar_color: [150, 150, 150],
            solution_line_width: 2.0,
            color_best: [40, 135, 95],
            color_worst: [40, 62, 130],
            show_nest_lines: true,
            show_scale: true,
            scale_ticks: 5,
            text_color: [255, 255, 255],
        }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> PlotResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PlotError::validation("canvas width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(PlotError::validation(format!(
                "canvas {}x{} exceeds the maximum of {max}x{max}",
                self.width,
                self.height,
                max = u16::MAX
            )));
        }
        for (name, v) in [
            ("vert_margin", self.vert_margin),
            ("left_margin", self.left_margin),
            ("right_margin", self.right_margin),
            ("left_bar_margin", self.left_bar_margin),
        ] {
            if !(0.0..0.5).contains(&v) {
                return Err(PlotError::validation(format!(
                    "{name} must be within [0, 0.5), got {v}"
                )));
            }
        }
        if self.scale_ticks < 2 {
            return Err(PlotError::validation("scale_ticks must be at least 2"));
        }
        for (name, v) in [
            ("bar_width", self.bar_width),
            ("solution_line_width", self.solution_line_width),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PlotError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Header/footer text size in pixels.
    pub fn text_size_px(&self) -> f32 {
        (f64::from(self.height) * self.vert_margin / 1.7).trunc() as f32
    }

    /// Scale label text size in pixels.
    pub fn scale_text_size_px(&self) -> f32 {
        (self.right_margin * f64::from(self.width) / 5.0).trunc() as f32
    }

    /// Load a style from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> PlotResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PlotError::from_io(path, e))?;
        let style: Self = serde_json::from_str(&raw).map_err(|e| {
            PlotError::validation(format!("invalid style file '{}': {e}", path.display()))
        })?;
        style.validate()?;
        Ok(style)
    }
}

/// Output directories for the two artifact kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDirs {
    pub gif_dir: PathBuf,
    pub mp4_dir: PathBuf,
}

impl OutputDirs {
    /// `<media_root>/gifs` and `<media_root>/mp4s`.
    pub fn under(media_root: impl AsRef<Path>) -> Self {
        let root = media_root.as_ref();
        Self {
            gif_dir: root.join("gifs"),
            mp4_dir: root.join("mp4s"),
        }
    }

    pub fn create(&self) -> PlotResult<()> {
        use anyhow::Context as _;
        for dir in [&self.gif_dir, &self.mp4_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    pub fn gif_path(&self, stem: &str) -> PathBuf {
        self.gif_dir.join(format!("{stem}.gif"))
    }

    pub fn mp4_path(&self, stem: &str) -> PathBuf {
        self.mp4_dir.join(format!("{stem}.mp4"))
    }
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self::under("media")
    }
}
