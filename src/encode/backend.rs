use std::path::Path;

use crate::{
    encode::{
        ffmpeg::FfmpegGif,
        gif::{ImageMagickGif, InProcessGif},
        process::is_tool_on_path,
    },
    foundation::error::{PlotError, PlotResult},
    render::frame::Frame,
};

/// Shortest per-frame delay, in centiseconds. Many GIF viewers ignore anything shorter.
pub const MIN_FRAME_DELAY_CS: f64 = 1.5;

/// Per-frame display time of an animation, in centiseconds (1/100 s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDelay(f64);

impl FrameDelay {
    /// Spread `duration_secs` evenly over `frame_count` frames, floored at
    /// [`MIN_FRAME_DELAY_CS`].
    pub fn for_run(duration_secs: f64, frame_count: usize) -> PlotResult<Self> {
        if frame_count == 0 {
            return Err(PlotError::validation("cannot time an animation with no frames"));
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(PlotError::validation("animation duration must be finite and > 0"));
        }
        let cs = 100.0 * duration_secs / frame_count as f64;
        Ok(Self(cs.max(MIN_FRAME_DELAY_CS)))
    }

    pub fn centiseconds(self) -> f64 {
        self.0
    }

    pub fn millis(self) -> f64 {
        self.0 * 10.0
    }

    /// Input frame rate that plays each frame for this delay.
    pub fn frames_per_second(self) -> f64 {
        100.0 / self.0
    }
}

/// Writes a looping GIF from opaque frames.
pub trait GifBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn write_gif(&self, frames: &[Frame], delay: FrameDelay, out: &Path) -> PlotResult<()>;
}

/// External encoders found on `PATH` at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toolchain {
    pub convert: bool,
    pub ffmpeg: bool,
}

impl Toolchain {
    pub fn detect() -> Self {
        let toolchain = Self {
            convert: is_tool_on_path("convert"),
            ffmpeg: is_tool_on_path("ffmpeg"),
        };
        toolchain.log_summary();
        toolchain
    }

    fn log_summary(&self) {
        if self.convert {
            tracing::info!("ImageMagick 'convert' found; using it for GIF output");
        } else if self.ffmpeg {
            tracing::info!("'convert' not found; using ffmpeg for GIF output");
        } else {
            tracing::info!("neither 'convert' nor ffmpeg found; using the built-in GIF encoder");
        }
        if !self.ffmpeg {
            tracing::warn!("ffmpeg not found on PATH; MP4 output is disabled");
        }
    }
}

/// Highest-priority GIF encoder the toolchain supports: ImageMagick, then ffmpeg, then
/// the built-in encoder.
pub fn select_gif_backend(toolchain: &Toolchain) -> Box<dyn GifBackend> {
    if toolchain.convert {
        Box::new(ImageMagickGif)
    } else if toolchain.ffmpeg {
        Box::new(FfmpegGif)
    } else {
        Box::new(InProcessGif::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_spreads_duration_over_frames() {
        let d = FrameDelay::for_run(5.0, 10).unwrap();
        assert!((d.centiseconds() - 50.0).abs() < 1e-9);
        assert!((d.millis() - 500.0).abs() < 1e-9);
        assert!((d.frames_per_second() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn delay_is_floored() {
        let d = FrameDelay::for_run(1.0, 1000).unwrap();
        assert_eq!(d.centiseconds(), MIN_FRAME_DELAY_CS);
    }

    #[test]
    fn delay_rejects_empty_runs_and_bad_durations() {
        assert!(FrameDelay::for_run(5.0, 0).is_err());
        assert!(FrameDelay::for_run(0.0, 3).is_err());
        assert!(FrameDelay::for_run(f64::NAN, 3).is_err());
    }

    #[test]
    fn backend_priority_follows_toolchain() {
        let all = Toolchain {
            convert: true,
            ffmpeg: true,
        };
        assert_eq!(select_gif_backend(&all).name(), "imagemagick");
        let ffmpeg_only = Toolchain {
            convert: false,
            ffmpeg: true,
        };
        assert_eq!(select_gif_backend(&ffmpeg_only).name(), "ffmpeg");
        assert_eq!(select_gif_backend(&Toolchain::default()).name(), "builtin");
    }
}
