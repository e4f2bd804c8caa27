//! Turning a run's frames into animation files.
//!
//! GIF output always succeeds or fails the run; MP4 output is best effort and only
//! attempted when ffmpeg is available.

/// GIF backend selection and frame timing.
pub mod backend;
/// ffmpeg-driven GIF and MP4 encoders.
pub mod ffmpeg;
/// Built-in and ImageMagick GIF encoders.
pub mod gif;
/// Scoped external encoder processes.
pub mod process;

use std::path::{Path, PathBuf};

use crate::{
    encode::{
        backend::{FrameDelay, GifBackend, Toolchain, select_gif_backend},
        ffmpeg::Mp4Encoder,
    },
    foundation::error::PlotResult,
    render::frame::Frame,
};

/// What was written for one run.
#[derive(Debug)]
pub struct EncodeReport {
    pub gif: PathBuf,
    pub delay: FrameDelay,
    /// `None` when MP4 output is disabled; otherwise the written path or why it failed.
    pub mp4: Option<PlotResult<PathBuf>>,
}

pub struct AnimationEncoder {
    gif: Box<dyn GifBackend>,
    video: Option<Mp4Encoder>,
}

impl AnimationEncoder {
    pub fn new(gif: Box<dyn GifBackend>, video: Option<Mp4Encoder>) -> Self {
        Self { gif, video }
    }

    pub fn from_toolchain(toolchain: &Toolchain) -> Self {
        Self::new(
            select_gif_backend(toolchain),
            toolchain.ffmpeg.then_some(Mp4Encoder),
        )
    }

    pub fn gif_backend(&self) -> &str {
        self.gif.name()
    }

    pub fn writes_video(&self) -> bool {
        self.video.is_some()
    }

    /// Write the GIF, then (if enabled) the MP4. Only GIF failures are returned as errors.
    #[tracing::instrument(skip(self, frames), fields(frames = frames.len(), backend = self.gif.name()))]
    pub fn encode(
        &self,
        frames: &[Frame],
        duration_secs: f64,
        gif_path: &Path,
        mp4_path: &Path,
    ) -> PlotResult<EncodeReport> {
        let delay = FrameDelay::for_run(duration_secs, frames.len())?;
        self.gif.write_gif(frames, delay, gif_path)?;
        tracing::debug!(path = %gif_path.display(), "wrote GIF");

        let mp4 = self.video.map(|video| {
            video
                .write_mp4(frames, delay, mp4_path)
                .map(|()| mp4_path.to_path_buf())
        });

        Ok(EncodeReport {
            gif: gif_path.to_path_buf(),
            delay,
            mp4,
        })
    }
}

impl std::fmt::Debug for AnimationEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationEncoder")
            .field("gif", &self.gif.name())
            .field("video", &self.video.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::gif::InProcessGif;

    #[test]
    fn builtin_encoder_writes_gif_without_video() {
        let dir = PathBuf::from("target").join("encode_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let gif = dir.join("solid.gif");
        let _ = std::fs::remove_file(&gif);

        let frame = Frame::from_premul(2, 2, &[0; 16], [9, 9, 9]).unwrap();
        let encoder = AnimationEncoder::new(Box::new(InProcessGif::default()), None);
        assert_eq!(encoder.gif_backend(), "builtin");
        assert!(!encoder.writes_video());

        let report = encoder
            .encode(&[frame.clone(), frame], 5.0, &gif, &dir.join("solid.mp4"))
            .unwrap();
        assert!(report.mp4.is_none());
        assert!((report.delay.centiseconds() - 250.0).abs() < 1e-9);
        assert!(std::fs::metadata(&gif).unwrap().len() > 0);
    }

    #[test]
    fn no_frames_is_an_error() {
        let encoder = AnimationEncoder::new(Box::new(InProcessGif::default()), None);
        assert!(
            encoder
                .encode(&[], 5.0, Path::new("target/x.gif"), Path::new("target/x.mp4"))
                .is_err()
        );
    }
}
