use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};

use crate::{
    encode::{
        backend::{FrameDelay, GifBackend},
        process::run_piped,
    },
    foundation::error::{PlotError, PlotResult},
    render::frame::Frame,
};

/// Quantizer speed for the built-in encoder (1 = best quality, 30 = fastest).
pub const DEFAULT_QUANTIZE_SPEED: i32 = 10;

/// Encode `frames` as an infinitely looping GIF into `out`.
///
/// With `delay == None` every frame gets a zero delay, leaving the timing to whoever
/// post-processes the stream.
pub fn encode_gif<W: Write>(
    frames: &[Frame],
    delay: Option<FrameDelay>,
    speed: i32,
    out: W,
) -> PlotResult<()> {
    if frames.is_empty() {
        return Err(PlotError::validation("cannot encode a GIF with no frames"));
    }
    let delay = match delay {
        Some(d) => image::Delay::from_numer_denom_ms((d.millis() * 10.0).round() as u32, 10),
        None => image::Delay::from_numer_denom_ms(0, 1),
    };

    let mut encoder = GifEncoder::new_with_speed(out, speed);
    encoder
        .set_repeat(Repeat::Infinite)
        .context("failed to set GIF loop count")?;
    for frame in frames {
        let buffer = frame.to_rgba_image()?;
        encoder
            .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
            .context("failed to encode GIF frame")?;
    }
    Ok(())
}

/// Built-in encoder; needs no external tools.
#[derive(Clone, Copy, Debug)]
pub struct InProcessGif {
    pub speed: i32,
}

impl Default for InProcessGif {
    fn default() -> Self {
        Self {
            speed: DEFAULT_QUANTIZE_SPEED,
        }
    }
}

impl GifBackend for InProcessGif {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn write_gif(&self, frames: &[Frame], delay: FrameDelay, out: &Path) -> PlotResult<()> {
        let file = std::fs::File::create(out).map_err(|e| PlotError::from_io(out, e))?;
        let mut writer = std::io::BufWriter::new(file);
        encode_gif(frames, Some(delay), self.speed, &mut writer)?;
        writer.flush().map_err(|e| PlotError::from_io(out, e))
    }
}

/// Pipes a quickly quantized GIF through ImageMagick's `convert`, which re-times and
/// optimizes it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageMagickGif;

impl ImageMagickGif {
    pub fn command(delay: FrameDelay, out: &Path) -> Command {
        let mut cmd = Command::new("convert");
        cmd.args([
            "-delay",
            &delay.centiseconds().to_string(),
            "-loop",
            "0",
            "-",
        ])
        .arg(out);
        cmd
    }
}

impl GifBackend for ImageMagickGif {
    fn name(&self) -> &'static str {
        "imagemagick"
    }

    fn write_gif(&self, frames: &[Frame], delay: FrameDelay, out: &Path) -> PlotResult<()> {
        let mut stream: Vec<u8> = Vec::new();
        encode_gif(frames, None, DEFAULT_QUANTIZE_SPEED, &mut stream)?;
        run_piped(Self::command(delay, out), |stdin| stdin.write_all(&stream))
    }
}
