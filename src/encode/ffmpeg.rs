use std::path::Path;
use std::process::Command;

use crate::{
    encode::{
        backend::{FrameDelay, GifBackend},
        process::run_piped,
    },
    foundation::error::{PlotError, PlotResult},
    render::frame::Frame,
};

/// Output frame rate of every ffmpeg-produced animation.
pub const OUTPUT_FPS: &str = "30";

/// yuv444p and some GIF palettes need even dimensions.
const EVEN_SCALE_FILTER: &str = "scale=trunc(iw/2)*2:trunc(ih/2)*2";

/// Input side shared by the GIF and MP4 commands: PNG frames on stdin at `100 / delay` fps.
fn png_pipe_command(delay: FrameDelay) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-loglevel",
        "error",
        "-framerate",
        &delay.frames_per_second().to_string(),
        "-f",
        "image2pipe",
        "-vcodec",
        "png",
        "-i",
        "-",
        "-vf",
        EVEN_SCALE_FILTER,
    ]);
    cmd
}

fn stream_frames(cmd: Command, frames: &[Frame]) -> PlotResult<()> {
    if frames.is_empty() {
        return Err(PlotError::validation("cannot encode an animation with no frames"));
    }
    run_piped(cmd, |stdin| {
        for frame in frames {
            frame.write_png(&mut *stdin)?;
        }
        Ok(())
    })
}

/// GIF output through ffmpeg's `rgb8` palette.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegGif;

impl FfmpegGif {
    pub fn command(delay: FrameDelay, out: &Path) -> Command {
        let mut cmd = png_pipe_command(delay);
        cmd.args(["-pix_fmt", "rgb8", "-r", OUTPUT_FPS, "-y"])
            .arg(out);
        cmd
    }
}

impl GifBackend for FfmpegGif {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn write_gif(&self, frames: &[Frame], delay: FrameDelay, out: &Path) -> PlotResult<()> {
        stream_frames(Self::command(delay, out), frames)
    }
}

/// H.264 MP4 output; only available when ffmpeg is on `PATH`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mp4Encoder;

impl Mp4Encoder {
    pub fn command(delay: FrameDelay, out: &Path) -> Command {
        let mut cmd = png_pipe_command(delay);
        cmd.args([
            "-vcodec",
            "libx264",
            "-crf",
            "25",
            "-maxrate",
            "10M",
            "-bufsize",
            "5M",
            "-pix_fmt",
            "yuv444p",
            "-r",
            OUTPUT_FPS,
            "-y",
        ])
        .arg(out);
        cmd
    }

    pub fn write_mp4(&self, frames: &[Frame], delay: FrameDelay, out: &Path) -> PlotResult<()> {
        stream_frames(Self::command(delay, out), frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::process::command_line;

    #[test]
    fn gif_command_pipes_png_frames() {
        let delay = FrameDelay::for_run(5.0, 10).unwrap();
        let line = command_line(&FfmpegGif::command(delay, Path::new("out.gif")));
        assert_eq!(
            line,
            "ffmpeg -loglevel error -framerate 2 -f image2pipe -vcodec png -i - \
             -vf scale=trunc(iw/2)*2:trunc(ih/2)*2 -pix_fmt rgb8 -r 30 -y out.gif"
        );
    }

    #[test]
    fn mp4_command_uses_x264() {
        let delay = FrameDelay::for_run(5.0, 10).unwrap();
        let line = command_line(&Mp4Encoder::command(delay, Path::new("out.mp4")));
        assert!(line.contains("-vcodec libx264 -crf 25 -maxrate 10M -bufsize 5M"));
        assert!(line.contains("-pix_fmt yuv444p -r 30 -y out.mp4"));
    }

    #[test]
    fn empty_frames_fail_before_spawning() {
        let delay = FrameDelay::for_run(5.0, 10).unwrap();
        let err = Mp4Encoder
            .write_mp4(&[], delay, Path::new("target/never.mp4"))
            .unwrap_err();
        assert!(matches!(err, PlotError::Validation(_)));
    }
}
