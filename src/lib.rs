//! Paracoord renders the solution files of multi-objective optimization runs as
//! parallel-coordinates animations.
//!
//! Each run is a series of `run<R>_gen<G>.pos` files. Every generation becomes one frame,
//! and each run becomes one looping GIF plus, when ffmpeg is available, one MP4.
#![forbid(unsafe_code)]

pub mod config;
/// Animation output: GIF backends, MP4 and external encoder processes.
pub mod encode;
pub mod foundation;
/// Run discovery and generation-file parsing.
pub mod input;
pub mod pipeline;
/// Frame layout and CPU rasterization.
pub mod render;

pub use crate::config::{OutputDirs, RenderStyle, RunOptions};
pub use crate::encode::{
    AnimationEncoder, EncodeReport,
    backend::{FrameDelay, GifBackend, Toolchain},
};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::error::{PlotError, PlotResult};
pub use crate::input::discover::{RunGroup, discover_runs};
pub use crate::pipeline::{Pipeline, RunArtifacts, render_run};
pub use crate::render::{cpu::FrameRenderer, frame::Frame, text::TextRenderer};
