//! Run-level orchestration: discover, parse, render and encode.

use std::path::{Path, PathBuf};

use crate::{
    config::{OutputDirs, RunOptions},
    encode::AnimationEncoder,
    foundation::{
        cancel::CancelToken,
        error::{PlotError, PlotResult},
    },
    input::{
        discover::{RunGroup, discover_runs, generation_label},
        hypervolume::HypervolumeTracker,
        metadata::RunMetadata,
        solutions::{ColorMode, GenerationFile, SolutionSet},
    },
    render::{
        cpu::{FrameLabels, FrameRenderer},
        frame::Frame,
        palette::Palette,
    },
};

/// Frames of one run, in generation order.
#[derive(Debug)]
pub struct RenderedRun {
    pub run_number: u64,
    pub stem: String,
    pub meta: RunMetadata,
    pub mode: ColorMode,
    pub frames: Vec<Frame>,
}

/// Files written for one run.
#[derive(Clone, Debug)]
pub struct RunArtifacts {
    pub run_number: u64,
    pub frame_count: usize,
    pub gif: PathBuf,
    pub mp4: Option<PathBuf>,
}

/// Render every stepped generation of `group`.
///
/// Metadata and colour mode come from the run's first file and hold for the whole run.
#[tracing::instrument(skip_all, fields(run = group.run_number))]
pub fn render_run(
    group: &RunGroup,
    opts: &RunOptions,
    renderer: &mut FrameRenderer,
    cancel: &CancelToken,
) -> PlotResult<RenderedRun> {
    let mut paths = group.stepped(opts.stepping);
    let Some(first_path) = paths.next() else {
        return Err(PlotError::validation(format!(
            "run {} has no generation files",
            group.run_number
        )));
    };

    cancel.check()?;
    let first = GenerationFile::read(first_path)?;
    let meta = RunMetadata::from_comments(first.comment_lines(), first_path)?;
    let mode = ColorMode::detect(&first, &meta)?;
    if mode == ColorMode::ByPosition {
        tracing::warn!(
            "no rank column in '{}'; colouring solutions by file position",
            first_path.display()
        );
    }

    let mut hypervolume = HypervolumeTracker::new(opts.show_hypervolume);
    let mut frames = Vec::new();
    frames.push(render_generation(
        renderer,
        first_path,
        &first,
        &meta,
        mode,
        &mut hypervolume,
    )?);
    for path in paths {
        cancel.check()?;
        let file = GenerationFile::read(path)?;
        frames.push(render_generation(
            renderer,
            path,
            &file,
            &meta,
            mode,
            &mut hypervolume,
        )?);
    }

    Ok(RenderedRun {
        run_number: group.run_number,
        stem: group.output_stem(),
        meta,
        mode,
        frames,
    })
}

fn render_generation(
    renderer: &mut FrameRenderer,
    path: &Path,
    file: &GenerationFile,
    meta: &RunMetadata,
    mode: ColorMode,
    hypervolume: &mut HypervolumeTracker,
) -> PlotResult<Frame> {
    let set = SolutionSet::from_generation(file, meta, mode)?;
    let style = renderer.style();
    let palette = Palette::for_set(style.color_best, style.color_worst, &set, mode)?;
    let generation = generation_label(path).unwrap_or_else(|| "?".to_string());
    let labels = FrameLabels {
        meta,
        mode,
        generation: &generation,
        hypervolume: hypervolume.value_for(path),
    };
    tracing::trace!(file = %path.display(), solutions = set.len(), "rendering generation");
    renderer.render(&set, &palette, &labels)
}

/// Everything needed to turn a directory of runs into animations.
#[derive(Debug)]
pub struct Pipeline {
    pub options: RunOptions,
    pub dirs: OutputDirs,
    pub renderer: FrameRenderer,
    pub encoder: AnimationEncoder,
    pub cancel: CancelToken,
}

impl Pipeline {
    /// Discover runs under `input_dir` and process them in ascending run order.
    pub fn run_dir(&mut self, input_dir: &Path) -> PlotResult<Vec<RunArtifacts>> {
        let runs = discover_runs(input_dir)?;
        tracing::info!(
            runs = runs.len(),
            "found generation files in '{}'",
            input_dir.display()
        );
        self.dirs.create()?;
        self.process_runs(&runs)
    }

    /// Render and encode each run; frames are dropped before the next run starts.
    ///
    /// A failed GIF aborts; a failed MP4 is logged and processing continues.
    pub fn process_runs(&mut self, runs: &[RunGroup]) -> PlotResult<Vec<RunArtifacts>> {
        let mut artifacts = Vec::with_capacity(runs.len());
        for group in runs {
            self.cancel.check()?;
            let stem = group.output_stem();
            tracing::info!("Creating animation for run {} ({stem})", group.run_number);

            let rendered = render_run(group, &self.options, &mut self.renderer, &self.cancel)?;
            let report = self.encoder.encode(
                &rendered.frames,
                self.options.duration_secs,
                &self.dirs.gif_path(&stem),
                &self.dirs.mp4_path(&stem),
            )?;

            let mp4 = match report.mp4 {
                Some(Ok(path)) => Some(path),
                Some(Err(err)) => {
                    tracing::error!("MP4 output for run {} failed: {err}", group.run_number);
                    None
                }
                None => None,
            };
            tracing::info!(
                gif = %report.gif.display(),
                frames = rendered.frames.len(),
                "finished run {}",
                group.run_number
            );
            artifacts.push(RunArtifacts {
                run_number: group.run_number,
                frame_count: rendered.frames.len(),
                gif: report.gif,
                mp4,
            });
        }
        Ok(artifacts)
    }
}
