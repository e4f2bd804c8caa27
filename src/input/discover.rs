use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::foundation::error::{PlotError, PlotResult};

static POS_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)run.*_gen.*\.pos$").expect("static regex is valid")
});
static RUN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)run([^_]*)").expect("static regex is valid"));
static GEN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_gen([0-9]+)").expect("static regex is valid"));

/// All generation files of one run, in filename order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunGroup {
    pub run_number: u64,
    pub files: Vec<PathBuf>,
}

impl RunGroup {
    /// Files at positions `0, stepping, 2*stepping, …`. A stepping of 0 is treated as 1.
    pub fn stepped(&self, stepping: usize) -> impl Iterator<Item = &PathBuf> {
        self.files.iter().step_by(stepping.max(1))
    }

    /// Output name shared by the run's artifacts: the first filename without its
    /// `_gen<digits>` parts and without the `.pos` extension.
    pub fn output_stem(&self) -> String {
        let name = self
            .files
            .first()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stripped = GEN_SUFFIX.replace_all(&name, "");
        match stripped.len().checked_sub(".pos".len()) {
            Some(cut) if stripped.is_char_boundary(cut) => stripped[..cut].to_string(),
            _ => stripped.into_owned(),
        }
    }
}

pub fn is_generation_file(name: &str) -> bool {
    POS_FILE.is_match(name)
}

/// Integer between the first `run` token and the next `_`.
pub fn run_number(name: &str) -> Option<u64> {
    RUN_TOKEN
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Digits following `_gen` in a filename, as written (leading zeros kept).
pub fn generation_label(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    GEN_SUFFIX
        .captures(&name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Group already-known file paths into runs ordered by run number.
pub fn group_runs(paths: impl IntoIterator<Item = PathBuf>) -> Vec<RunGroup> {
    let mut named: Vec<(String, PathBuf)> = paths
        .into_iter()
        .filter_map(|p| {
            let name = p.file_name()?.to_string_lossy().into_owned();
            is_generation_file(&name).then_some((name, p))
        })
        .collect();
    named.sort();

    let mut runs: BTreeMap<u64, Vec<PathBuf>> = BTreeMap::new();
    for (name, path) in named {
        match run_number(&name) {
            Some(run) => runs.entry(run).or_default().push(path),
            None => tracing::warn!("skipping '{name}': run number is not an integer"),
        }
    }

    runs.into_iter()
        .map(|(run_number, files)| RunGroup { run_number, files })
        .collect()
}

/// List `dir` and group its generation files. No matching file is a [`PlotError::Discovery`].
pub fn discover_runs(dir: &Path) -> PlotResult<Vec<RunGroup>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PlotError::from_io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PlotError::from_io(dir, e))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            paths.push(entry.path());
        }
    }

    let runs = group_runs(paths);
    if runs.is_empty() {
        return Err(PlotError::discovery(format!(
            "no .pos files with generation numbers found in '{}'",
            dir.display()
        )));
    }
    tracing::debug!(runs = runs.len(), "discovered runs");
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn matches_naming_convention_case_insensitively() {
        assert!(is_generation_file("run1_gen0.pos"));
        assert!(is_generation_file("ACO_Run12_GEN40.pos"));
        assert!(!is_generation_file("run1_gen0.hv"));
        assert!(!is_generation_file("gen0_run1.pos"));
        assert!(!is_generation_file("notes.pos"));
    }

    #[test]
    fn extracts_run_numbers_and_generation_labels() {
        assert_eq!(run_number("aco_RUN12_gen3.pos"), Some(12));
        assert_eq!(run_number("runX_gen3.pos"), None);
        assert_eq!(
            generation_label(Path::new("dir/run1_Gen0040.pos")).as_deref(),
            Some("0040")
        );
    }

    #[test]
    fn groups_by_run_then_filename() {
        let runs = group_runs(paths(&[
            "run2_gen0.pos",
            "run1_gen10.pos",
            "readme.txt",
            "run1_gen0.pos",
            "run10_gen0.pos",
            "run1_gen10.hv",
        ]));
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].run_number, 1);
        assert_eq!(
            runs[0].files,
            paths(&["run1_gen0.pos", "run1_gen10.pos"])
        );
        assert_eq!(runs[1].run_number, 2);
        assert_eq!(runs[2].run_number, 10);
    }

    #[test]
    fn stepping_keeps_every_nth_file_from_the_first() {
        let group = RunGroup {
            run_number: 1,
            files: paths(&["a", "b", "c", "d", "e", "f", "g"]),
        };
        let all: Vec<_> = group.stepped(1).cloned().collect();
        assert_eq!(all, group.files);
        let third: Vec<_> = group.stepped(3).cloned().collect();
        assert_eq!(third, paths(&["a", "d", "g"]));
        assert_eq!(group.stepped(0).count(), 7);
    }

    #[test]
    fn output_stem_drops_generation_and_extension() {
        let group = RunGroup {
            run_number: 1,
            files: paths(&["in/aco_run1_gen0.pos"]),
        };
        assert_eq!(group.output_stem(), "aco_run1");
    }

    #[test]
    fn empty_directory_is_a_discovery_error() {
        let dir = PathBuf::from("target").join("discover_tests").join("empty");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();
        assert!(matches!(
            discover_runs(&dir),
            Err(PlotError::Discovery(_))
        ));
    }
}
