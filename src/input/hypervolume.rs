use std::path::{Path, PathBuf};

/// Companion hypervolume file for a `.pos` file: same stem, `.hv` extension.
pub fn companion_path(pos_path: &Path) -> PathBuf {
    pos_path.with_extension("hv")
}

/// Why a hypervolume could not be read. Never fatal; it only switches the display off.
#[derive(Debug, thiserror::Error)]
pub enum HypervolumeIssue {
    #[error("file '{}' not found", .0.display())]
    Missing(PathBuf),
    #[error("you do not have the permissions to read file '{}'", .0.display())]
    Unreadable(PathBuf),
    #[error("file '{}' is empty", .0.display())]
    Empty(PathBuf),
    #[error("file '{}' contains an invalid hypervolume value", .0.display())]
    Invalid(PathBuf),
}

pub fn read_hypervolume(pos_path: &Path) -> Result<f64, HypervolumeIssue> {
    let path = companion_path(pos_path);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HypervolumeIssue::Missing(path));
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(HypervolumeIssue::Invalid(path));
        }
        Err(_) => return Err(HypervolumeIssue::Unreadable(path)),
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HypervolumeIssue::Empty(path));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(HypervolumeIssue::Invalid(path)),
    }
}

/// Per-run hypervolume state: once a read fails, the display stays off for the run.
#[derive(Debug)]
pub struct HypervolumeTracker {
    enabled: bool,
}

impl HypervolumeTracker {
    pub fn new(requested: bool) -> Self {
        Self { enabled: requested }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Hypervolume to show for `pos_path`, or `None` if display is (now) disabled.
    pub fn value_for(&mut self, pos_path: &Path) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        match read_hypervolume(pos_path) {
            Ok(v) => Some(v),
            Err(issue) => {
                tracing::warn!("{issue}; will not attempt to show any hypervolumes this run");
                self.enabled = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("hv_tests").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn companion_swaps_extension() {
        assert_eq!(
            companion_path(Path::new("d/run1_gen10.pos")),
            PathBuf::from("d/run1_gen10.hv")
        );
    }

    #[test]
    fn reads_valid_value() {
        let dir = scratch_dir("valid");
        std::fs::write(dir.join("run1_gen0.hv"), "1.25e3\n").unwrap();
        assert_eq!(read_hypervolume(&dir.join("run1_gen0.pos")).unwrap(), 1250.0);
    }

    #[test]
    fn classifies_problems() {
        let dir = scratch_dir("issues");
        std::fs::write(dir.join("empty_gen0.hv"), "  \n").unwrap();
        std::fs::write(dir.join("bad_gen0.hv"), "abc").unwrap();
        assert!(matches!(
            read_hypervolume(&dir.join("none_gen0.pos")),
            Err(HypervolumeIssue::Missing(_))
        ));
        assert!(matches!(
            read_hypervolume(&dir.join("empty_gen0.pos")),
            Err(HypervolumeIssue::Empty(_))
        ));
        assert!(matches!(
            read_hypervolume(&dir.join("bad_gen0.pos")),
            Err(HypervolumeIssue::Invalid(_))
        ));
    }

    #[test]
    fn tracker_disables_for_rest_of_run() {
        let dir = scratch_dir("tracker");
        std::fs::write(dir.join("run1_gen0.hv"), "2.0").unwrap();
        std::fs::write(dir.join("run1_gen20.hv"), "3.0").unwrap();

        let mut hv = HypervolumeTracker::new(true);
        assert_eq!(hv.value_for(&dir.join("run1_gen0.pos")), Some(2.0));
        assert_eq!(hv.value_for(&dir.join("run1_gen10.pos")), None);
        assert!(!hv.enabled());
        assert_eq!(hv.value_for(&dir.join("run1_gen20.pos")), None);
    }

    #[test]
    fn tracker_off_never_reads() {
        let mut hv = HypervolumeTracker::new(false);
        assert_eq!(hv.value_for(Path::new("whatever_gen0.pos")), None);
    }
}
