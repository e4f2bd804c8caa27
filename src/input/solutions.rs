use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{PlotError, PlotResult},
    input::metadata::{COMMENT_MARKER, RunMetadata},
};

pub const FIELD_DELIMITER: char = '\t';

/// One parsed `.pos` file: its comment lines and its numeric rows.
#[derive(Clone, Debug)]
pub struct GenerationFile {
    pub path: PathBuf,
    pub comments: Vec<String>,
    rows: Vec<Row>,
}

#[derive(Clone, Debug)]
struct Row {
    /// 1-based line number in the source file.
    line: usize,
    values: Vec<f64>,
}

impl GenerationFile {
    pub fn read(path: &Path) -> PlotResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PlotError::from_io(path, e))?;
        Self::parse(path, &text)
    }

    /// Split `text` into comments and tab-delimited float rows.
    ///
    /// Blank lines are skipped. Every row must parse completely and all rows must share
    /// one column count.
    pub fn parse(path: &Path, text: &str) -> PlotResult<Self> {
        let mut comments = Vec::new();
        let mut rows: Vec<Row> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with(COMMENT_MARKER) {
                comments.push(line.to_string());
                continue;
            }

            let values = line
                .split(FIELD_DELIMITER)
                .map(|field| {
                    let field = field.trim();
                    field.parse::<f64>().map_err(|_| {
                        PlotError::format(path, line_no, format!("'{field}' is not a number"))
                    })
                })
                .collect::<PlotResult<Vec<f64>>>()?;

            if let Some(first) = rows.first()
                && first.values.len() != values.len()
            {
                return Err(PlotError::format(
                    path,
                    line_no,
                    format!(
                        "row has {} columns but line {} has {}",
                        values.len(),
                        first.line,
                        first.values.len()
                    ),
                ));
            }
            rows.push(Row {
                line: line_no,
                values,
            });
        }

        if rows.is_empty() {
            return Err(PlotError::format(path, 0, "file contains no solutions"));
        }

        Ok(Self {
            path: path.to_path_buf(),
            comments,
            rows,
        })
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.values.len())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn comment_lines(&self) -> impl Iterator<Item = &str> {
        self.comments.iter().map(String::as_str)
    }

    fn first_line(&self) -> usize {
        self.rows.first().map_or(0, |r| r.line)
    }
}

/// How solution colours are chosen for a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Trailing rank column present; colour follows rank (1 = best).
    ByRank,
    /// No rank column; colour follows the row's position in the file.
    ByPosition,
}

impl ColorMode {
    /// Pick the mode from the column count of a run's first generation.
    pub fn detect(file: &GenerationFile, meta: &RunMetadata) -> PlotResult<Self> {
        let cols = file.column_count();
        if cols == meta.n + 1 {
            Ok(Self::ByRank)
        } else if cols == meta.n {
            Ok(Self::ByPosition)
        } else {
            Err(PlotError::format(
                &file.path,
                file.first_line(),
                format!(
                    "expected {} or {} columns for n={}, found {cols}",
                    meta.n,
                    meta.n + 1,
                    meta.n
                ),
            ))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub values: Vec<f64>,
    pub rank: Option<u32>,
}

/// The non-empty, uniformly sized population of one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionSet {
    solutions: Vec<Solution>,
    max_rank: Option<u32>,
}

impl SolutionSet {
    /// Interpret `file` under the run's fixed `mode`.
    ///
    /// `ByRank` requires the rank column and orders solutions by ascending rank (stable).
    /// `ByPosition` keeps file order and ignores a rank column if one is present.
    pub fn from_generation(
        file: &GenerationFile,
        meta: &RunMetadata,
        mode: ColorMode,
    ) -> PlotResult<Self> {
        let n = meta.n;
        let cols = file.column_count();
        let expected_ok = match mode {
            ColorMode::ByRank => cols == n + 1,
            ColorMode::ByPosition => cols == n || cols == n + 1,
        };
        if !expected_ok {
            return Err(PlotError::format(
                &file.path,
                file.first_line(),
                match mode {
                    ColorMode::ByRank => format!(
                        "run is coloured by rank, expected {} columns but found {cols}",
                        n + 1
                    ),
                    ColorMode::ByPosition => {
                        format!("expected {n} or {} columns, found {cols}", n + 1)
                    }
                },
            ));
        }

        let rank_limit = max_rank_for(file.rows.len());
        let mut solutions = Vec::with_capacity(file.rows.len());
        for row in &file.rows {
            let rank = match mode {
                ColorMode::ByRank => Some(parse_rank(
                    row.values[n],
                    rank_limit,
                    &file.path,
                    row.line,
                )?),
                ColorMode::ByPosition => None,
            };
            solutions.push(Solution {
                values: row.values[..n].to_vec(),
                rank,
            });
        }

        if mode == ColorMode::ByRank {
            solutions.sort_by_key(|s| s.rank);
        }
        let max_rank = solutions.iter().filter_map(|s| s.rank).max();

        Ok(Self {
            solutions,
            max_rank,
        })
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Largest observed rank; `None` when the set is not ranked.
    pub fn max_rank(&self) -> Option<u32> {
        self.max_rank
    }
}

/// Ranks may be sparse, but never more than this many times the row count; the palette
/// is sized by the largest rank.
pub const MAX_RANK_PER_ROW: u32 = 64;

fn max_rank_for(rows: usize) -> u32 {
    u32::try_from(rows)
        .unwrap_or(u32::MAX)
        .max(1)
        .saturating_mul(MAX_RANK_PER_ROW)
}

fn parse_rank(raw: f64, max_rank: u32, path: &Path, line: usize) -> PlotResult<u32> {
    let r = raw.trunc();
    if r.is_nan() || r < 1.0 {
        return Err(PlotError::format(
            path,
            line,
            format!("rank must be a positive integer, got {raw}"),
        ));
    }
    if r > f64::from(max_rank) {
        return Err(PlotError::format(
            path,
            line,
            format!("rank {raw} exceeds the limit of {max_rank} for this generation"),
        ));
    }
    Ok(r as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(n: usize) -> RunMetadata {
        RunMetadata::new("f1", "s1", 1, n, 0.0, 10.0, None, Path::new("m.pos")).unwrap()
    }

    fn parse(text: &str) -> PlotResult<GenerationFile> {
        GenerationFile::parse(Path::new("run1_gen0.pos"), text)
    }

    #[test]
    fn splits_comments_and_rows() {
        let f = parse("# n=2\n1\t2\t1\n\n3\t4\t2\r\n").unwrap();
        assert_eq!(f.comments, vec!["# n=2".to_string()]);
        assert_eq!(f.row_count(), 2);
        assert_eq!(f.column_count(), 3);
    }

    #[test]
    fn rank_column_selects_by_rank() {
        let f = parse("1\t2\t1\n3\t4\t2\n").unwrap();
        assert_eq!(ColorMode::detect(&f, &meta(2)).unwrap(), ColorMode::ByRank);
    }

    #[test]
    fn missing_rank_column_selects_by_position() {
        let f = parse("1\t2\n3\t4\n").unwrap();
        assert_eq!(
            ColorMode::detect(&f, &meta(2)).unwrap(),
            ColorMode::ByPosition
        );
    }

    #[test]
    fn unexpected_width_is_a_format_error() {
        let f = parse("1\t2\t3\t4\n").unwrap();
        assert!(matches!(
            ColorMode::detect(&f, &meta(2)),
            Err(PlotError::Format { .. })
        ));
    }

    #[test]
    fn ragged_rows_report_line() {
        let err = parse("# c\n1\t2\t1\n3\t4\n").unwrap_err();
        let PlotError::Format { line, .. } = err else {
            panic!("expected format error, got {err:?}");
        };
        assert_eq!(line, 3);
    }

    #[test]
    fn non_numeric_field_fails() {
        assert!(matches!(
            parse("1\tx\t1\n"),
            Err(PlotError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn empty_file_fails() {
        assert!(parse("# Function=f\n\n").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = GenerationFile::read(Path::new("target/definitely/missing_gen0.pos"))
            .unwrap_err();
        assert!(matches!(err, PlotError::NotFound { .. }));
    }

    #[test]
    fn ranked_sets_sort_stably_and_track_max_rank() {
        let f = parse("1\t1\t5\n2\t2\t1\n3\t3\t5\n4\t4\t1\n").unwrap();
        let set = SolutionSet::from_generation(&f, &meta(2), ColorMode::ByRank).unwrap();
        let firsts: Vec<f64> = set.solutions().iter().map(|s| s.values[0]).collect();
        assert_eq!(firsts, vec![2.0, 4.0, 1.0, 3.0]);
        assert_eq!(set.max_rank(), Some(5));
        assert!(set.solutions().iter().all(|s| s.values.len() == 2));
    }

    #[test]
    fn by_position_ignores_rank_column_and_keeps_order() {
        let f = parse("1\t1\t5\n2\t2\t1\n").unwrap();
        let set = SolutionSet::from_generation(&f, &meta(2), ColorMode::ByPosition).unwrap();
        assert_eq!(set.solutions()[0].values, vec![1.0, 1.0]);
        assert_eq!(set.solutions()[0].rank, None);
        assert_eq!(set.max_rank(), None);
    }

    #[test]
    fn by_rank_run_rejects_unranked_generation() {
        let f = parse("1\t1\n").unwrap();
        assert!(SolutionSet::from_generation(&f, &meta(2), ColorMode::ByRank).is_err());
    }

    #[test]
    fn non_positive_rank_fails() {
        let f = parse("1\t1\t0\n").unwrap();
        assert!(matches!(
            SolutionSet::from_generation(&f, &meta(2), ColorMode::ByRank),
            Err(PlotError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn huge_rank_is_rejected_before_sizing_the_palette() {
        let f = parse("1\t1\t1\n2\t2\t4000000000\n").unwrap();
        assert!(matches!(
            SolutionSet::from_generation(&f, &meta(2), ColorMode::ByRank),
            Err(PlotError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn sparse_ranks_within_limit_are_kept() {
        let f = parse("1\t1\t1\n2\t2\t100\n").unwrap();
        let set = SolutionSet::from_generation(&f, &meta(2), ColorMode::ByRank).unwrap();
        assert_eq!(set.max_rank(), Some(100));
        assert_eq!(max_rank_for(2), 2 * MAX_RANK_PER_ROW);
    }
}
