use std::path::Path;

use crate::foundation::error::{PlotError, PlotResult};

/// Marker that starts a metadata comment line.
pub const COMMENT_MARKER: char = '#';

/// Run-level configuration read from the comments of a run's first generation file.
#[derive(Clone, Debug, PartialEq)]
pub struct RunMetadata {
    pub objective_name: String,
    pub scalarizer_name: String,
    pub k: i64,
    /// Number of dimensions of every solution; also the number of bars.
    pub n: usize,
    pub value_min: f64,
    pub value_max: f64,
    pub language_label: Option<String>,
}

impl RunMetadata {
    /// Validate and build metadata from already-typed values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        objective_name: impl Into<String>,
        scalarizer_name: impl Into<String>,
        k: i64,
        n: usize,
        value_min: f64,
        value_max: f64,
        language_label: Option<String>,
        source: &Path,
    ) -> PlotResult<Self> {
        if n < 2 {
            return Err(PlotError::metadata(
                source,
                format!("n must be at least 2, got {n}"),
            ));
        }
        if !value_min.is_finite() || !value_max.is_finite() {
            return Err(PlotError::metadata(source, "Rmin and Rmax must be finite"));
        }
        if value_max <= value_min {
            return Err(PlotError::metadata(
                source,
                format!("Rmax ({value_max}) must be greater than Rmin ({value_min})"),
            ));
        }
        Ok(Self {
            objective_name: objective_name.into(),
            scalarizer_name: scalarizer_name.into(),
            k,
            n,
            value_min,
            value_max,
            language_label,
        })
    }

    /// Parse the `# Key=Value` comment lines of a generation file.
    ///
    /// Lines that are not comments, or comments without `=`, are ignored. The first
    /// occurrence of a key wins.
    pub fn from_comments<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        source: &Path,
    ) -> PlotResult<Self> {
        let mut fields = CommentFields::default();
        for line in lines {
            let Some(body) = line.trim_start().strip_prefix(COMMENT_MARKER) else {
                continue;
            };
            let Some((key, value)) = body.split_once('=') else {
                continue;
            };
            let value = value.trim();
            let slot = match key.trim() {
                "Function" => &mut fields.function,
                "Scalarizer" => &mut fields.scalarizer,
                "k" => &mut fields.k,
                "n" => &mut fields.n,
                "Rmin" => &mut fields.rmin,
                "Rmax" => &mut fields.rmax,
                "Lang" => &mut fields.lang,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        let function = required(fields.function, "Function", source)?;
        let scalarizer = required(fields.scalarizer, "Scalarizer", source)?;
        let k = parse_num::<i64>(required(fields.k, "k", source)?, "k", source)?;
        let n = parse_num::<usize>(required(fields.n, "n", source)?, "n", source)?;
        let rmin = parse_num::<f64>(required(fields.rmin, "Rmin", source)?, "Rmin", source)?;
        let rmax = parse_num::<f64>(required(fields.rmax, "Rmax", source)?, "Rmax", source)?;
        let lang = fields.lang.filter(|l| !l.is_empty());

        Self::new(function, scalarizer, k, n, rmin, rmax, lang, source)
    }

    pub fn dimension_count(&self) -> usize {
        self.n
    }

    pub fn value_range(&self) -> f64 {
        self.value_max - self.value_min
    }
}

#[derive(Default)]
struct CommentFields {
    function: Option<String>,
    scalarizer: Option<String>,
    k: Option<String>,
    n: Option<String>,
    rmin: Option<String>,
    rmax: Option<String>,
    lang: Option<String>,
}

fn required(value: Option<String>, key: &str, source: &Path) -> PlotResult<String> {
    value.ok_or_else(|| PlotError::metadata(source, format!("missing required comment '# {key}='")))
}

fn parse_num<T: std::str::FromStr>(raw: String, key: &str, source: &Path) -> PlotResult<T> {
    raw.parse::<T>().map_err(|_| {
        PlotError::metadata(source, format!("'{key}' has a non-numeric value '{raw}'"))
    })
}
