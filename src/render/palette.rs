use crate::{
    foundation::error::{PlotError, PlotResult},
    input::solutions::{ColorMode, SolutionSet},
};

pub type Rgb8 = [u8; 3];

/// Linear best-to-worst colour gradient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb8>,
}

impl Palette {
    /// `size` colours, interpolated per channel from `best` (index 0) to `worst`
    /// (index `size - 1`), truncated toward zero.
    pub fn linear(best: Rgb8, worst: Rgb8, size: usize) -> PlotResult<Self> {
        if size == 0 {
            return Err(PlotError::validation("palette size must be at least 1"));
        }
        let colors = (0..size)
            .map(|i| {
                if size > 1 && i == size - 1 {
                    return worst;
                }
                std::array::from_fn(|ch| lerp_channel(best[ch], worst[ch], i, size))
            })
            .collect();
        Ok(Self { colors })
    }

    /// Palette for one generation: `max_rank` entries when ranked, one per solution
    /// otherwise.
    pub fn for_set(
        best: Rgb8,
        worst: Rgb8,
        set: &SolutionSet,
        mode: ColorMode,
    ) -> PlotResult<Self> {
        let size = match (mode, set.max_rank()) {
            (ColorMode::ByRank, Some(max_rank)) => max_rank as usize,
            _ => set.len(),
        };
        Self::linear(best, worst, size)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// Colour of the solution at `position`, given its optional rank.
    ///
    /// Ranked solutions map rank `r` to entry `r - 1`; unranked ones use their position.
    /// Out-of-range lookups clamp to the worst colour.
    pub fn color_for(&self, position: usize, rank: Option<u32>) -> Rgb8 {
        let idx = match rank {
            Some(r) => (r as usize).saturating_sub(1),
            None => position,
        };
        let last = self.colors.len() - 1;
        self.colors[idx.min(last)]
    }
}

fn lerp_channel(best: u8, worst: u8, i: usize, size: usize) -> u8 {
    if size == 1 {
        return best;
    }
    let step = (f64::from(worst) - f64::from(best)) / (size - 1) as f64;
    let v = f64::from(best) + step * i as f64;
    v.trunc().clamp(0.0, 255.0) as u8
}
