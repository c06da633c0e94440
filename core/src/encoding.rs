use rand::{seq::SliceRandom, Rng};

use crate::{
    condition::Condition,
    error::FormatError,
    naming::{ImageVariant, StimulusNaming},
    stratify::ConditionGrid,
};

/// Shuffle every studied image into one encoding-phase presentation order.
///
/// The foil row is left out: the X row, or the last row of a grid too small
/// to hold X. Rows past X are studied like A to D.
pub fn build_encoding<R: Rng + ?Sized>(
    grid: &ConditionGrid,
    naming: &StimulusNaming,
    rng: &mut R,
) -> Result<Vec<String>, FormatError> {
    let foil = Condition::X
        .row()
        .min(grid.num_conditions().saturating_sub(1));
    let mut ids: Vec<u32> = grid
        .rows()
        .iter()
        .enumerate()
        .filter(|&(row, _)| row != foil)
        .flat_map(|(_, row_ids)| row_ids.iter().copied())
        .collect();
    ids.shuffle(rng);

    ids.into_iter()
        .map(|id| naming.filename(id, ImageVariant::Target))
        .collect()
}
