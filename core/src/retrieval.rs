use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    condition::TrialType,
    error::{DataError, TrialError},
    naming::{ImageVariant, StimulusNaming},
    stratify::{BinVector, ConditionGrid},
};

/// One forced-choice test trial as shown on screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTrial {
    pub left: String,
    pub right: String,
    pub trial_type: TrialType,
    pub lure_bin: i64,
}

/// Build the test-phase list: every trial type once per grid column.
///
/// Each trial pairs the target (`a`) image from the first condition of its
/// type with the lure (`b`) image from the second, taken from the same
/// column and therefore the same lure bin. The side holding the target is
/// drawn per trial, then the whole list is shuffled.
pub fn build_test<R: Rng + ?Sized>(
    grid: &ConditionGrid,
    bins: &BinVector,
    naming: &StimulusNaming,
    rng: &mut R,
) -> Result<Vec<TestTrial>, TrialError> {
    if bins.len() != grid.img_per_cond() {
        return Err(DataError::BinVectorMismatch {
            columns: grid.img_per_cond(),
            bins: bins.len(),
        }
        .into());
    }

    let mut trials = Vec::with_capacity(TrialType::ALL.len() * bins.len());
    for trial_type in TrialType::ALL {
        let (target_condition, lure_condition) = trial_type.pairing();
        let targets = grid.row(target_condition)?;
        let lures = grid.row(lure_condition)?;

        for ((&target, &lure), &lure_bin) in targets.iter().zip(lures).zip(bins.iter()) {
            let mut pair = [
                naming.filename(target, ImageVariant::Target)?,
                naming.filename(lure, ImageVariant::Lure)?,
            ];
            pair.shuffle(rng);
            let [left, right] = pair;

            trials.push(TestTrial {
                left,
                right,
                trial_type,
                lure_bin,
            });
        }
    }

    trials.shuffle(rng);
    Ok(trials)
}
