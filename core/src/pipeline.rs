use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    balance::BalanceSummary,
    bins::BinTable,
    encoding::build_encoding,
    error::TrialError,
    naming::StimulusNaming,
    retrieval::{build_test, TestTrial},
    stratify::{stratify, BinVector, ConditionGrid},
};

pub const DEFAULT_NUM_COND: usize = 5;
pub const DEFAULT_IMG_PER_COND: usize = 35;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub num_cond: usize,
    pub img_per_cond: usize,
    pub naming: StimulusNaming,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_cond: DEFAULT_NUM_COND,
            img_per_cond: DEFAULT_IMG_PER_COND,
            naming: StimulusNaming::default(),
        }
    }
}

/// Everything one run of the generator produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialLists {
    pub grid: ConditionGrid,
    pub bins: BinVector,
    pub encoding: Vec<String>,
    pub test: Vec<TestTrial>,
}

impl TrialLists {
    pub fn balance(&self) -> BalanceSummary {
        BalanceSummary::from_trials(&self.test)
    }
}

/// Stratify `table` and build both trial lists from the same grid.
///
/// The test list is checked for bin balance before it is returned.
pub fn generate_trials<R: Rng + ?Sized>(
    table: &BinTable,
    params: &GenerationParams,
    rng: &mut R,
) -> Result<TrialLists, TrialError> {
    let (grid, bins) = stratify(table, params.num_cond, params.img_per_cond, rng)?;
    let encoding = build_encoding(&grid, &params.naming, rng)?;
    let test = build_test(&grid, &bins, &params.naming, rng)?;

    BalanceSummary::from_trials(&test).check(&bins)?;

    info!(
        images = table.len(),
        bins = bins.counts().len(),
        encoding = encoding.len(),
        test = test.len(),
        "generated trial lists"
    );

    Ok(TrialLists {
        grid,
        bins,
        encoding,
        test,
    })
}

pub fn generate_trials_from_file<R: Rng + ?Sized>(
    path: &Path,
    params: &GenerationParams,
    rng: &mut R,
) -> Result<TrialLists, TrialError> {
    let table = BinTable::load(path)?;
    generate_trials(&table, params, rng)
}
