use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    condition::TrialType, error::TrialError, retrieval::TestTrial, stratify::BinVector,
};

/// Trials per lure bin, tallied separately for each trial type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    counts: BTreeMap<TrialType, BTreeMap<i64, usize>>,
}

impl BalanceSummary {
    pub fn from_trials(trials: &[TestTrial]) -> Self {
        let mut counts: BTreeMap<TrialType, BTreeMap<i64, usize>> = BTreeMap::new();
        for trial in trials {
            *counts
                .entry(trial.trial_type)
                .or_default()
                .entry(trial.lure_bin)
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Bin counts for `trial_type`, empty if no trial of that type was seen.
    pub fn counts_for(&self, trial_type: TrialType) -> BTreeMap<i64, usize> {
        self.counts.get(&trial_type).cloned().unwrap_or_default()
    }

    pub fn trial_types(&self) -> impl Iterator<Item = (&TrialType, &BTreeMap<i64, usize>)> {
        self.counts.iter()
    }

    /// Every trial type must cover the bin vector exactly once.
    pub fn check(&self, bins: &BinVector) -> Result<(), TrialError> {
        let expected = bins.counts();
        for trial_type in TrialType::ALL {
            let actual = self.counts_for(trial_type);
            if actual != expected {
                return Err(TrialError::Unbalanced {
                    trial_type,
                    expected: expected.into_iter().collect(),
                    actual: actual.into_iter().collect(),
                });
            }
        }
        Ok(())
    }
}
