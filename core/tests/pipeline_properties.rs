//! End-to-end and property tests for trial list generation.

use std::{collections::HashSet, fs};

use proptest::prelude::*;

use lurebin_core::{
    generate_trials, generate_trials_from_file, seeded_rng, BinTable, Condition, DataError,
    GenerationParams, ImageRecord, ImageVariant, StimulusNaming, TrialError, TrialType,
};

/// `per_bin` images for each of `num_bins` bins, labels interleaved by id.
fn interleaved_table(num_bins: usize, per_bin: usize) -> BinTable {
    let records = (0..num_bins * per_bin)
        .map(|index| ImageRecord {
            id: index as u32 + 1,
            bin: (index % num_bins) as i64 + 1,
        })
        .collect();
    BinTable::from_records(records).unwrap()
}

fn params(num_cond: usize, img_per_cond: usize) -> GenerationParams {
    GenerationParams {
        num_cond,
        img_per_cond,
        naming: StimulusNaming::default(),
    }
}

#[test]
fn two_bin_scenario_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Set1 bins.txt");
    let text: String = (1..=50)
        .map(|id| format!("{id}\t{}\n", if id % 2 == 1 { 1 } else { 2 }))
        .collect();
    fs::write(&path, text).unwrap();

    let lists = generate_trials_from_file(&path, &params(5, 10), &mut seeded_rng(2021)).unwrap();

    assert_eq!(lists.grid.num_conditions(), 5);
    assert_eq!(lists.grid.img_per_cond(), 10);
    assert_eq!(lists.bins.as_slice(), &[1, 1, 1, 1, 1, 2, 2, 2, 2, 2]);
    for row in lists.grid.rows() {
        assert!(row[..5].iter().all(|id| id % 2 == 1));
        assert!(row[5..].iter().all(|id| id % 2 == 0));
    }

    assert_eq!(lists.encoding.len(), 40);
    assert_eq!(lists.test.len(), 30);
    for trial_type in TrialType::ALL {
        let bins: Vec<i64> = lists
            .test
            .iter()
            .filter(|trial| trial.trial_type == trial_type)
            .map(|trial| trial.lure_bin)
            .collect();
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().filter(|&&bin| bin == 1).count(), 5);
        assert_eq!(bins.iter().filter(|&&bin| bin == 2).count(), 5);
    }
}

#[test]
fn thirty_six_per_condition_is_rejected() {
    let table = interleaved_table(5, 35);
    let err = generate_trials(&table, &params(5, 36), &mut seeded_rng(0)).unwrap_err();
    assert!(matches!(err, TrialError::Data(DataError::Indivisible { .. })));
}

#[test]
fn malformed_file_aborts_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bins.txt");
    fs::write(&path, "1 1\n2 one\n").unwrap();

    let err = generate_trials_from_file(&path, &params(5, 5), &mut seeded_rng(0)).unwrap_err();
    assert!(matches!(
        err,
        TrialError::Data(DataError::Malformed { line: 2, .. })
    ));
}

#[test]
fn surplus_images_are_dropped() {
    let table = interleaved_table(5, 60);
    let lists = generate_trials(&table, &params(5, 35), &mut seeded_rng(77)).unwrap();
    let used: HashSet<u32> = lists.grid.rows().iter().flatten().copied().collect();
    assert_eq!(used.len(), 5 * 35);
}

#[test]
fn encoding_shows_each_studied_image_once() {
    let table = interleaved_table(5, 35);
    let lists = generate_trials(&table, &params(5, 35), &mut seeded_rng(4)).unwrap();
    let unique: HashSet<&String> = lists.encoding.iter().collect();
    assert_eq!(unique.len(), lists.encoding.len());

    let foils: HashSet<u32> = lists.grid.rows()[4].iter().copied().collect();
    let naming = StimulusNaming::default();
    for name in &lists.encoding {
        let (id, variant) = naming.parse(name).unwrap();
        assert_eq!(variant, ImageVariant::Target);
        assert!(!foils.contains(&id));
    }
}

#[test]
fn sixth_condition_is_studied_and_foils_stay_unseen() {
    let table = interleaved_table(5, 60);
    let lists = generate_trials(&table, &params(6, 35), &mut seeded_rng(12)).unwrap();
    assert_eq!(lists.encoding.len(), 5 * 35);

    let naming = StimulusNaming::default();
    let encoded: HashSet<u32> = lists
        .encoding
        .iter()
        .map(|name| naming.parse(name).unwrap().0)
        .collect();
    let foils = lists.grid.row(Condition::X).unwrap();
    assert!(foils.iter().all(|id| !encoded.contains(id)));
    assert!(lists.grid.rows()[5].iter().all(|id| encoded.contains(id)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lists_are_balanced_for_any_valid_shape(
        num_cond in 5usize..8,
        num_bins in 1usize..6,
        share in 1usize..5,
        surplus in 0usize..4,
        seed in any::<u64>(),
    ) {
        let img_per_cond = num_bins * share;
        let per_bin = (num_cond * share).max(img_per_cond) + surplus;
        let table = interleaved_table(num_bins, per_bin);

        let lists = generate_trials(&table, &params(num_cond, img_per_cond), &mut seeded_rng(seed))
            .unwrap();

        prop_assert_eq!(lists.encoding.len(), (num_cond - 1) * img_per_cond);
        prop_assert_eq!(lists.test.len(), 3 * img_per_cond);

        let naming = StimulusNaming::default();
        let foils: HashSet<u32> = lists.grid.row(Condition::X).unwrap().iter().copied().collect();
        for name in &lists.encoding {
            let (id, _) = naming.parse(name).unwrap();
            prop_assert!(!foils.contains(&id), "foil {} shown at encoding", id);
        }

        let mut expected = lists.bins.as_slice().to_vec();
        expected.sort_unstable();
        for trial_type in TrialType::ALL {
            let mut bins: Vec<i64> = lists
                .test
                .iter()
                .filter(|trial| trial.trial_type == trial_type)
                .map(|trial| trial.lure_bin)
                .collect();
            bins.sort_unstable();
            prop_assert_eq!(&bins, &expected);
        }
    }

    #[test]
    fn pairs_follow_their_trial_type(seed in any::<u64>()) {
        let table = interleaved_table(5, 40);
        let lists = generate_trials(&table, &params(5, 35), &mut seeded_rng(seed)).unwrap();
        let naming = StimulusNaming::default();

        for trial in &lists.test {
            let (left, left_variant) = naming.parse(&trial.left).unwrap();
            let (right, right_variant) = naming.parse(&trial.right).unwrap();
            prop_assert_ne!(left_variant, right_variant);

            let (target, lure) = if left_variant == ImageVariant::Target {
                (left, right)
            } else {
                (right, left)
            };
            let (target_condition, lure_condition) = trial.trial_type.pairing();
            let targets = lists.grid.row(target_condition).unwrap();
            let lures = lists.grid.row(lure_condition).unwrap();
            let column = targets.iter().position(|&id| id == target).unwrap();
            prop_assert_eq!(lures[column], lure);
            prop_assert_eq!(lists.bins.as_slice()[column], trial.lure_bin);
        }
    }

    #[test]
    fn same_seed_same_lists(seed in any::<u64>()) {
        let table = interleaved_table(5, 35);
        let first = generate_trials(&table, &params(5, 35), &mut seeded_rng(seed)).unwrap();
        let second = generate_trials(&table, &params(5, 35), &mut seeded_rng(seed)).unwrap();
        prop_assert_eq!(first, second);
    }
}
