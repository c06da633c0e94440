use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{bins::BinTable, condition::Condition, error::DataError};

/// Image identifiers arranged as conditions (rows) by bin-matched columns.
///
/// Columns come in one contiguous block per lure bin, so column `k` has the
/// same bin in every row. Pairing two rows column by column therefore always
/// pairs images of equal difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionGrid {
    rows: Vec<Vec<u32>>,
}

impl ConditionGrid {
    pub(crate) fn new(rows: Vec<Vec<u32>>) -> Self {
        debug_assert!(rows.windows(2).all(|pair| pair[0].len() == pair[1].len()));
        Self { rows }
    }

    pub fn num_conditions(&self) -> usize {
        self.rows.len()
    }

    pub fn img_per_cond(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    pub fn row(&self, condition: Condition) -> Result<&[u32], DataError> {
        self.rows
            .get(condition.row())
            .map(Vec::as_slice)
            .ok_or(DataError::MissingCondition {
                condition,
                rows: self.rows.len(),
            })
    }
}

/// Lure bin of every grid column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinVector(pub(crate) Vec<i64>);

impl BinVector {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.0.iter()
    }

    /// Number of columns per bin label.
    pub fn counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &bin in &self.0 {
            *counts.entry(bin).or_insert(0) += 1;
        }
        counts
    }
}

/// Split the table into `num_cond` bin-matched conditions of `img_per_cond` images.
///
/// Bins are laid out in ascending label order. Within a bin the images are
/// shuffled and then dealt row-major, so the shuffle alone decides which
/// condition an image lands in. Images beyond what the conditions need are
/// dropped.
pub fn stratify<R: Rng + ?Sized>(
    table: &BinTable,
    num_cond: usize,
    img_per_cond: usize,
    rng: &mut R,
) -> Result<(ConditionGrid, BinVector), DataError> {
    if num_cond < 2 {
        return Err(DataError::TooFewConditions(num_cond));
    }
    if img_per_cond == 0 {
        return Err(DataError::NoImagesPerCondition);
    }

    let bins = table.distinct_bins();
    if bins.is_empty() {
        return Err(DataError::EmptyTable);
    }
    let num_bins = bins.len();
    if img_per_cond % num_bins != 0 {
        return Err(DataError::Indivisible {
            img_per_cond,
            num_bins,
        });
    }

    let share = img_per_cond / num_bins;
    let quota = num_cond
        .checked_mul(share)
        .ok_or(DataError::QuotaOverflow { num_cond, share })?;
    let required = quota.max(img_per_cond);

    let mut per_bin = Vec::with_capacity(num_bins);
    for &bin in &bins {
        let ids = table.ids_in_bin(bin);
        if ids.len() < required {
            return Err(DataError::InsufficientImages {
                bin,
                available: ids.len(),
                required,
            });
        }
        per_bin.push(ids);
    }

    // Every bin holds at least `quota` images, so the grid is bounded by the table.
    let mut rows = vec![vec![0u32; img_per_cond]; num_cond];
    let mut labels = Vec::with_capacity(img_per_cond);

    for (block, (&bin, mut ids)) in bins.iter().zip(per_bin).enumerate() {
        ids.shuffle(rng);
        if ids.len() > quota {
            debug!(bin, dropped = ids.len() - quota, "dropping surplus images");
        }
        ids.truncate(quota);

        let start = block * share;
        for (row, chunk) in rows.iter_mut().zip(ids.chunks_exact(share)) {
            row[start..start + share].copy_from_slice(chunk);
        }
        labels.extend(std::iter::repeat(bin).take(share));

        debug!(bin, columns = ?(start..start + share), "stratified bin");
    }

    Ok((ConditionGrid::new(rows), BinVector(labels)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{bins::ImageRecord, rng::seeded_rng};

    fn table(bins: &[(i64, u32)]) -> BinTable {
        let mut records = Vec::new();
        let mut next_id = 1;
        for &(bin, count) in bins {
            for _ in 0..count {
                records.push(ImageRecord { id: next_id, bin });
                next_id += 1;
            }
        }
        BinTable::from_records(records).unwrap()
    }

    #[test]
    fn five_bins_fill_five_conditions() {
        let table = table(&[(1, 40), (2, 40), (3, 40), (4, 40), (5, 40)]);
        let mut rng = seeded_rng(11);
        let (grid, bins) = stratify(&table, 5, 35, &mut rng).unwrap();

        assert_eq!(grid.num_conditions(), 5);
        assert_eq!(grid.img_per_cond(), 35);
        assert_eq!(bins.len(), 35);
        assert_eq!(bins.counts().values().copied().collect::<Vec<_>>(), vec![7; 5]);

        let bin_of: BTreeMap<u32, i64> = table
            .records()
            .iter()
            .map(|record| (record.id, record.bin))
            .collect();
        for row in grid.rows() {
            for (column, id) in row.iter().enumerate() {
                assert_eq!(bin_of[id], bins.as_slice()[column]);
            }
        }

        let distinct: HashSet<u32> = grid.rows().iter().flatten().copied().collect();
        assert_eq!(distinct.len(), 5 * 35);
    }

    #[test]
    fn blocks_follow_ascending_bin_labels() {
        let table = table(&[(9, 25), (-2, 25)]);
        let mut rng = seeded_rng(3);
        let (_, bins) = stratify(&table, 5, 10, &mut rng).unwrap();
        assert_eq!(bins.as_slice(), &[-2, -2, -2, -2, -2, 9, 9, 9, 9, 9]);
    }

    #[test]
    fn rejects_indivisible_counts() {
        let table = table(&[(1, 35), (2, 35), (3, 35), (4, 35), (5, 35)]);
        let err = stratify(&table, 5, 36, &mut seeded_rng(1)).unwrap_err();
        assert!(matches!(
            err,
            DataError::Indivisible {
                img_per_cond: 36,
                num_bins: 5
            }
        ));
    }

    #[test]
    fn names_the_bin_that_runs_short() {
        let table = table(&[(1, 25), (2, 24)]);
        let err = stratify(&table, 5, 10, &mut seeded_rng(1)).unwrap_err();
        match err {
            DataError::InsufficientImages {
                bin,
                available,
                required,
            } => {
                assert_eq!((bin, available, required), (2, 24, 25));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn requires_img_per_cond_images_even_with_few_conditions() {
        let table = table(&[(1, 5), (2, 5), (3, 5)]);
        let err = stratify(&table, 2, 6, &mut seeded_rng(1)).unwrap_err();
        assert!(matches!(
            err,
            DataError::InsufficientImages {
                bin: 1,
                available: 5,
                required: 6
            }
        ));
    }

    #[test]
    fn oversized_condition_counts_are_errors() {
        let single = table(&[(1, 8)]);
        let err = stratify(&single, usize::MAX / 2, 4, &mut seeded_rng(1)).unwrap_err();
        assert!(matches!(
            err,
            DataError::QuotaOverflow {
                num_cond,
                share: 4
            } if num_cond == usize::MAX / 2
        ));

        let table = table(&[(1, 8), (2, 8)]);
        let err = stratify(&table, 1 << 40, 4, &mut seeded_rng(1)).unwrap_err();
        assert!(matches!(
            err,
            DataError::InsufficientImages {
                bin: 1,
                available: 8,
                ..
            }
        ));
    }

    #[test]
    fn validates_parameters() {
        let table = table(&[(1, 10)]);
        assert!(matches!(
            stratify(&table, 1, 5, &mut seeded_rng(1)),
            Err(DataError::TooFewConditions(1))
        ));
        assert!(matches!(
            stratify(&table, 2, 0, &mut seeded_rng(1)),
            Err(DataError::NoImagesPerCondition)
        ));
        assert!(matches!(
            stratify(&BinTable::default(), 2, 5, &mut seeded_rng(1)),
            Err(DataError::EmptyTable)
        ));
    }

    #[test]
    fn missing_condition_is_reported() {
        let table = table(&[(1, 8)]);
        let (grid, _) = stratify(&table, 2, 4, &mut seeded_rng(5)).unwrap();
        assert!(grid.row(Condition::B).is_ok());
        assert!(matches!(
            grid.row(Condition::X),
            Err(DataError::MissingCondition {
                condition: Condition::X,
                rows: 2
            })
        ));
    }

    #[test]
    fn same_seed_same_grid() {
        let table = table(&[(1, 30), (2, 30)]);
        let first = stratify(&table, 5, 10, &mut seeded_rng(99)).unwrap();
        let second = stratify(&table, 5, 10, &mut seeded_rng(99)).unwrap();
        assert_eq!(first, second);
    }
}
