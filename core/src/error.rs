use std::path::PathBuf;

use thiserror::Error;

use crate::condition::{Condition, TrialType};

/// Problems with the bin table or with the parameters used to stratify it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read bin table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("bin table contains no images")]
    EmptyTable,

    #[error("image {id} is listed more than once")]
    DuplicateImage { id: u32 },

    #[error("num_cond must be at least 2, got {0}")]
    TooFewConditions(usize),

    #[error("img_per_cond must be positive")]
    NoImagesPerCondition,

    #[error("img_per_cond {img_per_cond} is not divisible by the {num_bins} bins in the table")]
    Indivisible { img_per_cond: usize, num_bins: usize },

    #[error("{num_cond} conditions of {share} images per bin overflow the per-bin image count")]
    QuotaOverflow { num_cond: usize, share: usize },

    #[error("bin {bin} has {available} images but {required} are required")]
    InsufficientImages {
        bin: i64,
        available: usize,
        required: usize,
    },

    #[error("condition {condition} is missing from a grid with {rows} rows")]
    MissingCondition { condition: Condition, rows: usize },

    #[error("bin vector has {bins} labels but the grid has {columns} columns")]
    BinVectorMismatch { columns: usize, bins: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("identifier {id} does not fit in {digits} digits")]
    TooWide { id: u32, digits: usize },

    #[error("identifier width must be at least one digit")]
    ZeroWidth,

    #[error("identifier width {digits} exceeds the maximum of {max}")]
    WidthTooLarge { digits: usize, max: usize },
}

/// Any failure of the trial generation pipeline.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{trial_type} trials have lure bins {actual:?}, expected {expected:?}")]
    Unbalanced {
        trial_type: TrialType,
        expected: Vec<(i64, usize)>,
        actual: Vec<(i64, usize)>,
    },
}
