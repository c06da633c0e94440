pub mod balance;
pub mod bins;
pub mod condition;
pub mod config;
pub mod encoding;
pub mod error;
pub mod experiment;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod retrieval;
pub mod rng;
pub mod stratify;

pub use balance::BalanceSummary;
pub use bins::{BinTable, ImageRecord};
pub use condition::{Condition, TrialType};
pub use config::GeneratorConfig;
pub use encoding::build_encoding;
pub use error::{DataError, FormatError, TrialError};
pub use experiment::{
    commit_run, write_outputs, OutputPaths, RunMode, RunSnapshot, SnapshotOutcome,
};
pub use naming::{format_ids, pad_id, ImageVariant, StimulusNaming};
pub use pipeline::{generate_trials, generate_trials_from_file, GenerationParams, TrialLists};
pub use report::{ensure_report_file, update_sections, ReportSection, DEFAULT_REPORT_TEMPLATE};
pub use retrieval::{build_test, TestTrial};
pub use rng::{fresh_seed, seeded_rng};
pub use stratify::{stratify, BinVector, ConditionGrid};
