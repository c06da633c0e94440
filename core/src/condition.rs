use std::fmt;

use serde::{Deserialize, Serialize};

/// Experimental conditions in grid row order.
///
/// A, B, C and D are studied at encoding. X supplies the unrelated foils
/// and is never shown before the test phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    A,
    B,
    C,
    D,
    X,
}

impl Condition {
    pub const ALL: [Condition; 5] = [Self::A, Self::B, Self::C, Self::D, Self::X];

    /// Row of the condition grid that holds this condition's images.
    pub fn row(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
            Self::X => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::X => "X",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Forced-choice test formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrialType {
    /// Corresponding lure: a studied image against its own lure.
    #[serde(rename = "A-A'")]
    CorrespondingLure,
    /// Noncorresponding lure: a studied image against another item's lure.
    #[serde(rename = "B-C'")]
    NoncorrespondingLure,
    /// Studied image against an unrelated foil.
    #[serde(rename = "D-X")]
    UnrelatedFoil,
}

impl TrialType {
    /// Block order used when the test list is assembled.
    pub const ALL: [TrialType; 3] = [
        Self::CorrespondingLure,
        Self::NoncorrespondingLure,
        Self::UnrelatedFoil,
    ];

    /// Conditions supplying the target and the lure of each trial.
    pub fn pairing(&self) -> (Condition, Condition) {
        match self {
            Self::CorrespondingLure => (Condition::A, Condition::A),
            Self::NoncorrespondingLure => (Condition::B, Condition::C),
            Self::UnrelatedFoil => (Condition::D, Condition::X),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CorrespondingLure => "A-A'",
            Self::NoncorrespondingLure => "B-C'",
            Self::UnrelatedFoil => "D-X",
        }
    }
}

impl fmt::Display for TrialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
