use serde::{Deserialize, Serialize};

use crate::error::FormatError;

pub const DEFAULT_DIGITS: usize = 3;
pub const DEFAULT_EXTENSION: &str = "jpg";
/// Widest field worth padding to: `u32::MAX` has ten digits.
pub const MAX_DIGITS: usize = 10;

/// Zero-pad `id` to `digits` characters.
pub fn pad_id(id: u32, digits: usize) -> Result<String, FormatError> {
    if digits == 0 {
        return Err(FormatError::ZeroWidth);
    }
    if digits > MAX_DIGITS {
        return Err(FormatError::WidthTooLarge {
            digits,
            max: MAX_DIGITS,
        });
    }
    let padded = format!("{id:0digits$}");
    if padded.len() > digits {
        return Err(FormatError::TooWide { id, digits });
    }
    Ok(padded)
}

pub fn format_ids(ids: &[u32], digits: usize) -> Result<Vec<String>, FormatError> {
    ids.iter().map(|&id| pad_id(id, digits)).collect()
}

/// Which photograph of a stimulus pair a filename refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageVariant {
    /// The studied image, `XYZa`.
    Target,
    /// The similar lure, `XYZb`.
    Lure,
}

impl ImageVariant {
    pub fn suffix(&self) -> char {
        match self {
            Self::Target => 'a',
            Self::Lure => 'b',
        }
    }

    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix {
            'a' => Some(Self::Target),
            'b' => Some(Self::Lure),
            _ => None,
        }
    }
}

/// Stimulus filename layout: `<padded id><variant>.<extension>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusNaming {
    pub digits: usize,
    pub extension: String,
}

impl Default for StimulusNaming {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl StimulusNaming {
    pub fn filename(&self, id: u32, variant: ImageVariant) -> Result<String, FormatError> {
        let padded = pad_id(id, self.digits)?;
        Ok(format!("{padded}{}.{}", variant.suffix(), self.extension))
    }

    /// Recover the identifier and variant from a filename built by [`Self::filename`].
    pub fn parse(&self, filename: &str) -> Option<(u32, ImageVariant)> {
        let stem = filename.strip_suffix(&self.extension)?.strip_suffix('.')?;
        let suffix = stem.chars().last()?;
        let variant = ImageVariant::from_suffix(suffix)?;
        let digits = &stem[..stem.len() - 1];
        if digits.len() != self.digits || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id = digits.parse().ok()?;
        Some((id, variant))
    }
}
