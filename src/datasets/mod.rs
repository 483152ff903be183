mod labeled;
mod unlabeled;

pub use labeled::*;
pub use unlabeled::*;

use serde::{Deserialize, Serialize};

use crate::{error::DatasetError, stack::Stack};

/// One drawn sample: an input patch and, for labeled data, the spatially
/// matching label patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Stack,
    pub target: Option<Stack>,
}

pub trait Dataset {
    /// Number of samples a consumer should treat as one epoch. This is a
    /// scheduling hint and is unrelated to the volume extents.
    fn nominal_length(&self) -> usize;

    /// Draw the next sample. Every call is an independent random draw, so
    /// the dataset never runs out.
    fn sample(&mut self) -> Result<Sample, DatasetError>;
}
