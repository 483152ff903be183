use std::path::PathBuf;

use thiserror::Error;

use crate::Float;

// Every failure in this crate is unrecoverable at this layer: loading and
// preprocessing either fully succeed or the caller gets one of these.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    #[error("stack shapes do not match: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: [usize; 3],
        right: [usize; 3],
    },

    #[error("patch shape {patch:?} does not fit in volume {volume:?}")]
    PatchTooLarge {
        patch: [usize; 3],
        volume: [usize; 3],
    },

    #[error("{name} must be within [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: Float },
}
