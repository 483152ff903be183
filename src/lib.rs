mod datasets;
mod error;
mod io;
mod sampler;
mod stack;
mod transform;
mod utils;

pub use datasets::*;
pub use error::*;
pub use io::*;
pub use sampler::*;
pub use stack::*;
pub use transform::*;
pub use utils::*;

pub type Float = f32;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
