//! Patch augmentation. A dataset applies its configured transform to every
//! patch it serves; an unset transform is the identity.

use serde::{Deserialize, Serialize};

use crate::stack::Stack;

#[typetag::serde]
pub trait Transform {
    fn apply(&self, patch: Stack) -> Stack;
}

/// Mirror a patch along the width axis.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlipHorizontal;

#[typetag::serde]
impl Transform for FlipHorizontal {
    fn apply(&self, mut patch: Stack) -> Stack {
        let (depth, height, width) = (patch.depth(), patch.height(), patch.width());
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width / 2 {
                    let left = patch.get(z, y, x);
                    let right = patch.get(z, y, width - 1 - x);
                    patch.set(z, y, x, right);
                    patch.set(z, y, width - 1 - x, left);
                }
            }
        }
        patch
    }
}

/// Mirror a patch along the height axis.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlipVertical;

#[typetag::serde]
impl Transform for FlipVertical {
    fn apply(&self, mut patch: Stack) -> Stack {
        let (depth, height, width) = (patch.depth(), patch.height(), patch.width());
        for z in 0..depth {
            for y in 0..height / 2 {
                for x in 0..width {
                    let top = patch.get(z, y, x);
                    let bottom = patch.get(z, height - 1 - y, x);
                    patch.set(z, y, x, bottom);
                    patch.set(z, height - 1 - y, x, top);
                }
            }
        }
        patch
    }
}

/// Quarter turn in the height/width plane. The output height is the input
/// width, so square in-plane patches keep their shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Rotate90;

#[typetag::serde]
impl Transform for Rotate90 {
    fn apply(&self, patch: Stack) -> Stack {
        let (depth, height, width) = (patch.depth(), patch.height(), patch.width());
        let mut out = Stack::zeros(depth, width, height);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    out.set(z, x, height - 1 - y, patch.get(z, y, x));
                }
            }
        }
        out
    }
}

/// Apply a sequence of transforms in order.
#[derive(Serialize, Deserialize)]
pub struct Compose {
    pub transforms: Vec<Box<dyn Transform>>,
}

#[typetag::serde]
impl Transform for Compose {
    fn apply(&self, patch: Stack) -> Stack {
        let mut patch = patch;
        for transform in &self.transforms {
            patch = transform.apply(patch);
        }
        patch
    }
}
