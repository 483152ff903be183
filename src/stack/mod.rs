mod serde;

use crate::{error::DatasetError, utils::zeros, Float};

// Stack is the in-memory form of one volumetric image: a 3D block of
// intensity values ordered (depth, height, width), depth outermost.
// it holds the raw stack, the co-registered label stack, and every
// patch cut out of them, so all the reshaping below stays inside this
// one type. v is the flat voxel buffer.
#[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
pub struct Stack {
    depth: usize,
    height: usize,
    width: usize,

    pub v: Vec<Float>,
}

impl Stack {
    pub fn zeros(depth: usize, height: usize, width: usize) -> Self {
        let n = depth * height * width;
        Self {
            depth,
            height,
            width,
            v: zeros(n),
        }
    }

    pub fn with_constant(depth: usize, height: usize, width: usize, constant: Float) -> Self {
        let n = depth * height * width;
        Self {
            depth,
            height,
            width,
            v: vec![constant; n],
        }
    }

    pub fn from_vec(depth: usize, height: usize, width: usize, v: Vec<Float>) -> Self {
        assert_eq!(
            depth * height * width,
            v.len(),
            "voxel buffer must match the stack extents"
        );
        Self {
            depth,
            height,
            width,
            v,
        }
    }

    fn get_index(&self, z: usize, y: usize, x: usize) -> usize {
        ((z * self.height) + y) * self.width + x
    }

    pub fn get(&self, z: usize, y: usize, x: usize) -> Float {
        let index = self.get_index(z, y, x);
        self.v[index]
    }

    pub fn set(&mut self, z: usize, y: usize, x: usize, value: Float) {
        let index = self.get_index(z, y, x);
        self.v[index] = value
    }

    // cut the height axis into two halves and restack them along depth:
    // block k of the output depth range holds half k of the input.
    // an odd final row is dropped.
    pub fn stripe_height(&self) -> Self {
        let half = self.height / 2;
        let mut out = Self::zeros(2 * self.depth, half, self.width);
        for k in 0..2 {
            for z in 0..self.depth {
                for y in 0..half {
                    for x in 0..self.width {
                        out.set(k * self.depth + z, y, x, self.get(z, k * half + y, x));
                    }
                }
            }
        }
        out
    }

    // same operation along the width axis.
    pub fn stripe_width(&self) -> Self {
        let half = self.width / 2;
        let mut out = Self::zeros(2 * self.depth, self.height, half);
        for k in 0..2 {
            for z in 0..self.depth {
                for y in 0..self.height {
                    for x in 0..half {
                        out.set(k * self.depth + z, y, x, self.get(z, y, k * half + x));
                    }
                }
            }
        }
        out
    }

    // split into the first `at` depth slices and the rest. the two parts
    // are disjoint and their depths sum to the input depth.
    pub fn split_depth(mut self, at: usize) -> (Self, Self) {
        assert!(at <= self.depth, "split index past the end of the stack");
        let tail = self.v.split_off(at * self.height * self.width);
        let suffix = Self {
            depth: self.depth - at,
            height: self.height,
            width: self.width,
            v: tail,
        };
        let prefix = Self {
            depth: at,
            height: self.height,
            width: self.width,
            v: self.v,
        };
        (prefix, suffix)
    }

    pub fn concat_depth(mut self, other: Self) -> Result<Self, DatasetError> {
        if self.height != other.height || self.width != other.width {
            return Err(DatasetError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        self.v.extend_from_slice(&other.v);
        Ok(Self {
            depth: self.depth + other.depth,
            height: self.height,
            width: self.width,
            v: self.v,
        })
    }

    // gather whole depth slices in the given order.
    pub fn select_slices(&self, indices: &[usize]) -> Self {
        let plane = self.height * self.width;
        let mut v = Vec::with_capacity(indices.len() * plane);
        for &z in indices {
            let start = z * plane;
            v.extend_from_slice(&self.v[start..start + plane]);
        }
        Self {
            depth: indices.len(),
            height: self.height,
            width: self.width,
            v,
        }
    }

    pub fn crop(&self, corner: [usize; 3], shape: [usize; 3]) -> Self {
        debug_assert!(
            corner[0] + shape[0] <= self.depth,
            "crop must stay inside the stack"
        );
        debug_assert!(
            corner[1] + shape[1] <= self.height,
            "crop must stay inside the stack"
        );
        debug_assert!(
            corner[2] + shape[2] <= self.width,
            "crop must stay inside the stack"
        );

        let mut out = Self::zeros(shape[0], shape[1], shape[2]);
        for z in 0..shape[0] {
            for y in 0..shape[1] {
                for x in 0..shape[2] {
                    out.set(
                        z,
                        y,
                        x,
                        self.get(corner[0] + z, corner[1] + y, corner[2] + x),
                    );
                }
            }
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.depth, self.height, self.width]
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}
