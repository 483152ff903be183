use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::{stack::Stack, Float};

pub fn gauss_random<R: Rng>(rng: &mut R, mean: Float, std: Float) -> Float {
    let normal = Normal::new(mean, std).expect("std must be finite");

    normal.sample(rng)
}

// uniform integer in [low, high).
pub fn randi<R: Rng>(rng: &mut R, low: usize, high: usize) -> usize {
    let uniform = Uniform::new(low, high);
    uniform.sample(rng)
}

pub fn zeros(n: usize) -> Vec<Float> {
    vec![0.0; n]
}

// scalar mean and population standard deviation over every voxel.
pub fn mean_std(stack: &Stack) -> (Float, Float) {
    let n = stack.len() as Float;
    let mean = stack.v.iter().copied().sum::<Float>() / n;
    let variance = stack
        .v
        .iter()
        .copied()
        .map(|value| (value - mean) * (value - mean))
        .sum::<Float>()
        / n;

    (mean, variance.sqrt())
}

// rescale every voxel by (v - mu) / std. label volumes pass their assumed
// (low, high) intensity range here instead of computed statistics.
pub fn normalize(stack: &Stack, mu: Float, std: Float) -> Stack {
    let mut out = stack.clone();
    for value in &mut out.v {
        *value = (*value - mu) / std;
    }
    out
}

pub struct MinMax {
    min_value: Float,
    max_value: Float,
    diff_value: Float,
}

impl MinMax {
    pub fn min(&self) -> Float {
        self.min_value
    }
    pub fn max(&self) -> Float {
        self.max_value
    }
    pub fn diff(&self) -> Float {
        self.diff_value
    }
}

// return max and min of a given non-empty array.
pub fn maxmin(values: &[Float]) -> Option<MinMax> {
    if values.is_empty() {
        return None;
    }

    let mut maxv = values[0];
    let mut minv = values[0];
    for value in values.iter().copied() {
        if value > maxv {
            maxv = value;
        }
        if value < minv {
            minv = value;
        }
    }
    Some(MinMax {
        min_value: minv,
        max_value: maxv,
        diff_value: maxv - minv,
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{gauss_random, maxmin, mean_std, normalize, randi};
    use crate::{stack::Stack, Float};

    #[test]
    fn mean_std_matches_hand_computed_values() {
        let stack = Stack::from_vec(1, 2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let (mean, std) = mean_std(&stack);

        assert_eq!(mean, 2.5);
        assert!((std - (1.25 as Float).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn normalize_centers_and_scales() {
        let stack = Stack::from_vec(1, 2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let (mu, std) = mean_std(&stack);
        let (mean, spread) = mean_std(&normalize(&stack, mu, std));

        assert!(mean.abs() < 1e-6);
        assert!((spread - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_range_normalization_maps_255_to_one() {
        let stack = Stack::from_vec(1, 2, 2, vec![0.0, 255.0, 255.0, 0.0]);
        let rescaled = normalize(&stack, 0.0, 255.0);
        let range = maxmin(&rescaled.v).unwrap();

        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 1.0);
        assert_eq!(range.diff(), 1.0);
    }

    #[test]
    fn randi_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let value = randi(&mut rng, 2, 5);
            assert!((2..5).contains(&value));
        }
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);

        for _ in 0..10 {
            assert_eq!(gauss_random(&mut a, 0.0, 1.0), gauss_random(&mut b, 0.0, 1.0));
        }
    }
}
