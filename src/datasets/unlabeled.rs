use std::path::Path;

use rand::rngs::StdRng;

use crate::{
    datasets::{Dataset, Sample},
    error::DatasetError,
    io::{read_stack, Dtype},
    sampler::sample_unlabeled_input,
    stack::Stack,
    transform::Transform,
    utils::{mean_std, normalize},
    Float,
};

// fixed storage layout under a dataset root.
const STACK1_FILE: &str = "stack1/data.idx";
const STACK2_FILE: &str = "stack2/data.idx";

/// Both acquired stacks fused along the depth axis, serving random input
/// patches without labels. The combined volume is normalized with one
/// global mean and standard deviation.
pub struct UnlabeledVolumeDataset {
    input_shape: [usize; 3],
    len_epoch: usize,

    data: Stack,
    mu: Float,
    std: Float,

    transform: Option<Box<dyn Transform>>,

    rng: StdRng,
}

impl std::fmt::Debug for UnlabeledVolumeDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlabeledVolumeDataset")
            .field("input_shape", &self.input_shape)
            .field("len_epoch", &self.len_epoch)
            .field("data", &self.data)
            .field("mu", &self.mu)
            .field("std", &self.std)
            .finish_non_exhaustive()
    }
}

impl UnlabeledVolumeDataset {
    pub fn builder(input_shape: [usize; 3]) -> UnlabeledVolumeDatasetBuilder {
        UnlabeledVolumeDatasetBuilder::new(input_shape)
    }

    /// Mean of the combined volume before normalization.
    pub fn mu(&self) -> Float {
        self.mu
    }

    /// Standard deviation of the combined volume before normalization.
    pub fn std(&self) -> Float {
        self.std
    }

    pub fn data(&self) -> &Stack {
        &self.data
    }
}

impl Dataset for UnlabeledVolumeDataset {
    fn nominal_length(&self) -> usize {
        self.len_epoch
    }

    fn sample(&mut self) -> Result<Sample, DatasetError> {
        let input = sample_unlabeled_input(&mut self.rng, &self.data, self.input_shape)?;

        let input = match &self.transform {
            Some(transform) => transform.apply(input),
            None => input,
        };

        Ok(Sample {
            input,
            target: None,
        })
    }
}

pub struct UnlabeledVolumeDatasetBuilder {
    input_shape: [usize; 3],

    len_epoch: usize,
    transform: Option<Box<dyn Transform>>,
}

impl UnlabeledVolumeDatasetBuilder {
    fn new(input_shape: [usize; 3]) -> Self {
        Self {
            // required
            input_shape,

            // optional
            len_epoch: 1000,
            transform: None,
        }
    }

    /// default: 1000
    pub fn len_epoch(mut self, value: usize) -> Self {
        self.len_epoch = value;
        self
    }

    /// augmentation applied to every input patch
    ///
    /// default: identity
    pub fn transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Read both data stacks under `root` and build the dataset.
    pub fn load(
        self,
        root: impl AsRef<Path>,
        rng: StdRng,
    ) -> Result<UnlabeledVolumeDataset, DatasetError> {
        let root = root.as_ref();
        let stack1 = read_stack(root.join(STACK1_FILE), Dtype::U8)?;
        let stack2 = read_stack(root.join(STACK2_FILE), Dtype::U8)?;
        self.build(stack1, stack2, rng)
    }

    pub fn build(
        self,
        stack1: Stack,
        stack2: Stack,
        rng: StdRng,
    ) -> Result<UnlabeledVolumeDataset, DatasetError> {
        let data = stack1.concat_depth(stack2)?;

        let (mu, std) = mean_std(&data);
        let data = normalize(&data, mu, std);

        log::debug!(
            "unlabeled volume ready: shape {:?}, mu {mu:.4}, std {std:.4}",
            data.shape()
        );

        Ok(UnlabeledVolumeDataset {
            input_shape: self.input_shape,
            len_epoch: self.len_epoch,
            data,
            mu,
            std,
            transform: self.transform,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::UnlabeledVolumeDataset;
    use crate::{datasets::Dataset, error::DatasetError, stack::Stack, Float};

    #[test]
    fn concatenation_runs_along_the_depth_axis() {
        let dataset = UnlabeledVolumeDataset::builder([2, 4, 4])
            .build(
                Stack::with_constant(5, 10, 10, 1.0),
                Stack::with_constant(5, 10, 10, 2.0),
                StdRng::seed_from_u64(41),
            )
            .unwrap();

        assert_eq!(dataset.data().shape(), [10, 10, 10]);
    }

    #[test]
    fn mismatched_stacks_are_rejected() {
        let err = UnlabeledVolumeDataset::builder([2, 4, 4])
            .build(
                Stack::with_constant(5, 10, 10, 1.0),
                Stack::with_constant(5, 10, 12, 2.0),
                StdRng::seed_from_u64(42),
            )
            .unwrap_err();

        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }

    #[test]
    fn combined_volume_is_globally_normalized() {
        let dataset = UnlabeledVolumeDataset::builder([2, 4, 4])
            .build(
                Stack::with_constant(5, 10, 10, 1.0),
                Stack::with_constant(5, 10, 10, 2.0),
                StdRng::seed_from_u64(43),
            )
            .unwrap();

        // two constant halves normalize to -1 and +1 around the global mean.
        assert_eq!(dataset.mu(), 1.5);
        assert_eq!(dataset.std(), 0.5);
        for z in 0..5 {
            assert_eq!(dataset.data().get(z, 0, 0), -1.0);
            assert_eq!(dataset.data().get(z + 5, 0, 0), 1.0);
        }
    }

    #[test]
    fn samples_are_unlabeled_with_the_requested_shape() {
        let mut ramp1 = Stack::zeros(5, 10, 10);
        for (i, value) in ramp1.v.iter_mut().enumerate() {
            *value = (i % 256) as Float;
        }
        let ramp2 = ramp1.clone();
        let mut dataset = UnlabeledVolumeDataset::builder([3, 6, 6])
            .build(ramp1, ramp2, StdRng::seed_from_u64(44))
            .unwrap();

        let sample = dataset.sample().unwrap();

        assert_eq!(sample.input.shape(), [3, 6, 6]);
        assert_eq!(sample.target, None);
    }

    #[test]
    fn nominal_length_is_the_configured_epoch_length() {
        let dataset = UnlabeledVolumeDataset::builder([2, 4, 4])
            .len_epoch(250)
            .build(
                Stack::with_constant(5, 10, 10, 1.0),
                Stack::with_constant(5, 10, 10, 2.0),
                StdRng::seed_from_u64(45),
            )
            .unwrap();

        assert_eq!(dataset.nominal_length(), 250);
    }
}
