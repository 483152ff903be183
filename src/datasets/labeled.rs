use std::path::Path;

use rand::{rngs::StdRng, seq::index};

use crate::{
    datasets::{Dataset, Sample},
    error::DatasetError,
    io::{read_stack, Dtype},
    sampler::sample_labeled_input,
    stack::Stack,
    transform::Transform,
    utils::{mean_std, normalize},
    Float,
};

// fixed storage layout under a dataset root.
const DATA_FILE: &str = "stack1/data.idx";
const LABEL_FILE: &str = "stack1/mito_labels.idx";

/// An annotated volume serving random `(input, target)` patch pairs.
///
/// Loading selects the train or test partition of the stored stack,
/// normalizes it and then serves patches forever. The train partition is
/// restriped before the split so both partitions see the full lateral
/// extent of the tissue.
pub struct LabeledVolumeDataset {
    input_shape: [usize; 3],
    len_epoch: usize,

    data: Stack,
    labels: Stack,
    mu: Float,
    std: Float,

    transform: Option<Box<dyn Transform>>,
    target_transform: Option<Box<dyn Transform>>,

    rng: StdRng,
}

impl std::fmt::Debug for LabeledVolumeDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabeledVolumeDataset")
            .field("input_shape", &self.input_shape)
            .field("len_epoch", &self.len_epoch)
            .field("data", &self.data)
            .field("labels", &self.labels)
            .field("mu", &self.mu)
            .field("std", &self.std)
            .finish_non_exhaustive()
    }
}

impl LabeledVolumeDataset {
    pub fn builder(input_shape: [usize; 3]) -> LabeledVolumeDatasetBuilder {
        LabeledVolumeDatasetBuilder::new(input_shape)
    }

    /// Mean of the selected partition before normalization.
    pub fn mu(&self) -> Float {
        self.mu
    }

    /// Standard deviation of the selected partition before normalization.
    pub fn std(&self) -> Float {
        self.std
    }

    pub fn data(&self) -> &Stack {
        &self.data
    }

    pub fn labels(&self) -> &Stack {
        &self.labels
    }
}

impl Dataset for LabeledVolumeDataset {
    fn nominal_length(&self) -> usize {
        self.len_epoch
    }

    fn sample(&mut self) -> Result<Sample, DatasetError> {
        let (input, target) =
            sample_labeled_input(&mut self.rng, &self.data, &self.labels, self.input_shape)?;

        let input = match &self.transform {
            Some(transform) => transform.apply(input),
            None => input,
        };
        let target = match &self.target_transform {
            Some(transform) if !target.is_empty() => transform.apply(target),
            _ => target,
        };

        Ok(Sample {
            input,
            target: Some(target),
        })
    }
}

pub struct LabeledVolumeDatasetBuilder {
    input_shape: [usize; 3],

    train: bool,
    split: Float,
    frac: Float,
    len_epoch: usize,
    transform: Option<Box<dyn Transform>>,
    target_transform: Option<Box<dyn Transform>>,
}

impl LabeledVolumeDatasetBuilder {
    fn new(input_shape: [usize; 3]) -> Self {
        Self {
            // required
            input_shape,

            // optional
            train: true,
            split: 0.67,
            frac: 1.0,
            len_epoch: 1000,
            transform: None,
            target_transform: None,
        }
    }

    /// select the training partition; the test partition otherwise
    ///
    /// default: true
    pub fn train(mut self, value: bool) -> Self {
        self.train = value;
        self
    }

    /// fraction of depth slices assigned to the training partition
    ///
    /// default: 0.67
    pub fn split(mut self, value: Float) -> Self {
        self.split = value;
        self
    }

    /// fraction of the partition's depth slices to keep
    ///
    /// default: 1.0
    pub fn frac(mut self, value: Float) -> Self {
        self.frac = value;
        self
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

    /// augmentation applied to every label patch
    ///
    /// default: identity
    pub fn target_transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.target_transform = Some(transform);
        self
    }

    /// Read the data and label stacks under `root` and build the dataset.
    pub fn load(
        self,
        root: impl AsRef<Path>,
        rng: StdRng,
    ) -> Result<LabeledVolumeDataset, DatasetError> {
        let root = root.as_ref();
        let data = read_stack(root.join(DATA_FILE), Dtype::U8)?;
        let labels = read_stack(root.join(LABEL_FILE), Dtype::I32)?;
        self.build(data, labels, rng)
    }

    pub fn build(
        self,
        data: Stack,
        labels: Stack,
        mut rng: StdRng,
    ) -> Result<LabeledVolumeDataset, DatasetError> {
        check_fraction("split", self.split)?;
        check_fraction("frac", self.frac)?;
        if data.shape() != labels.shape() {
            return Err(DatasetError::ShapeMismatch {
                left: data.shape(),
                right: labels.shape(),
            });
        }

        let (mut data, mut labels) = if self.train {
            // striping multiplies the usable depth slices four-fold, trading
            // in-plane extent for more independent cuts along the split axis.
            (
                data.stripe_height().stripe_width(),
                labels.stripe_height().stripe_width(),
            )
        } else {
            (data, labels)
        };

        let at = (self.split * data.depth() as Float) as usize;
        let (data_head, data_tail) = data.split_depth(at);
        let (label_head, label_tail) = labels.split_depth(at);
        if self.train {
            data = data_head;
            labels = label_head;
        } else {
            data = data_tail;
            labels = label_tail;
        }

        let (mu, std) = mean_std(&data);
        data = normalize(&data, mu, std);
        labels = normalize(&labels, 0.0, 255.0);

        // keep a random set of depth slices; at frac 1.0 this is a pure
        // permutation of slices.
        let keep = (self.frac * data.depth() as Float) as usize;
        let selected = index::sample(&mut rng, data.depth(), keep).into_vec();
        data = data.select_slices(&selected);
        labels = labels.select_slices(&selected);

        log::debug!(
            "labeled volume ready: shape {:?}, mu {mu:.4}, std {std:.4}",
            data.shape()
        );

        Ok(LabeledVolumeDataset {
            input_shape: self.input_shape,
            len_epoch: self.len_epoch,
            data,
            labels,
            mu,
            std,
            transform: self.transform,
            target_transform: self.target_transform,
            rng,
        })
    }
}

fn check_fraction(name: &'static str, value: Float) -> Result<(), DatasetError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DatasetError::FractionOutOfRange { name, value });
    }
    Ok(())
}
