//! Random patch extraction from preprocessed volumes. Every draw is
//! independent, so a dataset can serve arbitrarily many patches per epoch.

use rand::Rng;

use crate::{error::DatasetError, stack::Stack, utils::randi};

// draw a corner so the patch lies fully inside the volume.
fn random_corner<R: Rng>(
    rng: &mut R,
    volume: [usize; 3],
    patch: [usize; 3],
) -> Result<[usize; 3], DatasetError> {
    if patch[0] > volume[0] || patch[1] > volume[1] || patch[2] > volume[2] {
        return Err(DatasetError::PatchTooLarge { patch, volume });
    }
    Ok([
        randi(rng, 0, volume[0] - patch[0] + 1),
        randi(rng, 0, volume[1] - patch[1] + 1),
        randi(rng, 0, volume[2] - patch[2] + 1),
    ])
}

/// One random patch from `data` with the spatially matching label patch,
/// both cut at the same corner.
pub fn sample_labeled_input<R: Rng>(
    rng: &mut R,
    data: &Stack,
    labels: &Stack,
    shape: [usize; 3],
) -> Result<(Stack, Stack), DatasetError> {
    if data.shape() != labels.shape() {
        return Err(DatasetError::ShapeMismatch {
            left: data.shape(),
            right: labels.shape(),
        });
    }
    let corner = random_corner(rng, data.shape(), shape)?;
    Ok((data.crop(corner, shape), labels.crop(corner, shape)))
}

/// One random patch from `data`.
pub fn sample_unlabeled_input<R: Rng>(
    rng: &mut R,
    data: &Stack,
    shape: [usize; 3],
) -> Result<Stack, DatasetError> {
    let corner = random_corner(rng, data.shape(), shape)?;
    Ok(data.crop(corner, shape))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{sample_labeled_input, sample_unlabeled_input};
    use crate::{error::DatasetError, stack::Stack, Float};

    // voxel value encodes its own coordinates: z*10_000 + y*100 + x.
    fn coded(depth: usize, height: usize, width: usize) -> Stack {
        let mut stack = Stack::zeros(depth, height, width);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    stack.set(z, y, x, (z * 10_000 + y * 100 + x) as Float);
                }
            }
        }
        stack
    }

    #[test]
    fn labeled_patches_share_a_corner() {
        let mut rng = StdRng::seed_from_u64(11);
        let data = coded(6, 12, 12);
        let mut labels = data.clone();
        for value in labels.v.iter_mut() {
            *value += 0.5;
        }

        let (input, target) = sample_labeled_input(&mut rng, &data, &labels, [3, 5, 5]).unwrap();

        let code = input.get(0, 0, 0) as usize;
        let corner = [code / 10_000, (code / 100) % 100, code % 100];
        for z in 0..3 {
            for y in 0..5 {
                for x in 0..5 {
                    let expected =
                        ((corner[0] + z) * 10_000 + (corner[1] + y) * 100 + (corner[2] + x))
                            as Float;
                    assert_eq!(input.get(z, y, x), expected);
                    assert_eq!(target.get(z, y, x), expected + 0.5);
                }
            }
        }
    }

    #[test]
    fn every_patch_has_the_requested_shape() {
        let mut rng = StdRng::seed_from_u64(12);
        let data = coded(8, 10, 14);

        for _ in 0..10 {
            let patch = sample_unlabeled_input(&mut rng, &data, [2, 7, 9]).unwrap();
            assert_eq!(patch.shape(), [2, 7, 9]);
        }
    }

    #[test]
    fn patch_matching_the_volume_is_the_whole_volume() {
        let mut rng = StdRng::seed_from_u64(13);
        let data = coded(4, 6, 6);

        let patch = sample_unlabeled_input(&mut rng, &data, [4, 6, 6]).unwrap();

        assert_eq!(patch, data);
    }

    #[test]
    fn oversized_patch_is_rejected() {
        let mut rng = StdRng::seed_from_u64(14);
        let data = coded(4, 6, 6);

        let err = sample_unlabeled_input(&mut rng, &data, [5, 6, 6]).unwrap_err();

        assert!(matches!(err, DatasetError::PatchTooLarge { .. }));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let mut rng = StdRng::seed_from_u64(15);
        let data = coded(4, 6, 6);
        let labels = coded(4, 6, 5);

        let err = sample_labeled_input(&mut rng, &data, &labels, [2, 2, 2]).unwrap_err();

        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }
}
