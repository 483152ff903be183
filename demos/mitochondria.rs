use std::{error::Error, fs, path::Path};

use rand::{rngs::StdRng, SeedableRng};
use volset_rust::{
    gauss_random, maxmin, randi, write_stack, Compose, Dataset, Dtype, FlipHorizontal, Float,
    LabeledVolumeDataset, Rotate90, Stack, Transform, UnlabeledVolumeDataset,
};

/// Two synthetic acquisition stacks: noisy background with bright
/// mitochondria-like blobs, labels marking the blob voxels of stack1.
fn synth_stacks(root: &Path) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(40);
    let (depth, height, width) = (16usize, 96usize, 96usize);

    for (stack, with_labels) in [("stack1", true), ("stack2", false)] {
        let dir = root.join(stack);
        fs::create_dir_all(&dir)?;

        let mut data = Stack::zeros(depth, height, width);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    data.set(z, y, x, gauss_random(&mut rng, 90.0, 12.0).clamp(0.0, 255.0));
                }
            }
        }

        let mut labels = Stack::zeros(depth, height, width);
        for _ in 0..40 {
            let cz = randi(&mut rng, 2, depth - 2) as isize;
            let cy = randi(&mut rng, 6, height - 6) as isize;
            let cx = randi(&mut rng, 6, width - 6) as isize;
            let r = randi(&mut rng, 2, 5) as isize;

            for dz in -r..=r {
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dz * dz + dy * dy + dx * dx > r * r {
                            continue;
                        }
                        let (z, y, x) = (cz + dz, cy + dy, cx + dx);
                        if z < 0
                            || z >= depth as isize
                            || y < 0
                            || y >= height as isize
                            || x < 0
                            || x >= width as isize
                        {
                            continue;
                        }
                        let (z, y, x) = (z as usize, y as usize, x as usize);
                        data.set(z, y, x, gauss_random(&mut rng, 180.0, 8.0).clamp(0.0, 255.0));
                        labels.set(z, y, x, 255.0);
                    }
                }
            }
        }

        write_stack(dir.join("data.idx"), &data, Dtype::U8)?;
        if with_labels {
            write_stack(dir.join("mito_labels.idx"), &labels, Dtype::I32)?;
        }
    }

    println!("Synthesized stacks under {}", root.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let root = Path::new("demos/data/drosophila");
    if !root.join("stack1/data.idx").exists() {
        synth_stacks(root)?;
    }

    let augment: Box<dyn Transform> = Box::new(Compose {
        transforms: vec![Box::new(FlipHorizontal), Box::new(Rotate90)],
    });
    println!("Augmentation: {}", serde_json::to_string(&augment)?);

    let mut train = LabeledVolumeDataset::builder([8, 24, 24])
        .split(0.67)
        .len_epoch(200)
        .transform(augment)
        .load(root, StdRng::seed_from_u64(7))?;
    println!(
        "Train volume: {:?}, mu {:.2}, std {:.2}",
        train.data().shape(),
        train.mu(),
        train.std()
    );

    let mut test = LabeledVolumeDataset::builder([4, 24, 24])
        .train(false)
        .split(0.67)
        .len_epoch(50)
        .load(root, StdRng::seed_from_u64(8))?;
    println!("Test volume: {:?}", test.data().shape());

    let mut unlabeled = UnlabeledVolumeDataset::builder([8, 24, 24])
        .len_epoch(100)
        .load(root, StdRng::seed_from_u64(9))?;
    println!("Unlabeled volume: {:?}", unlabeled.data().shape());

    let mut coverage = 0.0;
    let mut last = None;
    for _ in 0..train.nominal_length() {
        let sample = train.sample()?;
        if let Some(target) = &sample.target {
            coverage += target.v.iter().sum::<Float>() / target.len() as Float;
        }
        last = Some(sample);
    }
    let drawn = train.nominal_length();
    println!(
        "Sampled {drawn} train patches, mean label coverage {:.1}%",
        100.0 * coverage / drawn as Float
    );

    let sample = last.expect("at least one sample drawn");
    let patch = &sample.input;
    let range = maxmin(&patch.v).expect("patch is non-empty");
    println!(
        "Last patch intensity range: [{:.2}, {:.2}]",
        range.min(),
        range.max()
    );

    // middle slice of the last patch, mapped back to raw intensities
    let z = patch.depth() / 2;
    let mut slice = Vec::with_capacity(patch.height() * patch.width());
    for y in 0..patch.height() {
        for x in 0..patch.width() {
            let value = patch.get(z, y, x) * train.std() + train.mu();
            slice.push(value.clamp(0.0, 255.0) as u8);
        }
    }
    image::save_buffer(
        "train-patch.png",
        &slice,
        patch.width() as u32,
        patch.height() as u32,
        image::ColorType::L8,
    )?;

    let bytes = bincode::serialize(&sample)?;
    fs::write("train-sample.bin", bytes)?;

    let test_sample = test.sample()?;
    println!("Test patch: {:?}", test_sample.input.shape());

    let unlabeled_sample = unlabeled.sample()?;
    println!(
        "Unlabeled patch: {:?}, labeled: {}",
        unlabeled_sample.input.shape(),
        unlabeled_sample.target.is_some()
    );

    Ok(())
}
