//! Reading and writing image stacks in the idx binary container: a four
//! byte magic of two zero bytes, a dtype code and the dimension count,
//! followed by big endian u32 extents and the raw voxel data.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{error::DatasetError, stack::Stack, Float};

/// Element datatype a stack file is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    U8,
    I32,
}

impl Dtype {
    fn code(self) -> u8 {
        match self {
            Dtype::U8 => 0x08,
            Dtype::I32 => 0x0C,
        }
    }
}

pub fn read_stack(path: impl AsRef<Path>, dtype: Dtype) -> Result<Stack, DatasetError> {
    let path = path.as_ref();
    let io_err = |source| DatasetError::Io {
        path: path.to_owned(),
        source,
    };
    let format_err = |reason: String| DatasetError::Format {
        path: path.to_owned(),
        reason,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(io_err)?;
    if magic[0] != 0 || magic[1] != 0 {
        return Err(format_err("not an idx stack file".into()));
    }
    if magic[2] != dtype.code() {
        return Err(format_err(format!(
            "dtype code {:#04x} does not match the expected {:#04x}",
            magic[2],
            dtype.code()
        )));
    }
    if magic[3] != 3 {
        return Err(format_err(format!(
            "expected 3 dimensions, found {}",
            magic[3]
        )));
    }

    let mut extents = [0u8; 12];
    reader.read_exact(&mut extents).map_err(io_err)?;
    let depth = u32::from_be_bytes([extents[0], extents[1], extents[2], extents[3]]) as usize;
    let height = u32::from_be_bytes([extents[4], extents[5], extents[6], extents[7]]) as usize;
    let width = u32::from_be_bytes([extents[8], extents[9], extents[10], extents[11]]) as usize;

    let n = depth * height * width;
    let v = match dtype {
        Dtype::U8 => {
            let mut raw = vec![0u8; n];
            reader.read_exact(&mut raw).map_err(io_err)?;
            raw.iter().map(|byte| *byte as Float).collect()
        }
        Dtype::I32 => {
            let mut raw = vec![0u8; 4 * n];
            reader.read_exact(&mut raw).map_err(io_err)?;
            raw.chunks_exact(4)
                .map(|chunk| i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as Float)
                .collect()
        }
    };

    log::info!(
        "loaded {depth}x{height}x{width} stack from {}",
        path.display()
    );

    Ok(Stack::from_vec(depth, height, width, v))
}

pub fn write_stack(path: impl AsRef<Path>, stack: &Stack, dtype: Dtype) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let io_err = |source| DatasetError::Io {
        path: path.to_owned(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    writer
        .write_all(&[0, 0, dtype.code(), 3])
        .map_err(io_err)?;
    for extent in stack.shape() {
        writer
            .write_all(&(extent as u32).to_be_bytes())
            .map_err(io_err)?;
    }

    match dtype {
        Dtype::U8 => {
            let raw: Vec<u8> = stack
                .v
                .iter()
                .map(|value| value.clamp(0.0, 255.0).round() as u8)
                .collect();
            writer.write_all(&raw).map_err(io_err)?;
        }
        Dtype::I32 => {
            let mut raw = Vec::with_capacity(4 * stack.len());
            for value in stack.v.iter().copied() {
                raw.extend_from_slice(&(value.round() as i32).to_be_bytes());
            }
            writer.write_all(&raw).map_err(io_err)?;
        }
    }

    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{read_stack, write_stack, Dtype};
    use crate::{error::DatasetError, stack::Stack, Float};

    #[test]
    fn roundtrips_a_u8_stack() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.idx");

        let mut stack = Stack::zeros(3, 4, 5);
        for (i, value) in stack.v.iter_mut().enumerate() {
            *value = (i % 256) as Float;
        }

        write_stack(&path, &stack, Dtype::U8).unwrap();
        let restored = read_stack(&path, Dtype::U8).unwrap();

        assert_eq!(restored, stack);
    }

    #[test]
    fn roundtrips_an_i32_stack_with_negative_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.idx");

        let stack = Stack::from_vec(1, 2, 2, vec![0.0, 255.0, -7.0, 1024.0]);

        write_stack(&path, &stack, Dtype::I32).unwrap();
        let restored = read_stack(&path, Dtype::I32).unwrap();

        assert_eq!(restored, stack);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_stack(dir.path().join("nope.idx"), Dtype::U8).unwrap_err();

        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn wrong_dtype_code_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.idx");

        write_stack(&path, &Stack::zeros(2, 2, 2), Dtype::U8).unwrap();
        let err = read_stack(&path, Dtype::I32).unwrap_err();

        assert!(matches!(err, DatasetError::Format { .. }));
    }
}
