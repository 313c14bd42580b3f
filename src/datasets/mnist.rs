//! Downloads and parses the MNIST dataset of handwritten digits into
//! batches ready to be given to the digit Model.
//!
//! The four idx files are fetched over HTTP on first use, gunzipped and
//! cached under a local `data/` directory; every later use reads the cache
//! instead of the network.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::service::INPUT_SHAPE;
use crate::tensor::Batch;

const BASE_URL: &str = "https://storage.googleapis.com/cvdf-datasets/mnist/";
const CACHE_DIR: &str = "data";

const TRAIN_IMAGES_FILE: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS_FILE: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES_FILE: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS_FILE: &str = "t10k-labels-idx1-ubyte";

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

/// The error that can happen while fetching or parsing the MNIST idx files.
#[derive(Debug)]
pub enum MnistError {
    /// Something went wrong downloading one of the files.
    Http(reqwest::Error),
    /// Something went wrong reading or writing the local cache.
    Io(std::io::Error),
    /// A file did not start with the magic number its kind requires.
    InvalidMagic {
        /// The file being parsed.
        file: &'static str,
        /// The magic number that was found instead.
        found: u32,
    },
    /// A file ended before all of the samples it declared were read.
    TruncatedFile {
        /// The file being parsed.
        file: &'static str,
    },
    /// An images file declared dimensions other than `28x28`.
    UnexpectedDimensions {
        /// The file being parsed.
        file: &'static str,
        /// The declared amount of rows.
        rows: usize,
        /// The declared amount of columns.
        columns: usize,
    },
}

impl fmt::Display for MnistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnistError::Http(err) => write!(f, "unable to download a MNIST file: {}", err),
            MnistError::Io(err) => write!(f, "unable to read or write the MNIST cache: {}", err),
            MnistError::InvalidMagic { file, found } => {
                write!(f, "{} does not look like an idx file (magic {})", file, found)
            }
            MnistError::TruncatedFile { file } => {
                write!(f, "{} ended before all of its declared samples", file)
            }
            MnistError::UnexpectedDimensions {
                file,
                rows,
                columns,
            } => {
                write!(f, "{} declares {}x{} images instead of 28x28", file, rows, columns)
            }
        }
    }
}

impl std::error::Error for MnistError {}

impl From<reqwest::Error> for MnistError {
    fn from(err: reqwest::Error) -> Self {
        MnistError::Http(err)
    }
}

impl From<std::io::Error> for MnistError {
    fn from(err: std::io::Error) -> Self {
        MnistError::Io(err)
    }
}

/// Gets the 60.000 training images together with their labels.
///
/// The pixels of every image are flattened into one sample of the Model's
/// `28x28x1` input shape with the colors normalized from `0 to 1` by
/// dividing by **255**.
pub fn training_set() -> Result<(Batch, Vec<usize>), MnistError> {
    Ok((
        parse_images(TRAIN_IMAGES_FILE, &fetch(TRAIN_IMAGES_FILE)?)?,
        parse_labels(TRAIN_LABELS_FILE, &fetch(TRAIN_LABELS_FILE)?)?,
    ))
}

/// Gets the 10.000 images held out for testing together with their labels,
/// normalized the same way as [`training_set`].
pub fn test_set() -> Result<(Batch, Vec<usize>), MnistError> {
    Ok((
        parse_images(TEST_IMAGES_FILE, &fetch(TEST_IMAGES_FILE)?)?,
        parse_labels(TEST_LABELS_FILE, &fetch(TEST_LABELS_FILE)?)?,
    ))
}

fn fetch(file: &'static str) -> Result<Vec<u8>, MnistError> {
    let cache_path: PathBuf = Path::new(CACHE_DIR).join(file);

    if cache_path.exists() {
        return Ok(fs::read(&cache_path)?);
    }

    let compressed = reqwest::blocking::get(format!("{}{}.gz", BASE_URL, file))?
        .error_for_status()?
        .bytes()?;

    let mut contents = Vec::new();
    GzDecoder::new(compressed.as_ref()).read_to_end(&mut contents)?;

    fs::create_dir_all(CACHE_DIR)?;
    fs::write(&cache_path, &contents)?;

    Ok(contents)
}

fn parse_images(file: &'static str, contents: &[u8]) -> Result<Batch, MnistError> {
    let magic = read_u32(file, contents, 0)?;
    if magic != IMAGES_MAGIC {
        return Err(MnistError::InvalidMagic { file, found: magic });
    }

    let samples_amount = read_u32(file, contents, 4)? as usize;
    let rows = read_u32(file, contents, 8)? as usize;
    let columns = read_u32(file, contents, 12)? as usize;
    if rows != INPUT_SHAPE.height || columns != INPUT_SHAPE.width {
        return Err(MnistError::UnexpectedDimensions {
            file,
            rows,
            columns,
        });
    }

    let image_volume = INPUT_SHAPE.volume();

    let pixels = &contents[16..];
    if pixels.len() < samples_amount * image_volume {
        return Err(MnistError::TruncatedFile { file });
    }

    let samples = pixels
        .chunks_exact(image_volume)
        .take(samples_amount)
        .map(|image| image.iter().map(|byte| *byte as f32 / 255.0).collect())
        .collect::<Vec<Vec<f32>>>();

    Ok(Batch::new(samples, INPUT_SHAPE)
        .expect("MNIST images are always of the model's input shape"))
}

fn parse_labels(file: &'static str, contents: &[u8]) -> Result<Vec<usize>, MnistError> {
    let magic = read_u32(file, contents, 0)?;
    if magic != LABELS_MAGIC {
        return Err(MnistError::InvalidMagic { file, found: magic });
    }

    let samples_amount = read_u32(file, contents, 4)? as usize;

    let labels = &contents[8..];
    if labels.len() < samples_amount {
        return Err(MnistError::TruncatedFile { file });
    }

    Ok(labels
        .iter()
        .take(samples_amount)
        .map(|byte| *byte as usize)
        .collect())
}

fn read_u32(file: &'static str, contents: &[u8], offset: usize) -> Result<u32, MnistError> {
    if contents.len() < offset + 4 {
        return Err(MnistError::TruncatedFile { file });
    }

    Ok(u32::from_be_bytes([
        contents[offset],
        contents[offset + 1],
        contents[offset + 2],
        contents[offset + 3],
    ]))
}

#[cfg(test)]
mod tests {
    use super::{parse_images, parse_labels, IMAGES_MAGIC, LABELS_MAGIC};

    fn images_file(samples_amount: u32) -> Vec<u8> {
        let mut contents = Vec::new();
        contents.extend_from_slice(&IMAGES_MAGIC.to_be_bytes());
        contents.extend_from_slice(&samples_amount.to_be_bytes());
        contents.extend_from_slice(&28_u32.to_be_bytes());
        contents.extend_from_slice(&28_u32.to_be_bytes());
        contents.extend(std::iter::repeat(127_u8).take(samples_amount as usize * 28 * 28));
        contents
    }

    #[test]
    fn should_parse_and_normalize_images() {
        let batch = parse_images("images", &images_file(3)).expect("a well formed idx file");

        assert_eq!(batch.samples_amount(), 3);
        assert!((batch.samples()[0][0] - 127.0 / 255.0).abs() <= 0.000_01);
    }

    #[test]
    fn should_reject_files_with_the_wrong_magic() {
        let mut contents = images_file(1);
        contents[0..4].copy_from_slice(&LABELS_MAGIC.to_be_bytes());

        assert!(parse_images("images", &contents).is_err());
    }

    #[test]
    fn should_parse_labels() {
        let mut contents = Vec::new();
        contents.extend_from_slice(&LABELS_MAGIC.to_be_bytes());
        contents.extend_from_slice(&4_u32.to_be_bytes());
        contents.extend_from_slice(&[0, 3, 9, 5]);

        let labels = parse_labels("labels", &contents).expect("a well formed idx file");

        assert_eq!(labels, vec![0, 3, 9, 5]);
    }
}
