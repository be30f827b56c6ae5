//! Data ingestion: read the source dataset, persist a raw copy and split it
//! into train and test partitions.

use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::{DatasetSchema, IngestionConfig};
use crate::error::Result;
use crate::pipeline::loader::{load_dataset, save_dataset, take_rows, validate_schema};

/// Paths of the persisted partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionOutput {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Split `n_samples` row positions into shuffled `(train, test)` index sets.
///
/// The test partition holds `ceil(test_size * n_samples)` rows. The same seed
/// always produces the same partitions.
pub fn split_indices(n_samples: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let raw = n_samples as f64 * test_size;
    // 0.2 * 15 is 3.0000000000000004 in floating point
    let n_test = if (raw - raw.round()).abs() < 1e-9 { raw.round() } else { raw.ceil() };
    let n_test = (n_test as usize).min(n_samples);

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    (train, indices)
}

/// Ingestion stage.
pub struct DataIngestion {
    config: IngestionConfig,
    schema: DatasetSchema,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig, schema: DatasetSchema) -> Self {
        Self { config, schema }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Read, validate, persist and split the source dataset.
    ///
    /// A failure after the raw copy is written leaves that copy in place;
    /// re-running always re-derives everything from the source.
    pub fn run(&self) -> Result<IngestionOutput> {
        info!(source = %self.config.source_path.display(), "entered data ingestion");

        let mut df = load_dataset(&self.config.source_path)?;
        info!(rows = df.height(), cols = df.width(), "read source dataset");

        validate_schema(&df, &self.schema, "ingestion")?;

        save_dataset(&mut df, &self.config.raw_data_path)?;
        info!(path = %self.config.raw_data_path.display(), "saved raw copy");

        info!(test_size = self.config.test_size, seed = self.config.seed, "train test split initiated");
        let (train_idx, test_idx) = split_indices(df.height(), self.config.test_size, self.config.seed);

        let mut train = take_rows(&df, &train_idx)?;
        let mut test = take_rows(&df, &test_idx)?;

        save_dataset(&mut train, &self.config.train_data_path)?;
        save_dataset(&mut test, &self.config.test_data_path)?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "data ingestion completed"
        );

        Ok(IngestionOutput {
            train_path: self.config.train_data_path.clone(),
            test_path: self.config.test_data_path.clone(),
            train_rows: train.height(),
            test_rows: test.height(),
        })
    }
}
