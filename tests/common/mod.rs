//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

use studperf::config::PipelineConfig;

pub const GENDERS: [&str; 2] = ["female", "male"];
pub const RACES: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
pub const EDUCATION: [&str; 6] = [
    "some high school",
    "high school",
    "some college",
    "associate's degree",
    "bachelor's degree",
    "master's degree",
];
pub const LUNCH: [&str; 2] = ["standard", "free/reduced"];
pub const PREP: [&str; 2] = ["none", "completed"];

/// Number of output feature columns for the default schema
/// (2 numeric + 2 + 5 + 6 + 2 + 2 one-hot).
pub const FULL_FEATURE_WIDTH: usize = 19;

/// Create a student performance DataFrame with `rows` rows.
///
/// Categories cycle through every level so any sizeable split sees all of
/// them. `math_score` is a noisy linear function of the other scores and the
/// categorical effects, so a linear model scores well above R² 0.6.
pub fn create_student_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut gender = Vec::with_capacity(rows);
    let mut race = Vec::with_capacity(rows);
    let mut education = Vec::with_capacity(rows);
    let mut lunch = Vec::with_capacity(rows);
    let mut prep = Vec::with_capacity(rows);
    let mut reading = Vec::with_capacity(rows);
    let mut writing = Vec::with_capacity(rows);
    let mut math = Vec::with_capacity(rows);

    for i in 0..rows {
        let g = i % 2;
        let l = (i / 3) % 2;
        let p = (i / 7) % 2;
        let r: i64 = rng.gen_range(40..=95);
        let w: i64 = (r + rng.gen_range(-6..=6)).clamp(0, 100);
        let noise: f64 = rng.gen_range(-3.0..3.0);
        let m = 0.6 * r as f64 + 0.3 * w as f64 + 5.0 * (l == 0) as i32 as f64
            + 4.0 * p as f64
            + 3.0 * g as f64
            + noise;

        gender.push(GENDERS[g]);
        race.push(RACES[i % 5]);
        education.push(EDUCATION[i % 6]);
        lunch.push(LUNCH[l]);
        prep.push(PREP[p]);
        reading.push(r);
        writing.push(w);
        math.push(m.round().clamp(0.0, 100.0) as i64);
    }

    df! {
        "gender" => gender,
        "race_ethnicity" => race,
        "parental_level_of_education" => education,
        "lunch" => lunch,
        "test_preparation_course" => prep,
        "math_score" => math,
        "reading_score" => reading,
        "writing_score" => writing,
    }
    .unwrap()
}

/// `rows` copies of one student record.
pub fn create_identical_dataframe(rows: usize) -> DataFrame {
    df! {
        "gender" => vec!["female"; rows],
        "race_ethnicity" => vec!["group B"; rows],
        "parental_level_of_education" => vec!["bachelor's degree"; rows],
        "lunch" => vec!["standard"; rows],
        "test_preparation_course" => vec!["none"; rows],
        "math_score" => vec![72i64; rows],
        "reading_score" => vec![72i64; rows],
        "writing_score" => vec![74i64; rows],
    }
    .unwrap()
}

/// Write `df` as CSV into `dir/name`.
pub fn write_csv(df: &mut DataFrame, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Temporary workspace holding a source CSV and an artifacts directory.
pub struct Workspace {
    pub dir: TempDir,
    pub source: PathBuf,
    pub artifacts: PathBuf,
}

impl Workspace {
    pub fn with_dataframe(df: &mut DataFrame) -> Self {
        let dir = TempDir::new().unwrap();
        let source = write_csv(df, dir.path(), "stud.csv");
        let artifacts = dir.path().join("artifacts");
        Self {
            dir,
            source,
            artifacts,
        }
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            source_path: self.source.clone(),
            artifacts_dir: self.artifacts.clone(),
            ..PipelineConfig::default()
        }
    }
}

/// Read a CSV written by the pipeline.
pub fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
