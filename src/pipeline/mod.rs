//! Pipeline module - the training stages and prediction

pub mod ingestion;
pub mod loader;
pub mod predict;
pub mod selection;
pub mod trainer;
pub mod transformation;

pub use ingestion::{split_indices, DataIngestion, IngestionOutput};
pub use loader::*;
pub use predict::{prediction_column, PredictPipeline};
pub use selection::{split_features_target, CandidateScore, ModelSelection, ScoreReport, TunedCandidate};
pub use trainer::{ModelTrainer, TrainedModel, TrainingOutcome};
pub use transformation::{target_vector, with_target, DataTransformation, TransformationOutput};
