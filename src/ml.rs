//! Pattern statistics and classification.
//!
//! Stages, in data-flow order:
//!
//! 1. [`vectorizer`] - corpus to vocabulary and TF-IDF matrix
//! 2. [`distribution`] - per-recording (pattern, score, count) lists
//! 3. [`aggregate`] - long frames and per-category averages
//! 4. [`classifier`] - feature table, train/test split, logistic fit, accuracy

pub mod aggregate;
pub mod classifier;
pub mod distribution;
pub mod logistic;
pub mod metrics;
pub mod split;
pub mod vectorizer;

pub use aggregate::{
    AggregatedFrame, AnnotatedRecordingRow, AnnotatedRow, FrameRow, LongFrame,
    average_by_category, category_frame, category_recordings_frame, zip_to_frame,
};
pub use classifier::{
    ClassifierConfig, Evaluation, FeatureTable, MissingValuePolicy, NawbaClassifier,
    train_classifier,
};
pub use distribution::{Distribution, DistributionExtractor, PatternWeight};
pub use logistic::{FittedLogistic, LogisticConfig, LogisticRegression};
pub use metrics::{ConfusionMatrix, accuracy_score};
pub use split::{TrainTestSplit, train_test_split};
pub use vectorizer::{TfIdfVectorizer, TfidfMatrix, TfidfNorm, VectorizerConfig, Vocabulary};
