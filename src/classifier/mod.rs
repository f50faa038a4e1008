pub mod knn;
pub mod outliers;
pub mod samples;
pub mod scores;

pub use knn::{Candidate, Neighbors, PoseClassifier};
pub use outliers::SampleOutlier;
pub use samples::{PoseSample, SampleDatabase};
pub use scores::{ClassScores, PoseClassification, SmoothedClassification};
