pub mod embedding;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod landmark;
pub mod stream;

pub use embedding::{FullBodyEmbedder, PoseEmbedding, EMBEDDING_DIMS, EMBEDDING_SIZE};
pub use landmark::{Landmark, LandmarkIndex, PoseLandmarks};
pub use stream::{read_landmark_file, read_landmark_stream, NO_POSE_MARKER};
