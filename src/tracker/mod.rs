pub mod counter;
pub mod exercise;
pub mod smooth;

pub use counter::RepetitionCounter;
pub use exercise::{ExerciseTracker, FrameResult};
pub use smooth::EmaSmoother;
