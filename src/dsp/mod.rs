pub mod level;
pub mod note;
pub mod pitch;
pub mod stats;
