pub mod progress;
pub mod term;

pub use progress::ProgressRenderer;
