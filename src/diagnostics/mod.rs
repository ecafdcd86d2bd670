//! Serializable run reports for the command-line tools.

pub mod report;
pub mod timing;

pub use report::{BufferDescriptor, TransformDescriptor, TransformReport};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
