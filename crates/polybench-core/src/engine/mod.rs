pub mod collector;
pub mod process;

pub use collector::{CollectionReport, SampleCollector, TrialFailure};
pub use process::{parse_output, ProcessRunner, SampleSource};
