pub mod handler;

pub use handler::{JobError, JobSummary, SpeedtestJob};
