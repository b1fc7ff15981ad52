pub mod sample;
pub mod server;

pub use sample::{Run, Sample, RAW_UNITS_PER_MBPS, SAMPLE_TIMESTAMP_FORMAT};
pub use server::ServerDescriptor;
