pub mod publisher;
pub mod s3;

pub use publisher::{DEFAULT_BUCKET, PublishError, Publisher, content_type_for};
pub use s3::{BucketSettings, S3Publisher};
