//! Bucket manifest, provider shapes and error codes for the Rustack S3
//! provider.
//!
//! - [`bucket`] holds the `Bucket` managed resource and its desired record.
//! - [`types`] holds the request/response shapes of the bucket configuration
//!   APIs, shared by the AWS and in-memory adapters.
//! - [`policy`] holds the structured policy body.
//! - [`error`] holds [`S3Error`] and the well-known codes.

pub mod bucket;
pub mod error;
pub mod policy;
pub mod types;

pub use bucket::{Bucket, BucketObservation, BucketParameters, KIND_BUCKET};
pub use error::{S3Error, S3ErrorCode};
pub use policy::BucketPolicyBody;
