//! Bucket reconciliation for Rustack.
//!
//! Drives an S3 bucket and its fourteen sub-resources towards the state
//! declared in a `Bucket` manifest. The engine only talks to S3 through
//! [`api::BucketApi`], which has a live adapter over the AWS SDK and an
//! in-memory one with the same error semantics.
//!
//! # Architecture
//!
//! ```text
//! BucketConnector (provider config -> credentials, region, endpoint)
//!        |
//!        v
//!   BucketEngine (observe / create / update / delete)
//!        |
//!        v
//!   SubresourceSet<Bucket> (versioning ... object lock, fixed order)
//!        |
//!        v
//!   BucketApi (AwsBucketApi | MemoryBucketApi)
//! ```

pub mod api;
pub mod aws;
pub mod compare;
pub mod config;
pub mod connector;
pub mod external;
pub mod memory;
pub mod policy;
pub mod references;
pub mod subresource;
pub mod validation;

pub use api::{BucketApi, S3Result};
pub use aws::{AwsBucketApi, AwsBucketApiFactory};
pub use config::S3ProviderConfig;
pub use connector::{BucketApiFactory, BucketConnector, MemoryBucketApiFactory};
pub use external::BucketEngine;
pub use memory::{MemoryBucketApi, MemoryOptions};
pub use references::BucketReferenceResolver;
pub use subresource::bucket_subresources;
