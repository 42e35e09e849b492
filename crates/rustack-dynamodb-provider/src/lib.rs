//! Table reconciliation for Rustack.
//!
//! The same managed-resource pattern as the bucket provider, applied to a
//! DynamoDB table: the table itself is created from the key schema, and
//! billing, streams, encryption, deletion protection and tags are
//! reconciled as sub-resources afterwards.
//!
//! DynamoDB accepts a single change per `UpdateTable` and only while the
//! table is `ACTIVE`, so [`TableEngine`] converges one sub-resource per
//! tick and leaves a transitioning table alone.
//!
//! ```text
//! TableConnector -> TableEngine -> SubresourceSet<Table> -> TableApi
//!                                                          (AwsTableApi | MemoryTableApi)
//! ```

pub mod api;
pub mod aws;
pub mod config;
pub mod connector;
pub mod external;
pub mod memory;
pub mod references;
pub mod subresource;
pub mod validation;

pub use api::{DynamoDBResult, TableApi};
pub use aws::{AwsTableApi, AwsTableApiFactory};
pub use config::DynamoDBProviderConfig;
pub use connector::{MemoryTableApiFactory, TableApiFactory, TableConnector};
pub use external::TableEngine;
pub use memory::{MemoryTableApi, MemoryTableOptions};
pub use references::TableReferenceResolver;
pub use subresource::table_subresources;
