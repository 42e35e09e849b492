//! Table manifest, provider shapes and error codes for the Rustack DynamoDB
//! provider.
//!
//! - [`table`] holds the `Table` managed resource and its desired record.
//! - [`types`] holds the shapes of the table-management APIs.
//! - [`error`] holds [`DynamoDBError`] and the well-known codes.

pub mod error;
pub mod table;
pub mod types;

pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use table::{KIND_TABLE, Table, TableObservation, TableParameters};
