//! S3 error codes and the error type returned by every bucket API call.
//!
//! Reconcilers tell "not configured" apart from real failures by code, so the
//! codes a sub-resource can answer with when it has no configuration are all
//! spelled out here.

use std::fmt;

/// Well-known S3 error codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// AccessControlListNotSupported error.
    AccessControlListNotSupported,
    /// AccessDenied error.
    AccessDenied,
    /// BucketAlreadyExists error.
    BucketAlreadyExists,
    /// BucketAlreadyOwnedByYou error.
    BucketAlreadyOwnedByYou,
    /// BucketNotEmpty error.
    BucketNotEmpty,
    /// Default error code.
    #[default]
    InternalError,
    /// InvalidArgument error.
    InvalidArgument,
    /// InvalidBucketName error.
    InvalidBucketName,
    /// InvalidBucketState error.
    InvalidBucketState,
    /// InvalidLocationConstraint error.
    InvalidLocationConstraint,
    /// InvalidRequest error.
    InvalidRequest,
    /// InvalidTag error.
    InvalidTag,
    /// InvalidTargetBucketForLogging error.
    InvalidTargetBucketForLogging,
    /// MalformedPolicy error.
    MalformedPolicy,
    /// MalformedXML error.
    MalformedXML,
    /// MethodNotAllowed error.
    MethodNotAllowed,
    /// NoSuchBucket error.
    NoSuchBucket,
    /// NoSuchBucketPolicy error.
    NoSuchBucketPolicy,
    /// NoSuchCORSConfiguration error.
    NoSuchCORSConfiguration,
    /// NoSuchLifecycleConfiguration error.
    NoSuchLifecycleConfiguration,
    /// NoSuchPublicAccessBlockConfiguration error.
    NoSuchPublicAccessBlockConfiguration,
    /// NoSuchTagSet error.
    NoSuchTagSet,
    /// NoSuchWebsiteConfiguration error.
    NoSuchWebsiteConfiguration,
    /// NotFound error, returned by HEAD requests without a body.
    NotFound,
    /// NotImplemented error.
    NotImplemented,
    /// ObjectLockConfigurationNotFoundError error.
    ObjectLockConfigurationNotFoundError,
    /// OwnershipControlsNotFoundError error.
    OwnershipControlsNotFoundError,
    /// ReplicationConfigurationNotFoundError error.
    ReplicationConfigurationNotFoundError,
    /// ServerSideEncryptionConfigurationNotFoundError error.
    ServerSideEncryptionConfigurationNotFoundError,
    /// ServiceUnavailable error.
    ServiceUnavailable,
    /// SlowDown error.
    SlowDown,
    /// UnsupportedArgument error.
    UnsupportedArgument,
    /// Any code not in the list above.
    Other(String),
}

impl S3ErrorCode {
    /// Returns the error code as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessControlListNotSupported => "AccessControlListNotSupported",
            Self::AccessDenied => "AccessDenied",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidBucketState => "InvalidBucketState",
            Self::InvalidLocationConstraint => "InvalidLocationConstraint",
            Self::InvalidRequest => "InvalidRequest",
            Self::InvalidTag => "InvalidTag",
            Self::InvalidTargetBucketForLogging => "InvalidTargetBucketForLogging",
            Self::MalformedPolicy => "MalformedPolicy",
            Self::MalformedXML => "MalformedXML",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::NoSuchCORSConfiguration => "NoSuchCORSConfiguration",
            Self::NoSuchLifecycleConfiguration => "NoSuchLifecycleConfiguration",
            Self::NoSuchPublicAccessBlockConfiguration => "NoSuchPublicAccessBlockConfiguration",
            Self::NoSuchTagSet => "NoSuchTagSet",
            Self::NoSuchWebsiteConfiguration => "NoSuchWebsiteConfiguration",
            Self::NotFound => "NotFound",
            Self::NotImplemented => "NotImplemented",
            Self::ObjectLockConfigurationNotFoundError => "ObjectLockConfigurationNotFoundError",
            Self::OwnershipControlsNotFoundError => "OwnershipControlsNotFoundError",
            Self::ReplicationConfigurationNotFoundError => "ReplicationConfigurationNotFoundError",
            Self::ServerSideEncryptionConfigurationNotFoundError => {
                "ServerSideEncryptionConfigurationNotFoundError"
            }
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::SlowDown => "SlowDown",
            Self::UnsupportedArgument => "UnsupportedArgument",
            Self::Other(s) => s,
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::AccessControlListNotSupported
            | Self::InvalidArgument
            | Self::InvalidBucketName
            | Self::InvalidLocationConstraint
            | Self::InvalidRequest
            | Self::InvalidTag
            | Self::InvalidTargetBucketForLogging
            | Self::MalformedPolicy
            | Self::MalformedXML
            | Self::UnsupportedArgument => http::StatusCode::BAD_REQUEST,
            Self::AccessDenied => http::StatusCode::FORBIDDEN,
            Self::NoSuchBucket
            | Self::NoSuchBucketPolicy
            | Self::NoSuchCORSConfiguration
            | Self::NoSuchLifecycleConfiguration
            | Self::NoSuchPublicAccessBlockConfiguration
            | Self::NoSuchTagSet
            | Self::NoSuchWebsiteConfiguration
            | Self::NotFound
            | Self::ObjectLockConfigurationNotFoundError
            | Self::OwnershipControlsNotFoundError
            | Self::ReplicationConfigurationNotFoundError
            | Self::ServerSideEncryptionConfigurationNotFoundError => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyExists
            | Self::BucketAlreadyOwnedByYou
            | Self::BucketNotEmpty
            | Self::InvalidBucketState => http::StatusCode::CONFLICT,
            Self::NotImplemented => http::StatusCode::NOT_IMPLEMENTED,
            Self::ServiceUnavailable | Self::SlowDown => http::StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError | Self::Other(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AccessControlListNotSupported => "The bucket does not allow ACLs",
            Self::AccessDenied => "Access Denied",
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::BucketAlreadyOwnedByYou => "The bucket is already owned by you",
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::InvalidArgument => "Invalid Argument",
            Self::InvalidBucketName => "The specified bucket is not valid",
            Self::InvalidBucketState => {
                "The request is not valid with the current state of the bucket"
            }
            Self::InvalidLocationConstraint => "The specified location constraint is not valid",
            Self::InvalidRequest => "Invalid Request",
            Self::InvalidTag => "The tag provided was not a valid tag",
            Self::InvalidTargetBucketForLogging => "The target bucket for logging does not exist",
            Self::MalformedPolicy => "Policies must be valid JSON",
            Self::MalformedXML => "The XML you provided was not well-formed",
            Self::MethodNotAllowed => "The specified method is not allowed against this resource",
            Self::NoSuchBucket | Self::NotFound => "The specified bucket does not exist",
            Self::NoSuchBucketPolicy => "The specified bucket does not have a bucket policy",
            Self::NoSuchCORSConfiguration => "The CORS configuration does not exist",
            Self::NoSuchLifecycleConfiguration => "The lifecycle configuration does not exist",
            Self::NoSuchPublicAccessBlockConfiguration => {
                "The public access block configuration was not found"
            }
            Self::NoSuchTagSet => "The TagSet does not exist",
            Self::NoSuchWebsiteConfiguration => "The website configuration does not exist",
            Self::NotImplemented => "The functionality is not implemented",
            Self::ObjectLockConfigurationNotFoundError => {
                "Object Lock configuration does not exist for this bucket"
            }
            Self::OwnershipControlsNotFoundError => "The bucket ownership controls were not found",
            Self::ReplicationConfigurationNotFoundError => {
                "The replication configuration was not found"
            }
            Self::ServerSideEncryptionConfigurationNotFoundError => {
                "The server side encryption configuration was not found"
            }
            Self::ServiceUnavailable => "Service is unable to handle request",
            Self::SlowDown => "Please reduce your request rate",
            Self::UnsupportedArgument => "The argument is not supported",
            Self::InternalError | Self::Other(_) => "We encountered an internal error",
        }
    }
}

impl From<&str> for S3ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "AccessControlListNotSupported" => Self::AccessControlListNotSupported,
            "AccessDenied" => Self::AccessDenied,
            "BucketAlreadyExists" => Self::BucketAlreadyExists,
            "BucketAlreadyOwnedByYou" => Self::BucketAlreadyOwnedByYou,
            "BucketNotEmpty" => Self::BucketNotEmpty,
            "InternalError" => Self::InternalError,
            "InvalidArgument" => Self::InvalidArgument,
            "InvalidBucketName" => Self::InvalidBucketName,
            "InvalidBucketState" => Self::InvalidBucketState,
            "InvalidLocationConstraint" => Self::InvalidLocationConstraint,
            "InvalidRequest" => Self::InvalidRequest,
            "InvalidTag" => Self::InvalidTag,
            "InvalidTargetBucketForLogging" => Self::InvalidTargetBucketForLogging,
            "MalformedPolicy" => Self::MalformedPolicy,
            "MalformedXML" => Self::MalformedXML,
            "MethodNotAllowed" => Self::MethodNotAllowed,
            "NoSuchBucket" => Self::NoSuchBucket,
            "NoSuchBucketPolicy" => Self::NoSuchBucketPolicy,
            "NoSuchCORSConfiguration" => Self::NoSuchCORSConfiguration,
            "NoSuchLifecycleConfiguration" => Self::NoSuchLifecycleConfiguration,
            "NoSuchPublicAccessBlockConfiguration" => Self::NoSuchPublicAccessBlockConfiguration,
            "NoSuchTagSet" => Self::NoSuchTagSet,
            "NoSuchWebsiteConfiguration" => Self::NoSuchWebsiteConfiguration,
            "NotFound" => Self::NotFound,
            "NotImplemented" => Self::NotImplemented,
            "ObjectLockConfigurationNotFoundError" => Self::ObjectLockConfigurationNotFoundError,
            "OwnershipControlsNotFoundError" => Self::OwnershipControlsNotFoundError,
            "ReplicationConfigurationNotFoundError" => Self::ReplicationConfigurationNotFoundError,
            "ServerSideEncryptionConfigurationNotFoundError" => {
                Self::ServerSideEncryptionConfigurationNotFoundError
            }
            "ServiceUnavailable" => Self::ServiceUnavailable,
            "SlowDown" => Self::SlowDown,
            "UnsupportedArgument" => Self::UnsupportedArgument,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
}

impl S3Error {
    /// Create a new S3Error from an error code.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.default_message().to_owned(),
            code,
            resource: None,
        }
    }

    /// Create a new S3Error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            resource: None,
        }
    }

    /// Set the resource that caused this error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Override the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status_code: http::StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Create a NoSuchBucket error.
    #[must_use]
    pub fn no_such_bucket(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_resource(bucket_name)
    }

    /// Create a BucketAlreadyOwnedByYou error.
    #[must_use]
    pub fn bucket_already_owned_by_you(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketAlreadyOwnedByYou).with_resource(bucket_name)
    }

    /// Create an InvalidRequest error with a message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidRequest, message)
    }

    /// Whether the error carries `code`.
    #[must_use]
    pub fn is_code(&self, code: &S3ErrorCode) -> bool {
        &self.code == code
    }

    /// Whether the bucket (or the addressed configuration) does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code == http::StatusCode::NOT_FOUND
            || matches!(self.code, S3ErrorCode::NoSuchBucket | S3ErrorCode::NotFound)
    }

    /// Whether the bucket already exists and belongs to the caller.
    #[must_use]
    pub fn is_already_owned(&self) -> bool {
        matches!(self.code, S3ErrorCode::BucketAlreadyOwnedByYou)
    }
}
