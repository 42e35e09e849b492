//! [`BucketApi`] backed by the AWS SDK for Rust.
//!
//! Each call maps one-to-one onto an S3 operation. SDK failures are turned
//! into [`S3Error`] values that keep the service error code and HTTP status,
//! so reconcilers can tell a missing configuration from a real failure the
//! same way they do against the in-memory store.

mod convert;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types as sdk;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use rustack_provider_core::{ConnectSettings, ProviderResult, ResolvedCredentials};
use rustack_s3_model::types::{
    AccelerateConfiguration, BucketLoggingStatus, CorsConfiguration, CreateBucketInput,
    LifecycleConfiguration, NotificationConfiguration, ObjectLockConfiguration, ObjectOwnership,
    Payer, PublicAccessBlockConfiguration, PutBucketAclInput, ReplicationConfiguration,
    RequestPaymentConfiguration, ServerSideEncryptionConfiguration, Tagging,
    VersioningConfiguration, WebsiteConfiguration,
};
use rustack_s3_model::{S3Error, S3ErrorCode};
use tracing::debug;

use self::convert::{build_error, parse};
use crate::api::{BucketApi, S3Result};
use crate::config::S3ProviderConfig;
use crate::connector::BucketApiFactory;

/// Name the static credentials provider reports to the SDK.
const CREDENTIALS_PROVIDER_NAME: &str = "provider-config";

/// Bucket API over a real (or S3-compatible) endpoint.
#[derive(Debug, Clone)]
pub struct AwsBucketApi {
    client: Client,
}

impl AwsBucketApi {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for the given region, credentials and endpoint.
    ///
    /// The endpoint named by the provider config wins over the one in
    /// `config`. Static credentials bypass the SDK's default chain.
    pub async fn connect(settings: &ConnectSettings, config: &S3ProviderConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let ResolvedCredentials::Static(creds) = &settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = settings.endpoint.as_ref().or(config.endpoint_url.as_ref()) {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        debug!(region = %settings.region, endpoint = ?settings.endpoint, "built S3 client");

        Self::new(Client::from_conf(builder.build()))
    }
}

/// Builds an [`AwsBucketApi`] per connect.
#[derive(Debug, Clone, Default)]
pub struct AwsBucketApiFactory {
    config: S3ProviderConfig,
}

impl AwsBucketApiFactory {
    /// Create a factory with shared adapter settings.
    #[must_use]
    pub fn new(config: S3ProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BucketApiFactory for AwsBucketApiFactory {
    async fn build(&self, settings: &ConnectSettings) -> ProviderResult<Arc<dyn BucketApi>> {
        Ok(Arc::new(AwsBucketApi::connect(settings, &self.config).await))
    }
}

/// Turn an SDK failure into an [`S3Error`] keeping code and status.
///
/// HEAD responses carry no body, so a bare 404 becomes `NotFound`.
fn map_sdk_error<E>(err: SdkError<E, HttpResponse>) -> S3Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err
        .raw_response()
        .and_then(|r| http::StatusCode::from_u16(r.status().as_u16()).ok());
    let code = match (err.code(), status) {
        (Some(code), _) => S3ErrorCode::from(code),
        (None, Some(http::StatusCode::NOT_FOUND)) => S3ErrorCode::NotFound,
        (None, _) => S3ErrorCode::InternalError,
    };
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_owned);
    let error = S3Error::with_message(code, message);
    match status {
        Some(status) => error.with_status(status),
        None => error,
    }
}

fn not_found(code: S3ErrorCode, bucket: &str) -> S3Error {
    S3Error::new(code).with_resource(bucket)
}

#[async_trait]
impl BucketApi for AwsBucketApi {
    async fn head_bucket(&self, bucket: &str) -> S3Result<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn create_bucket(&self, input: &CreateBucketInput) -> S3Result<()> {
        let location = input.location_constraint.as_deref().map(|l| {
            sdk::CreateBucketConfiguration::builder()
                .location_constraint(sdk::BucketLocationConstraint::from(l))
                .build()
        });
        let grants = &input.grants;
        self.client
            .create_bucket()
            .bucket(&input.bucket)
            .set_create_bucket_configuration(location)
            .set_acl(input.acl.map(|a| sdk::BucketCannedAcl::from(a.as_str())))
            .set_grant_full_control(grants.grant_full_control.clone())
            .set_grant_read(grants.grant_read.clone())
            .set_grant_read_acp(grants.grant_read_acp.clone())
            .set_grant_write(grants.grant_write.clone())
            .set_grant_write_acp(grants.grant_write_acp.clone())
            .object_lock_enabled_for_bucket(input.object_lock_enabled_for_bucket)
            .set_object_ownership(
                input
                    .object_ownership
                    .map(|o| sdk::ObjectOwnership::from(o.as_str())),
            )
            .send()
            .await
            .map_err(map_sdk_error)?;
        debug!(bucket = %input.bucket, "created bucket");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        debug!(bucket, "deleted bucket");
        Ok(())
    }

    async fn put_bucket_acl(&self, input: &PutBucketAclInput) -> S3Result<()> {
        let grants = &input.grants;
        self.client
            .put_bucket_acl()
            .bucket(&input.bucket)
            .set_acl(input.acl.map(|a| sdk::BucketCannedAcl::from(a.as_str())))
            .set_grant_full_control(grants.grant_full_control.clone())
            .set_grant_read(grants.grant_read.clone())
            .set_grant_read_acp(grants.grant_read_acp.clone())
            .set_grant_write(grants.grant_write.clone())
            .set_grant_write_acp(grants.grant_write_acp.clone())
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn put_bucket_ownership_controls(
        &self,
        bucket: &str,
        ownership: ObjectOwnership,
    ) -> S3Result<()> {
        let rule = sdk::OwnershipControlsRule::builder()
            .object_ownership(sdk::ObjectOwnership::from(ownership.as_str()))
            .build()
            .map_err(build_error)?;
        let controls = sdk::OwnershipControls::builder()
            .rules(rule)
            .build()
            .map_err(build_error)?;
        self.client
            .put_bucket_ownership_controls()
            .bucket(bucket)
            .ownership_controls(controls)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &str) -> S3Result<VersioningConfiguration> {
        let out = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(VersioningConfiguration {
            status: out.status().map(|s| parse(s.as_str())).transpose()?,
            mfa_delete: out.mfa_delete().map(|m| parse(m.as_str())).transpose()?,
        })
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &str,
        config: &VersioningConfiguration,
    ) -> S3Result<()> {
        let versioning = sdk::VersioningConfiguration::builder()
            .set_status(config.status.map(|s| sdk::BucketVersioningStatus::from(s.as_str())))
            .set_mfa_delete(config.mfa_delete.map(|m| sdk::MfaDelete::from(m.as_str())))
            .build();
        self.client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(versioning)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_accelerate_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<AccelerateConfiguration> {
        let out = self
            .client
            .get_bucket_accelerate_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(AccelerateConfiguration {
            status: out.status().map(|s| parse(s.as_str())).transpose()?,
        })
    }

    async fn put_bucket_accelerate_configuration(
        &self,
        bucket: &str,
        config: &AccelerateConfiguration,
    ) -> S3Result<()> {
        let accelerate = sdk::AccelerateConfiguration::builder()
            .set_status(config.status.map(|s| sdk::BucketAccelerateStatus::from(s.as_str())))
            .build();
        self.client
            .put_bucket_accelerate_configuration()
            .bucket(bucket)
            .accelerate_configuration(accelerate)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_logging(&self, bucket: &str) -> S3Result<BucketLoggingStatus> {
        let out = self
            .client
            .get_bucket_logging()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(BucketLoggingStatus {
            logging_enabled: out.logging_enabled().map(convert::from_logging).transpose()?,
        })
    }

    async fn put_bucket_logging(
        &self,
        bucket: &str,
        status: &BucketLoggingStatus,
    ) -> S3Result<()> {
        let logging = sdk::BucketLoggingStatus::builder()
            .set_logging_enabled(
                status
                    .logging_enabled
                    .as_ref()
                    .map(convert::to_logging)
                    .transpose()?,
            )
            .build();
        self.client
            .put_bucket_logging()
            .bucket(bucket)
            .bucket_logging_status(logging)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_notification_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<NotificationConfiguration> {
        let out = self
            .client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(convert::from_notification(
            out.topic_configurations(),
            out.queue_configurations(),
            out.lambda_function_configurations(),
        ))
    }

    async fn put_bucket_notification_configuration(
        &self,
        bucket: &str,
        config: &NotificationConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(convert::to_notification(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_request_payment(
        &self,
        bucket: &str,
    ) -> S3Result<RequestPaymentConfiguration> {
        let out = self
            .client
            .get_bucket_request_payment()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let payer = out
            .payer()
            .map_or(Payer::BucketOwner.as_str(), sdk::Payer::as_str);
        Ok(RequestPaymentConfiguration {
            payer: parse(payer)?,
        })
    }

    async fn put_bucket_request_payment(
        &self,
        bucket: &str,
        config: &RequestPaymentConfiguration,
    ) -> S3Result<()> {
        let payment = sdk::RequestPaymentConfiguration::builder()
            .payer(sdk::Payer::from(config.payer.as_str()))
            .build()
            .map_err(build_error)?;
        self.client
            .put_bucket_request_payment()
            .bucket(bucket)
            .request_payment_configuration(payment)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_object_lock_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<ObjectLockConfiguration> {
        let out = self
            .client
            .get_object_lock_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.object_lock_configuration()
            .map_or_else(|| Ok(ObjectLockConfiguration::default()), convert::from_object_lock)
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &ObjectLockConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_object_lock_configuration()
            .bucket(bucket)
            .object_lock_configuration(convert::to_object_lock(config))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_cors(&self, bucket: &str) -> S3Result<CorsConfiguration> {
        let out = self
            .client
            .get_bucket_cors()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(convert::from_cors(out.cors_rules()))
    }

    async fn put_bucket_cors(&self, bucket: &str, config: &CorsConfiguration) -> S3Result<()> {
        self.client
            .put_bucket_cors()
            .bucket(bucket)
            .cors_configuration(convert::to_cors(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_cors(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_cors()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<LifecycleConfiguration> {
        let out = self
            .client
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        convert::from_lifecycle(out.rules())
    }

    async fn put_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
        config: &LifecycleConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(convert::to_lifecycle(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_lifecycle(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_lifecycle()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_replication(&self, bucket: &str) -> S3Result<ReplicationConfiguration> {
        let out = self
            .client
            .get_bucket_replication()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let config = out.replication_configuration().ok_or_else(|| {
            not_found(S3ErrorCode::ReplicationConfigurationNotFoundError, bucket)
        })?;
        convert::from_replication(config)
    }

    async fn put_bucket_replication(
        &self,
        bucket: &str,
        config: &ReplicationConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_bucket_replication()
            .bucket(bucket)
            .replication_configuration(convert::to_replication(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_replication(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_replication()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_encryption(
        &self,
        bucket: &str,
    ) -> S3Result<ServerSideEncryptionConfiguration> {
        let out = self
            .client
            .get_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let config = out.server_side_encryption_configuration().ok_or_else(|| {
            not_found(
                S3ErrorCode::ServerSideEncryptionConfigurationNotFoundError,
                bucket,
            )
        })?;
        convert::from_encryption(config)
    }

    async fn put_bucket_encryption(
        &self,
        bucket: &str,
        config: &ServerSideEncryptionConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(convert::to_encryption(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_encryption(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_tagging(&self, bucket: &str) -> S3Result<Tagging> {
        let out = self
            .client
            .get_bucket_tagging()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(Tagging {
            tag_set: convert::from_tags(out.tag_set()),
        })
    }

    async fn put_bucket_tagging(&self, bucket: &str, tagging: &Tagging) -> S3Result<()> {
        let tags = sdk::Tagging::builder()
            .set_tag_set(Some(convert::to_tags(&tagging.tag_set)?))
            .build()
            .map_err(build_error)?;
        self.client
            .put_bucket_tagging()
            .bucket(bucket)
            .tagging(tags)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_tagging(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_tagging()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_website(&self, bucket: &str) -> S3Result<WebsiteConfiguration> {
        let out = self
            .client
            .get_bucket_website()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        convert::from_website(&out)
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        config: &WebsiteConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(convert::to_website(config)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_website(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_website()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_public_access_block(
        &self,
        bucket: &str,
    ) -> S3Result<PublicAccessBlockConfiguration> {
        let out = self
            .client
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.public_access_block_configuration()
            .map(convert::from_public_access_block)
            .ok_or_else(|| {
                not_found(S3ErrorCode::NoSuchPublicAccessBlockConfiguration, bucket)
            })
    }

    async fn put_public_access_block(
        &self,
        bucket: &str,
        config: &PublicAccessBlockConfiguration,
    ) -> S3Result<()> {
        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(convert::to_public_access_block(config))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_public_access_block(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn get_bucket_policy(&self, bucket: &str) -> S3Result<String> {
        let out = self
            .client
            .get_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.policy()
            .map(str::to_owned)
            .ok_or_else(|| not_found(S3ErrorCode::NoSuchBucketPolicy, bucket))
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> S3Result<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_bucket_policy(&self, bucket: &str) -> S3Result<()> {
        self.client
            .delete_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::operation::head_bucket::HeadBucketError;
    use rustack_provider_core::AwsCredentials;

    use super::*;

    fn settings() -> ConnectSettings {
        ConnectSettings {
            region: "eu-west-1".into(),
            credentials: ResolvedCredentials::Static(AwsCredentials {
                access_key_id: "test".into(),
                secret_access_key: "test".into(),
                session_token: None,
            }),
            endpoint: Some("http://localhost:4566".into()),
        }
    }

    #[test]
    fn test_should_map_construction_failure_to_internal_error() {
        let err: SdkError<HeadBucketError, HttpResponse> =
            SdkError::construction_failure("missing bucket name");
        let mapped = map_sdk_error(err);
        assert_eq!(mapped.code, S3ErrorCode::InternalError);
        assert!(!mapped.is_not_found());
    }

    #[tokio::test]
    async fn test_should_build_client_with_static_credentials() {
        let api = AwsBucketApi::connect(&settings(), &S3ProviderConfig::default()).await;
        let config = api.client.config();
        assert_eq!(
            config.region().map(ToString::to_string).as_deref(),
            Some("eu-west-1")
        );
    }

    #[tokio::test]
    #[ignore = "requires an S3-compatible endpoint at localhost:4566"]
    async fn test_should_report_missing_bucket_as_not_found() {
        let api = AwsBucketApi::connect(&settings(), &S3ProviderConfig::default()).await;
        let err = api.head_bucket("acme-missing-bucket").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
