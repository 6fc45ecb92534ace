//! Object store adapter over `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::error::BuildError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, Event, NotificationConfiguration,
    ObjectIdentifier, TopicConfiguration,
};
use aws_sdk_s3::Client;
use shared_bus::{ObjectPage, ObjectStoreService};
use shared_types::ServiceError;
use tracing::{info, warn};

use super::errors::classify;

/// Returned when re-creating a bucket this account already owns.
const ALREADY_OWNED: &str = "BucketAlreadyOwnedByYou";

/// `ObjectStoreService` backed by the managed object store.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn invalid_request(operation: &str, bucket: &str, e: BuildError) -> ServiceError {
    ServiceError::rejected(operation, bucket, "InvalidRequest", e.to_string())
}

#[async_trait]
impl ObjectStoreService for S3ObjectStore {
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), ServiceError> {
        let configuration = location_constraint.map(|region| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build()
        });
        let result = self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(configuration)
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => match classify("CreateBucket", bucket, &e) {
                ServiceError::Rejected { code, .. } if code == ALREADY_OWNED => {
                    info!(bucket, "Bucket already exists in this account");
                    Ok(())
                }
                other => Err(other),
            },
        }
    }

    async fn put_bucket_notification(
        &self,
        bucket: &str,
        topic_arn: &str,
        events: &[String],
    ) -> Result<(), ServiceError> {
        const OP: &str = "PutBucketNotificationConfiguration";
        let topic_configuration = TopicConfiguration::builder()
            .topic_arn(topic_arn)
            .set_events(Some(events.iter().map(|e| Event::from(e.as_str())).collect()))
            .build()
            .map_err(|e| invalid_request(OP, bucket, e))?;
        let configuration = NotificationConfiguration::builder()
            .topic_configurations(topic_configuration)
            .build();
        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(configuration)
            .send()
            .await
            .map_err(|e| classify(OP, bucket, &e))?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| classify("PutObject", bucket, &e))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ServiceError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| classify("ListObjectsV2", bucket, &e))?;
        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        let next_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        Ok(ObjectPage { keys, next_token })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ServiceError> {
        const OP: &str = "DeleteObjects";
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid_request(OP, bucket, e))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| invalid_request(OP, bucket, e))?;
        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| classify(OP, bucket, &e))?;

        if let Some(first) = output.errors().first() {
            warn!(
                bucket,
                failed = output.errors().len(),
                key = first.key().unwrap_or_default(),
                "Some objects were not deleted"
            );
            return Err(ServiceError::rejected(
                OP,
                bucket,
                first.code().unwrap_or("PartialFailure"),
                first.message().unwrap_or("objects were not deleted"),
            ));
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify("DeleteBucket", bucket, &e))?;
        Ok(())
    }
}
