//! Classification of SDK failures into `ServiceError`.
//!
//! Every `SdkError` variant is handled:
//! - `ServiceError`: dispatched by error code
//! - `TimeoutError`, `DispatchFailure`, `ResponseError`: `Transient`
//! - `ConstructionFailure`: `Rejected`

use aws_sdk_sqs::error::{ProvideErrorMetadata, SdkError};
use shared_types::ServiceError;

/// Codes meaning the addressed resource does not exist.
const NOT_FOUND_CODES: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
    "NotFound",
    "NotFoundException",
    "ResourceNotFoundException",
    "NoSuchBucket",
    "NoSuchKey",
];

/// Codes meaning a receipt handle was superseded or already used.
const STALE_RECEIPT_CODES: &[&str] = &["ReceiptHandleIsInvalid", "InvalidReceiptHandle"];

/// Codes worth retrying.
const TRANSIENT_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestThrottled",
    "RequestThrottledException",
    "TooManyRequestsException",
    "SlowDown",
    "RequestTimeout",
    "RequestTimeoutException",
    "ServiceUnavailable",
    "InternalError",
    "InternalFailure",
    "AWS.SimpleQueueService.InternalError",
    "KMS.ThrottlingException",
];

/// Classify an `SdkError` from any of the service clients.
///
/// All SDK crates share the same `SdkError` type, so one function serves
/// the queue, topic, object store and identity adapters.
pub fn classify<E, R>(operation: &str, resource: &str, err: &SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service_err) => {
            let inner = service_err.err();
            let message = inner
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| inner.to_string());
            classify_code(operation, resource, inner.code(), &message)
        }
        SdkError::TimeoutError(_) => {
            ServiceError::transient(operation, resource, "operation timed out")
        }
        SdkError::DispatchFailure(e) => {
            ServiceError::transient(operation, resource, format!("dispatch failure: {e:?}"))
        }
        SdkError::ResponseError(e) => {
            ServiceError::transient(operation, resource, format!("unreadable response: {e:?}"))
        }
        SdkError::ConstructionFailure(e) => ServiceError::rejected(
            operation,
            resource,
            "ConstructionFailure",
            format!("{e:?}"),
        ),
        _ => ServiceError::transient(operation, resource, format!("{err:?}")),
    }
}

/// Classify a service error by its error code.
pub fn classify_code(
    operation: &str,
    resource: &str,
    code: Option<&str>,
    message: &str,
) -> ServiceError {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => {
            ServiceError::not_found(operation, resource)
        }
        Some(code) if STALE_RECEIPT_CODES.contains(&code) => ServiceError::StaleReceipt {
            operation: operation.to_string(),
        },
        Some(code) if TRANSIENT_CODES.contains(&code) => {
            ServiceError::transient(operation, resource, format!("{code}: {message}"))
        }
        Some(code) => ServiceError::rejected(operation, resource, code, message),
        None => ServiceError::transient(operation, resource, message),
    }
}

/// A response field the service always sets was missing.
pub(crate) fn missing_field(operation: &str, resource: &str, field: &str) -> ServiceError {
    ServiceError::rejected(
        operation,
        resource,
        "MissingField",
        format!("response did not include {field}"),
    )
}
