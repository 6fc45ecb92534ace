//! # Error Types
//!
//! Defines the error taxonomy shared by every component that talks to a
//! managed service.

use thiserror::Error;

/// Failure of a single remote call against a managed service.
///
/// Callers decide locally what each class means for them: the worker keeps
/// polling, setup aborts, teardown moves on to the next step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The addressed resource does not exist (or no longer exists).
    #[error("{operation} on {resource}: resource does not exist")]
    NotFound {
        operation: String,
        resource: String,
    },

    /// The receipt handle was superseded by a redelivery or already used.
    #[error("{operation}: receipt handle is no longer valid")]
    StaleReceipt { operation: String },

    /// Network failure, throttling, timeout or a service-side 5xx.
    #[error("{operation} on {resource}: transient failure: {message}")]
    Transient {
        operation: String,
        resource: String,
        message: String,
    },

    /// The service refused the request.
    #[error("{operation} on {resource} rejected ({code}): {message}")]
    Rejected {
        operation: String,
        resource: String,
        code: String,
        message: String,
    },
}

impl ServiceError {
    /// Build a `NotFound` error.
    pub fn not_found(operation: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::NotFound {
            operation: operation.into(),
            resource: resource.into(),
        }
    }

    /// Build a `Transient` error.
    pub fn transient(
        operation: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transient {
            operation: operation.into(),
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Build a `Rejected` error.
    pub fn rejected(
        operation: impl Into<String>,
        resource: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            operation: operation.into(),
            resource: resource.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// True when the resource is already absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when retrying later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// True for acknowledgement conditions that only mean "already handled".
    #[must_use]
    pub fn is_ignorable_on_delete(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::StaleReceipt { .. })
    }

    /// The operation that failed.
    #[must_use]
    pub fn operation(&self) -> &str {
        match self {
            Self::NotFound { operation, .. }
            | Self::StaleReceipt { operation }
            | Self::Transient { operation, .. }
            | Self::Rejected { operation, .. } => operation,
        }
    }
}

/// The caller's account identity could not be determined.
///
/// Single failure signal for identity resolution; each caller decides whether
/// it is fatal to its own operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identity service call failed.
    #[error("cannot resolve caller account: {0}")]
    Unavailable(#[from] ServiceError),

    /// The identity service answered without an account id.
    #[error("identity service returned no account id")]
    MissingAccount,
}

/// A queue message body could not be decoded into event records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Outer notification envelope is not valid JSON of the expected shape.
    #[error("malformed notification envelope: {0}")]
    MalformedEnvelope(String),

    /// Inner `Message` string is not a valid event notification.
    #[error("malformed event notification in envelope message: {0}")]
    MalformedNotification(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_helpers() {
        let gone = ServiceError::not_found("DeleteQueue", "ShippingQueue");
        assert!(gone.is_not_found());
        assert!(gone.is_ignorable_on_delete());
        assert!(!gone.is_transient());

        let stale = ServiceError::StaleReceipt {
            operation: "DeleteMessage".into(),
        };
        assert!(stale.is_ignorable_on_delete());

        let throttled = ServiceError::transient("ReceiveMessage", "q", "throttled");
        assert!(throttled.is_transient());
        assert!(!throttled.is_ignorable_on_delete());
        assert_eq!(throttled.operation(), "ReceiveMessage");
    }

    #[test]
    fn test_display_carries_context() {
        let err = ServiceError::rejected("CreateBucket", "orders", "AccessDenied", "denied");
        assert_eq!(
            err.to_string(),
            "CreateBucket on orders rejected (AccessDenied): denied"
        );

        let identity = IdentityError::from(ServiceError::transient("GetCallerIdentity", "sts", "timeout"));
        assert!(identity.to_string().starts_with("cannot resolve caller account"));
    }
}
