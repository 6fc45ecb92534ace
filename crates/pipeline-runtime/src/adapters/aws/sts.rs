//! Caller identity adapter over `aws-sdk-sts`.

use async_trait::async_trait;
use aws_sdk_sts::Client;
use shared_bus::IdentityService;
use shared_types::IdentityError;

use super::errors::classify;

#[derive(Clone, Debug)]
pub struct StsIdentity {
    client: Client,
}

impl StsIdentity {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityService for StsIdentity {
    async fn caller_account_id(&self) -> Result<String, IdentityError> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify("GetCallerIdentity", "caller", &e))?;
        output
            .account()
            .filter(|account| !account.is_empty())
            .map(str::to_string)
            .ok_or(IdentityError::MissingAccount)
    }
}
