//! Ports Layer
//!
//! - Driving Port (inbound): `ProvisioningApi`
//! - Driven Ports (outbound): the four managed services, bundled as
//!   `CloudServices`

pub mod inbound;
pub mod outbound;

pub use inbound::ProvisioningApi;
pub use outbound::CloudServices;
