//! Auth types shared between the accounts service and the gateway.
//!
//! Provides JWT claims and access-token validation, token cookie builders, and
//! the `IdentityHeaders` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
