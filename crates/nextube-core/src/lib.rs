//! Ambient plumbing shared by Nextube services: probes, request ids,
//! tracing setup, serde helpers and SeaORM error helpers.

pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
