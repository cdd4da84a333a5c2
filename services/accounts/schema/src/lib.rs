//! SeaORM entities owned by the accounts service.

pub mod accounts;
pub mod likes;
pub mod subscriptions;
pub mod videos;
