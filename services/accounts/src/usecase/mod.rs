pub mod account;
pub mod channel;
pub mod federated;
pub mod like;
pub mod password_reset;
pub mod registration;
pub mod session;
pub mod subscription;
pub mod token;
