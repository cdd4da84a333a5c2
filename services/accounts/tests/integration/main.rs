
mod account_test;
mod channel_test;
mod federated_test;
mod otp_cache_test;
mod password_reset_test;
mod registration_test;
