pub mod cache;
pub mod db;
pub mod google;
pub mod mailer;
pub mod media;
