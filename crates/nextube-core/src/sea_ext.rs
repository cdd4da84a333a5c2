use sea_orm::{DbErr, SqlErr};

/// True when the database rejected a write because of a unique index.
///
/// Used to turn insert races (two registrations for one email, two
/// profile completions for one username) into conflicts instead of 500s.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
