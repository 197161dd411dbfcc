pub mod cart_repo;
pub mod models;
pub mod order_repo;
pub mod paypal;
pub mod product_repo;
pub mod review_repo;
pub mod stripe;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => DomainError::NotFound("Record"),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(format!("Already exists: {}", info.message()))
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Query helpers ────────────────────────────────────────────────────────────

/// `%q%` for a case-insensitive substring match, with LIKE wildcards in `q`
/// taken literally. Postgres escapes with a backslash by default.
pub(crate) fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            DomainError::from(DieselError::NotFound),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn like_wildcards_are_matched_literally() {
        assert_eq!(contains_pattern("shirt"), "%shirt%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn other_diesel_errors_are_internal() {
        assert!(matches!(
            DomainError::from(DieselError::RollbackTransaction),
            DomainError::Internal(_)
        ));
    }
}
