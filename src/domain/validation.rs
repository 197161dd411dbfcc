use super::errors::DomainError;

pub fn require_min_len(field: &str, value: &str, min: usize) -> Result<(), DomainError> {
    if value.trim().chars().count() < min {
        return Err(DomainError::InvalidInput(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

/// A pragmatic address check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_len_counts_characters_not_bytes() {
        assert!(require_min_len("Name", "Zoë", 3).is_ok());
        assert!(require_min_len("Name", "  a ", 3).is_err());
    }

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@.com"));
    }
}
