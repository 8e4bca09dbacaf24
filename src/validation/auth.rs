use crate::error::{AppError, Result};

/// Validates an email address. Deliberately loose: presence, one `@`, and a
/// sane length; the unique constraint does the rest.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    if email.len() > 255 {
        return Err(AppError::Validation(
            "Email must be at most 255 characters".to_string(),
        ));
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    Ok(())
}

/// Validates a password against the configured minimum length.
pub fn validate_password(password: &str, min_len: usize) -> Result<()> {
    if password.len() < min_len {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            min_len
        )));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a display name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    if name.len() > 255 {
        return Err(AppError::Validation(
            "Name must be at most 255 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn password_length_is_policy_driven() {
        assert!(validate_password("demo123", 6).is_ok());
        assert!(validate_password("demo1", 6).is_err());
        assert!(validate_password("demo1", 4).is_ok());
        assert!(validate_password(&"x".repeat(129), 6).is_err());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("A").is_ok());
        assert!(validate_name("   ").is_err());
    }
}
