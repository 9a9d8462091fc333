//! Input validation for KURCH credentials and email addresses.

use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Symbols that satisfy the special-character rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Human-readable description of the password strength policy.
pub const PASSWORD_POLICY: &str = "Password must be at least 8 characters long and include \
     uppercase, lowercase, number, and special character.";

/// Email domains accepted for university accounts.
const UNIVERSITY_DOMAINS: &[&str] = &["ku.edu.np", "student.ku.edu.np"];

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Password is too short.
    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    /// Password has no uppercase letter.
    #[error("password must contain an uppercase letter")]
    PasswordMissingUppercase,

    /// Password has no lowercase letter.
    #[error("password must contain a lowercase letter")]
    PasswordMissingLowercase,

    /// Password has no digit.
    #[error("password must contain a digit")]
    PasswordMissingDigit,

    /// Password has no symbol from the accepted set.
    #[error("password must contain one of {}", PASSWORD_SYMBOLS)]
    PasswordMissingSymbol,

    /// Email is too long.
    #[error("email must be at most {} characters", MAX_EMAIL_LENGTH)]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Email is not a university address.
    #[error("email must be a ku.edu.np or student.ku.edu.np address")]
    EmailNotUniversity,
}

/// Validate a new password against the strength policy.
///
/// Requirements:
/// - At least 8 characters
/// - An ASCII uppercase letter, lowercase letter and digit
/// - A symbol from [`PASSWORD_SYMBOLS`]
///
/// # Examples
///
/// ```
/// use kurch::auth::validation::validate_password_strength;
///
/// assert!(validate_password_strength("New123!!").is_ok());
/// assert!(validate_password_strength("short1!").is_err());
/// assert!(validate_password_strength("nouppercase1!").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(ValidationError::PasswordMissingSymbol);
    }
    Ok(())
}

/// Validate a university email address.
///
/// The local part must be non-empty and free of whitespace and `@`; the
/// domain must be exactly `ku.edu.np` or `student.ku.edu.np`.
///
/// # Examples
///
/// ```
/// use kurch::auth::validation::validate_university_email;
///
/// assert!(validate_university_email("asha@student.ku.edu.np").is_ok());
/// assert!(validate_university_email("asha@gmail.com").is_err());
/// ```
pub fn validate_university_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::EmailInvalidFormat)?;

    if local.is_empty() || local.chars().any(char::is_whitespace) || domain.contains('@') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    if !UNIVERSITY_DOMAINS.contains(&domain) {
        return Err(ValidationError::EmailNotUniversity);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password_strength("Old123!!").is_ok());
        assert!(validate_password_strength("New123!!").is_ok());
        assert!(validate_password_strength("a{B}c|D<1>").is_ok());
    }

    #[test]
    fn test_each_rule_rejected() {
        assert_eq!(
            validate_password_strength("short1!"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_password_strength("lower123!"),
            Err(ValidationError::PasswordMissingUppercase)
        );
        assert_eq!(
            validate_password_strength("UPPER123!"),
            Err(ValidationError::PasswordMissingLowercase)
        );
        assert_eq!(
            validate_password_strength("NoDigits!!"),
            Err(ValidationError::PasswordMissingDigit)
        );
        assert_eq!(
            validate_password_strength("NoSymbol123"),
            Err(ValidationError::PasswordMissingSymbol)
        );
    }

    #[test]
    fn test_symbols_outside_set_do_not_count() {
        // '-', '_', '~' and space are not in the accepted set
        assert!(validate_password_strength("Abcdef12-_~ ").is_err());
        assert!(validate_password_strength("Abcdef12\"").is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        // 7 characters, more than 8 bytes
        assert_eq!(
            validate_password_strength("Ab1!ééé"),
            Err(ValidationError::PasswordTooShort)
        );
        assert!(validate_password_strength("Ab1!éééé").is_ok());
    }

    #[test]
    fn test_non_ascii_letters_do_not_count_for_case() {
        assert_eq!(
            validate_password_strength("ÉÉÉÉ123!a"),
            Err(ValidationError::PasswordMissingUppercase)
        );
    }

    #[test]
    fn test_university_email() {
        assert!(validate_university_email("asha@ku.edu.np").is_ok());
        assert!(validate_university_email("asha.shrestha@student.ku.edu.np").is_ok());

        assert_eq!(
            validate_university_email("asha@gmail.com"),
            Err(ValidationError::EmailNotUniversity)
        );
        assert_eq!(
            validate_university_email("asha@mail.ku.edu.np"),
            Err(ValidationError::EmailNotUniversity)
        );
        assert_eq!(
            validate_university_email("@ku.edu.np"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_university_email("as ha@ku.edu.np"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_university_email("a@b@ku.edu.np"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_university_email("no-at-sign"),
            Err(ValidationError::EmailInvalidFormat)
        );
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@ku.edu.np", "a".repeat(250));
        assert_eq!(
            validate_university_email(&email),
            Err(ValidationError::EmailTooLong)
        );
    }
}
