use axum::http::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, warn};

use super::dto::{AuthResponse, RegisterRequest};
use super::jwt::JwtKeys;
use super::repo_types::{Role, User};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_AGE: i32 = 13;
pub const MAX_AGE: i32 = 110;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes the registration form in place and returns the parsed role.
pub(crate) fn validate_registration(req: &mut RegisterRequest) -> Result<Role, String> {
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_lowercase();

    if req.name.is_empty() {
        return Err("Please fill all fields".into());
    }
    if !is_valid_email(&req.email) {
        return Err("Invalid email".into());
    }
    if req.password != req.confirm_password {
        return Err("Passwords don't match".into());
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !(MIN_AGE..=MAX_AGE).contains(&req.age) {
        return Err(format!("Age must be between {MIN_AGE} and {MAX_AGE}"));
    }
    req.role.parse::<Role>().map_err(|e| {
        warn!(error = %e, "invalid role received");
        "Invalid role selected".to_string()
    })
}

/// Signs a fresh access/refresh pair for the user.
pub(crate) fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, (StatusCode, String)> {
    let access_token = keys.sign_access(user.id, user.role).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let refresh_token = keys.sign_refresh(user.id, user.role).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterRequest {
        RegisterRequest {
            name: "  Asha Rao ".into(),
            email: " Asha@Example.COM ".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            age: 34,
            role: "Researcher".into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
    }

    #[test]
    fn valid_form_is_normalized() {
        let mut f = form();
        assert_eq!(validate_registration(&mut f).unwrap(), Role::Researcher);
        assert_eq!(f.email, "asha@example.com");
        assert_eq!(f.name, "Asha Rao");
    }

    #[test]
    fn rejects_mismatched_passwords() {
        let mut f = form();
        f.confirm_password = "secret2".into();
        assert_eq!(validate_registration(&mut f).unwrap_err(), "Passwords don't match");
    }

    #[test]
    fn rejects_short_password() {
        let mut f = form();
        f.password = "abc".into();
        f.confirm_password = "abc".into();
        assert!(validate_registration(&mut f).unwrap_err().contains("at least 6"));
    }

    #[test]
    fn rejects_age_out_of_range() {
        for age in [12, 111] {
            let mut f = form();
            f.age = age;
            assert!(validate_registration(&mut f).unwrap_err().starts_with("Age"));
        }
    }

    #[test]
    fn rejects_unknown_role_and_blank_name() {
        let mut f = form();
        f.role = "nurse".into();
        assert_eq!(validate_registration(&mut f).unwrap_err(), "Invalid role selected");

        let mut f = form();
        f.name = "   ".into();
        assert!(validate_registration(&mut f).is_err());
    }
}
