//! 账号字段校验

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 128;

/// 3 到 32 位，字母、数字、下划线或连字符
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err("Username must be 3-32 characters of letters, numbers, underscores or hyphens")
    }
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() <= 254 && EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err("Please enter a valid email")
    }
}

/// 至少 6 位，且同时包含大写字母、小写字母和数字
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        ));
    }
    if length > PASSWORD_MAX_LEN {
        return Err(format!(
            "Password must be at most {PASSWORD_MAX_LEN} characters"
        ));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err("Password must contain uppercase, lowercase, and number".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("team_rocket-42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("judge@hackflow.dev").is_ok());
        assert!(validate_email("no-at-sign.dev").is_err());
        assert!(validate_email("a b@c.de").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Abc123").is_ok());
        assert!(validate_password("Ab1").is_err());
        assert!(validate_password("abcdef1").is_err());
        assert!(validate_password("ABCDEF1").is_err());
        assert!(validate_password("Abcdefg").is_err());
    }
}
