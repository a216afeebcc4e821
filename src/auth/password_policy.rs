//! Password policy applied at registration and password reset.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min_length} characters required")]
    TooShort { min_length: usize },

    #[error("Password too long: maximum {max_length} characters allowed")]
    TooLong { max_length: usize },

    #[error("Password must contain at least one letter")]
    MissingLetter,

    #[error("Password must contain at least one number")]
    MissingNumber,

    #[error("Password is in the list of commonly used passwords")]
    CommonPassword,

    #[error("Password is too similar to username")]
    SimilarToUsername,
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_letter: bool,
    pub require_number: bool,
    pub prevent_common_passwords: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_number: true,
            prevent_common_passwords: true,
        }
    }
}

lazy_static! {
    static ref LETTER_RE: Regex = Regex::new(r"[A-Za-z]").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref COMMON_PASSWORDS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        for pwd in [
            "password", "password1", "password123", "123456", "1234567", "12345678",
            "123456789", "qwerty", "qwerty123", "abc123", "letmein", "welcome",
            "welcome1", "admin", "iloveyou", "monkey", "dragon", "111111", "000000",
            "sunshine", "princess", "football", "baseball", "trustno1",
        ] {
            set.insert(pwd);
        }
        set
    };
}

impl PasswordPolicy {
    pub fn validate(
        &self,
        password: &str,
        username: Option<&str>,
    ) -> Result<(), PasswordPolicyError> {
        if password.len() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }
        if password.len() > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max_length: self.max_length,
            });
        }
        if self.require_letter && !LETTER_RE.is_match(password) {
            return Err(PasswordPolicyError::MissingLetter);
        }
        if self.require_number && !NUMBER_RE.is_match(password) {
            return Err(PasswordPolicyError::MissingNumber);
        }
        if self.prevent_common_passwords
            && COMMON_PASSWORDS.contains(password.to_lowercase().as_str())
        {
            return Err(PasswordPolicyError::CommonPassword);
        }
        if let Some(username) = username {
            if !username.is_empty()
                && password.to_lowercase().contains(&username.to_lowercase())
            {
                return Err(PasswordPolicyError::SimilarToUsername);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_password() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("Tr4ding-floor", Some("amal")).is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("ab1", None),
            Err(PasswordPolicyError::TooShort { min_length: 8 })
        );
    }

    #[test]
    fn rejects_password_without_number() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("lettersonly", None),
            Err(PasswordPolicyError::MissingNumber)
        );
    }

    #[test]
    fn rejects_common_password() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("password123", None),
            Err(PasswordPolicyError::CommonPassword)
        );
    }

    #[test]
    fn rejects_password_containing_username() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("amal-trade-99", Some("amal")),
            Err(PasswordPolicyError::SimilarToUsername)
        );
    }
}
