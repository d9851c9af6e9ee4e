//! User Name Value Object
//!
//! Public handle shown on listings and comments. Case is preserved for
//! display; uniqueness is checked case-insensitively.

use std::fmt;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => write!(
                f,
                "Invalid character '{char}' at position {position}. Only letters, digits, _, . and - are allowed"
            ),
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, trimmed user name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = trimmed.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = trimmed
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(c))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used for uniqueness checks
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_keeps_case() {
        let name = UserName::new("  Rani_K  ").unwrap();
        assert_eq!(name.as_str(), "Rani_K");
        assert_eq!(name.canonical(), "rani_k");
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, .. })
        ));
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_inner_whitespace_rejected() {
        assert_eq!(
            UserName::new("rani k"),
            Err(UserNameError::InvalidCharacter {
                char: ' ',
                position: 4
            })
        );
    }
}
