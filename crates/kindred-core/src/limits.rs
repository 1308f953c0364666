//! Input validation limits for resource protection

/// Maximum length for a name field (128 chars)
pub const MAX_NAME_LEN: usize = 128;

/// Maximum generation depth any walk will descend or ascend.
///
/// Cyclic pedigrees are a caller error; the cap turns them into a terminated
/// walk instead of a hang. Real pedigrees sit far below it.
pub const MAX_WALK_DEPTH: u32 = 64;

/// Maximum nodes loaded into one arena
pub const MAX_ARENA_NODES: usize = 100_000;

/// Validation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyFirstName,
    EmptyLastName,
    NameTooLong { field: &'static str, len: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "First name is required"),
            Self::EmptyLastName => write!(f, "Last name is required"),
            Self::NameTooLong { field, len, max } => {
                write!(f, "{} too long: {} chars (max {})", field, len, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate the identity fields of a new person
pub fn validate_identity(identity: &crate::person::PersonIdentity) -> Result<(), ValidationError> {
    if identity.first_name.trim().is_empty() {
        return Err(ValidationError::EmptyFirstName);
    }
    if identity.last_name.trim().is_empty() {
        return Err(ValidationError::EmptyLastName);
    }
    validate_name("first name", &identity.first_name)?;
    validate_name("last name", &identity.last_name)?;
    if let Some(middle) = &identity.middle_name {
        validate_name("middle name", middle)?;
    }
    Ok(())
}

fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            field,
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::PersonIdentity;

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity(&PersonIdentity::new("Ada", "Lovelace")).is_ok());
        assert_eq!(
            validate_identity(&PersonIdentity::new("  ", "Lovelace")),
            Err(ValidationError::EmptyFirstName)
        );
        assert_eq!(
            validate_identity(&PersonIdentity::new("Ada", "")),
            Err(ValidationError::EmptyLastName)
        );
        assert!(validate_identity(&PersonIdentity::new("x".repeat(200), "Lovelace")).is_err());
    }
}
