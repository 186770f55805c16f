//! Random password generation.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{CoreError, CoreResult};

const LOWERCASE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT_CHARS: &[u8] = b"0123456789";
const SYMBOL_CHARS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// What the generated password should look like.
#[derive(Debug, Clone)]
pub struct PasswordSpec {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for PasswordSpec {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

/// Generate a random password matching the spec.
///
/// Each enabled character class is guaranteed at least one occurrence (as
/// long as the length allows), with the remainder drawn from the merged
/// charset and the result shuffled.
pub fn generate_password(spec: &PasswordSpec) -> CoreResult<String> {
    if spec.length == 0 {
        return Err(CoreError::invalid_request(
            "password length must be at least 1",
        ));
    }

    let mut classes: Vec<&[u8]> = Vec::new();
    if spec.lowercase {
        classes.push(LOWERCASE_CHARS);
    }
    if spec.uppercase {
        classes.push(UPPERCASE_CHARS);
    }
    if spec.digits {
        classes.push(DIGIT_CHARS);
    }
    if spec.symbols {
        classes.push(SYMBOL_CHARS);
    }
    if classes.is_empty() {
        return Err(CoreError::invalid_request(
            "at least one character class must be enabled",
        ));
    }

    let mut rng = rand::rng();
    let merged: Vec<u8> = classes.concat();

    // One pick per class first, then fill from the merged charset.
    let mut bytes: Vec<u8> = classes
        .iter()
        .take(spec.length)
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();
    while bytes.len() < spec.length {
        bytes.push(merged[rng.random_range(0..merged.len())]);
    }
    bytes.shuffle(&mut rng);

    Ok(bytes.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_length() {
        let password = generate_password(&PasswordSpec::default()).unwrap();
        assert_eq!(password.len(), 16);

        let password = generate_password(&PasswordSpec {
            length: 32,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(password.len(), 32);
    }

    #[test]
    fn test_every_enabled_class_is_present() {
        let password = generate_password(&PasswordSpec::default()).unwrap();
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| SYMBOL_CHARS.contains(&(c as u8))));
    }

    #[test]
    fn test_single_class_spec() {
        let password = generate_password(&PasswordSpec {
            length: 12,
            uppercase: false,
            lowercase: false,
            digits: true,
            symbols: false,
        })
        .unwrap();
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_rejects_empty_spec() {
        let spec = PasswordSpec {
            length: 10,
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
        };
        assert!(generate_password(&spec).is_err());

        let spec = PasswordSpec {
            length: 0,
            ..Default::default()
        };
        assert!(generate_password(&spec).is_err());
    }

    #[test]
    fn test_short_lengths_still_work() {
        // Fewer slots than enabled classes: fill what fits.
        let password = generate_password(&PasswordSpec {
            length: 2,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(password.len(), 2);
    }

    #[test]
    fn test_outputs_differ() {
        let spec = PasswordSpec::default();
        let first = generate_password(&spec).unwrap();
        let second = generate_password(&spec).unwrap();
        assert_ne!(first, second);
    }
}
