use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::{AppError, Result};

/// The retry ceiling when the candidate space is crowded.
const MAX_ATTEMPTS: u32 = 100;

const DIGITS: &[u8] = b"0123456789";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LETTERS_AND_DIGITS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The alphabet a pair code is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodeFormat {
    /// Digits only.
    Numeric,
    /// Uppercase letters only.
    Alphabetic,
    /// Uppercase letters and digits.
    #[default]
    Alphanumeric,
}

impl CodeFormat {
    /// Returns the character set for this format.
    pub fn charset(self) -> &'static [u8] {
        match self {
            CodeFormat::Numeric => DIGITS,
            CodeFormat::Alphabetic => LETTERS,
            CodeFormat::Alphanumeric => LETTERS_AND_DIGITS,
        }
    }

    /// Returns the configuration name of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            CodeFormat::Numeric => "numeric",
            CodeFormat::Alphabetic => "alphabetic",
            CodeFormat::Alphanumeric => "alphanumeric",
        }
    }
}

impl fmt::Display for CodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" => Ok(CodeFormat::Numeric),
            "alphabetic" => Ok(CodeFormat::Alphabetic),
            "alphanumeric" => Ok(CodeFormat::Alphanumeric),
            other => Err(format!("unknown code format: {other}")),
        }
    }
}

/// Draws a single candidate of `length` characters from the format's alphabet.
fn draw(format: CodeFormat, length: usize) -> String {
    let charset = format.charset();
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Generates a collision-free pair code.
///
/// Candidates for which `is_taken` returns `true` are rejected and redrawn.
/// Fails with [`AppError::GenerationExhausted`] after [`MAX_ATTEMPTS`]
/// rejections. Codes are unique labels, not secrets; there is no CSPRNG
/// requirement.
pub fn generate<F>(format: CodeFormat, length: usize, is_taken: F) -> Result<String>
where
    F: Fn(&str) -> bool,
{
    for _ in 0..MAX_ATTEMPTS {
        let candidate = draw(format, length);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(AppError::GenerationExhausted(MAX_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_the_requested_length_and_alphabet() {
        for _ in 0..50 {
            let code = generate(CodeFormat::Alphanumeric, 8, |_| false).unwrap();
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| LETTERS_AND_DIGITS.contains(&b)));
        }
    }

    #[test]
    fn numeric_codes_contain_only_digits() {
        let code = generate(CodeFormat::Numeric, 6, |_| false).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn alphabetic_codes_contain_only_letters() {
        let code = generate(CodeFormat::Alphabetic, 10, |_| false).unwrap();
        assert!(code.bytes().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn taken_candidates_are_rejected() {
        // Only one candidate exists at length 1 in a 10-symbol alphabet being
        // vetoed for everything but "7".
        let code = generate(CodeFormat::Numeric, 1, |c| c != "7").unwrap();
        assert_eq!(code, "7");
    }

    #[test]
    fn exhaustion_fails_after_the_retry_ceiling() {
        let err = generate(CodeFormat::Alphanumeric, 8, |_| true).unwrap_err();
        assert!(matches!(err, AppError::GenerationExhausted(100)));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("NUMERIC".parse::<CodeFormat>().unwrap(), CodeFormat::Numeric);
        assert_eq!(
            "Alphanumeric".parse::<CodeFormat>().unwrap(),
            CodeFormat::Alphanumeric
        );
        assert!("hex".parse::<CodeFormat>().is_err());
    }
}
