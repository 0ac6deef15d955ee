use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// An eight-digit Brazilian postal code (CEP), stored without punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Normalizes user input by dropping every non-digit character.
    ///
    /// `"89207-407"`, `"89207407"` and `" 89.207-407 "` all yield the same
    /// code.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPostalCode`] unless exactly eight digits
    /// remain.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 8 {
            Ok(Self(digits))
        } else {
            Err(CoreError::InvalidPostalCode(raw.to_string()))
        }
    }

    /// The bare digits, as the postal lookup service expects them.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl FromStr for PostalCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self {
        value.0
    }
}
