//! Module identifiers.
//!
//! A module is addressed as `owner-name` or `owner/name`. The owner is made of
//! ASCII letters and digits; the name starts with a lowercase letter followed
//! by lowercase letters, digits or underscores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ForgeError, ForgeResult};

/// Validated `owner` + `name` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName {
    owner: String,
    name: String,
}

impl ModuleName {
    /// Parse a raw identifier, rejecting anything outside the naming grammar
    pub fn parse(raw: &str) -> ForgeResult<Self> {
        let invalid = || ForgeError::InvalidName {
            raw: raw.to_string(),
        };

        let (owner, name) = raw.split_once(['-', '/']).ok_or_else(invalid)?;
        if !Self::is_valid_owner(owner) || !Self::is_valid_name(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Check the owner half of an identifier
    pub fn is_valid_owner(owner: &str) -> bool {
        !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Check the module half of an identifier
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() => chars
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
            _ => false,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `owner/name` form used by forge queries
    pub fn forge_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner, self.name)
    }
}

impl FromStr for ModuleName {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleName {
    type Error = ForgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModuleName> for String {
    fn from(name: ModuleName) -> Self {
        name.to_string()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_is_pure(raw in "\\PC{0,24}") {
            let first = ModuleName::parse(&raw).map_err(|e| e.to_string());
            let second = ModuleName::parse(&raw).map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn well_formed_names_parse(owner in "[a-zA-Z0-9]{1,12}", name in "[a-z][a-z0-9_]{0,12}") {
            let parsed = ModuleName::parse(&format!("{}-{}", owner, name)).unwrap();
            prop_assert_eq!(parsed.owner(), owner.as_str());
            prop_assert_eq!(parsed.name(), name.as_str());
        }
    }
}
