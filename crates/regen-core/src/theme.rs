//! Theme preference model.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RegenError;

/// Process-local display theme, persisted to the local key-value store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// Returns the opposite theme. Toggling twice returns the original.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for ThemePreference {
    type Err = RegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(RegenError::config(format!("Unknown theme: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        let theme = ThemePreference::Light;
        assert_eq!(theme.toggled(), ThemePreference::Dark);
        assert_eq!(theme.toggled().toggled(), theme);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("light".parse::<ThemePreference>().unwrap(), ThemePreference::Light);
        assert_eq!("dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("solarized".parse::<ThemePreference>().is_err());
    }
}
