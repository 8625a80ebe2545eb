//! Service mode.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Deployment flavor of the running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    #[default]
    Prod,
    Dev,
    Mock,
    Local,
}

/// Error returned when a mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("received wrong mode syntax: {0:?}")]
pub struct ModeError(pub String);

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Prod => "PROD",
            Mode::Dev => "DEV",
            Mode::Mock => "MOCK",
            Mode::Local => "LOCAL",
        }
    }

    pub fn is_prod(&self) -> bool {
        *self == Mode::Prod
    }

    pub fn is_dev(&self) -> bool {
        *self == Mode::Dev
    }

    pub fn is_mock(&self) -> bool {
        *self == Mode::Mock
    }

    pub fn is_local(&self) -> bool {
        *self == Mode::Local
    }
}

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PROD" => Ok(Mode::Prod),
            "DEV" => Ok(Mode::Dev),
            "MOCK" => Ok(Mode::Mock),
            "LOCAL" => Ok(Mode::Local),
            _ => Err(ModeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = ModeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("dev".parse::<Mode>(), Ok(Mode::Dev));
        assert_eq!("Local".parse::<Mode>(), Ok(Mode::Local));
        assert_eq!("MOCK".parse::<Mode>(), Ok(Mode::Mock));
        assert_eq!("prod".parse::<Mode>(), Ok(Mode::Prod));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "staging".parse::<Mode>().unwrap_err();
        assert_eq!(err, ModeError("staging".to_string()));
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn default_is_prod() {
        assert!(Mode::default().is_prod());
        assert!(!Mode::default().is_dev());
    }
}
