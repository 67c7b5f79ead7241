use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named rendering target within a message.
///
/// Every message carries at most one content field per format. The pipeline
/// only ever iterates over the formats a message actually sets, so nothing
/// downstream assumes both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// The `text/plain` body.
    Text,
    /// The `text/html` body.
    Html,
}

impl Format {
    /// All known formats, in the order they appear in a multipart message.
    pub const ALL: [Self; 2] = [Self::Text, Self::Html];

    /// Returns the configuration key for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`Format`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format '{0}', expected 'text' or 'html'")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            other => Err(UnknownFormat(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_formats() {
        assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("html".parse::<Format>().unwrap(), Format::Html);
    }

    #[test]
    fn parse_unknown_format_fails() {
        let err = "amp".parse::<Format>().unwrap_err();
        assert_eq!(err, UnknownFormat("amp".to_owned()));
        assert!(err.to_string().contains("'amp'"));
    }

    #[test]
    fn display_matches_serde_name() {
        for format in Format::ALL {
            let json = serde_json::to_value(format).unwrap();
            assert_eq!(json, serde_json::Value::String(format.to_string()));
        }
    }
}
