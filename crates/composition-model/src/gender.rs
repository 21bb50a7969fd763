//! Template selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which background template a composition uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Boy,
    Girl,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boy => "boy",
            Gender::Girl => "girl",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Gender::Boy => Gender::Girl,
            Gender::Girl => Gender::Boy,
        }
    }

    /// Infer the template from a free-form "baby" label on a record.
    ///
    /// Anything containing "girl" (any case) selects the girl template;
    /// everything else, including an empty label, selects boy.
    pub fn infer_from(label: &str) -> Self {
        if label.to_lowercase().contains("girl") {
            Gender::Girl
        } else {
            Gender::Boy
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boy" => Ok(Gender::Boy),
            "girl" => Ok(Gender::Girl),
            other => Err(format!("unknown gender '{other}', expected boy or girl")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_label() {
        assert_eq!(Gender::infer_from("Baby Girl"), Gender::Girl);
        assert_eq!(Gender::infer_from("GIRL"), Gender::Girl);
        assert_eq!(Gender::infer_from("Boy"), Gender::Boy);
        assert_eq!(Gender::infer_from(""), Gender::Boy);
        assert_eq!(Gender::infer_from("twins"), Gender::Boy);
    }

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!("Girl".parse::<Gender>().unwrap(), Gender::Girl);
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(Gender::Boy.toggled(), Gender::Girl);
        assert_eq!(Gender::Girl.toggled().as_str(), "boy");
    }
}
