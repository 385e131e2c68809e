use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Layout algorithm selector.
///
/// `Zigzag` and `Smart` run the built-in snake grid. Every other mode is delegated to an
/// external general-purpose layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Zigzag,
    Smart,
    Grid,
    Circle,
    Breadthfirst,
    Dagre,
    CoseBilkent,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 7] = [
        Self::Zigzag,
        Self::Smart,
        Self::Grid,
        Self::Circle,
        Self::Breadthfirst,
        Self::Dagre,
        Self::CoseBilkent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zigzag => "zigzag",
            Self::Smart => "smart",
            Self::Grid => "grid",
            Self::Circle => "circle",
            Self::Breadthfirst => "breadthfirst",
            Self::Dagre => "dagre",
            Self::CoseBilkent => "cose-bilkent",
        }
    }

    pub fn is_snake(self) -> bool {
        matches!(self, Self::Zigzag | Self::Smart)
    }
}

impl FromStr for LayoutMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| Error::UnknownLayoutMode {
                mode: s.to_string(),
            })
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
