use serde::{Deserialize, Serialize};

/// Wire dialect spoken with the assistant service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolMode {
    /// JSON records in both directions, with a `type` discriminator on
    /// incoming frames.
    #[default]
    Structured,
    /// Plain text both ways; incoming frames are never parsed.
    Raw,
}

impl ProtocolMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Raw => "raw",
        }
    }
}

impl std::str::FromStr for ProtocolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "raw" | "text" => Ok(Self::Raw),
            other => Err(format!("unknown protocol mode: {other}")),
        }
    }
}

impl std::fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
