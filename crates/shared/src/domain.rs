use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a destination institution as issued by the collaborator
/// service (for example `UPC-EETAC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniversityId(pub String);

impl UniversityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniversityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wizard stage. The numeric order doubles as a watermark: being at stage N
/// means every stage before N completed at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Bando,
    Mete,
    Esami,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Bando, Stage::Mete, Stage::Esami];

    /// 1-based stage number, matching what the user sees in the stepper.
    pub fn number(self) -> u8 {
        match self {
            Self::Bando => 1,
            Self::Mete => 2,
            Self::Esami => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Bando),
            2 => Some(Self::Mete),
            3 => Some(Self::Esami),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bando => "Bando",
            Self::Mete => "Mete",
            Self::Esami => "Esami",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Live,
    Mock,
}

impl Mode {
    pub fn from_flag(mock: bool) -> Self {
        if mock {
            Self::Mock
        } else {
            Self::Live
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
        }
    }
}

/// Exchange period. Serialized the way the collaborator expects it on the
/// wire (`"Fall"` / `"Spring"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    Fall,
    Spring,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Spring => "Spring",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fall" | "autumn" => Some(Self::Fall),
            "spring" => Some(Self::Spring),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the shortlist request is encoded and whether it needs a study plan
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadProfile {
    /// Study plan PDF is mandatory; the request goes out as multipart form data.
    #[default]
    PdfRequired,
    /// No document; the request goes out as a JSON body.
    TextOnly,
}

impl UploadProfile {
    pub fn requires_file(self) -> bool {
        matches!(self, Self::PdfRequired)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pdf_required" | "pdf" | "multipart" => Some(Self::PdfRequired),
            "text_only" | "text" | "json" => Some(Self::TextOnly),
            _ => None,
        }
    }
}
