use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Technique {
    Path,
    Header(&'static str),
}

impl Technique {
    pub fn name(&self) -> &str {
        match self {
            Technique::Path => "path",
            Technique::Header(name) => name,
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            Technique::Path => "Bypass Success",
            Technique::Header(_) => "Header Bypass",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finding {
    Severity(Severity),
    Bypass(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub url: String,
    pub status: Option<u16>,
    #[serde(flatten)]
    pub finding: Finding,
}

impl DiscoveryRecord {
    pub fn discovered(url: String, status: u16, severity: Severity) -> Self {
        Self {
            url,
            status: Some(status),
            finding: Finding::Severity(severity),
        }
    }

    pub fn bypass(url: String, status: u16, technique: &Technique) -> Self {
        Self {
            url,
            status: Some(status),
            finding: Finding::Bypass(technique.name().to_string()),
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match &self.finding {
            Finding::Severity(s) => Some(*s),
            Finding::Bypass(_) => None,
        }
    }

    pub fn technique(&self) -> Option<&str> {
        match &self.finding {
            Finding::Bypass(t) => Some(t),
            Finding::Severity(_) => None,
        }
    }

    pub fn is_bypass(&self) -> bool {
        matches!(self.finding, Finding::Bypass(_))
    }

    pub fn field_names(&self) -> [&'static str; 3] {
        match self.finding {
            Finding::Severity(_) => ["url", "status", "severity"],
            Finding::Bypass(_) => ["url", "status", "bypass"],
        }
    }
}
