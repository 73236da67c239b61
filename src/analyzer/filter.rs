use regex::{Regex, RegexBuilder};

use crate::error::{Result, ScanError};

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl ContentFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(Self::compile).transpose()?,
            exclude: exclude.map(Self::compile).transpose()?,
        })
    }

    fn compile(pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ScanError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn passes(&self, body: Option<&str>) -> bool {
        let Some(body) = body else {
            return false;
        };

        if let Some(include) = &self.include {
            if !include.is_match(body) {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(body) {
                return false;
            }
        }

        true
    }

    pub fn include_pattern(&self) -> Option<&str> {
        self.include.as_ref().map(Regex::as_str)
    }

    pub fn exclude_pattern(&self) -> Option<&str> {
        self.exclude.as_ref().map(Regex::as_str)
    }
}
