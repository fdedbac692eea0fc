use serde::Deserialize;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),
}

/// The curated tables and numeric bounds the engine runs on.
///
/// Every field has a default tuned for Hyderabad listings, so a market only needs to
/// override the tables that differ (eg: a `keywords` list for another city).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Chain names, format tags and landmarks. Matched as case-insensitive substrings.
    pub keywords: Vec<String>,
    pub localities: Vec<String>,
    /// Venues that are always worth looking for, even when the page layout hides them.
    pub named_venues: Vec<String>,
    /// Regular expressions. A line matching any of them is never a venue name.
    pub exclusions: Vec<String>,
    pub time_pattern: String,

    pub min_line_len: usize,
    pub max_line_len: usize,
    pub backward_margin: usize,
    pub forward_range: usize,
    pub secondary_forward_range: usize,
    pub max_showtime_line_len: usize,
    pub refine_radius: usize,
    pub max_refined_len: usize,
    pub co_occurrence_max_line_len: usize,
    pub low_count_threshold: usize,
    pub alternative_min_line_len: usize,
    pub alternative_max_line_len: usize,
    pub alternative_forward_range: usize,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            keywords: owned(&[
                "pvr",
                "inox",
                "cinepolis",
                "asian",
                "miraj",
                "carnival",
                "cinema",
                "cinemas",
                "theatre",
                "theater",
                "multiplex",
                "imax",
                "4dx",
                "35mm",
                "70mm",
                "dolby atmos",
                "laser",
                "screen",
                "mall",
                "prasads",
                "amb",
                "gpr",
                "sudarshan",
                "sandhya",
                "devi",
                "mukta",
                "bhramaramba",
                "mallikarjuna",
                "arjun",
                "shiva parvathi",
                "platinum",
            ]),
            localities: owned(&[
                "hyderabad",
                "secunderabad",
                "kukatpally",
                "ameerpet",
                "gachibowli",
                "banjara hills",
                "jubilee hills",
                "madhapur",
                "kondapur",
                "hitech city",
                "dilsukhnagar",
                "lb nagar",
                "begumpet",
                "somajiguda",
                "kachiguda",
                "abids",
                "miyapur",
                "attapur",
                "rtc x roads",
                "chikkadpally",
                "necklace road",
                "punjagutta",
                "uppal",
                "kompally",
                "nallagandla",
                "chandanagar",
                "malkajgiri",
                "ecil",
            ]),
            named_venues: owned(&[
                "prasads multiplex",
                "prasads imax",
                "amb cinemas",
                "sudarshan 35mm",
                "sandhya 70mm",
                "sandhya 35mm",
                "devi 70mm",
                "bhramaramba 70mm",
                "mallikarjuna 70mm",
                "gpr multiplex",
            ]),
            exclusions: owned(&[
                r"(?i)^movies?\s+in\b",
                r"(?i)\bmovies\s+in\s+[a-z]+",
                r"(?i)^(?:pvr|inox|cinepolis|asian|miraj|carnival|amb)\s*$",
                r"(?i)^part\s*[-:]?\s*\d+\b",
                r"(?i)\bpart\s+\d+\s*$",
                r"(?i)^(?:\s*\d{1,2}:\d{2}\s?[ap]m\s*[,|/\-–]?)+\s*$",
                r"(?i)^now\s+showing",
                r"(?i)^coming\s+soon",
                r"(?i)\bbook\s+tickets?\b",
                r"(?i)^sort\s+by\b",
                r"(?i)^filters?\b",
                r"(?i)^languages?\b",
                r"(?i)^formats?\b",
                r"(?i)^(?:privacy|terms|cookie)\b",
            ]),
            time_pattern: r"(?i)\b\d{1,2}:\d{2} ?[ap]m\b".to_string(),

            min_line_len: 5,
            max_line_len: 200,
            backward_margin: 2,
            forward_range: 20,
            secondary_forward_range: 5,
            max_showtime_line_len: 100,
            refine_radius: 3,
            max_refined_len: 100,
            co_occurrence_max_line_len: 200,
            low_count_threshold: 10,
            alternative_min_line_len: 8,
            alternative_max_line_len: 300,
            alternative_forward_range: 40,
        }
    }
}

impl ExtractorConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.min_line_len >= self.max_line_len {
            return Err(ConfigError::InvalidBounds(format!(
                "min_line_len ({}) must be below max_line_len ({})",
                self.min_line_len, self.max_line_len
            )));
        }
        if self.alternative_min_line_len > self.alternative_max_line_len {
            return Err(ConfigError::InvalidBounds(format!(
                "alternative_min_line_len ({}) must not exceed alternative_max_line_len ({})",
                self.alternative_min_line_len, self.alternative_max_line_len
            )));
        }
        if self.forward_range == 0 || self.alternative_forward_range == 0 {
            return Err(ConfigError::InvalidBounds(
                "forward ranges must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn lowercased_keywords(&self) -> Vec<String> {
        lowercase_all(&self.keywords)
    }

    pub(crate) fn lowercased_localities(&self) -> Vec<String> {
        lowercase_all(&self.localities)
    }

    pub(crate) fn lowercased_named_venues(&self) -> Vec<String> {
        lowercase_all(&self.named_venues)
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

pub(crate) fn compile(pattern: &str) -> Result<regex::Regex, ConfigError> {
    regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, ExtractorConfig};

    #[test]
    fn default_bounds_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok())
    }

    #[test]
    fn min_line_len_must_be_below_max() {
        let config = ExtractorConfig {
            min_line_len: 200,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds(_))
        ))
    }

    #[test]
    fn zero_forward_range_is_rejected() {
        let config = ExtractorConfig {
            forward_range: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err())
    }
}
