//! User-defined line parsers.
//!
//! A parser projects a line into an ordered sequence of field strings, either
//! by splitting on a pattern or by capturing regex groups. Parsers are
//! immutable once constructed; a new configuration allocates a new parser.
//! Each parser carries an ordered analytics mapping from field label to
//! accumulation method, consumed by the analytics engine.
//!
//! Parsers are saved as human-editable JSON records under the configured
//! patterns directory:
//!
//! ```json
//! {
//!     "pattern": " - ",
//!     "type": "split",
//!     "name": "Hyphen Separated",
//!     "example": "2005-03-19 15:10:26,773 - simple_example - CRITICAL - critical message",
//!     "analytics": { "timestamp": "count", "module": "count", "level": "count", "message": "sum" }
//! }
//! ```

use std::path::PathBuf;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsMethod;
use crate::config::Config;
use crate::error::{LogriaError, Result};
use crate::util::atomic_write;

/// How a parser's pattern is applied to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Split the line on every match of the pattern, keeping empty pieces.
    Split,
    /// Match the pattern at the start of the line and take its capture groups.
    Regex,
}

/// The on-disk shape of a parser, exactly as serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserRecord {
    /// The raw pattern.
    pub pattern: String,
    /// How the pattern is applied.
    #[serde(rename = "type")]
    pub kind: PatternType,
    /// Display name; also the filename the record is saved under.
    pub name: String,
    /// An example line the pattern is known to parse.
    pub example: String,
    /// Ordered mapping from field label to accumulation method.
    pub analytics: IndexMap<String, AnalyticsMethod>,
}

/// A validated parser with its compiled pattern.
#[derive(Debug, Clone)]
pub struct Parser {
    record: ParserRecord,
    matcher: Regex,
    example_fields: Vec<String>,
}

impl Parser {
    /// Validate a record and compile its pattern.
    ///
    /// Rejects records whose pattern does not compile, whose example does not
    /// parse, or whose analytics mapping names more fields than the example
    /// yields.
    pub fn from_record(record: ParserRecord) -> Result<Self> {
        let matcher = match record.kind {
            PatternType::Split => Regex::new(&record.pattern),
            // Anchor at the start without disturbing group numbering
            PatternType::Regex => Regex::new(&format!(r"\A(?:{})", record.pattern)),
        }
        .map_err(|e| LogriaError::regex(record.pattern.as_str(), e))?;

        let example_fields = apply(&matcher, record.kind, &record.example);
        if example_fields.is_empty() {
            return Err(LogriaError::InvalidParser {
                name: record.name.clone(),
                reason: format!("example {:?} does not parse", record.example),
            });
        }
        if record.analytics.len() > example_fields.len() {
            return Err(LogriaError::InvalidParser {
                name: record.name.clone(),
                reason: format!(
                    "analytics maps {} fields but the example yields {}",
                    record.analytics.len(),
                    example_fields.len()
                ),
            });
        }

        Ok(Self {
            record,
            matcher,
            example_fields,
        })
    }

    /// Construct a parser from its parts. See [`Parser::from_record`].
    pub fn new(
        pattern: impl Into<String>,
        kind: PatternType,
        name: impl Into<String>,
        example: impl Into<String>,
        analytics: IndexMap<String, AnalyticsMethod>,
    ) -> Result<Self> {
        Self::from_record(ParserRecord {
            pattern: pattern.into(),
            kind,
            name: name.into(),
            example: example.into(),
            analytics,
        })
    }

    /// The parser's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// How the pattern is applied.
    #[must_use]
    pub fn kind(&self) -> PatternType {
        self.record.kind
    }

    /// The underlying record, for saving.
    #[must_use]
    pub fn record(&self) -> &ParserRecord {
        &self.record
    }

    /// The ordered analytics mapping.
    #[must_use]
    pub fn analytics(&self) -> &IndexMap<String, AnalyticsMethod> {
        &self.record.analytics
    }

    /// Project a line into its fields.
    ///
    /// Split parsers return every piece including empty ones; regex parsers
    /// return the ordered capture groups, or nothing when the line does not
    /// match.
    #[must_use]
    pub fn parse(&self, message: &str) -> Vec<String> {
        apply(&self.matcher, self.record.kind, message)
    }

    /// Number of fields the example line yields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.example_fields.len()
    }

    /// The example's fields formatted for the field-selection listing.
    #[must_use]
    pub fn display_example(&self) -> Vec<String> {
        self.example_fields
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{i}: {v}"))
            .collect()
    }

    /// The analytics label for a field index, when the mapping has one.
    ///
    /// Fields beyond the mapping are still projectable; they just carry no
    /// analytics.
    #[must_use]
    pub fn label_for_index(&self, index: usize) -> Option<&str> {
        self.record
            .analytics
            .get_index(index)
            .map(|(label, _)| label.as_str())
    }

    /// The accumulation method for a field index, when the mapping has one.
    #[must_use]
    pub fn method_for_index(&self, index: usize) -> Option<AnalyticsMethod> {
        self.record
            .analytics
            .get_index(index)
            .map(|(_, method)| *method)
    }
}

fn apply(matcher: &Regex, kind: PatternType, message: &str) -> Vec<String> {
    match kind {
        PatternType::Split => matcher.split(message).map(str::to_string).collect(),
        PatternType::Regex => match matcher.captures(message) {
            None => Vec::new(),
            Some(caps) => caps
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        },
    }
}

/// Storage for saved parser records.
#[derive(Debug)]
pub struct ParserStore {
    dir: PathBuf,
}

impl ParserStore {
    /// Storage rooted at the configured patterns directory.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.patterns_dir(),
        }
    }

    /// Names of every saved parser, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Load and validate a saved parser.
    pub fn load(&self, name: &str) -> Result<Parser> {
        let path = self.dir.join(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogriaError::RecordNotFound {
                    name: name.to_string(),
                    dir: self.dir.clone(),
                }
            } else {
                LogriaError::io(format!("Failed to read {}", path.display()), e)
            }
        })?;
        let record: ParserRecord = serde_json::from_str(&content)
            .map_err(|e| LogriaError::serialization(format!("Failed to parse {}", path.display()), e))?;
        Parser::from_record(record)
    }

    /// Save a record under its name.
    pub fn save(&self, record: &ParserRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| LogriaError::serialization(format!("Failed to serialize {}", record.name), e))?;
        atomic_write(self.dir.join(&record.name), content.as_bytes())
    }

    /// Delete a saved parser.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::remove_file(&path)
            .map_err(|e| LogriaError::io(format!("Failed to remove {}", path.display()), e))
    }
}
