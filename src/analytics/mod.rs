//! Rolling per-field analytics.
//!
//! When analytics is active, every newly parsed message feeds the field
//! accumulators configured by the active parser: a frequency map, a running
//! total, or a running mean. The engine renders the current state as a list
//! of lines the view controller can window like any other sequence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::parser::Parser;

/// How a field's values are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsMethod {
    /// Frequency of each distinct value.
    Count,
    /// Running numeric total.
    Sum,
    /// Running numeric mean with count and total.
    Average,
}

/// A numeric value extracted from a field.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extracted {
    value: f64,
    integral: bool,
}

/// Keep digits and `.` from a field and parse what remains.
///
/// Returns `None` when nothing numeric remains or the residue does not parse
/// (for example two decimal points); the caller skips the field silently.
fn extract_number(field: &str) -> Option<Extracted> {
    let digits: String = field
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    if digits.contains('.') {
        digits.parse::<f64>().ok().map(|value| Extracted {
            value,
            integral: false,
        })
    } else {
        digits.parse::<i64>().ok().map(|value| Extracted {
            value: value as f64,
            integral: true,
        })
    }
}

/// Format a total, without a decimal point when every input was integral.
fn format_total(value: f64, integral: bool) -> String {
    if integral {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone)]
enum Accumulator {
    Count(HashMap<String, u64>),
    Sum {
        total: f64,
        integral: bool,
        seen: bool,
    },
    Average {
        total: f64,
        count: u64,
        mean: f64,
    },
}

impl Accumulator {
    fn new(method: AnalyticsMethod) -> Self {
        match method {
            AnalyticsMethod::Count => Self::Count(HashMap::new()),
            AnalyticsMethod::Sum => Self::Sum {
                total: 0.0,
                integral: true,
                seen: false,
            },
            AnalyticsMethod::Average => Self::Average {
                total: 0.0,
                count: 0,
                mean: 0.0,
            },
        }
    }

    fn update(&mut self, field: &str) {
        match self {
            Self::Count(freq) => {
                *freq.entry(field.to_string()).or_insert(0) += 1;
            }
            Self::Sum {
                total,
                integral,
                seen,
            } => {
                if let Some(extracted) = extract_number(field) {
                    *total += extracted.value;
                    *integral &= extracted.integral;
                    *seen = true;
                }
            }
            Self::Average { total, count, mean } => {
                if let Some(extracted) = extract_number(field) {
                    *total += extracted.value;
                    *count += 1;
                    *mean = *total / *count as f64;
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Count(freq) => freq.is_empty(),
            Self::Sum { seen, .. } => !seen,
            Self::Average { count, .. } => *count == 0,
        }
    }

    fn render_into(&self, out: &mut Vec<String>, top_k: usize) {
        match self {
            Self::Count(freq) => {
                let mut entries: Vec<(&String, &u64)> = freq.iter().collect();
                // Most frequent first, value order breaking ties
                entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                for (value, count) in entries.into_iter().take(top_k) {
                    out.push(format!("  {value}: {count}"));
                }
            }
            Self::Sum { total, integral, .. } => {
                out.push(format!("  Total: {}", format_total(*total, *integral)));
            }
            Self::Average { total, count, mean } => {
                out.push(format!("  Average: {mean}"));
                out.push(format!("  Count: {count}"));
                out.push(format!("  Total: {total}"));
            }
        }
    }
}

#[derive(Debug, Clone)]
struct FieldStats {
    label: String,
    accumulator: Accumulator,
}

/// Per-field accumulators for the active parser.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    fields: Vec<FieldStats>,
    top_k: usize,
}

impl AnalyticsEngine {
    /// Build accumulators from the parser's ordered analytics mapping.
    #[must_use]
    pub fn new(parser: &Parser, top_k: usize) -> Self {
        let fields = parser
            .analytics()
            .iter()
            .map(|(label, method)| FieldStats {
                label: label.clone(),
                accumulator: Accumulator::new(*method),
            })
            .collect();
        Self { fields, top_k }
    }

    /// Clear every accumulator.
    pub fn reset(&mut self) {
        for stats in &mut self.fields {
            let method = match stats.accumulator {
                Accumulator::Count(_) => AnalyticsMethod::Count,
                Accumulator::Sum { .. } => AnalyticsMethod::Sum,
                Accumulator::Average { .. } => AnalyticsMethod::Average,
            };
            stats.accumulator = Accumulator::new(method);
        }
    }

    /// Feed one parsed message. Fields beyond the mapping, and mapped fields
    /// the message did not yield, are ignored.
    pub fn ingest(&mut self, fields: &[String]) {
        for (index, stats) in self.fields.iter_mut().enumerate() {
            if let Some(field) = fields.get(index) {
                stats.accumulator.update(field);
            }
        }
    }

    /// Render the current state: one header line per non-empty field followed
    /// by its type-specific body.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        for stats in &self.fields {
            if stats.accumulator.is_empty() {
                continue;
            }
            out.push(stats.label.clone());
            stats.accumulator.render_into(&mut out, self.top_k);
        }
        out
    }
}
