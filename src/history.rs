//! Reading stress histories from delimited text files.
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{FatigueError, Result};
use crate::stress::{StressCriterion, StressTensor};

/// Where a stress history lives and how to parse it.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub path: String,
    /// Number of leading lines to skip.
    #[serde(default)]
    pub header: usize,
    /// Field delimiter. A blank delimiter splits on any run of whitespace.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Zero-based column of the scalar history, or of σxx for tensor histories.
    #[serde(default)]
    pub column: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_scale() -> f64 {
    1.0
}

impl HistoryConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        HistoryConfig {
            path: path.as_ref().to_string_lossy().into_owned(),
            header: 0,
            delimiter: default_delimiter(),
            column: 0,
            scale: default_scale(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(FatigueError::Validation("path must not be empty".into()));
        }
        if self.delimiter.is_empty() {
            return Err(FatigueError::Validation("delimiter must not be empty".into()));
        }
        if !self.delimiter.trim().is_empty() && self.delimiter.len() != 1 {
            return Err(FatigueError::Validation(format!(
                "delimiter must be a single character, got {:?}",
                self.delimiter
            )));
        }
        if !self.scale.is_finite() {
            return Err(FatigueError::Validation(format!("scale must be finite, got {}", self.scale)));
        }
        Ok(())
    }

    /// Reads every data row as `(line number, fields)`, skipping header and blank lines.
    fn read_rows(&self) -> Result<Vec<(u64, Vec<String>)>> {
        self.validate()?;
        if self.delimiter.trim().is_empty() {
            let content = fs::read_to_string(&self.path)?;
            let whitespace = Regex::new(r"\s+").map_err(|e| FatigueError::InvalidInput(e.to_string()))?;
            return Ok(content
                .lines()
                .enumerate()
                .skip(self.header)
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    let fields = whitespace.split(line.trim()).map(str::to_string).collect();
                    (i as u64 + 1, fields)
                })
                .collect());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.delimiter.as_bytes()[0])
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if line as usize <= self.header || record.iter().all(|field| field.is_empty()) {
                continue;
            }
            rows.push((line, record.iter().map(str::to_string).collect()));
        }
        Ok(rows)
    }

    fn parse_field(&self, line: u64, fields: &[String], column: usize) -> Result<f64> {
        let field = fields.get(column).ok_or_else(|| {
            FatigueError::InvalidInput(format!(
                "line {}: expected at least {} columns, found {}",
                line,
                column + 1,
                fields.len()
            ))
        })?;
        field.parse::<f64>().map_err(|_| {
            FatigueError::InvalidInput(format!(
                "line {} column {}: cannot parse {:?} as a number",
                line,
                column + 1,
                field
            ))
        })
    }
}

/// Reads the configured column of a scalar history, multiplied by `scale`.
pub fn read_history(config: &HistoryConfig) -> Result<Vec<f64>> {
    config
        .read_rows()?
        .iter()
        .map(|(line, fields)| Ok(config.parse_field(*line, fields, config.column)? * config.scale))
        .collect()
}

/// Reads six consecutive Voigt components per row, starting at the configured column.
pub fn read_tensor_history(config: &HistoryConfig) -> Result<Vec<StressTensor>> {
    config
        .read_rows()?
        .iter()
        .map(|(line, fields)| {
            let mut components = [0.0; 6];
            for (i, component) in components.iter_mut().enumerate() {
                *component = config.parse_field(*line, fields, config.column + i)? * config.scale;
            }
            Ok(StressTensor::from_voigt(&components))
        })
        .collect()
}

/// Reads the sample sequence fed to the damage pipeline, reducing tensor rows
/// with `criterion` when one is given.
pub fn read_samples(config: &HistoryConfig, criterion: Option<StressCriterion>) -> Result<Vec<f64>> {
    match criterion {
        None => read_history(config),
        Some(criterion) => Ok(criterion.reduce(&read_tensor_history(config)?)),
    }
}
