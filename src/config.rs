//! A module for validating and loading the configuration of a damage assessment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use evalexpr::HashMapContext;
use regex::Regex;
use serde::Deserialize;

use crate::curve::CurveParams;
use crate::damage::DamageConfig;
use crate::error::{FatigueError, Result};
use crate::history::HistoryConfig;
use crate::parser::{build_context, Quantity};
use crate::stress::StressCriterion;

/// Represents the configuration of a single fatigue damage assessment.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solution: Solution,
    /// Detail category of the assessed detail, in the units of the history.
    pub detail_category: Quantity,
    #[serde(default)]
    pub curve: CurveParams,
    #[serde(default)]
    pub safety_factor: SafetyFactor,
    /// Number of times the history is applied during the design life.
    #[serde(default)]
    pub repetitions: Quantity,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub expressions: Expressions,
    pub history: HistoryConfig,
}

/// The numeric inputs of an assessment once every expression is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub detail_category: f64,
    pub damage: DamageConfig,
    pub criterion: Option<StressCriterion>,
}

impl Config {
    /// Validates the entire configuration.
    ///
    /// This checks every section, evaluates all expressions and checks the
    /// resulting numbers.
    pub fn validate(&self) -> Result<()> {
        self.solution.validate()?;
        self.history.validate()?;
        self.validate_variables_and_parameters()?;
        self.resolve()?;
        Ok(())
    }

    fn context(&self) -> Result<HashMapContext> {
        build_context(&self.parameters, &self.variables, &self.expressions.order)
    }

    /// Evaluates the configured quantities into the inputs of the damage pipeline.
    pub fn resolve(&self) -> Result<Assessment> {
        let context = self.context()?;
        let detail_category = self.detail_category.evaluate(&context)?;
        if !(detail_category.is_finite() && detail_category > 0.0) {
            return Err(FatigueError::Validation(format!(
                "detail_category must be greater than 0, got {}",
                detail_category
            )));
        }
        let damage = DamageConfig {
            curve: self.curve,
            amplitude_safety_factor: self.safety_factor.amplitude.evaluate(&context)?,
            strength_safety_factor: self.safety_factor.strength.evaluate(&context)?,
            repetitions: self.repetitions.evaluate(&context)?,
        };
        damage.validate()?;
        Ok(Assessment {
            detail_category,
            damage,
            criterion: self.solution.stress_criteria.criterion()?,
        })
    }

    fn validate_variables_and_parameters(&self) -> Result<()> {
        let re = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$")
            .map_err(|e| FatigueError::Validation(e.to_string()))?;
        for (key, value) in &self.parameters {
            if !re.is_match(key) {
                return Err(FatigueError::Validation(format!("Invalid parameter name: {}", key)));
            }
            if !value.is_finite() {
                return Err(FatigueError::Validation(format!(
                    "parameter '{}' must be a finite number, got {}",
                    key, value
                )));
            }
        }
        for (key, value) in &self.variables {
            if !re.is_match(key) {
                return Err(FatigueError::Validation(format!("Invalid variable name: {}", key)));
            }
            if self.parameters.contains_key(key) {
                return Err(FatigueError::Validation(format!("Variable '{}' shadows a parameter", key)));
            }
            if value.trim().is_empty() {
                return Err(FatigueError::Validation(format!("Variable expression is empty for: {}", key)));
            }
        }
        Ok(())
    }
}

/// How the assessment is run and reported.
#[derive(Debug, Deserialize)]
pub struct Solution {
    /// The output format, "JSON" for the full report or "TABLE" for a plain cycle table.
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub stress_criteria: StressCriteria,
}

fn default_output() -> String {
    "JSON".to_string()
}

impl Default for Solution {
    fn default() -> Self {
        Solution {
            output: default_output(),
            stress_criteria: StressCriteria::default(),
        }
    }
}

impl Solution {
    /// Validates the `Solution` configuration.
    ///
    /// ```
    /// use fatigue_miner::config::{Solution, StressCriteria};
    ///
    /// let solution = Solution {
    ///     output: String::from("TABLE"),
    ///     stress_criteria: StressCriteria { method: String::from("VONMISES"), number: None },
    /// };
    /// assert!(solution.validate().is_ok());
    ///
    /// let solution = Solution { output: String::from("ANSYS"), ..Default::default() };
    /// assert!(solution.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        match self.output.as_str() {
            "JSON" | "TABLE" => Ok(()),
            _ => Err(FatigueError::Validation(format!("output must be JSON or TABLE, got {}", self.output))),
        }?;
        self.stress_criteria.validate()
    }
}

/// Selects how multi-axial stress rows are reduced to a scalar history.
///
/// "NONE" reads a scalar column; "VONMISES", "SIGNEDVONMISES" and "MAXIMUM"
/// reduce six Voigt columns; "COMPONENT" picks the Voigt component `number`.
#[derive(Debug, Deserialize)]
pub struct StressCriteria {
    #[serde(default = "default_method")]
    pub method: String,
    pub number: Option<usize>,
}

fn default_method() -> String {
    "NONE".to_string()
}

impl Default for StressCriteria {
    fn default() -> Self {
        StressCriteria {
            method: default_method(),
            number: None,
        }
    }
}

impl StressCriteria {
    pub fn criterion(&self) -> Result<Option<StressCriterion>> {
        StressCriterion::from_method(&self.method, self.number)
    }

    pub fn validate(&self) -> Result<()> {
        self.criterion().map(|_| ())
    }
}

/// Partial safety factors.
#[derive(Debug, Default, Deserialize)]
pub struct SafetyFactor {
    /// Factor on the stress ranges (γFf).
    #[serde(default)]
    pub amplitude: Quantity,
    /// Factor on the fatigue strength (γMf).
    #[serde(default)]
    pub strength: Quantity,
}

/// Evaluation order of the configured variables.
#[derive(Debug, Default, Deserialize)]
pub struct Expressions {
    pub order: Vec<String>,
}

/// Loads the configuration from a YAML file, or a TOML file when the path ends in `.toml`.
///
/// # Errors
///
/// This function will return an error if reading or parsing the configuration file fails.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<Config> {
    let path = config_path.as_ref();
    let content = fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(config)
}
