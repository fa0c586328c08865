use std::collections::HashMap;

use evalexpr::{eval_with_context, ContextWithMutableVariables, HashMapContext, Value};
use serde::Deserialize;

use crate::error::{FatigueError, Result};

/// A configured number, given either literally or as an expression over the
/// configuration's parameters and variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Value(f64),
    Expression(String),
}

impl Quantity {
    pub fn one() -> Self {
        Quantity::Value(1.0)
    }

    pub fn evaluate(&self, context: &HashMapContext) -> Result<f64> {
        match self {
            Quantity::Value(value) => Ok(*value),
            Quantity::Expression(expression) => eval_with_context(expression, context)
                .and_then(|value| value.as_number())
                .map_err(|e| {
                    FatigueError::Validation(format!("Failed to evaluate expression '{}': {}", expression, e))
                }),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::one()
    }
}

/// Builds the evaluation context from numeric parameters and variable
/// expressions.
///
/// Variables named in `order` are evaluated first, in that order; any others
/// follow sorted by name. A variable may refer to parameters and to variables
/// evaluated before it.
pub fn build_context(
    parameters: &HashMap<String, f64>,
    variables: &HashMap<String, String>,
    order: &[String],
) -> Result<HashMapContext> {
    let mut context = HashMapContext::new();

    for (key, value) in parameters {
        context
            .set_value(key.clone(), Value::Float(*value))
            .map_err(|e| FatigueError::Validation(format!("Failed to insert parameter '{}': {}", key, e)))?;
    }

    let mut remaining: Vec<&String> = variables.keys().filter(|k| !order.contains(k)).collect();
    remaining.sort();
    for key in order.iter().chain(remaining) {
        let expression = variables
            .get(key)
            .ok_or_else(|| FatigueError::Validation(format!("Variable '{}' in order is not defined", key)))?;
        let value = eval_with_context(expression, &context).map_err(|e| {
            FatigueError::Validation(format!(
                "Failed to evaluate variable '{}' with expression '{}': {}",
                key, expression, e
            ))
        })?;
        context
            .set_value(key.clone(), value)
            .map_err(|e| FatigueError::Validation(format!("Failed to insert variable '{}': {}", key, e)))?;
    }

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_expression_over_parameters() {
        let context = build_context(&params(&[("years", 20.0), ("per_year", 52560.0)]), &HashMap::new(), &[]).unwrap();
        let repetitions = Quantity::Expression("years * per_year".into()).evaluate(&context).unwrap();
        assert_relative_eq!(repetitions, 1_051_200.0);
        assert_eq!(Quantity::Value(3.5).evaluate(&context).unwrap(), 3.5);
    }

    #[test]
    fn test_variables_follow_order() {
        let variables = vars(&[("total", "base * 2"), ("base", "a + 1")]);
        let order = vec!["base".to_string(), "total".to_string()];
        let context = build_context(&params(&[("a", 4.0)]), &variables, &order).unwrap();
        let total = Quantity::Expression("total".into()).evaluate(&context).unwrap();
        assert_relative_eq!(total, 10.0);
    }

    #[test]
    fn test_unordered_variables_are_sorted() {
        // "a_first" sorts before "b_second", so the reference resolves.
        let variables = vars(&[("b_second", "a_first + 1"), ("a_first", "x * 3")]);
        let context = build_context(&params(&[("x", 2.0)]), &variables, &[]).unwrap();
        assert_relative_eq!(Quantity::Expression("b_second".into()).evaluate(&context).unwrap(), 7.0);
    }

    #[test]
    fn test_errors() {
        let context = build_context(&HashMap::new(), &HashMap::new(), &[]).unwrap();
        assert!(Quantity::Expression("unknown * 2".into()).evaluate(&context).is_err());
        assert!(Quantity::Expression("\"text\"".into()).evaluate(&context).is_err());
        assert!(build_context(&HashMap::new(), &HashMap::new(), &["missing".to_string()]).is_err());
    }
}
