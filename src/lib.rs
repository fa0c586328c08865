// src/lib.rs
//! Fatigue damage of a structural detail under a variable-amplitude stress
//! history: turning-point extraction, four-point rainflow counting, design
//! S-N curves by detail category and Palmgren-Miner summation.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub mod config;
pub mod curve;
pub mod damage;
pub mod error;
pub mod extrema;
pub mod history;
pub mod parser;
pub mod rainflow;
pub mod stress;

pub use curve::{endurance as evaluate_endurance, endurance_many, CurveParams, StressType};
pub use damage::{accumulate_damage, assess, DamageConfig, DamageReport};
pub use error::{FatigueError, Result};
pub use extrema::extract_extrema;
pub use rainflow::{count_cycles, Cycle};

// When the "wasm" feature is enabled, use wasm_bindgen to expose functions to the host environment.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn run_rainflow(stress: &[f64]) -> std::result::Result<Vec<f64>, JsValue> {
    let (means, ranges) = rainflow::rainflow(stress).map_err(|e| JsValue::from_str(&e.to_string()))?;
    // Means first, then ranges, both in extraction order.
    Ok(means.into_iter().chain(ranges).collect())
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn run_damage(history: &[f64], detail_category: f64) -> std::result::Result<f64, JsValue> {
    accumulate_damage(history, detail_category, &DamageConfig::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
