//! A module for the main application logic for the fatigue assessment tool
use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use fatigue_miner::config::load_config;
use fatigue_miner::curve::{endurance_many, CurveParams};
use fatigue_miner::damage::{assess, DamageReport};
use fatigue_miner::history::{read_history, read_samples, HistoryConfig};
use fatigue_miner::{count_cycles, extract_extrema};

/// Runs the assessment described by a configuration file and renders the
/// report in the configured output format.
pub fn run(config_path: &str) -> Result<String> {
    info!("Running with configuration: {}", config_path);
    let conf = load_config(config_path).with_context(|| format!("Failed to load config {}", config_path))?;
    conf.validate().context("Validation error")?;
    let assessment = conf.resolve()?;

    let samples = read_samples(&conf.history, assessment.criterion)
        .with_context(|| format!("Failed to read history {}", conf.history.path))?;
    info!("{} samples read from {}", samples.len(), conf.history.path);

    let report = assess(&samples, assessment.detail_category, &assessment.damage)?;
    if report.failed {
        warn!("Accumulated damage {} reaches failure", report.damage);
    } else {
        info!("Accumulated damage {}", report.damage);
    }
    render_report(&report, &conf.solution.output)
}

/// Renders a report as pretty JSON, or as a CSV cycle table followed by the damage.
pub fn render_report(report: &DamageReport, output: &str) -> Result<String> {
    if output == "TABLE" {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["weight", "range", "mean", "applied_cycles", "endurance", "damage"])?;
        for c in &report.cycles {
            writer.write_record([
                c.cycle.weight.to_string(),
                c.cycle.range.to_string(),
                c.cycle.mean.to_string(),
                c.applied_cycles.to_string(),
                c.endurance.to_string(),
                c.damage.to_string(),
            ])?;
        }
        let mut table = String::from_utf8(writer.into_inner().map_err(|e| anyhow!(e.to_string()))?)?;
        table.push_str(&format!("damage,{}\n", report.damage));
        Ok(table)
    } else {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Counts the cycles of a history file and renders them as CSV.
pub fn run_cycles(history: &HistoryConfig) -> Result<String> {
    let samples = read_history(history).with_context(|| format!("Failed to read history {}", history.path))?;
    let cycles = count_cycles(&extract_extrema(&samples)?);
    info!("{} cycles counted in {} samples", cycles.len(), samples.len());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["weight", "range", "mean"])?;
    for cycle in &cycles {
        writer.write_record([cycle.weight.to_string(), cycle.range.to_string(), cycle.mean.to_string()])?;
    }
    Ok(String::from_utf8(writer.into_inner().map_err(|e| anyhow!(e.to_string()))?)?)
}

/// Evaluates the S-N curve at each range, one `range,endurance` line per input.
pub fn run_endurance(ranges: &[f64], detail_category: f64, params: &CurveParams) -> Result<String> {
    params.validate()?;
    let endurances = endurance_many(ranges, detail_category, params)?;
    Ok(ranges
        .iter()
        .zip(endurances)
        .map(|(range, n)| format!("{},{}\n", range, n))
        .collect())
}
