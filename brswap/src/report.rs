//! Benchmark speedup report
//!
//! Turns the `benchmark,run,result` rows written by the benchmark harness into
//! one line per benchmark comparing a baseline run against ours.
//!
//! ```text
//! sum,baseline,10            benchmark,baseline,ours,% speedup
//! sum,ours,5          ==>    sum,10.0,5.0,50.0
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::{BrswapError, Result};

/// One measurement as read from the harness output
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub benchmark: String,
    pub run: String,
    /// `None` for missing, non-numeric or non-finite results (`timeout`, `NaN`)
    pub result: Option<f64>,
}

/// Which runs to compare; unset sides take the first/second run in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSelection {
    pub baseline: Option<String>,
    pub ours: Option<String>,
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedupRow {
    pub benchmark: String,
    pub baseline: f64,
    pub ours: f64,
    /// Absent when the baseline is zero
    #[serde(rename = "% speedup")]
    pub speedup: Option<f64>,
}

/// Parse harness output, one `benchmark,run,result` row per line
pub fn parse_rows(source: &str) -> Result<Vec<RunResult>> {
    let mut rows = Vec::new();
    for (i, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Benchmark names may contain commas; run and result never do
        let mut fields = line.rsplitn(3, ',');
        let (Some(result), Some(run), Some(benchmark)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(BrswapError::ReportRow {
                line: i + 1,
                message: format!("expected `benchmark,run,result`, found '{}'", line),
            });
        };
        rows.push(RunResult {
            benchmark: benchmark.trim().to_string(),
            run: run.trim().to_string(),
            result: result.trim().parse::<f64>().ok().filter(|r| r.is_finite()),
        });
    }
    Ok(rows)
}

/// Pivot rows by benchmark and compute speedups
pub fn speedup_table(rows: &[RunResult], selection: &RunSelection) -> Result<Vec<SpeedupRow>> {
    let mut by_benchmark: BTreeMap<&str, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    let mut runs: BTreeSet<&str> = BTreeSet::new();

    for row in rows {
        runs.insert(row.run.as_str());
        let results = by_benchmark.entry(row.benchmark.as_str()).or_default();
        if results.insert(row.run.as_str(), row.result).is_some() {
            return Err(BrswapError::Report {
                message: format!(
                    "duplicate result for benchmark '{}' run '{}'",
                    row.benchmark, row.run
                ),
            });
        }
    }

    let mut ordered = run_order(&runs).into_iter();
    let baseline = pick_run(&runs, selection.baseline.as_deref(), ordered.next(), "baseline")?;
    let ours = pick_run(&runs, selection.ours.as_deref(), ordered.next(), "ours")?;
    debug!(baseline, ours, benchmarks = by_benchmark.len(), "building report");

    Ok(by_benchmark
        .into_iter()
        .map(|(benchmark, results)| {
            let value = |run: &str| results.get(run).copied().flatten().unwrap_or(0.0);
            let (baseline, ours) = (value(baseline), value(ours));
            SpeedupRow {
                benchmark: benchmark.to_string(),
                baseline,
                ours,
                speedup: speedup(baseline, ours),
            }
        })
        .collect())
}

/// Runs in numeric order when every name is a number, lexical otherwise
fn run_order<'a>(runs: &BTreeSet<&'a str>) -> Vec<&'a str> {
    let numeric: Option<Vec<(f64, &'a str)>> = runs
        .iter()
        .map(|run| run.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| (v, *run)))
        .collect();
    match numeric {
        Some(mut numeric) => {
            numeric.sort_by(|a, b| a.0.total_cmp(&b.0));
            numeric.into_iter().map(|(_, run)| run).collect()
        }
        None => runs.iter().copied().collect(),
    }
}

fn pick_run<'a>(
    runs: &BTreeSet<&'a str>,
    requested: Option<&str>,
    positional: Option<&'a str>,
    side: &str,
) -> Result<&'a str> {
    match requested {
        Some(name) => runs.get(name).copied().ok_or_else(|| BrswapError::Report {
            message: format!("{} run '{}' does not appear in the input", side, name),
        }),
        None => positional.ok_or_else(|| BrswapError::Report {
            message: format!("no run available for {}; at least two runs are needed", side),
        }),
    }
}

/// `(baseline - ours) / baseline * 100` to one decimal, ties to even
pub fn speedup(baseline: f64, ours: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    let percent = (baseline - ours) / baseline * 100.0;
    Some((percent * 10.0).round_ties_even() / 10.0)
}

/// Render the report as CSV with a header line
pub fn to_csv(rows: &[SpeedupRow]) -> String {
    let mut out = String::from("benchmark,baseline,ours,% speedup\n");
    for row in rows {
        let speedup = row.speedup.map(|s| format!("{:?}", s)).unwrap_or_default();
        out.push_str(&format!(
            "{},{:?},{:?},{}\n",
            csv_field(&row.benchmark),
            row.baseline,
            row.ours,
            speedup
        ));
    }
    out
}

/// Render the report as a JSON array of records
pub fn to_json(rows: &[SpeedupRow], indent: usize) -> Result<String> {
    let value = serde_json::to_value(rows).map_err(BrswapError::Encode)?;
    crate::ir::codec::render(&value, indent)
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
