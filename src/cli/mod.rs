//! KPI Sentinel CLI Module
//!
//! Command-line interface for batch anomaly detection and data inspection.

use clap::{Args, Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::anomaly::MaxSamples;
use crate::detection::{DetectionConfig, DetectionEngine};
use crate::preprocessing::{is_numeric_dtype, numeric_values};
use crate::report::{AnomalyFilter, AnomalyReport, FeatureSummary, RiskLevel};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

/// Features shown next to each top anomaly
const PREVIEW_FEATURES: usize = 6;

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn risk_badge(level: RiskLevel) -> ColoredString {
    let text = level.to_string().to_uppercase();
    match level {
        RiskLevel::Stable => ok(&text),
        RiskLevel::Watch => text.yellow(),
        RiskLevel::Critical => text.red().bold(),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kpi-sentinel")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Unsupervised anomaly detection for 5G KPI telemetry")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect anomalous records in a KPI table
    Detect(DetectArgs),

    /// Show data information
    Info {
        /// Input data file (CSV or TSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Field separator (default: tab for .tsv, comma otherwise)
        #[arg(long)]
        delimiter: Option<char>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    /// Input data file (CSV or TSV)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Field separator (default: tab for .tsv, comma otherwise)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Expected fraction of anomalies, in (0, 0.5)
    #[arg(long)]
    pub contamination: Option<f64>,

    /// Number of trees
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Rows drawn per tree (default: min(256, rows))
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (default: all cores)
    #[arg(long)]
    pub n_jobs: Option<usize>,

    /// Number of top anomalies to display
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Show a normal vs anomalous breakdown of this feature
    #[arg(short, long)]
    pub feature: Option<String>,

    /// Export to CSV; without a value writes anomalies_YYYYMMDD_HHMM.csv
    #[arg(short, long, num_args = 0..=1)]
    pub output: Option<Option<PathBuf>>,

    /// Export every record instead of only the anomalies
    #[arg(long)]
    pub all: bool,
}

impl DetectArgs {
    /// Merge the optional config file with the flag overrides
    pub fn detection_config(&self) -> anyhow::Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::from_json_file(path)?,
            None => DetectionConfig::default(),
        };

        if let Some(c) = self.contamination {
            config.forest.contamination = c;
        }
        if let Some(n) = self.n_estimators {
            config.forest.n_estimators = n;
        }
        if let Some(n) = self.max_samples {
            config.forest.max_samples = MaxSamples::Count(n);
        }
        if let Some(seed) = self.seed {
            config.forest.random_state = seed;
        }
        if let Some(n) = self.n_jobs {
            config.forest.n_jobs = Some(n);
        }

        config.validate()?;
        Ok(config)
    }

    /// Export destination, if any
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(default_output_path))
    }
}

/// `anomalies_YYYYMMDD_HHMM.csv` in the working directory
pub fn default_output_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M");
    PathBuf::from(format!("anomalies_{}.csv", stamp))
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path, delimiter: Option<char>) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !["csv", "tsv", "txt"].iter().any(|known| ext.eq_ignore_ascii_case(known)) {
        anyhow::bail!("Unsupported file format: {}", ext);
    }

    let mut loader = DataLoader::new();
    if let Some(c) = delimiter {
        if !c.is_ascii() {
            anyhow::bail!("Delimiter must be a single ASCII character, got {:?}", c);
        }
        loader = loader.with_delimiter(c as u8);
    }
    Ok(loader.load_csv(path)?)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_detect(args: &DetectArgs) -> anyhow::Result<()> {
    section("Detect");

    let config = args.detection_config()?;

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(&args.data, args.delimiter)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run(&format!("Training {} trees", config.forest.n_estimators.to_string().cyan()));
    let engine = DetectionEngine::new(config);
    let outcome = engine.run(df)?;
    step_done(&format!(
        "prepare {:.3}s · train {:.3}s · score {:.3}s",
        outcome.timings.prepare_secs, outcome.timings.train_secs, outcome.timings.score_secs
    ));

    let report = &outcome.report;
    print_summary(report, &outcome.dropped_columns);
    print_top_anomalies(report, args.top)?;

    if let Some(feature) = &args.feature {
        print_feature_breakdown(report, feature)?;
    }

    if let Some(path) = args.output_path() {
        let mut table = if args.all {
            report.to_dataframe()?
        } else {
            report.anomalies_dataframe(&AnomalyFilter::new())?
        };
        step_run(&format!("Saving → {}", path.display()));
        DataSaver::save_csv(&mut table, &path)?;
        step_done(&format!("{} rows × {} cols", table.height(), table.width()));
    }

    println!();
    Ok(())
}

fn print_summary(report: &AnomalyReport, dropped: &[String]) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Anomaly Summary".white().bold()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Records     ", &report.n_samples().to_string()));
    line_box(&kv("Anomalies   ", &report.n_anomalies().to_string()));
    line_box(&kv("Rate        ", &format!("{:.2}%", report.anomaly_rate() * 100.0)));
    line_box(&format!("{} {}", muted("Risk level  "), risk_badge(report.risk_level())));
    line_box(&kv("Mean score  ", &fmt_opt(report.mean_score())));
    line_box(&kv("Features    ", &report.feature_names().len().to_string()));
    if !dropped.is_empty() {
        line_box(&kv("Dropped     ", &dropped.join(", ")));
    }
    line_box_empty();
    line_box_bottom();
}

fn print_top_anomalies(report: &AnomalyReport, top: usize) -> anyhow::Result<()> {
    section("Top anomalies");

    let rows = report.filter(&AnomalyFilter::new().with_limit(top));
    if rows.is_empty() {
        println!("  {}", dim("no anomalies detected"));
        return Ok(());
    }

    let features: Vec<&String> = report.feature_names().iter().take(PREVIEW_FEATURES).collect();
    let mut columns = Vec::with_capacity(features.len());
    for name in &features {
        columns.push(numeric_values(report.table().column(name.as_str())?)?);
    }

    let mut header = format!("  {:>6} {:>9}", muted("Row"), muted("Score"));
    for name in &features {
        header.push_str(&format!(" {:>12}", muted(&truncate(name, 12))));
    }
    println!("{}", header);
    println!("  {}", dim(&"─".repeat(17 + 13 * features.len())));

    for sample in rows {
        let mut line = format!("  {:>6} {:>9}", sample.index, format!("{:.4}", sample.score).red());
        for column in &columns {
            let cell = column[sample.index].map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
            line.push_str(&format!(" {:>12}", cell));
        }
        println!("{}", line);
    }
    Ok(())
}

fn print_feature_breakdown(report: &AnomalyReport, feature: &str) -> anyhow::Result<()> {
    section(&format!("Feature · {}", feature));

    let summary = report.feature_summary(feature)?;
    println!("  {:<10} {:>12} {:>12}", muted("Stat"), muted("Normal"), muted("Anomalous"));
    println!("  {}", dim(&"─".repeat(36)));

    let row = |name: &str, f: fn(&FeatureSummary) -> Option<f64>| {
        println!(
            "  {:<10} {:>12} {:>12}",
            name,
            fmt_opt(f(&summary.normal)),
            fmt_opt(f(&summary.anomalous))
        );
    };
    println!("  {:<10} {:>12} {:>12}", "count", summary.normal.count, summary.anomalous.count);
    row("mean", |s| s.mean);
    row("std", |s| s.std);
    row("min", |s| s.min);
    row("median", |s| s.median);
    row("max", |s| s.max);
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let head: String = s.chars().take(width - 1).collect();
        format!("{}…", head)
    }
}

pub fn cmd_info(data_path: &Path, delimiter: Option<char>) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path, delimiter)?;
    let numeric = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .count();

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {}", muted("Numeric"), numeric);
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<24} {:<12} {:>8} {:>6}", muted("Column"), muted("Type"), muted("Numeric"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(54)));

    for col in df.get_columns() {
        let flag = if is_numeric_dtype(col.dtype()) { ok("yes") } else { dim("no") };
        println!(
            "  {:<24} {:<12} {:>8} {:>6}",
            truncate(col.name().as_str(), 24),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            flag,
            col.null_count()
        );
    }

    println!();
    Ok(())
}
