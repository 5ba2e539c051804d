use anyhow::Context;
use clap::Parser;
use identcore::remote::ClassifierClient;
use identcore::{ConfigOverrides, WidgetConfig};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::runtime::Builder as TokioBuilder;
use workflow::runner::{RunReport, Runner};

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Headless image identification driver")]
struct Args {
    /// Image to upload for classification
    #[arg(long)]
    image: Option<PathBuf>,
    /// Load settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the classification service
    #[arg(long, env = "IDENTIFY_ENDPOINT")]
    endpoint: Option<String>,
    /// Directory holding the placeholder slideshow images
    #[arg(long)]
    gallery: Option<PathBuf>,
    /// Probe the service root before uploading
    #[arg(long, default_value_t = false)]
    wake: bool,
    /// Append a JSON summary line to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print the whole service reply as indented JSON
    #[arg(long, default_value_t = false)]
    raw: bool,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    image: Option<String>,
    category: Option<&'a str>,
    probability: Option<f64>,
    error: Option<&'a str>,
    alerts: &'a [String],
    backend_awake: bool,
    frames_shown: usize,
    elapsed_ms: u128,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = WidgetConfig::resolve(
        args.config.as_deref(),
        ConfigOverrides {
            endpoint: args.endpoint,
            gallery: args.gallery,
            wake: args.wake,
        },
    )
    .context("resolving configuration")?;
    let client = ClassifierClient::from_config(&config).context("building classifier client")?;
    let runner = Runner::new(config, client);

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    let report = runtime.block_on(runner.run(args.image.clone()))?;

    print_report(&report, args.raw);

    if let Some(report_path) = args.report {
        append_report(&report_path, args.image.as_deref(), &report)?;
    }

    Ok(())
}

fn print_report(report: &RunReport, raw: bool) {
    for alert in &report.alerts {
        println!("Alert: {}", alert);
    }
    if !report.backend.message.is_empty() {
        println!("Backend: {}", report.backend.message);
    }
    match &report.result {
        Some(result) => {
            let probability = result.probability_label().unwrap_or_else(|| "n/a".into());
            println!(
                "Result -> {} (probability {}, {} slideshow frames, {} ms)",
                result.headline(),
                probability,
                report.frames_shown,
                report.elapsed.as_millis()
            );
            if let Some(error) = &result.error {
                println!("Detail: {}", error);
            }
            if raw {
                println!("Reply:\n{}", result.pretty());
            }
        }
        None => println!("No classification result."),
    }
    let metrics = report.metrics;
    println!(
        "Sessions -> submitted {}, succeeded {}, failed {}, stale {}",
        metrics.submitted, metrics.succeeded, metrics.failed, metrics.stale_discarded
    );
}

fn append_report(path: &Path, image: Option<&Path>, report: &RunReport) -> anyhow::Result<()> {
    let line = ReportLine {
        image: image.map(|p| p.display().to_string()),
        category: report.result.as_ref().map(|r| r.headline()),
        probability: report.result.as_ref().and_then(|r| r.probability),
        error: report.result.as_ref().and_then(|r| r.error.as_deref()),
        alerts: &report.alerts,
        backend_awake: report.backend.awake,
        frames_shown: report.frames_shown,
        elapsed_ms: report.elapsed.as_millis(),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;
    let mut json = serde_json::to_string(&line)?;
    json.push('\n');
    file.write_all(json.as_bytes())?;
    Ok(())
}
