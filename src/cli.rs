use clap::{Parser, Subcommand, ValueEnum};
use printer_lib::{Config, Dimension, PrinterError, RenderOptions};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "printer")]
#[command(
    version,
    about = "Printer - Render application pages to PDF, PNG or JPEG with headless Chromium",
    long_about = "Printer\n\nRenders a root-relative page path (e.g. /report?id=5) against the configured base host and writes the artifact under the artifact directory.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for base host, artifact dir and browser launch settings; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a page to a file and print its path
    Render {
        #[arg(help = "Root-relative page path, including query (e.g. /report?id=5)")]
        path: String,

        #[arg(long = "type", default_value = "pdf", help = "Output type (pdf, png, jpg, jpeg)")]
        kind: String,

        #[arg(long, help = "Use https instead of http")]
        secure: bool,

        #[arg(long, help = "Sub-domain prepended to the base host")]
        subdomain: Option<String>,

        #[arg(long, help = "Width (px number or length like 210mm)")]
        width: Option<String>,

        #[arg(long, help = "Height (px number or length like 297mm)")]
        height: Option<String>,

        #[arg(
            long = "option",
            value_name = "KEY=JSON",
            help = "Extra export option, e.g. landscape=true or margin={\"top\":\"2cm\"}; repeatable"
        )]
        options: Vec<String>,

        #[arg(long, help = "Override the configured base host")]
        base_host: Option<String>,

        #[arg(long, value_name = "PATH", help = "Override the artifact directory")]
        artifact_dir: Option<PathBuf>,

        #[arg(long, help = "Fail on unrecognized output types")]
        strict: bool,

        #[arg(long, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses a `--width`/`--height` value: plain numbers are pixels.
pub fn parse_dimension(raw: &str) -> Dimension {
    match raw.trim().parse::<f64>() {
        Ok(px) => Dimension::Pixels(px),
        Err(_) => Dimension::Text(raw.trim().to_string()),
    }
}

/// Parses `KEY=JSON`; values that are not valid JSON are taken as strings.
pub fn parse_option(raw: &str) -> Result<(String, Value), PrinterError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        PrinterError::invalid_options(format!("Expected KEY=VALUE, got '{raw}'"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(PrinterError::invalid_options(format!(
            "Missing option name in '{raw}'"
        )));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn build_render_options(
    kind: &str,
    secure: bool,
    subdomain: Option<String>,
    width: Option<&str>,
    height: Option<&str>,
    options: &[String],
) -> Result<RenderOptions, PrinterError> {
    let mut render = RenderOptions::new().with_type(kind).secure(secure);
    render.subdomain = subdomain;
    render.width = width.map(parse_dimension);
    render.height = height.map(parse_dimension);
    for raw in options {
        let (key, value) = parse_option(raw)?;
        render = render.with_option(key, value);
    }
    Ok(render)
}

pub fn apply_overrides(
    mut config: Config,
    base_host: Option<String>,
    artifact_dir: Option<PathBuf>,
    strict: bool,
) -> Config {
    if let Some(host) = base_host {
        config.base_host = host;
    }
    if let Some(dir) = artifact_dir {
        config.artifact_dir = dir;
    }
    if strict {
        config.strict_formats = true;
    }
    config
}
