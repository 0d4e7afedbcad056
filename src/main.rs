mod cli;

use std::process::ExitCode;

use cli::{Commands, OutputFormat};
use printer_lib::{Config, Printer, PrinterError, RenderedArtifact};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Render {
            path,
            kind,
            secure,
            subdomain,
            width,
            height,
            options,
            base_host,
            artifact_dir,
            strict,
            format,
        } => {
            let result = async {
                let config = Config::load(args.config.as_deref())?.apply_env();
                let config = cli::apply_overrides(config, base_host, artifact_dir, strict);
                let render = cli::build_render_options(
                    &kind,
                    secure,
                    subdomain,
                    width.as_deref(),
                    height.as_deref(),
                    &options,
                )?;
                let printer = Printer::new(config)?;
                printer.render(&path, &render).await
            }
            .await;
            report(result, format)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report(result: Result<RenderedArtifact, PrinterError>, format: OutputFormat) -> ExitCode {
    match result {
        Ok(artifact) => {
            if !artifact.written {
                warn!(path = %artifact.path.display(), "nothing was written for type '{}'", artifact.kind);
            }
            match format {
                OutputFormat::Text => println!("{}", artifact.path.display()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "path": artifact.path,
                        "kind": artifact.kind.to_string(),
                        "url": artifact.url,
                        "written": artifact.written,
                    })
                ),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let payload = err.to_payload();
            match format {
                OutputFormat::Json => match serde_json::to_string(&payload) {
                    Ok(json) => println!("{json}"),
                    Err(_) => eprintln!("{}", payload.message),
                },
                OutputFormat::Text => {
                    eprintln!("Error: {}", payload.message);
                    if let Some(hint) = payload.remediation {
                        eprintln!("Hint: {hint}");
                    }
                }
            }
            ExitCode::FAILURE
        }
    }
}
