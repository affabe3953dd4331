use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tinysaver::host::fs::HostProfile;
use tinysaver::{Blob, Downloader, FsHost, Payload, SaveError, SaveOptions, SaverConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Native,
    Legacy,
    Reader,
}

impl From<Mode> for HostProfile {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Native => HostProfile::Native,
            Mode::Legacy => HostProfile::Legacy,
            Mode::Reader => HostProfile::Reader,
        }
    }
}

/// Save a local file or a remote URL into a directory.
#[derive(Debug, Parser)]
#[command(name = "tinysaver", version)]
struct Cli {
    /// File path or http(s) URL
    input: String,

    /// Name of the saved file
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// MIME type of a local file
    #[arg(long)]
    mime: Option<String>,

    /// Prepend a UTF-8 BOM to text payloads
    #[arg(long)]
    bom: bool,

    /// TOML file with saver defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save primitive the host advertises
    #[arg(long, value_enum, default_value_t = Mode::Native)]
    mode: Mode,

    /// Report download progress for remote URLs
    #[arg(long)]
    progress: bool,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tinysaver=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_payload(input: &str, mime: Option<&str>) -> Result<Payload, SaveError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(Payload::Url(input.to_string()));
    }
    let path = Path::new(input);
    let data = tokio::fs::read(path).await?;
    let mut blob = Blob::new(data, mime.unwrap_or(tinysaver::domain::OCTET_STREAM));
    if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
        blob = blob.with_name(file_name);
    }
    Ok(Payload::Blob(blob))
}

async fn run(cli: Cli) -> Result<(), SaveError> {
    let config = match &cli.config {
        Some(path) => SaverConfig::load(path)?,
        None => SaverConfig::default(),
    };
    let host = FsHost::new(cli.out.clone()).with_profile(cli.mode.into());
    let downloader = Downloader::with_config(Arc::new(host), config);
    info!(strategy = %downloader.strategy(), "selected save strategy");

    let payload = load_payload(&cli.input, cli.mime.as_deref()).await?;
    let mut options = SaveOptions::new()
        .on_start(|| info!("save started"))
        .on_complete(|| info!("save complete"));
    if cli.bom {
        options = options.auto_bom(true);
    }
    if cli.progress {
        options = options.on_progress(|loaded, total| {
            info!("Downloading: {:.1}%", loaded as f64 / total.max(1) as f64 * 100.0)
        });
    }

    downloader.save(payload, cli.name.as_deref(), options).await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Save failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
