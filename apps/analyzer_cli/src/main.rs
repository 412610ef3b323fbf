use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AnalysisService, AnalyzeRequest, AnalyzerSession, HttpAnalysisService, PreviewRequest,
};
use shared::protocol::{decode_data_uri, extension_for_media_type};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod files;
mod orchestration;
mod terminal;

use commands::{Command, HELP};
use config::{load_settings, normalize_base_url, Settings};
use files::load_selected_file;
use orchestration::{dispatch, Reply};
use terminal::{save_result_image, TempFilePreviewStore, TerminalUi};

#[derive(Parser, Debug)]
#[command(about = "Spiral composition analyzer client")]
struct Args {
    /// Base URL of the analysis service.
    #[arg(long)]
    api_url: Option<String>,
    /// TOML settings file (defaults to ./analyzer.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where previews and result images are written.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Drive the form from stdin with live previews.
    Interactive,
    /// Run one analysis and save the result image.
    Analyze {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        k: Option<u32>,
        #[arg(long)]
        b_weight: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch one cluster preview.
    Preview {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        k: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = normalize_base_url(&api_url)?;
    }
    if let Some(output_dir) = args.output_dir {
        settings.output_dir = output_dir;
    }
    info!(api = %settings.api_base_url, output = %settings.output_dir.display(), "analyzer client starting");

    match args.mode.unwrap_or(Mode::Interactive) {
        Mode::Interactive => run_interactive(settings).await,
        Mode::Analyze {
            file,
            k,
            b_weight,
            output,
        } => {
            let k = k.unwrap_or(settings.default_k);
            let b_weight = b_weight.unwrap_or(settings.default_b_weight);
            run_analyze(&settings, file, k, b_weight, output).await
        }
        Mode::Preview { file, k, output } => run_preview(&settings, file, k, output).await,
    }
}

async fn run_interactive(settings: Settings) -> Result<()> {
    let service = Arc::new(HttpAnalysisService::new(settings.api_base_url.clone()));
    let ui = Arc::new(TerminalUi::stdout(settings.output_dir.clone()));
    let previews = Arc::new(TempFilePreviewStore::new(
        settings.output_dir.join("previews"),
    ));
    let session = AnalyzerSession::new(service, ui, previews, settings.controller_options());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        match dispatch(&session, command).await {
            Reply::Continue(Some(message)) => println!("{message}"),
            Reply::Continue(None) => {}
            Reply::Quit => break,
        }
    }
    if session.is_submitting() {
        info!("leaving while an analysis is still running; its result is dropped");
    }
    Ok(())
}

async fn run_analyze(
    settings: &Settings,
    file: PathBuf,
    k: u32,
    b_weight: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = HttpAnalysisService::new(settings.api_base_url.clone());
    let file = load_selected_file(&file).await?;
    info!(file = %file.filename, k, b_weight, "requesting analysis");

    let result = service
        .analyze(AnalyzeRequest { file, k, b_weight })
        .await
        .map_err(|error| anyhow::anyhow!("Error: {error}"))?;

    if let Some(score) = result.score {
        println!("score: {score}");
    }
    if let Some(b_value) = result.b_value {
        println!("b value: {b_value}");
    }
    if let Some(golden_b) = result.golden_b {
        println!("golden b: {golden_b}");
    }

    let saved = match output {
        Some(path) => {
            let image = decode_data_uri(&result.image_base64)
                .context("result image is not a base64 data uri")?;
            write_output(&path, &image.bytes).await?;
            path
        }
        None => save_result_image(&settings.output_dir, &result.image_base64)?,
    };
    println!("result image: {}", saved.display());
    Ok(())
}

async fn run_preview(
    settings: &Settings,
    file: PathBuf,
    k: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = HttpAnalysisService::new(settings.api_base_url.clone());
    let file = load_selected_file(&file).await?;

    let image = service
        .preview_clusters(PreviewRequest { file, k })
        .await
        .map_err(|error| match error.status_code() {
            Some(status) => anyhow::anyhow!("preview rejected with status {status}"),
            None => anyhow::anyhow!("preview failed: {error}"),
        })?;

    let path = output.unwrap_or_else(|| {
        let extension = image
            .content_type
            .as_deref()
            .map(extension_for_media_type)
            .unwrap_or("png");
        settings.output_dir.join(format!("preview-k{k}.{extension}"))
    });
    write_output(&path, &image.bytes).await?;
    println!("preview image: {}", path.display());
    Ok(())
}

/// Writes a one-shot image, creating missing parent directories first.
async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn output_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/deeper/result.png");

        write_output(&path, b"png").await.expect("write");

        assert_eq!(std::fs::read(&path).expect("read"), b"png");
    }

    #[tokio::test]
    async fn output_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("result.png");

        write_output(&path, b"one").await.expect("write");
        write_output(&path, b"two").await.expect("overwrite");

        assert_eq!(std::fs::read(&path).expect("read"), b"two");
    }
}
