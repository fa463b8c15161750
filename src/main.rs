mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use talon::config;
use talon::download::{tools, Downloader};
use talon::media::MediaEntry;
use talon::output::{output_filename, VideoFormat};
use talon::server;
use talon::twitter::TwitterClient;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise use defaults based on the verbose
    // flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "talon=trace,tower_http=debug".to_string()
        } else {
            "talon=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::Resolve { reference, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(&reference, json, cli.config.as_deref()))
        }
        Commands::Download {
            reference,
            output,
            quality,
            format,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(download(
                &reference,
                output.as_deref(),
                quality.as_deref(),
                &format,
                cli.config.as_deref(),
            ))
        }
        Commands::CheckTools => check_tools(),
        Commands::Version => {
            println!("talon {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(host: String, port: u16, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting talon server");
    server::start_server(config).await
}

async fn resolve(reference: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = TwitterClient::new(&config.twitter);

    let catalog = client.resolve(reference).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("Tweet: {}", catalog.tweet_id);
    if catalog.media_list.is_empty() {
        println!("No videos found in this tweet.");
        return Ok(());
    }

    println!("Found {} media options:", catalog.media_list.len());
    for (i, entry) in catalog.media_list.iter().enumerate() {
        let mut line = format!("  {}. quality: {}", i + 1, entry.quality);
        if let (Some(w), Some(h)) = (entry.width, entry.height) {
            line.push_str(&format!("  {}x{}", w, h));
        }
        if let Some(codec) = &entry.video_codec {
            line.push_str(&format!("  {}", codec));
        }
        println!("{line}");
    }
    Ok(())
}

async fn download(
    reference: &str,
    output: Option<&str>,
    quality: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let format = VideoFormat::parse(format)?;

    let client = TwitterClient::new(&config.twitter);
    let downloader = Downloader::new(tools::find_ffmpeg(&config.download));

    tracing::info!("Resolving tweet reference...");
    let catalog = client.resolve(reference).await?;

    let entry = pick_entry(&catalog.media_list, quality, downloader.ffmpeg_available())
        .ok_or_else(|| anyhow::anyhow!("no video found in the tweet"))?;

    if (entry.is_manifest() || format != VideoFormat::Mp4) && !downloader.ffmpeg_available() {
        anyhow::bail!(
            "ffmpeg is required for this download but was not found.\n\
             Ubuntu/Debian: sudo apt-get install ffmpeg\n\
             macOS: brew install ffmpeg"
        );
    }

    let filename = output_filename(output, &catalog.tweet_id, format);
    println!("Downloading quality {} to {filename}...", entry.quality);

    downloader
        .download_to(client.http(), entry, format, Path::new(&filename))
        .await?;

    println!("Download completed: {filename}");
    Ok(())
}

/// Pick the variant to download. An explicit quality tag must match
/// exactly; otherwise the HLS stream is preferred (it carries audio for
/// older posts) when ffmpeg can handle it, falling back to the best
/// fixed-container variant.
fn pick_entry<'a>(
    entries: &'a [MediaEntry],
    quality: Option<&str>,
    ffmpeg_available: bool,
) -> Option<&'a MediaEntry> {
    match quality {
        Some(q) => entries.iter().find(|e| e.quality == q),
        None => {
            if ffmpeg_available {
                if let Some(manifest) = entries.iter().find(|e| e.is_manifest()) {
                    return Some(manifest);
                }
            }
            entries.iter().find(|e| !e.is_manifest())
        }
    }
}

fn check_tools() -> Result<()> {
    let statuses = tools::check_tools();
    let mut all_available = true;

    for status in &statuses {
        if status.available {
            let path = status
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("✓ {} ({})", status.name, path);
        } else {
            all_available = false;
            println!("✗ {} (not found)", status.name);
        }
    }

    if !all_available {
        println!("\nffmpeg is optional but required for HLS downloads and format conversion.");
    }
    Ok(())
}
