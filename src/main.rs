mod app;
mod core;
mod error;
mod events;
mod models;
mod utils;

use crate::{
    app::config,
    core::pipeline::EmotePipeline,
    events::download_event::ConsoleSink,
};
use clap::Parser;
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing_subscriber::EnvFilter;

/// Download every emote of a twitchemotes.com channel.
#[derive(Parser, Debug)]
#[command(name = "twe-dlp", version)]
struct Cli {
    /// Channel name or numeric ID. Prompts for one when omitted.
    channel: Option<String>,

    /// Directory the channel folder is created in.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file to use instead of the one in the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Logs go to a file so stdout stays readable.
    let file_appender = tracing_appender::rolling::never(".", "twe-dlp.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();

    let cli = Cli::parse();

    let identifier = match &cli.channel {
        Some(channel) => channel.trim().to_string(),
        None => match read_stdin_line("Twitch channel name or ID: ") {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading channel: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    if identifier.is_empty() {
        eprintln!("No channel identifier provided.");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli, identifier))
}

async fn run(cli: Cli, identifier: String) -> ExitCode {
    let mut config = match config::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config error: {:#}", e);
            eprintln!("Error loading config: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    let pipeline = match EmotePipeline::new(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let channel_id = match pipeline.resolve(&identifier).await {
        Ok(channel_id) => channel_id,
        Err(e) => {
            tracing::error!("Resolution failed: {}", e);
            eprintln!("Error resolving channel: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sink = ConsoleSink;
    match pipeline.download_channel_emotes(&channel_id, &mut sink).await {
        Ok(output_root) => {
            tracing::info!("Finished channel {} into {}", channel_id, output_root.display());
            println!("Download completed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Download failed: {}", e);
            eprintln!("Error downloading emotes: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_stdin_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
