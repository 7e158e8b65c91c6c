use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use es_pipeline::{
    pacer::Pacer,
    player::{PlaybackEnd, Player},
};
use tokio_util::sync::CancellationToken;

use crate::{
    cli::Cli,
    sink::{FanoutSink, JpegSink, StatusSink},
};

mod cli;
mod sink;

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("ffmpeg_next", log::LevelFilter::Warn)
        .filter_module("es_pipeline", log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

async fn play(cli: Cli, cancel: CancellationToken) -> anyhow::Result<PlaybackEnd> {
    let config = cli.pipeline_config()?;
    es_pipeline::init().context("ffmpeg init")?;

    let mut sink = FanoutSink::default();
    sink.push(StatusSink::stderr());
    if let Some(dir) = &cli.jpeg_dir {
        sink.push(JpegSink::new(dir, cli.jpeg_every, cli.jpeg_quality)?);
    }

    let mut pipeline = es_pipeline::ffmpeg::open_file(&cli.input, &config)
        .with_context(|| format!("open {}", cli.input.display()))?;
    log::info!(
        "playing {} at {} fps",
        cli.input.display(),
        config.stream.fps
    );

    let mut pacer = Pacer::new(config.stream.fps);
    pacer.set_enabled(!cli.no_pace);
    let mut player = Player::new(pacer, cancel);

    let summary = tokio::task::spawn_blocking(move || player.run(&mut pipeline, &mut sink))
        .await
        .context("player task")??;
    log::info!(
        "{} frames presented ({:?}), {} packets, {} skipped, {} decode errors",
        summary.frames,
        summary.end,
        summary.stats.packets,
        summary.stats.skipped,
        summary.stats.decode_errors
    );
    Ok(summary.end)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            return match cli::usage_error(&e) {
                Some(usage) => {
                    eprintln!("{}", usage);
                    ExitCode::FAILURE
                }
                None => {
                    let _ = e.print();
                    ExitCode::SUCCESS
                }
            };
        }
    };

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel_clone.cancelled() => {},
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, stopping playback");
                cancel_clone.cancel();
            },
        }
    });

    let result = play(cli, cancel.clone()).await;
    cancel.cancel();
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
