//! threshcorder: record a WAV file every time an audio input gets loud.

mod args;
mod driver;
mod reporter;
mod sources;

use std::fs;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use threshcorder_core::TriggerRecorder;

use args::Args;
use driver::Driver;
use reporter::JsonReporter;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.to_configuration().context("invalid arguments")?;

    log::info!(
        "Threshold: {} ({}), keepalive: {}, cooldown: {:.2}s, buffer: {} ms",
        config.trigger.trigger_level,
        config.trigger.detection,
        config.trigger.keepalive_level,
        config.trigger.cooldown.as_secs_f64(),
        config.buffer_duration().as_millis()
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            log::info!("Interrupted, finishing current recording");
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("failed to install signal handler")?;
    }

    let source = sources::open_source(&args.device, config.format)
        .with_context(|| format!("failed to open audio source '{}'", args.device))?;

    fs::create_dir_all(&config.output_directory).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_directory.display()
        )
    })?;

    let mut recorder = TriggerRecorder::new(&config)?;
    if args.json {
        recorder.set_delegate(Box::new(JsonReporter::stdout()));
    }

    let mut driver = Driver::new(source, recorder, config.frames_per_buffer, shutdown);
    let summary = driver.run().context("recording stopped")?;

    log::info!(
        "Done: {} buffers analysed, {} recordings written, {} failed",
        summary.buffers,
        summary.episodes,
        summary.failed_episodes
    );
    Ok(())
}
