//! `framelabel` entrypoint: label a video frame by frame from the terminal.
//!
//! Decoding runs in an ffmpeg sidecar, the preview draws on the alternate screen,
//! and the label table is written once the session ends normally.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use framelabel::{
    config::AppConfig, frames::FfmpegFrameSource, init_logging, input::CrosstermKeys,
    log_debug, log_file_path, preview::TerminalPreview, table::write_label_table,
    SessionController, SessionOutcome,
};
use std::process::ExitCode;

/// Exit status after Ctrl+C, matching a shell's SIGINT convention.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let mut config = match AppConfig::try_parse() {
        Ok(config) => config,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(&mut config) {
        Ok(SessionOutcome::Interrupted) => {
            eprintln!("Interrupted; labels were not written.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log_debug(&format!("Exit with error: {err:#}"));
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &mut AppConfig) -> Result<SessionOutcome> {
    config.validate()?;
    init_logging(config);
    log_debug("=== framelabel started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let source = FfmpegFrameSource::open(&config.video_path, &config.ffmpeg_config())?;
    let mut session = SessionController::new(source, config.buffer_capacity);
    let mut preview = TerminalPreview::open()?;
    let outcome = session.run(&mut CrosstermKeys::new(), &mut preview)?;
    let labels = session.finish();

    if outcome.writes_table() {
        write_label_table(&config.output_path, &labels).with_context(|| {
            format!(
                "failed to write {} labels to '{}'",
                labels.len(),
                config.output_path.display()
            )
        })?;
        println!(
            "Wrote {} labels to {}",
            labels.len(),
            config.output_path.display()
        );
    }

    log_debug(&format!("=== framelabel exiting ({outcome:?}) ==="));
    Ok(outcome)
}
