//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_FFMPEG_CMD, DEFAULT_FFPROBE_CMD, MAX_BUFFER_CAPACITY,
    MIN_BUFFER_CAPACITY,
};

/// CLI options for the frame labeler. Validated values keep the decoder subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "framelabel",
    about = "Step through a video frame by frame and label each frame with a key press",
    author,
    version
)]
pub struct AppConfig {
    /// Video file to label
    #[arg(value_name = "VIDEO_PATH")]
    pub video_path: PathBuf,

    /// CSV file that receives one `Frame,Label` row per labeled frame
    #[arg(value_name = "OUTPUT_TABLE_PATH")]
    pub output_path: PathBuf,

    /// Number of past frames kept for undo
    #[arg(long = "buffer-capacity", default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// FFmpeg binary used to decode frames
    #[arg(long, default_value = DEFAULT_FFMPEG_CMD)]
    pub ffmpeg_cmd: String,

    /// FFprobe binary used to read the video geometry
    #[arg(long, default_value = DEFAULT_FFPROBE_CMD)]
    pub ffprobe_cmd: String,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "FRAMELABEL_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "FRAMELABEL_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Decoder settings handed to the ffmpeg frame source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegConfig {
    pub ffmpeg_cmd: String,
    pub ffprobe_cmd: String,
}

impl AppConfig {
    /// Whether file logging should be active for this run.
    pub fn logs_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    pub fn ffmpeg_config(&self) -> FfmpegConfig {
        FfmpegConfig {
            ffmpeg_cmd: self.ffmpeg_cmd.clone(),
            ffprobe_cmd: self.ffprobe_cmd.clone(),
        }
    }
}
