//! FFmpeg sidecar that streams raw RGB24 frames over a pipe.
//!
//! `ffprobe` reports the stream geometry up front so every frame can be read as a
//! fixed-size chunk from `ffmpeg`'s stdout.

use super::{FrameSource, VideoFrame, RGB_CHANNELS};
use crate::config::FfmpegConfig;
use crate::log_debug;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

const STDERR_KEEP_BYTES: u64 = 16 * 1024;

/// Width and height of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
}

impl VideoGeometry {
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * RGB_CHANNELS
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -of json` output into the geometry of the first video stream.
pub(super) fn parse_probe_json(raw: &str) -> Result<VideoGeometry> {
    let probe: ProbeOutput =
        serde_json::from_str(raw).context("ffprobe returned malformed JSON")?;
    let stream = probe
        .streams
        .first()
        .ok_or_else(|| anyhow!("no video stream found"))?;
    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(VideoGeometry { width, height })
        }
        _ => bail!("video stream reports no usable frame size"),
    }
}

fn spawn_error(cmd: &str, flag: &str, err: std::io::Error) -> anyhow::Error {
    if err.kind() == ErrorKind::NotFound {
        anyhow!("{cmd} was not found on PATH. Install FFmpeg or point {flag} at the binary.")
    } else {
        anyhow!("failed to spawn {cmd}: {err}")
    }
}

/// Ask ffprobe for the first video stream's geometry.
pub fn probe_geometry(path: &Path, config: &FfmpegConfig) -> Result<VideoGeometry> {
    let output = Command::new(&config.ffprobe_cmd)
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height", "-of", "json"])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| spawn_error(&config.ffprobe_cmd, "--ffprobe-cmd", err))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "ffprobe failed on '{}' ({}): {}",
            path.display(),
            output.status,
            stderr.trim()
        );
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_json(&stdout).with_context(|| format!("cannot read '{}'", path.display()))
}

/// Reads fixed-size RGB24 frames from any byte stream.
pub(super) struct RawFrameReader<R> {
    reader: R,
    geometry: VideoGeometry,
    next_index: u64,
}

impl<R: Read> RawFrameReader<R> {
    pub(super) fn new(reader: R, geometry: VideoGeometry) -> Self {
        Self {
            reader,
            geometry,
            next_index: 0,
        }
    }

    pub(super) fn read_frame(&mut self) -> Result<Option<VideoFrame>> {
        let mut pixels = vec![0u8; self.geometry.frame_bytes()];
        let mut filled = 0;
        while filled < pixels.len() {
            match self.reader.read(&mut pixels[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(err).context("failed to read frame data from ffmpeg");
                }
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < pixels.len() {
            log_debug(&format!(
                "dropping truncated trailing frame {} ({filled} of {} bytes)",
                self.next_index,
                pixels.len()
            ));
            return Ok(None);
        }
        let frame = VideoFrame::new(
            self.next_index,
            self.geometry.width,
            self.geometry.height,
            pixels,
        );
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Frame source backed by an `ffmpeg` child process.
pub struct FfmpegFrameSource {
    path: PathBuf,
    geometry: VideoGeometry,
    child: Option<Child>,
    frames: Option<RawFrameReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    released: bool,
}

/// Keep the head of ffmpeg's stderr and discard the rest so the pipe never fills.
fn drain_stderr(mut pipe: ChildStderr) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut kept = Vec::new();
        let _ = pipe.by_ref().take(STDERR_KEEP_BYTES).read_to_end(&mut kept);
        let _ = io::copy(&mut pipe, &mut io::sink());
        String::from_utf8_lossy(&kept).trim().to_string()
    })
}

impl FfmpegFrameSource {
    /// Probe the video and start decoding it.
    pub fn open(path: &Path, config: &FfmpegConfig) -> Result<Self> {
        let geometry = probe_geometry(path, config)?;
        let mut child = Command::new(&config.ffmpeg_cmd)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-noautorotate"])
            .arg("-i")
            .arg(path)
            .args(["-map", "0:v:0", "-an", "-sn"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_error(&config.ffmpeg_cmd, "--ffmpeg-cmd", err))?;
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                bail!("failed to capture ffmpeg stdout");
            }
        };
        let stderr = child.stderr.take().map(drain_stderr);
        log_debug(&format!(
            "decoding '{}' at {}x{}",
            path.display(),
            geometry.width,
            geometry.height
        ));
        Ok(Self {
            path: path.to_path_buf(),
            geometry,
            child: Some(child),
            frames: Some(RawFrameReader::new(stdout, geometry)),
            stderr,
            released: false,
        })
    }

    pub fn geometry(&self) -> VideoGeometry {
        self.geometry
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Reap ffmpeg once its output runs dry; a failed exit is a decode error, not the end.
    fn finish_decode(&mut self) -> Result<()> {
        self.frames = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().context("failed to wait for ffmpeg")?;
        let stderr = self
            .stderr
            .take()
            .and_then(|drain| drain.join().ok())
            .unwrap_or_default();
        if !status.success() {
            if stderr.is_empty() {
                bail!("ffmpeg failed on '{}' ({status})", self.path.display());
            }
            bail!("ffmpeg failed on '{}' ({status}): {stderr}", self.path.display());
        }
        log_debug(&format!("ffmpeg finished decoding '{}'", self.path.display()));
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    type Frame = VideoFrame;

    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        let Some(frames) = self.frames.as_mut() else {
            return Ok(None);
        };
        let frame = frames
            .read_frame()
            .with_context(|| format!("decoding '{}'", self.path.display()))?;
        if frame.is_none() {
            self.finish_decode()?;
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.released = true;
        // Drop stdout before kill so a blocked write sees EPIPE.
        self.frames = None;
        self.stderr = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            match child.wait() {
                Ok(status) => log_debug(&format!("ffmpeg released ({status})")),
                Err(err) => log_debug(&format!("ffmpeg wait failed: {err}")),
            }
        }
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        self.release();
    }
}
