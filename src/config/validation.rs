use super::{AppConfig, MAX_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY};
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};

impl AppConfig {
    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_BUFFER_CAPACITY..=MAX_BUFFER_CAPACITY).contains(&self.buffer_capacity) {
            bail!(
                "--buffer-capacity must be between {MIN_BUFFER_CAPACITY} and {MAX_BUFFER_CAPACITY}, got {}",
                self.buffer_capacity
            );
        }

        self.ffmpeg_cmd = sanitize_binary(&self.ffmpeg_cmd, "--ffmpeg-cmd", &["ffmpeg"])?;
        self.ffprobe_cmd = sanitize_binary(&self.ffprobe_cmd, "--ffprobe-cmd", &["ffprobe"])?;

        let video = fs::metadata(&self.video_path).with_context(|| {
            format!("video file '{}' does not exist", self.video_path.display())
        })?;
        if !video.is_file() {
            bail!("video path '{}' is not a file", self.video_path.display());
        }

        check_output_path(&self.output_path)?;
        Ok(())
    }
}

/// The table is only written after the session ends, so catch unwritable targets up front.
pub(super) fn check_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("output table path cannot be empty");
    }
    if path.is_dir() {
        bail!("output table path '{}' is a directory", path.display());
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };
    if !parent.is_dir() {
        bail!(
            "output directory '{}' does not exist",
            parent.display()
        );
    }
    Ok(())
}

/// Allow either a known binary name or an absolute path.
pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
