use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use vidscript_core::MediaDescriptor;

/// Describe a media file using ffprobe
pub fn probe_media(path: impl AsRef<Path>) -> Result<MediaDescriptor> {
    let path = path.as_ref();
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .context("ffprobe not found. Please install FFmpeg.")?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {:?} with exit code: {:?}",
            path,
            output.status.code()
        );
    }

    let json = String::from_utf8_lossy(&output.stdout);
    let descriptor = MediaDescriptor::from_ffprobe_json(&json)
        .with_context(|| format!("Failed to read ffprobe output for {:?}", path))?;

    log::info!(
        "Media info: resolution {}, duration {}, codecs [{}]",
        descriptor
            .resolution
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        descriptor
            .duration
            .map(|d| format!("{:.2}s", d))
            .unwrap_or_else(|| "unknown".to_string()),
        descriptor.codecs.join(", ")
    );

    Ok(descriptor)
}
