#[cfg(test)]
mod tests;

use std::path::Path;

use crate::{
    error_code::ErrorCode,
    process::{Process, ProcessError},
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum FfMpegError {
    #[error("Error in ffmpeg process")]
    Process(#[source] ProcessError),

    #[error("Error deserializing probe output")]
    Json(#[source] serde_json::Error),

    #[error("Invalid media file provided")]
    CommandFailed(ProcessError),
}

impl FfMpegError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Process(e) => e.error_code(),
            Self::Json(_) => ErrorCode::EXTRACT_DETAILS,
            Self::CommandFailed(_) => ErrorCode::COMMAND_FAILURE,
        }
    }
}

impl From<ProcessError> for FfMpegError {
    fn from(value: ProcessError) -> Self {
        match value {
            e @ ProcessError::Status(_, _) => Self::CommandFailed(e),
            otherwise => Self::Process(otherwise),
        }
    }
}

/// Media properties extracted from a probe, shaped for the info response.
#[derive(Debug, PartialEq, serde::Serialize)]
pub(crate) struct MediaDetails {
    pub(crate) duration: Option<f64>,
    pub(crate) size: Option<u64>,
    pub(crate) format: Option<String>,
    pub(crate) bitrate: Option<u64>,
    pub(crate) video: Option<VideoDetails>,
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub(crate) struct VideoDetails {
    pub(crate) codec: Option<String>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) framerate: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,

    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, serde::Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[tracing::instrument(level = "debug")]
pub(crate) async fn transcode(
    input: &Path,
    output: &Path,
    timeout: u64,
) -> Result<(), FfMpegError> {
    Process::run(
        "ffmpeg",
        &[
            "-y".as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            output.as_os_str(),
        ],
        timeout,
    )?
    .wait()
    .await?;

    Ok(())
}

#[tracing::instrument(level = "debug")]
pub(crate) async fn trim(
    input: &Path,
    output: &Path,
    start: f64,
    duration: f64,
    timeout: u64,
) -> Result<(), FfMpegError> {
    let start = start.to_string();
    let duration = duration.to_string();

    Process::run(
        "ffmpeg",
        &[
            "-y".as_ref(),
            "-ss".as_ref(),
            start.as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            "-t".as_ref(),
            duration.as_ref(),
            output.as_os_str(),
        ],
        timeout,
    )?
    .wait()
    .await?;

    Ok(())
}

#[tracing::instrument(level = "debug")]
pub(crate) async fn probe(input: &Path, timeout: u64) -> Result<MediaDetails, FfMpegError> {
    let output = Process::run(
        "ffprobe",
        &[
            "-v".as_ref(),
            "quiet".as_ref(),
            "-print_format".as_ref(),
            "json".as_ref(),
            "-show_format".as_ref(),
            "-show_streams".as_ref(),
            input.as_os_str(),
        ],
        timeout,
    )?
    .output()
    .await?;

    let probe: ProbeOutput = serde_json::from_slice(&output).map_err(FfMpegError::Json)?;

    Ok(parse_details(probe))
}

fn parse_details(output: ProbeOutput) -> MediaDetails {
    let ProbeOutput { format, streams } = output;

    let video = streams
        .into_iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"));

    MediaDetails {
        duration: format.duration.and_then(|d| d.parse().ok()),
        size: format.size.and_then(|s| s.parse().ok()),
        format: format.format_name,
        bitrate: format.bit_rate.and_then(|b| b.parse().ok()),
        video: video.map(|stream| VideoDetails {
            codec: stream.codec_name,
            width: stream.width,
            height: stream.height,
            framerate: stream.r_frame_rate.as_deref().and_then(parse_frame_rate),
        }),
    }
}

// ffprobe reports frame rates as rationals like 30000/1001
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;

        if den == 0.0 {
            return None;
        }

        return Some(num / den);
    }

    rate.parse().ok()
}
