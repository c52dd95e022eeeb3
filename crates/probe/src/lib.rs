//! Media inspection via ffprobe
//!
//! Spawns `ffprobe -v quiet -print_format json -show_format -show_streams`
//! for one file and converts its JSON description into the common record
//! model. ffprobe reports most numeric values as strings; they are parsed
//! leniently, so an unparsable value simply becomes an absent field rather
//! than a probe failure.

use async_trait::async_trait;
use media_find_common::{ContainerRecord, InspectError, ProbeReport, StreamRecord};
use media_find_core::MediaInspector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// ffprobe-backed [`MediaInspector`]
#[derive(Debug, Clone)]
pub struct Ffprobe {
    binary: String,
}

impl Ffprobe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: "ffprobe".to_string(),
        }
    }

    /// Use a non-default ffprobe binary (name or path)
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run ffprobe on one file and parse its JSON output
    pub async fn probe_file(&self, path: &Path) -> Result<ProbeReport, InspectError> {
        if !path.exists() {
            return Err(InspectError::FileNotFound(path.display().to_string()));
        }

        debug!(path = %path.display(), "probing");

        let output = Command::new(&self.binary)
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
            .await
            .map_err(|err| {
                InspectError::Ffprobe(format!("failed to execute {}: {}", self.binary, err))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectError::Ffprobe(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        parse_report(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaInspector for Ffprobe {
    async fn inspect(&self, path: &Path) -> Result<ProbeReport, InspectError> {
        self.probe_file(path).await
    }
}

/// Parse ffprobe JSON output into a [`ProbeReport`]
pub fn parse_report(json: &str) -> Result<ProbeReport, InspectError> {
    let raw: RawProbeOutput =
        serde_json::from_str(json).map_err(|err| InspectError::Parse(err.to_string()))?;

    Ok(ProbeReport {
        container: raw.format.map(convert_format).unwrap_or_default(),
        streams: raw.streams.into_iter().map(convert_stream).collect(),
    })
}

// ────────── Internal ffprobe JSON shapes ──────────

#[derive(Debug, Deserialize)]
struct RawProbeOutput {
    format: Option<RawFormat>,
    #[serde(default)]
    streams: Vec<RawStream>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
    nb_streams: Option<u32>,
    tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    index: Option<u32>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    profile: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    level: Option<i64>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    channel_layout: Option<String>,
    bit_rate: Option<String>,
    duration: Option<String>,
    tags: Option<BTreeMap<String, String>>,
    disposition: Option<BTreeMap<String, i64>>,
}

fn convert_format(raw: RawFormat) -> ContainerRecord {
    ContainerRecord {
        format_name: raw.format_name,
        format_long_name: raw.format_long_name,
        duration: raw.duration.as_deref().and_then(parse_lenient),
        size: raw.size.as_deref().and_then(parse_lenient),
        bit_rate: raw.bit_rate.as_deref().and_then(parse_lenient),
        nb_streams: raw.nb_streams,
        tags: raw.tags.unwrap_or_default(),
    }
}

fn convert_stream(raw: RawStream) -> StreamRecord {
    StreamRecord {
        index: raw.index,
        // kinds outside video/audio/subtitle (data, attachment) stay None
        kind: raw.codec_type.as_deref().and_then(|t| t.parse().ok()),
        codec_name: raw.codec_name,
        codec_long_name: raw.codec_long_name,
        profile: raw.profile,
        width: raw.width,
        height: raw.height,
        pix_fmt: raw.pix_fmt,
        level: raw.level,
        r_frame_rate: raw.r_frame_rate,
        avg_frame_rate: raw.avg_frame_rate,
        sample_rate: raw.sample_rate.as_deref().and_then(parse_lenient),
        channels: raw.channels,
        channel_layout: raw.channel_layout,
        bit_rate: raw.bit_rate.as_deref().and_then(parse_lenient),
        duration: raw.duration.as_deref().and_then(parse_lenient),
        tags: raw.tags.unwrap_or_default(),
        disposition: raw.disposition.unwrap_or_default(),
    }
}

fn parse_lenient<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_find_common::StreamKind;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_long_name": "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10",
                "profile": "Main",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "pix_fmt": "yuv420p",
                "level": 40,
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "bit_rate": "4500000",
                "duration": "600.050000",
                "disposition": {"default": 1, "forced": 0},
                "tags": {"language": "und"}
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000",
                "channels": 2,
                "channel_layout": "stereo",
                "bit_rate": "not-a-number",
                "tags": {"language": "eng"}
            },
            {
                "index": 2,
                "codec_type": "data"
            }
        ],
        "format": {
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "format_long_name": "QuickTime / MOV",
            "nb_streams": 3,
            "duration": "600.084000",
            "size": "356378912",
            "bit_rate": "4750712",
            "tags": {"major_brand": "isom"}
        }
    }"#;

    #[test]
    fn test_parse_full_report() {
        let report = parse_report(SAMPLE).unwrap();

        assert_eq!(report.streams.len(), 3);
        let video = &report.streams[0];
        assert_eq!(video.kind, Some(StreamKind::Video));
        assert_eq!(video.codec_name.as_deref(), Some("h264"));
        assert_eq!(video.width, Some(1920));
        assert_eq!(video.bit_rate, Some(4_500_000));
        assert_eq!(video.disposition.get("default"), Some(&1));

        let audio = &report.streams[1];
        assert_eq!(audio.kind, Some(StreamKind::Audio));
        assert_eq!(audio.sample_rate, Some(48_000));
        assert_eq!(audio.tags.get("language").map(String::as_str), Some("eng"));

        assert_eq!(
            report.container.format_name.as_deref(),
            Some("mov,mp4,m4a,3gp,3g2,mj2")
        );
        assert_eq!(report.container.size, Some(356_378_912));
        assert!((report.container.duration.unwrap() - 600.084).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_codec_type_has_no_kind() {
        let report = parse_report(SAMPLE).unwrap();
        assert_eq!(report.streams[2].kind, None);
    }

    #[test]
    fn test_unparsable_numeric_becomes_absent() {
        let report = parse_report(SAMPLE).unwrap();
        assert_eq!(report.streams[1].bit_rate, None);
    }

    #[test]
    fn test_missing_sections() {
        let report = parse_report(r#"{"streams": []}"#).unwrap();
        assert!(report.streams.is_empty());
        assert_eq!(report.container.format_name, None);

        assert!(matches!(
            parse_report("not json"),
            Err(InspectError::Parse(_))
        ));
    }
}
