/// Common types shared across the media-find workspace
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while inspecting a single media file.
///
/// These are expected, per-item failures: the scan treats any of them as
/// "this file does not match" and keeps going.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("ffprobe execution failed: {0}")]
    Ffprobe(String),

    #[error("failed to parse probe output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream kind discriminator, mirroring ffprobe's `codec_type`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

impl StreamKind {
    pub const ALL: [StreamKind; 3] = [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = UnknownStreamKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(StreamKind::Video),
            "audio" => Ok(StreamKind::Audio),
            "subtitle" => Ok(StreamKind::Subtitle),
            other => Err(UnknownStreamKind(other.to_string())),
        }
    }
}

/// Error for `codec_type` values outside the three matchable kinds
#[derive(Debug, Error)]
#[error("unknown stream kind: {0}")]
pub struct UnknownStreamKind(pub String);

/// A scalar or nested view of one observed record field.
///
/// Returned by [`Record::field`]; the matcher compares `Text` and `Number`
/// scalars and recurses into `Nested` records.
pub enum FieldRef<'a> {
    Text(&'a str),
    Number(f64),
    Nested(&'a dyn Record),
}

/// Field lookup by name over an observed record.
///
/// Observed records are a closed set of shapes (stream, container, and their
/// one-level nested tag/disposition maps); unknown field names yield `None`.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.get(name).map(|v| FieldRef::Text(v))
    }
}

impl Record for BTreeMap<String, i64> {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.get(name).map(|v| FieldRef::Number(*v as f64))
    }
}

/// Information about one media stream, as reported by ffprobe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    pub index: Option<u32>,
    /// Stream kind; `None` for kinds the query model does not match
    /// (data, attachment, ...)
    pub kind: Option<StreamKind>,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub profile: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub level: Option<i64>,
    pub r_frame_rate: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub channel_layout: Option<String>,
    pub bit_rate: Option<u64>,
    pub duration: Option<f64>,
    /// Stream-level tags (language, title, ...)
    pub tags: BTreeMap<String, String>,
    /// Disposition flags (default, forced, ...), 0 or 1 per flag
    pub disposition: BTreeMap<String, i64>,
}

impl Record for StreamRecord {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "index" => self.index.map(|v| FieldRef::Number(f64::from(v))),
            "codec_type" => self.kind.map(|k| FieldRef::Text(k.as_str())),
            "codec_name" => self.codec_name.as_deref().map(FieldRef::Text),
            "codec_long_name" => self.codec_long_name.as_deref().map(FieldRef::Text),
            "profile" => self.profile.as_deref().map(FieldRef::Text),
            "width" => self.width.map(|v| FieldRef::Number(f64::from(v))),
            "height" => self.height.map(|v| FieldRef::Number(f64::from(v))),
            "pix_fmt" => self.pix_fmt.as_deref().map(FieldRef::Text),
            "level" => self.level.map(|v| FieldRef::Number(v as f64)),
            "r_frame_rate" => self.r_frame_rate.as_deref().map(FieldRef::Text),
            "avg_frame_rate" => self.avg_frame_rate.as_deref().map(FieldRef::Text),
            "sample_rate" => self.sample_rate.map(|v| FieldRef::Number(f64::from(v))),
            "channels" => self.channels.map(|v| FieldRef::Number(f64::from(v))),
            "channel_layout" => self.channel_layout.as_deref().map(FieldRef::Text),
            "bit_rate" => self.bit_rate.map(|v| FieldRef::Number(v as f64)),
            "duration" => self.duration.map(FieldRef::Number),
            "tags" => Some(FieldRef::Nested(&self.tags)),
            "disposition" => Some(FieldRef::Nested(&self.disposition)),
            _ => None,
        }
    }
}

/// Container-level ("format") information for a media file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Format name (e.g. "matroska,webm")
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// File size in bytes
    pub size: Option<u64>,
    /// Overall bitrate in bits/second
    pub bit_rate: Option<u64>,
    pub nb_streams: Option<u32>,
    /// Format-level tags (title, encoder, creation_time, ...)
    pub tags: BTreeMap<String, String>,
}

impl Record for ContainerRecord {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "format_name" => self.format_name.as_deref().map(FieldRef::Text),
            "format_long_name" => self.format_long_name.as_deref().map(FieldRef::Text),
            "duration" => self.duration.map(FieldRef::Number),
            "size" => self.size.map(|v| FieldRef::Number(v as f64)),
            "bit_rate" => self.bit_rate.map(|v| FieldRef::Number(v as f64)),
            "nb_streams" => self.nb_streams.map(|v| FieldRef::Number(f64::from(v))),
            "tags" => Some(FieldRef::Nested(&self.tags)),
            _ => None,
        }
    }
}

/// Complete probe result for one media file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    pub container: ContainerRecord,
    pub streams: Vec<StreamRecord>,
}

impl ProbeReport {
    /// Iterate the streams of one kind
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &StreamRecord> {
        self.streams.iter().filter(move |s| s.kind == Some(kind))
    }
}
