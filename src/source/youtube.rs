//! YouTube caption source.

use super::captions::caption_to_text;
use super::video_id::VideoIdExtractor;
use super::{FetchedTranscript, TranscriptSource};
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Caption formats we can convert, most preferred first.
const CAPTION_FORMATS: &[&str] = &["vtt", "srt"];

#[derive(Debug, Deserialize)]
struct CaptionFormat {
    #[serde(default)]
    ext: String,
    #[serde(default)]
    url: String,
}

/// The parts of `yt-dlp --dump-json` output we read.
#[derive(Debug, Default, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<CaptionFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

/// One downloadable caption track.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CaptionTrack {
    language: String,
    automatic: bool,
    url: String,
}

impl std::fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.automatic {
            write!(f, "{} (auto)", self.language)
        } else {
            write!(f, "{}", self.language)
        }
    }
}

fn pick_format(formats: &[CaptionFormat]) -> Option<&CaptionFormat> {
    CAPTION_FORMATS
        .iter()
        .find_map(|ext| formats.iter().find(|f| f.ext == *ext && !f.url.is_empty()))
}

/// Order tracks for download: preferred languages first (manual before automatic
/// for each), then every remaining manual track, then every remaining automatic one.
fn order_tracks(info: &VideoInfo, languages: &[String]) -> Vec<CaptionTrack> {
    let mut tracks = Vec::new();
    let mut seen: HashSet<(String, bool)> = HashSet::new();

    let mut push = |language: &str, automatic: bool, tracks: &mut Vec<CaptionTrack>| {
        let source = if automatic {
            &info.automatic_captions
        } else {
            &info.subtitles
        };
        let Some(format) = source.get(language).and_then(|f| pick_format(f)) else {
            return;
        };
        if seen.insert((language.to_string(), automatic)) {
            tracks.push(CaptionTrack {
                language: language.to_string(),
                automatic,
                url: format.url.clone(),
            });
        }
    };

    for language in languages {
        push(language.as_str(), false, &mut tracks);
        push(language.as_str(), true, &mut tracks);
    }
    for language in info.subtitles.keys() {
        push(language.as_str(), false, &mut tracks);
    }
    for language in info.automatic_captions.keys() {
        push(language.as_str(), true, &mut tracks);
    }

    tracks
}

/// Fetches YouTube captions through `yt-dlp`.
pub struct YoutubeCaptionSource {
    extractor: VideoIdExtractor,
    languages: Vec<String>,
    http: reqwest::Client,
}

impl YoutubeCaptionSource {
    /// Create a source preferring `languages`, in order.
    pub fn new(languages: Vec<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VidsageError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            extractor: VideoIdExtractor::new()?,
            languages,
            http,
        })
    }

    /// Video metadata and caption listings via yt-dlp.
    async fn fetch_info(&self, video_id: &str) -> Result<VideoInfo> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--skip-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidsageError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VidsageError::SourceUnavailable(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsageError::SourceUnavailable(format!(
                "Video {} not found or unavailable: {}",
                video_id,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            VidsageError::SourceUnavailable(format!("Failed to parse yt-dlp output: {}", e))
        })
    }

    async fn download_track(&self, track: &CaptionTrack) -> Result<String> {
        let body = self
            .http
            .get(&track.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(caption_to_text(&body))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptionSource {
    fn name(&self) -> &str {
        "youtube"
    }

    fn can_handle(&self, locator: &str) -> bool {
        self.extractor.extract(locator).is_some()
    }

    #[instrument(skip(self))]
    async fn fetch(&self, locator: &str) -> Result<FetchedTranscript> {
        let video_id = self.extractor.extract(locator).ok_or_else(|| {
            VidsageError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", locator))
        })?;

        let info = self.fetch_info(&video_id).await?;
        let tracks = order_tracks(&info, &self.languages);
        if tracks.is_empty() {
            return Err(VidsageError::NoContent(format!(
                "no captions available for {}",
                video_id
            )));
        }
        debug!("{} caption tracks available for {}", tracks.len(), video_id);

        let mut failures = Vec::new();
        for track in &tracks {
            match self.download_track(track).await {
                Ok(text) if !text.is_empty() => {
                    info!("Found {} captions ({} characters)", track, text.len());
                    return Ok(FetchedTranscript {
                        source_id: video_id,
                        text,
                        title: info.title,
                    });
                }
                Ok(_) => failures.push(format!("{}: empty captions", track)),
                Err(e) => {
                    warn!("Caption track {} failed: {}", track, e);
                    failures.push(format!("{}: {}", track, e));
                }
            }
        }

        Err(VidsageError::SourceUnavailable(format!(
            "could not extract captions for {} ({})",
            video_id,
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VideoInfo {
        serde_json::from_str(
            r#"{
                "id": "dQw4w9WgXcQ",
                "title": "Test video",
                "subtitles": {
                    "de": [{"ext": "vtt", "url": "https://x/de.vtt"}],
                    "en-GB": [
                        {"ext": "json3", "url": "https://x/en-GB.json3"},
                        {"ext": "srt", "url": "https://x/en-GB.srt"}
                    ]
                },
                "automatic_captions": {
                    "en": [
                        {"ext": "srv1", "url": "https://x/en.srv1"},
                        {"ext": "vtt", "url": "https://x/en.vtt"}
                    ],
                    "fr": [{"ext": "json3", "url": "https://x/fr.json3"}]
                }
            }"#,
        )
        .unwrap()
    }

    fn languages() -> Vec<String> {
        ["en", "a.en", "en-US", "en-GB"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_track_order() {
        let tracks = order_tracks(&info(), &languages());
        let order: Vec<String> = tracks.iter().map(|t| t.to_string()).collect();
        assert_eq!(order, vec!["en (auto)", "en-GB", "de"]);
        assert_eq!(tracks[0].url, "https://x/en.vtt");
        assert_eq!(tracks[1].url, "https://x/en-GB.srt");
    }

    #[test]
    fn test_no_captions() {
        let info: VideoInfo = serde_json::from_str(r#"{"title": "silent"}"#).unwrap();
        assert!(order_tracks(&info, &languages()).is_empty());
    }

    #[test]
    fn test_can_handle() {
        let source = YoutubeCaptionSource::new(languages()).unwrap();
        assert!(source.can_handle("dQw4w9WgXcQ"));
        assert!(source.can_handle("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!source.can_handle("/path/to/transcript.txt"));
    }

    #[tokio::test]
    async fn test_invalid_locator() {
        let source = YoutubeCaptionSource::new(languages()).unwrap();
        assert!(matches!(
            source.fetch("not a video").await,
            Err(VidsageError::InvalidInput(_))
        ));
    }
}
