//! Resumable video upload and playlist insertion.
//!
//! The upload is a chunked transfer: a session-init request yields an upload
//! URL, then chunks are PUT with `Content-Range` headers until the API
//! returns a final response. 308 responses acknowledge received bytes and
//! drive the progress log.

use crate::config::UploadSettings;
use crate::error::{RasiError, Result};
use crate::metadata::UploadMetadata;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

const UPLOAD_INIT_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";
const PLAYLIST_ITEMS_URL: &str =
    "https://www.googleapis.com/youtube/v3/playlistItems?part=snippet";

/// Uploads rendered videos with a bearer token.
pub struct YouTubeUploader {
    client: reqwest::Client,
    access_token: String,
    settings: UploadSettings,
}

impl YouTubeUploader {
    pub fn new(access_token: String, settings: UploadSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            settings,
        }
    }

    /// Upload a video file in resumable chunks. Returns the new video id.
    pub async fn upload(&self, video_path: &Path, metadata: &UploadMetadata) -> Result<String> {
        info!("Uploading video with title: {}", metadata.title);

        let video_bytes = tokio::fs::read(video_path).await?;
        let total = video_bytes.len() as u64;

        let upload_url = self.init_session(metadata, total).await?;
        info!("Resumable upload session opened ({} bytes to send)", total);

        let chunk_size = self.settings.chunk_size.max(256 * 1024) as u64;
        let mut offset: u64 = 0;

        loop {
            let end = (offset + chunk_size).min(total);
            let chunk = video_bytes[offset as usize..end as usize].to_vec();

            let response = self
                .client
                .put(&upload_url)
                .bearer_auth(&self.access_token)
                .header(
                    reqwest::header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", offset, end - 1, total),
                )
                .body(chunk)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == 308 {
                // Partial response: the Range header tells us how far we got.
                offset = response
                    .headers()
                    .get(reqwest::header::RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_range_end)
                    .map(|last| last + 1)
                    .unwrap_or(end);
                info!("Upload progress: {}%", progress_percent(offset, total));
                continue;
            }

            if status.is_success() {
                let body: serde_json::Value = response.json().await?;
                let video_id = body["id"]
                    .as_str()
                    .ok_or_else(|| {
                        RasiError::Upload("upload response missing video id".to_string())
                    })?
                    .to_string();
                info!("Video uploaded successfully with ID: {}", video_id);
                return Ok(video_id);
            }

            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::Upload(format!(
                "upload chunk rejected ({}): {}",
                status, detail
            )));
        }
    }

    /// Open a resumable upload session; returns the session URL.
    async fn init_session(&self, metadata: &UploadMetadata, total: u64) -> Result<String> {
        let body = json!({
            "snippet": {
                "categoryId": self.settings.category_id,
                "title": metadata.title,
                "description": metadata.description,
                "tags": metadata.tags,
            },
            "status": {
                "privacyStatus": self.settings.privacy_status,
                "selfDeclaredMadeForKids": false,
            },
        });

        let response = self
            .client
            .post(UPLOAD_INIT_URL)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", total.to_string())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::Upload(format!(
                "session init rejected ({}): {}",
                status, detail
            )));
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| RasiError::Upload("no upload URL in session response".to_string()))
    }

    /// Add an uploaded video to the configured playlist.
    ///
    /// Failures here are reported to the caller, who logs them as warnings;
    /// a playlist miss never fails the run.
    pub async fn add_to_playlist(&self, video_id: &str) -> Result<()> {
        info!("Adding video to playlist {}", self.settings.playlist_id);

        let body = json!({
            "snippet": {
                "playlistId": self.settings.playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id,
                },
            },
        });

        let response = self
            .client
            .post(PLAYLIST_ITEMS_URL)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::Upload(format!(
                "playlist insert rejected ({}): {}",
                status, detail
            )));
        }

        info!(
            "Video added to playlist: https://www.youtube.com/playlist?list={}",
            self.settings.playlist_id
        );
        Ok(())
    }

    /// Upload and then best-effort add to the playlist.
    pub async fn upload_and_catalog(
        &self,
        video_path: &Path,
        metadata: &UploadMetadata,
    ) -> Result<String> {
        let video_id = self.upload(video_path, metadata).await?;

        if let Err(e) = self.add_to_playlist(&video_id).await {
            warn!("Could not add video to playlist: {}", e);
        }

        Ok(video_id)
    }
}

/// Parse the last acknowledged byte out of a 308 `Range: bytes=0-N` header.
fn parse_range_end(header: &str) -> Option<u64> {
    header
        .trim()
        .strip_prefix("bytes=")?
        .split('-')
        .nth(1)?
        .parse()
        .ok()
}

/// Integer upload percentage.
fn progress_percent(sent: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    sent * 100 / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_end() {
        assert_eq!(parse_range_end("bytes=0-8388607"), Some(8_388_607));
        assert_eq!(parse_range_end("bytes=0-0"), Some(0));
    }

    #[test]
    fn test_parse_range_end_malformed() {
        assert_eq!(parse_range_end("0-100"), None);
        assert_eq!(parse_range_end("bytes=oops"), None);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 200), 0);
        assert_eq!(progress_percent(100, 200), 50);
        assert_eq!(progress_percent(200, 200), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
