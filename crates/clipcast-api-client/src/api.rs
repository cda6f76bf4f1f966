//! Video record methods for the metadata API client.
//!
//! Request and response shapes come from `clipcast_core::models`. The
//! [`VideoApi`] impl at the bottom is what the upload pipeline calls.

use crate::{ApiClient, API_PREFIX};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clipcast_core::models::{
    CreateVideoRequest, Quota, UpdateVideoRequest, UploadTicket, VideoStatus,
};
use clipcast_core::VideoApi;

fn video_path(video_id: &str) -> String {
    format!("{}/videos/{}", API_PREFIX, urlencoding::encode(video_id))
}

impl ApiClient {
    /// Create the record for a captured recording. `Ok(None)` means the server returned `null`.
    pub async fn create_recording_video(
        &self,
        request: &CreateVideoRequest,
    ) -> Result<Option<UploadTicket>> {
        self.post_json(&format!("{}/videos", API_PREFIX), request)
            .await
            .context("Create video request failed")
    }

    /// Create the record for a user-selected file. Webcam streams are not accepted here.
    pub async fn create_file_video(
        &self,
        request: &CreateVideoRequest,
    ) -> Result<Option<UploadTicket>> {
        let request = CreateVideoRequest {
            webcam_file_size: None,
            ..request.clone()
        };
        self.post_json(&format!("{}/videos/upload", API_PREFIX), &request)
            .await
            .context("Create upload request failed")
    }

    /// Flip the record to `ready` once its bytes are in storage.
    pub async fn mark_video_ready(&self, video_id: &str) -> Result<()> {
        self.patch_json(
            &video_path(video_id),
            &UpdateVideoRequest::Status {
                status: VideoStatus::Ready,
            },
        )
        .await
        .with_context(|| format!("Failed to finalize video {}", video_id))
    }

    pub async fn update_video_title(&self, video_id: &str, title: &str) -> Result<()> {
        self.patch_json(
            &video_path(video_id),
            &UpdateVideoRequest::Title {
                title: title.to_string(),
            },
        )
        .await
        .with_context(|| format!("Failed to rename video {}", video_id))
    }

    pub async fn delete_video_record(&self, video_id: &str) -> Result<()> {
        self.delete(&video_path(video_id))
            .await
            .with_context(|| format!("Failed to delete video {}", video_id))
    }

    /// Current monthly usage snapshot.
    pub async fn get_video_limits(&self) -> Result<Quota> {
        self.get(&format!("{}/videos/limits", API_PREFIX), &[])
            .await
            .context("Failed to fetch video limits")
    }
}

#[async_trait]
impl VideoApi for ApiClient {
    async fn create_recording(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>> {
        self.create_recording_video(request).await
    }

    async fn create_upload(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>> {
        self.create_file_video(request).await
    }

    async fn finalize_video(&self, video_id: &str) -> Result<()> {
        self.mark_video_ready(video_id).await
    }

    async fn rename_video(&self, video_id: &str, title: &str) -> Result<()> {
        self.update_video_title(video_id, title).await
    }

    async fn delete_video(&self, video_id: &str) -> Result<()> {
        self.delete_video_record(video_id).await
    }

    async fn get_limits(&self) -> Result<Quota> {
        self.get_video_limits().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Auth;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn client(url: String) -> ApiClient {
        ApiClient::new(url, Auth::XApiKey("test-key".to_string()), Duration::from_secs(5)).unwrap()
    }

    fn request(webcam: Option<u64>) -> CreateVideoRequest {
        CreateVideoRequest {
            title: "Demo".to_string(),
            file_size: 1024,
            content_type: "video/webm".to_string(),
            webcam_file_size: webcam,
        }
    }

    #[tokio::test]
    async fn create_recording_posts_body_and_parses_ticket() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/videos")
            .match_header("x-api-key", "test-key")
            .match_body(Matcher::Json(json!({
                "title": "Demo",
                "fileSize": 1024,
                "contentType": "video/webm",
                "webcamFileSize": 256
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "vid_1",
                    "uploadUrl": "https://storage.example/screen",
                    "shareToken": "tok",
                    "webcamUploadUrl": "https://storage.example/cam"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let ticket = client(server.url())
            .create_recording(&request(Some(256)))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.video_id, "vid_1");
        assert_eq!(ticket.share_token, "tok");
        assert_eq!(
            ticket.webcam_upload_url.as_deref(),
            Some("https://storage.example/cam")
        );
    }

    #[tokio::test]
    async fn create_recording_null_body_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/videos")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .create_async()
            .await;

        let ticket = client(server.url())
            .create_recording(&request(None))
            .await
            .unwrap();
        assert!(ticket.is_none());
    }

    #[tokio::test]
    async fn create_upload_uses_upload_endpoint_without_webcam() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/videos/upload")
            .match_body(Matcher::Json(json!({
                "title": "Demo",
                "fileSize": 1024,
                "contentType": "video/webm"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"vid_2","uploadUrl":"https://storage.example/f","shareToken":"t2"}"#)
            .create_async()
            .await;

        let ticket = client(server.url())
            .create_upload(&request(Some(99)))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.video_id, "vid_2");
        assert!(ticket.webcam_upload_url.is_none());
    }

    #[tokio::test]
    async fn create_surfaces_server_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/videos")
            .with_status(403)
            .with_body("Monthly video limit reached")
            .create_async()
            .await;

        let err = client(server.url())
            .create_recording(&request(None))
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("403"));
        assert!(message.contains("Monthly video limit reached"));
    }

    #[tokio::test]
    async fn finalize_patches_ready_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/videos/vid_1")
            .match_body(Matcher::Json(json!({"status": "ready"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(server.url()).finalize_video("vid_1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rename_patches_title() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/videos/vid_1")
            .match_body(Matcher::Json(json!({"title": "Quarterly demo"})))
            .with_status(204)
            .create_async()
            .await;

        client(server.url())
            .rename_video("vid_1", "Quarterly demo")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_uses_bearer_auth_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/videos/vid_9")
            .match_header("authorization", "Bearer jwt-token")
            .with_status(204)
            .create_async()
            .await;

        let api = ApiClient::new(
            server.url(),
            Auth::Bearer("jwt-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        api.delete_video("vid_9").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/videos/vid_9")
            .with_status(500)
            .create_async()
            .await;

        assert!(client(server.url()).delete_video("vid_9").await.is_err());
    }

    #[tokio::test]
    async fn limits_parses_quota() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/videos/limits")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"maxVideosPerMonth":25,"maxVideoDurationSeconds":600,"videosUsedThisMonth":25}"#,
            )
            .create_async()
            .await;

        let quota = client(server.url()).get_limits().await.unwrap();
        assert_eq!(quota.max_videos_per_month, 25);
        assert_eq!(quota.videos_used_this_month, 25);
        assert_eq!(quota.max_duration_seconds, 600);
    }

    #[test]
    fn video_path_encodes_id() {
        assert_eq!(video_path("a/b"), "/api/videos/a%2Fb");
    }
}
