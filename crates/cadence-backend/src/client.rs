//! The [`Backend`] trait and its HTTP implementation.
//!
//! The trait is object-safe so the engine can hold an `Arc<dyn Backend>`
//! and tests can substitute a scripted implementation.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::types::{
    AgentConfig, ConfigEnvelope, ExtractResponse, GenerateImageResponse, GenerateResponse,
    RegenerateContentResponse, RegenerateScriptResponse, RegenerateSubcontentResponse, TaskConfig,
};

/// Operation surface of the content-generation backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload a source document and extract per-week, per-day talking
    /// points. `days` is the configured posting-day list.
    async fn extract_content(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        weeks: u32,
        days: &[String],
    ) -> Result<ExtractResponse, BackendError>;

    /// Generate per-platform post drafts for the full schedule.
    /// `platform_posts` pairs each platform with its posts-per-day count.
    async fn generate_custom_scripts(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        weeks: u32,
        days: &[String],
        platform_posts: &[(String, u32)],
    ) -> Result<GenerateResponse, BackendError>;

    /// Regenerate one week's main idea from a seed text.
    async fn regenerate_content(
        &self,
        week_content: &str,
    ) -> Result<RegenerateContentResponse, BackendError>;

    /// Regenerate one day's sub-topic from a seed text.
    async fn regenerate_subcontent(
        &self,
        subcontent: &str,
    ) -> Result<RegenerateSubcontentResponse, BackendError>;

    /// Regenerate one slot's post text. `content` is the current text,
    /// `query` the operator's edit instruction.
    async fn regenerate_script(
        &self,
        content: &str,
        query: &str,
        platform: &str,
    ) -> Result<RegenerateScriptResponse, BackendError>;

    /// Generate a fresh image for one slot.
    async fn generate_image(
        &self,
        content: &str,
        query: &str,
    ) -> Result<GenerateImageResponse, BackendError>;

    /// Fetch the agent definition for a pipeline role
    /// (`GET /config/{name}_agent`).
    async fn agent_config(&self, name: &str)
    -> Result<ConfigEnvelope<AgentConfig>, BackendError>;

    /// Fetch the task definition for a pipeline role
    /// (`GET /config/{name}_task`).
    async fn task_config(&self, name: &str) -> Result<ConfigEnvelope<TaskConfig>, BackendError>;
}

/// `reqwest`-backed [`Backend`] implementation.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    client: Client,
}

impl HttpBackend {
    /// Build a client for the given backend.
    ///
    /// No request timeout is set unless the config carries one:
    /// generation calls legitimately run tens of seconds.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { config, client })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = self.config.endpoint(path);
        debug!(%url, %method, "backend request");
        let resp = self
            .client
            .request(method, &url)
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<T, BackendError> {
        let url = self.config.endpoint(path);
        debug!(%url, "backend multipart request");
        let resp = self
            .client
            .post(&url)
            .query(query)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn extract_content(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        weeks: u32,
        days: &[String],
    ) -> Result<ExtractResponse, BackendError> {
        let form = Form::new()
            .part("file", Part::bytes(file_bytes).file_name(file_name.to_owned()))
            .text("week", weeks.to_string())
            .text("days", days.join(","));
        self.send_multipart("extract_content", &[], form).await
    }

    async fn generate_custom_scripts(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        weeks: u32,
        days: &[String],
        platform_posts: &[(String, u32)],
    ) -> Result<GenerateResponse, BackendError> {
        let form =
            Form::new().part("file", Part::bytes(file_bytes).file_name(file_name.to_owned()));
        let query = [
            ("weeks", weeks.to_string()),
            ("days", days.join(",")),
            ("platform_posts", platform_posts_param(platform_posts)),
        ];
        self.send_multipart("generate_custom_scripts", &query, form)
            .await
    }

    async fn regenerate_content(
        &self,
        week_content: &str,
    ) -> Result<RegenerateContentResponse, BackendError> {
        let query = [
            ("week_content", decoded(week_content)),
            ("timestamp", timestamp_ms()),
        ];
        self.send_json(Method::POST, "regenerate_content", &query)
            .await
    }

    async fn regenerate_subcontent(
        &self,
        subcontent: &str,
    ) -> Result<RegenerateSubcontentResponse, BackendError> {
        let query = [
            ("subcontent", decoded(subcontent)),
            ("timestamp", timestamp_ms()),
        ];
        self.send_json(Method::POST, "regenerate_subcontent", &query)
            .await
    }

    async fn regenerate_script(
        &self,
        content: &str,
        query: &str,
        platform: &str,
    ) -> Result<RegenerateScriptResponse, BackendError> {
        let params = [
            ("content", decoded(content)),
            ("query", decoded(query)),
            ("platform", platform.to_owned()),
            ("timestamp", timestamp_ms()),
        ];
        self.send_json(Method::PUT, "regenerate_script", &params)
            .await
    }

    async fn generate_image(
        &self,
        content: &str,
        query: &str,
    ) -> Result<GenerateImageResponse, BackendError> {
        let params = [
            ("content", decoded(content)),
            ("query", decoded(query)),
            ("timestamp", timestamp_ms()),
        ];
        self.send_json(Method::POST, "generate_image", &params).await
    }

    async fn agent_config(
        &self,
        name: &str,
    ) -> Result<ConfigEnvelope<AgentConfig>, BackendError> {
        self.send_json(Method::GET, &format!("config/{name}_agent"), &[])
            .await
    }

    async fn task_config(&self, name: &str) -> Result<ConfigEnvelope<TaskConfig>, BackendError> {
        self.send_json(Method::GET, &format!("config/{name}_task"), &[])
            .await
    }
}

/// Percent-decode residue from earlier hops so the query serializer
/// encodes each value exactly once (`%2520` must never reach the wire).
fn decoded(value: &str) -> String {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_owned())
}

/// Wire format for the per-platform post counts: `"instagram:2,linkedin:1"`.
fn platform_posts_param(platform_posts: &[(String, u32)]) -> String {
    platform_posts
        .iter()
        .map(|(platform, count)| format!("{platform}:{count}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Cache-buster value carried by every regeneration call.
fn timestamp_ms() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_strips_one_encoding_layer() {
        assert_eq!(decoded("Hello%20world"), "Hello world");
        assert_eq!(decoded("plain text"), "plain text");
    }

    #[test]
    fn decoded_tolerates_stray_percent() {
        assert_eq!(decoded("100% organic"), "100% organic");
    }

    #[test]
    fn platform_posts_wire_format() {
        let posts = vec![("instagram".to_owned(), 2), ("linkedin".to_owned(), 1)];
        assert_eq!(platform_posts_param(&posts), "instagram:2,linkedin:1");
        assert_eq!(platform_posts_param(&[]), "");
    }
}
