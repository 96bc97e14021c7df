//! Blocking HTTP client for the MOJi cloud functions and REST API.

use super::response::{
    classify_http_failure, ensure_success, parse_content_page, parse_folders, parse_item_targets,
    parse_word_detail, unwrap_cloud_result,
};
use super::{
    CollectionClient, Credentials, FolderDirectory, ItemTarget, Page, WordDetail, WordLookup,
};
use crate::domain::{ClientConfig, Folder, Partition};
use crate::error::ExportError;
use serde_json::{Map, Value};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

const FETCH_CONTENT_FUNCTION: &str = "folder-fetchContentWithRelatives";
const FETCH_FOLDERS_FUNCTION: &str = "fetchMyFolders";

const ORIGIN: &str = "https://www.mojidict.com";
const REFERER: &str = "https://www.mojidict.com/collection";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const G_OS: &str = "PCWeb";

pub struct MojiClient {
    agent: Agent,
    credentials: Credentials,
    config: ClientConfig,
}

impl MojiClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, credentials, config }
    }

    /// Call a Parse cloud function and return its unwrapped, successful payload.
    pub fn call_function(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, ExportError> {
        let url = format!("{}/functions/{}", self.config.parse_server.trim_end_matches('/'), name);
        let body = serde_json::to_string(&Value::Object(self.function_body(params)))
            .map_err(|err| ExportError::transport(format!("{name}: failed encoding request: {err}")))?;

        let raw = self.send_with_retry(name, || {
            let mut request = self.agent.post(&url);
            for (key, value) in self.function_headers() {
                request = request.header(key, value);
            }
            request.send(body.as_bytes())
        })?;

        let resp: Value = serde_json::from_str(&raw).map_err(|_| {
            ExportError::transport(format!("{name}: non-JSON response: {}", truncate(&raw)))
        })?;
        let payload = unwrap_cloud_result(resp, name)?;
        ensure_success(&payload, name)?;
        Ok(payload)
    }

    /// Folders that contain `item_id` (the item may be a word id).
    pub fn item_targets(&self, item_id: &str) -> Result<Vec<ItemTarget>, ExportError> {
        let resp = self.get_rest(&targets_path(item_id), &[])?;
        Ok(parse_item_targets(&resp))
    }

    /// Raw targets response, for display.
    pub fn item_targets_raw(&self, item_id: &str) -> Result<Value, ExportError> {
        self.get_rest(&targets_path(item_id), &[])
    }

    fn get_rest(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ExportError> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        let raw = self.send_with_retry(path, || {
            let mut request = self.agent.get(&url);
            for (key, value) in query {
                request = request.query(*key, *value);
            }
            for (key, value) in self.rest_headers() {
                request = request.header(key, value);
            }
            request.call()
        })?;
        serde_json::from_str(&raw)
            .map_err(|_| ExportError::transport(format!("{path}: non-JSON response: {}", truncate(&raw))))
    }

    /// Send a request, retrying HTTP 403 (edge/WAF rejections) with linear back-off.
    fn send_with_retry<F>(&self, label: &str, send: F) -> Result<String, ExportError>
    where
        F: Fn() -> Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    {
        let mut attempt = 0u32;
        loop {
            let mut response = send()
                .map_err(|err| ExportError::transport(format!("{label}: request failed: {err}")))?;
            let status = response.status().as_u16();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|err| ExportError::transport(format!("{label}: failed reading body: {err}")))?;

            if (200..300).contains(&status) {
                return Ok(body);
            }
            if status == 403 && attempt < self.config.forbidden_retries {
                attempt += 1;
                warn!("{label}: HTTP 403, retrying ({attempt}/{})", self.config.forbidden_retries);
                thread::sleep(Duration::from_millis(self.config.forbidden_backoff_ms) * attempt);
                continue;
            }
            return Err(classify_http_failure(status, &body));
        }
    }

    fn function_body(&self, params: Map<String, Value>) -> Map<String, Value> {
        let mut body = params;
        let defaults = [
            ("_SessionToken", Some(self.credentials.session_token.as_str())),
            ("_ApplicationId", Some(self.config.parse_app_id.as_str())),
            ("_ClientVersion", Some(self.config.client_version.as_str())),
            ("g_os", Some(G_OS)),
            ("_InstallationId", self.credentials.installation_id.as_deref()),
        ];
        for (key, value) in defaults {
            if let Some(value) = value {
                body.entry(key).or_insert_with(|| Value::String(value.to_string()));
            }
        }
        body
    }

    fn function_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept", "*/*".to_string()),
            ("Accept-Language", "ja,en-US;q=0.9,en;q=0.8".to_string()),
            ("Content-Type", "application/json".to_string()),
            ("Origin", ORIGIN.to_string()),
            ("Referer", REFERER.to_string()),
            ("User-Agent", USER_AGENT.to_string()),
            ("X-Parse-Application-Id", self.config.parse_app_id.clone()),
            ("X-Parse-Client-Version", self.config.client_version.clone()),
            ("X-Parse-Session-Token", self.credentials.session_token.clone()),
        ];
        if let Some(installation_id) = &self.credentials.installation_id {
            headers.push(("X-Parse-Installation-Id", installation_id.clone()));
        }
        headers.extend(self.moji_headers());
        headers
    }

    fn rest_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept", "application/json".to_string()),
            ("Origin", ORIGIN.to_string()),
            ("Referer", format!("{ORIGIN}/")),
            ("User-Agent", USER_AGENT.to_string()),
        ];
        headers.extend(self.moji_headers());
        headers
    }

    fn moji_headers(&self) -> Vec<(&'static str, String)> {
        let token = &self.credentials.session_token;
        let mut headers = vec![
            ("X-MOJI-OS", G_OS.to_string()),
            ("X-MOJI-APP-VERSION", self.config.app_version.clone()),
            ("X-MOJI-APP-ID", self.config.app_id.clone()),
            ("X-MOJI-TOKEN", token.clone()),
            ("X-MOJI-SESSION-ID", token.clone()),
        ];
        if let Some(device_id) = &self.credentials.device_id {
            headers.push(("X-MOJI-DEVICE-ID", device_id.clone()));
        }
        headers
    }
}

impl CollectionClient for MojiClient {
    fn fetch_page(
        &self,
        partition: &Partition,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page, ExportError> {
        let mut params = Map::new();
        params.insert("fid".to_string(), Value::from(partition.folder.id.clone()));
        params.insert("sortType".to_string(), Value::from(partition.sort_order.0));
        params.insert("pageIndex".to_string(), Value::from(page_index));
        params.insert("count".to_string(), Value::from(page_size));
        // Without an explicit list the server falls back to sentence-like items only.
        params.insert(
            "targetTypes".to_string(),
            Value::Array(partition.target_types.iter().map(|t| Value::from(t.0)).collect()),
        );

        debug!("fetching {partition} page {page_index} (count {page_size})");
        let payload = self.call_function(FETCH_CONTENT_FUNCTION, params)?;
        Ok(parse_content_page(&payload))
    }
}

impl FolderDirectory for MojiClient {
    fn list_folders(&self, root_folder_id: Option<&str>) -> Result<Vec<Folder>, ExportError> {
        let mut params = Map::new();
        if let Some(root) = root_folder_id {
            params.insert("pfid".to_string(), Value::from(root));
        }
        let folders = parse_folders(&self.call_function(FETCH_FOLDERS_FUNCTION, params)?)?;
        if !folders.is_empty() || root_folder_id.is_none() {
            return Ok(folders);
        }

        // Some accounts list nothing under the root; the unrooted call still finds them.
        debug!("no folders under root, retrying {FETCH_FOLDERS_FUNCTION} without pfid");
        match self.call_function(FETCH_FOLDERS_FUNCTION, Map::new()) {
            Ok(payload) => Ok(parse_folders(&payload).unwrap_or_default()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("unrooted folder listing failed: {err}");
                Ok(folders)
            }
        }
    }
}

impl WordLookup for MojiClient {
    fn word_detail(&self, word_id: &str) -> Result<Option<WordDetail>, ExportError> {
        let resp = self.get_rest("/api/v1/word/detailInfo", &[("wordId", word_id)])?;
        Ok(parse_word_detail(&resp))
    }
}

fn targets_path(item_id: &str) -> String {
    format!("/api/v1/folder/items/{}/targets", urlencoding::encode(item_id))
}

fn truncate(raw: &str) -> String {
    raw.chars().take(500).collect()
}
