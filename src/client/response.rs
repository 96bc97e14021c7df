//! Normalization of remote responses into canonical shapes.
//!
//! Cloud functions answer `{"result": {...}}`, sometimes `{"result": [...]}` and
//! sometimes `{"result": null}`; failures come back as `{"code": .., "error": ..}`.

use super::{ItemTarget, Page, WordDetail};
use crate::domain::item::scalar_string;
use crate::domain::{Folder, RawItem};
use crate::error::ExportError;
use serde_json::{Map, Value};

/// Parse error code for a rejected or expired session token.
pub const INVALID_SESSION_TOKEN: i64 = 209;

const BODY_EXCERPT_CHARS: usize = 500;

/// Unwrap a cloud function envelope into the object payload it carries.
pub fn unwrap_cloud_result(resp: Value, function: &str) -> Result<Map<String, Value>, ExportError> {
    let Value::Object(mut envelope) = resp else {
        return Err(ExportError::transport(format!("{function}: unexpected response type")));
    };

    match envelope.remove("result") {
        Some(Value::Object(payload)) => Ok(payload),
        Some(Value::Array(list)) => {
            let mut payload = Map::new();
            payload.insert("code".to_string(), Value::from(200));
            payload.insert("result".to_string(), Value::Array(list));
            Ok(payload)
        }
        Some(Value::Null) | None => {
            if response_code(&envelope) == Some(INVALID_SESSION_TOKEN) {
                return Err(ExportError::Auth(error_message(&envelope)));
            }
            Err(ExportError::transport(format!("{function}: server returned a null result")))
        }
        Some(other) => {
            Err(ExportError::transport(format!("{function}: unexpected result shape: {other}")))
        }
    }
}

/// Require `code == 200` on an unwrapped payload.
pub fn ensure_success(payload: &Map<String, Value>, function: &str) -> Result<(), ExportError> {
    match response_code(payload) {
        Some(200) => Ok(()),
        Some(INVALID_SESSION_TOKEN) => Err(ExportError::Auth(error_message(payload))),
        code => Err(ExportError::transport(format!(
            "{function} failed: code {} {}",
            code.map(|c| c.to_string()).unwrap_or_else(|| "missing".to_string()),
            error_message(payload)
        ))),
    }
}

/// Build a [`Page`] from a `folder-fetchContentWithRelatives` payload.
pub fn parse_content_page(payload: &Map<String, Value>) -> Page {
    let items = payload
        .get("result")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter(|v| v.is_object()).cloned().map(RawItem).collect())
        .unwrap_or_default();
    let reported_page_count = payload.get("totalPage").and_then(as_page_count);
    Page { items, reported_page_count }
}

/// Folders from a `fetchMyFolders` payload. Entries without an id are dropped.
pub fn parse_folders(payload: &Map<String, Value>) -> Result<Vec<Folder>, ExportError> {
    let list = payload
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| ExportError::transport("fetchMyFolders: unexpected folders shape"))?;

    Ok(list
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|folder| {
            let id = ["targetId", "objectId", "id"]
                .iter()
                .filter_map(|field| folder.get(*field).and_then(scalar_string))
                .find(|id| !id.is_empty())?;
            let title = ["title", "name"]
                .iter()
                .filter_map(|field| folder.get(*field).and_then(scalar_string))
                .find(|t| !t.is_empty())
                .unwrap_or_default();
            Some(Folder { id, title })
        })
        .collect())
}

/// The `word` object of a `word/detailInfo` response.
pub fn parse_word_detail(resp: &Value) -> Option<WordDetail> {
    let word = resp.get("word")?.as_object()?;
    let field = |name: &str| word.get(name).and_then(scalar_string).unwrap_or_default();
    Some(WordDetail {
        spell: field("spell"),
        pron: field("pron"),
        accent: field("accent"),
        excerpt: field("excerpt"),
    })
}

/// Entries of a `folder/items/<id>/targets` response.
pub fn parse_item_targets(resp: &Value) -> Vec<ItemTarget> {
    resp.get("list")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|entry| {
                    let parent = entry.get("parentFolderId").and_then(scalar_string)?;
                    (!parent.is_empty())
                        .then(|| ItemTarget { parent_folder_id: parent, raw: entry.clone() })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Map a non-success HTTP response to an error.
pub fn classify_http_failure(status: u16, body: &str) -> ExportError {
    let parsed: Option<Map<String, Value>> = serde_json::from_str(body).ok();
    let auth_code = parsed.as_ref().and_then(response_code) == Some(INVALID_SESSION_TOKEN);
    if status == 401 || auth_code {
        let message = parsed.as_ref().map(error_message).unwrap_or_else(|| excerpt(body));
        return ExportError::Auth(message);
    }
    ExportError::http(status, excerpt(body))
}

fn response_code(map: &Map<String, Value>) -> Option<i64> {
    match map.get("code")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn error_message(map: &Map<String, Value>) -> String {
    ["error", "message", "msg"]
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .next()
        .unwrap_or("no message")
        .to_string()
}

fn as_page_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_result_is_returned_as_is() {
        let payload = unwrap_cloud_result(json!({"result": {"code": 200, "totalPage": 3}}), "f").unwrap();
        assert_eq!(payload.get("totalPage"), Some(&json!(3)));
        assert!(ensure_success(&payload, "f").is_ok());
    }

    #[test]
    fn bare_list_result_is_wrapped_as_success() {
        let payload = unwrap_cloud_result(json!({"result": [{"title": "a"}]}), "fetchMyFolders").unwrap();
        assert_eq!(payload.get("code"), Some(&json!(200)));
        assert_eq!(payload["result"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn null_result_is_a_transport_error() {
        let err = unwrap_cloud_result(json!({"result": null}), "f").unwrap_err();
        assert!(matches!(err, ExportError::Transport { .. }));
        assert!(unwrap_cloud_result(json!([1, 2]), "f").is_err());
    }

    #[test]
    fn invalid_session_code_is_an_auth_error() {
        let err = unwrap_cloud_result(json!({"code": 209, "error": "Invalid session token"}), "f")
            .unwrap_err();
        assert!(matches!(err, ExportError::Auth(ref m) if m == "Invalid session token"));

        let payload = unwrap_cloud_result(json!({"result": {"code": "209", "message": "expired"}}), "f").unwrap();
        assert!(matches!(ensure_success(&payload, "f"), Err(ExportError::Auth(_))));
    }

    #[test]
    fn non_200_code_is_a_transport_error() {
        let payload = unwrap_cloud_result(json!({"result": {"code": 500, "message": "boom"}}), "fetch").unwrap();
        let err = ensure_success(&payload, "fetch").unwrap_err();
        assert!(err.to_string().contains("fetch failed: code 500 boom"));
    }

    #[test]
    fn content_page_keeps_object_items_and_page_count() {
        let payload = unwrap_cloud_result(
            json!({"result": {"code": 200, "totalPage": "4", "result": [
                {"targetType": 102, "target": {"objectId": "a"}},
                "junk",
                null
            ]}}),
            "f",
        )
        .unwrap();
        let page = parse_content_page(&payload);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.reported_page_count, Some(4));
    }

    #[test]
    fn content_page_tolerates_missing_fields() {
        let page = parse_content_page(&Map::new());
        assert!(page.items.is_empty());
        assert_eq!(page.reported_page_count, None);
    }

    #[test]
    fn folders_use_target_id_then_object_id() {
        let payload = unwrap_cloud_result(
            json!({"result": [
                {"targetId": "t1", "title": "例文"},
                {"objectId": "o2", "name": "Words"},
                {"title": "no id"}
            ]}),
            "fetchMyFolders",
        )
        .unwrap();
        let folders = parse_folders(&payload).unwrap();
        assert_eq!(folders, vec![Folder::new("t1", "例文"), Folder::new("o2", "Words")]);
    }

    #[test]
    fn http_failures_are_classified() {
        assert!(matches!(classify_http_failure(401, "nope"), ExportError::Auth(_)));
        assert!(matches!(
            classify_http_failure(400, r#"{"code":209,"error":"Invalid session token"}"#),
            ExportError::Auth(_)
        ));
        assert!(matches!(
            classify_http_failure(502, "<html>bad gateway</html>"),
            ExportError::Transport { status: Some(502), .. }
        ));
    }

    #[test]
    fn word_detail_and_targets_are_extracted() {
        let detail = parse_word_detail(&json!({"word": {"spell": "猫", "pron": "ねこ", "accent": "①"}})).unwrap();
        assert_eq!(detail.spell, "猫");
        assert_eq!(detail.excerpt, "");
        assert!(parse_word_detail(&json!({"code": 404})).is_none());

        let targets = parse_item_targets(&json!({"list": [{"parentFolderId": "f1"}, {"other": 1}]}));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].parent_folder_id, "f1");
    }
}
