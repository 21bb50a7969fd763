//! The script's JSON reply envelope.

use serde::Deserialize;

use birthcard_render_engine::export::StorageError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Vec<serde_json::Value>>>,
}

/// Parse a reply body. `success: false` becomes a rejection carrying the
/// script's message, or `default_error` when it sent none.
pub fn parse_reply(body: &str, default_error: &str) -> Result<ScriptReply, StorageError> {
    let reply: ScriptReply = serde_json::from_str(body)
        .map_err(|e| StorageError::Transport(format!("malformed reply: {e}")))?;

    if reply.success {
        return Ok(reply);
    }
    let message = reply
        .error
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_error.to_string());
    Err(StorageError::Rejected(message))
}
