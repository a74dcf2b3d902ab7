use serde::Serialize;
use tauri::{
    http::{header, Request, Response, StatusCode},
    AppHandle, Emitter,
};
use url::Url;

use crate::{append_ipc_log, IPC_MESSAGE_EVENT, IPC_SCHEME};

/// WebView2 rewrites custom schemes to `http://<scheme>.localhost/`.
const WINDOWS_IPC_HOST: &str = "shellipc.localhost";
/// WebKit pages address custom schemes as `<scheme>://localhost/`.
const LOCAL_IPC_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct IpcMessage {
    pub(crate) command: String,
    pub(crate) payload: Option<String>,
}

fn decode_segment(segment: &str) -> Result<String, String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|error| format!("Invalid percent-encoding in ipc request: {error}"))
}

/// Accepts `shellipc://command/payload`, `shellipc://localhost/command/payload`,
/// `shellipc:command/payload` and the WebView2 form
/// `http://shellipc.localhost/command/payload`.
pub(crate) fn parse_ipc_uri(raw: &str) -> Result<IpcMessage, String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|error| format!("Invalid ipc request '{raw}': {error}"))?;

    let mut segments: Vec<&str> = parsed
        .path()
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let command = match (parsed.scheme(), parsed.host_str()) {
        (IPC_SCHEME, Some(host)) if !host.is_empty() && host != LOCAL_IPC_HOST => {
            host.to_string()
        }
        (IPC_SCHEME, _) | ("http" | "https", Some(WINDOWS_IPC_HOST)) => {
            if segments.is_empty() {
                return Err(format!("Missing ipc command in '{raw}'"));
            }
            segments.remove(0).to_string()
        }
        (scheme, _) => {
            return Err(format!("Unsupported ipc request scheme '{scheme}'"));
        }
    };

    let command = decode_segment(&command)?;
    if command.trim().is_empty() {
        return Err(format!("Missing ipc command in '{raw}'"));
    }

    let payload = if segments.is_empty() {
        None
    } else {
        Some(decode_segment(&segments.join("/"))?)
    };

    Ok(IpcMessage { command, payload })
}

/// Request bodies fill in the payload when the URL carries none.
pub(crate) fn message_from_request(uri: &str, body: &[u8]) -> Result<IpcMessage, String> {
    let mut message = parse_ipc_uri(uri)?;
    if message.payload.is_none() && !body.is_empty() {
        let text = String::from_utf8(body.to_vec())
            .map_err(|error| format!("ipc request body is not UTF-8: {error}"))?;
        message.payload = Some(text);
    }
    Ok(message)
}

fn build_response(status: StatusCode, body: Vec<u8>) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .unwrap_or_else(|_| Response::new(Vec::new()))
}

pub(crate) fn handle_ipc_request(
    app_handle: &AppHandle,
    request: &Request<Vec<u8>>,
) -> Response<Vec<u8>> {
    let uri = request.uri().to_string();
    match message_from_request(&uri, request.body()) {
        Ok(message) => {
            append_ipc_log(&format!(
                "received command '{}' ({} payload bytes)",
                message.command,
                message.payload.as_ref().map_or(0, String::len)
            ));
            if let Err(error) = app_handle.emit(IPC_MESSAGE_EVENT, &message) {
                append_ipc_log(&format!("failed to emit {IPC_MESSAGE_EVENT}: {error}"));
                return build_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error.to_string().into_bytes(),
                );
            }
            build_response(StatusCode::NO_CONTENT, Vec::new())
        }
        Err(error) => {
            append_ipc_log(&format!("rejected request: {error}"));
            build_response(StatusCode::BAD_REQUEST, error.into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(command: &str, payload: Option<&str>) -> IpcMessage {
        IpcMessage {
            command: command.to_string(),
            payload: payload.map(str::to_string),
        }
    }

    #[test]
    fn parse_ipc_uri_reads_host_as_command() {
        assert_eq!(
            parse_ipc_uri("shellipc://notify/hello%20world"),
            Ok(message("notify", Some("hello world")))
        );
        assert_eq!(parse_ipc_uri("shellipc://quit"), Ok(message("quit", None)));
    }

    #[test]
    fn parse_ipc_uri_accepts_opaque_and_webview2_forms() {
        assert_eq!(
            parse_ipc_uri("shellipc:open/docs/index.html"),
            Ok(message("open", Some("docs/index.html")))
        );
        assert_eq!(
            parse_ipc_uri("http://shellipc.localhost/notify/%7B%22a%22%3A1%7D"),
            Ok(message("notify", Some("{\"a\":1}")))
        );
        assert_eq!(
            parse_ipc_uri("shellipc://localhost/notify/hello%20world"),
            Ok(message("notify", Some("hello world")))
        );
        assert_eq!(
            parse_ipc_uri("shellipc://localhost/quit"),
            Ok(message("quit", None))
        );
        assert!(parse_ipc_uri("shellipc://localhost/").is_err());
    }

    #[test]
    fn parse_ipc_uri_rejects_foreign_or_empty_requests() {
        assert!(parse_ipc_uri("https://example.com/notify").is_err());
        assert!(parse_ipc_uri("shellipc:").is_err());
        assert!(parse_ipc_uri("not a url").is_err());
    }

    #[test]
    fn message_from_request_uses_body_when_url_has_no_payload() {
        assert_eq!(
            message_from_request("shellipc://save", b"{\"title\":\"draft\"}"),
            Ok(message("save", Some("{\"title\":\"draft\"}")))
        );
        assert_eq!(
            message_from_request("shellipc://save/inline", b"ignored"),
            Ok(message("save", Some("inline")))
        );
        assert!(message_from_request("shellipc://save", &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn bundled_pages_can_subscribe_to_ipc_messages() {
        let config: serde_json::Value = serde_json::from_str(include_str!("../tauri.conf.json"))
            .expect("parse tauri.conf.json");
        assert_eq!(config["app"]["withGlobalTauri"], serde_json::Value::Bool(true));

        let page = include_str!("../../dist/index.html");
        assert!(page.contains(&format!("event.listen(\"{IPC_MESSAGE_EVENT}\"")));
    }

    #[test]
    fn build_response_sets_status_and_cors_header() {
        let response = build_response(StatusCode::NO_CONTENT, Vec::new());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }
}
