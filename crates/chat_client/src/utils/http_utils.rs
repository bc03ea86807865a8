use std::error::Error;

use log::error;
use serde_json::Value;

/// Pull the server-provided message out of an error body (`{"error": "..."}`).
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

/// Message used when the server gave no usable body.
pub fn generic_status_message(status: u16) -> String {
    format!("Request failed with status code {}", status)
}

/// Log the details of a transport failure and return a user-facing message.
pub fn describe_transport_error(url: &str, err: &reqwest_middleware::Error) -> String {
    let error_msg = format!("Failed HTTP request to {}: {}", url, err);
    error!("{}", error_msg);

    if let reqwest_middleware::Error::Reqwest(e) = err {
        if let Some(source) = e.source() {
            error!("Error source: {:?}", source);
        }
        if e.is_timeout() {
            error!("Request timed out");
        }
        if e.is_connect() {
            error!("Connection error");
        }
        if e.is_body() {
            error!("Body error");
        }
    }

    error_msg
}
