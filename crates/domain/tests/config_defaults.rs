use std::path::PathBuf;

use wc_domain::config::{normalize_api_base, ProtocolMode, WidgetConfig};

#[test]
fn default_api_base_is_local_backend() {
    let config = WidgetConfig::default();
    assert_eq!(config.api_base, "http://localhost:8000");
}

#[test]
fn empty_document_parses_to_defaults() {
    let config = WidgetConfig::from_toml("").unwrap();
    assert_eq!(config.protocol_mode, ProtocolMode::Structured);
    assert_eq!(config.reconnect.delay_ms, 3000);
    assert_eq!(config.storage.key, "webchat-session-id");
    assert!(config.session_id.is_none());
}

#[test]
fn host_options_parse() {
    let toml_str = r#"
api_base = "https://assist.example.com/"
session_id = "visitor-7"
protocol_mode = "raw"

[reconnect]
delay_ms = 500
"#;
    let config = WidgetConfig::from_toml(toml_str).unwrap();
    assert_eq!(normalize_api_base(&config.api_base), "https://assist.example.com");
    assert_eq!(config.session_id.as_deref(), Some("visitor-7"));
    assert_eq!(config.protocol_mode, ProtocolMode::Raw);
    assert_eq!(config.reconnect.delay_ms, 500);
}

#[test]
fn unknown_protocol_mode_is_rejected() {
    assert!(WidgetConfig::from_toml(r#"protocol_mode = "xml""#).is_err());
}

#[test]
fn notices_can_be_partially_localized() {
    let toml_str = r#"
[notices]
connected = "Bağlantı kuruldu."
"#;
    let config = WidgetConfig::from_toml(toml_str).unwrap();
    assert_eq!(config.notices.connected, "Bağlantı kuruldu.");
    assert_eq!(config.notices.typing, "Assistant is typing...");
}

#[test]
fn explicit_storage_path_wins() {
    let toml_str = r#"
[storage]
path = "/tmp/wc/session"
"#;
    let config = WidgetConfig::from_toml(toml_str).unwrap();
    assert_eq!(config.storage.resolved_path(), PathBuf::from("/tmp/wc/session"));
}

#[test]
fn default_storage_path_ends_with_key() {
    let config = WidgetConfig::default();
    assert!(config.storage.resolved_path().ends_with("webchat/webchat-session-id"));
}

#[test]
fn protocol_mode_from_str_accepts_aliases() {
    assert_eq!("JSON".parse::<ProtocolMode>().unwrap(), ProtocolMode::Structured);
    assert_eq!("raw".parse::<ProtocolMode>().unwrap(), ProtocolMode::Raw);
    assert!("binary".parse::<ProtocolMode>().is_err());
}
