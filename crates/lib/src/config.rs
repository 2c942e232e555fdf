//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.forwarder/config.json`) and environment.
//! Environment values win over the file so the same binary runs on Lambda, LocalStack, and a laptop.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Target stream and client settings.
    #[serde(default)]
    pub kinesis: KinesisConfig,

    /// Local HTTP gateway settings and response policy.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Kinesis stream name, region, endpoint, and optional static credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisConfig {
    /// Stream every forwarded record is written to. Overridden by FORWARDER_STREAM_NAME env.
    #[serde(default = "default_stream_name")]
    pub stream_name: String,

    /// Signing region (default "us-east-1").
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint (e.g. LocalStack). Overridden by FORWARDER_KINESIS_ENDPOINT or LOCALSTACK_HOSTNAME env.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Static access key id. Only used when secret_access_key is also set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// Local gateway bind and port, and how much error detail callers see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the local HTTP gateway (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Include the sink failure detail in 500 responses (default true).
    #[serde(default = "default_true")]
    pub expose_error_detail: bool,
}

/// Port LocalStack serves every AWS service on.
const LOCALSTACK_PORT: u16 = 4566;

fn default_stream_name() -> String {
    "my-kinesis-stream".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for KinesisConfig {
    fn default() -> Self {
        Self {
            stream_name: default_stream_name(),
            region: default_region(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            expose_error_detail: default_true(),
        }
    }
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Process environment as a lookup for the `*_from` resolvers.
fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the stream name: env FORWARDER_STREAM_NAME overrides config.
pub fn resolve_stream_name(config: &KinesisConfig) -> String {
    stream_name_from(config, process_env)
}

/// `resolve_stream_name` against an arbitrary variable lookup. Blank values count as unset.
pub fn stream_name_from(config: &KinesisConfig, env: impl Fn(&str) -> Option<String>) -> String {
    trimmed(env("FORWARDER_STREAM_NAME").as_ref())
        .or_else(|| trimmed(Some(&config.stream_name)))
        .unwrap_or_else(default_stream_name)
}

/// Resolve the Kinesis endpoint: FORWARDER_KINESIS_ENDPOINT, then LOCALSTACK_HOSTNAME, then config.
/// None means the SDK picks the regional endpoint.
pub fn resolve_endpoint_url(config: &KinesisConfig) -> Option<String> {
    endpoint_url_from(config, process_env)
}

/// `resolve_endpoint_url` against an arbitrary variable lookup. Blank values count as unset.
pub fn endpoint_url_from(
    config: &KinesisConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    trimmed(env("FORWARDER_KINESIS_ENDPOINT").as_ref())
        .or_else(|| {
            trimmed(env("LOCALSTACK_HOSTNAME").as_ref())
                .map(|host| format!("http://{}:{}", host, LOCALSTACK_PORT))
        })
        .or_else(|| trimmed(config.endpoint_url.as_ref()))
}

/// Static credential pair from config when both halves are set; otherwise the default chain applies.
pub fn resolve_static_credentials(config: &KinesisConfig) -> Option<(String, String)> {
    let key = trimmed(config.access_key_id.as_ref())?;
    let secret = trimmed(config.secret_access_key.as_ref())?;
    Some((key, secret))
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FORWARDER_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".forwarder").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, FORWARDER_CONFIG_PATH, or the default path. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn stream_name_env_overrides_config() {
        let mut k = KinesisConfig::default();
        k.stream_name = " speeds ".to_string();
        assert_eq!(stream_name_from(&k, env_of(&[])), "speeds");
        assert_eq!(
            stream_name_from(&k, env_of(&[("FORWARDER_STREAM_NAME", " from-env ")])),
            "from-env"
        );
        assert_eq!(
            stream_name_from(&k, env_of(&[("FORWARDER_STREAM_NAME", "   ")])),
            "speeds"
        );
    }

    #[test]
    fn blank_stream_name_falls_back_to_default() {
        let mut k = KinesisConfig::default();
        k.stream_name = "  ".to_string();
        assert_eq!(stream_name_from(&k, env_of(&[])), "my-kinesis-stream");
        assert_eq!(
            stream_name_from(&k, env_of(&[("FORWARDER_STREAM_NAME", "")])),
            "my-kinesis-stream"
        );
    }

    #[test]
    fn endpoint_precedence() {
        let mut k = KinesisConfig::default();
        assert_eq!(endpoint_url_from(&k, env_of(&[])), None);

        k.endpoint_url = Some(" http://config:4566 ".to_string());
        assert_eq!(
            endpoint_url_from(&k, env_of(&[])).as_deref(),
            Some("http://config:4566")
        );
        assert_eq!(
            endpoint_url_from(&k, env_of(&[("LOCALSTACK_HOSTNAME", " ls ")])).as_deref(),
            Some("http://ls:4566")
        );
        assert_eq!(
            endpoint_url_from(
                &k,
                env_of(&[
                    ("LOCALSTACK_HOSTNAME", "ls"),
                    ("FORWARDER_KINESIS_ENDPOINT", "http://explicit:1234"),
                ])
            )
            .as_deref(),
            Some("http://explicit:1234")
        );
    }

    #[test]
    fn blank_endpoint_env_falls_through() {
        let mut k = KinesisConfig::default();
        k.endpoint_url = Some("http://config:4566".to_string());
        let env = env_of(&[("FORWARDER_KINESIS_ENDPOINT", "  "), ("LOCALSTACK_HOSTNAME", "")]);
        assert_eq!(endpoint_url_from(&k, env).as_deref(), Some("http://config:4566"));

        k.endpoint_url = Some("   ".to_string());
        assert_eq!(endpoint_url_from(&k, env_of(&[])), None);
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.kinesis.stream_name, "my-kinesis-stream");
        assert_eq!(c.kinesis.region, "us-east-1");
        assert_eq!(c.gateway.port, 15152);
        assert_eq!(c.gateway.bind, "127.0.0.1");
        assert!(c.gateway.expose_error_detail);
    }

    #[test]
    fn parses_camel_case_and_fills_missing_fields() {
        let c: Config = serde_json::from_str(
            r#"{"kinesis":{"streamName":"speeds","endpointUrl":"http://localhost:4566"},
                "gateway":{"exposeErrorDetail":false}}"#,
        )
        .unwrap();
        assert_eq!(c.kinesis.stream_name, "speeds");
        assert_eq!(c.kinesis.region, "us-east-1");
        assert_eq!(c.kinesis.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(c.gateway.port, 15152);
        assert!(!c.gateway.expose_error_detail);
    }

    #[test]
    fn static_credentials_need_both_halves() {
        let mut k = KinesisConfig::default();
        k.access_key_id = Some("AKID".to_string());
        assert_eq!(resolve_static_credentials(&k), None);
        k.secret_access_key = Some("  ".to_string());
        assert_eq!(resolve_static_credentials(&k), None);
        k.secret_access_key = Some("secret".to_string());
        assert_eq!(
            resolve_static_credentials(&k),
            Some(("AKID".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn loopback_binds() {
        assert!(is_loopback_bind("127.0.0.1"));
        assert!(is_loopback_bind(" localhost "));
        assert!(!is_loopback_bind("0.0.0.0"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let path = std::env::temp_dir()
            .join(format!("forwarder-missing-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.kinesis.stream_name, "my-kinesis-stream");
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = std::env::temp_dir().join(format!("forwarder-bad-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
    }
}
