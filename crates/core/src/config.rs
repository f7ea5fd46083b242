use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub bounds: BoundsConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &[
    "BROKER_HOST",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "ASSET_ID",
];

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PUMP_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PUMP_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            broker: BrokerConfig::from_env_profiled(p),
            bounds: BoundsConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:     host={} port={}", self.server.host, self.server.port);
        tracing::info!(
            "  broker:     {}:{} base_topic={} asset_id={}",
            self.broker.host, self.broker.port, self.broker.base_topic, self.broker.asset_id
        );
        tracing::info!(
            "  bounds:     history={} chat_turn={} fault_event={} session={}",
            self.bounds.history_capacity, self.bounds.chat_turn_cap,
            self.bounds.fault_event_cap, self.bounds.session_cap
        );
        tracing::info!("  llm:        provider={} model={}", self.llm.provider, self.llm.model_for(&self.llm.provider));
        tracing::info!("  embedding:  provider={} model={}", self.embedding.provider, self.embedding.model);
        tracing::info!("  retrieval:  persist_dir={}", self.retrieval.index_persist_dir.display());
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "broker": {
                "host": self.broker.host,
                "port": self.broker.port,
                "base_topic": self.broker.base_topic,
                "asset_id": self.broker.asset_id,
            },
            "bounds": {
                "history_capacity": self.bounds.history_capacity,
                "chat_turn_cap": self.bounds.chat_turn_cap,
                "fault_event_cap": self.bounds.fault_event_cap,
                "session_cap": self.bounds.session_cap,
            },
            "llm": { "provider": self.llm.provider, "configured": self.llm.is_configured() },
            "embedding": { "provider": self.embedding.provider, "model": self.embedding.model },
            "retrieval": { "index_persist_dir": self.retrieval.index_persist_dir },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8080),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Broker (pub/sub wiring) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub asset_id: String,
    pub base_topic: String,
}

impl BrokerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "BROKER_HOST", "127.0.0.1"),
            port: profiled_env_u16(p, "BROKER_PORT", 15700),
            asset_id: profiled_env_or(p, "ASSET_ID", "pump01"),
            base_topic: profiled_env_or(p, "BASE_TOPIC", "digital_twin"),
        }
    }

    pub fn telemetry_topic(&self) -> String {
        format!("{}/{}/telemetry", self.base_topic, self.asset_id)
    }

    pub fn command_topic(&self) -> String {
        format!("{}/{}/command", self.base_topic, self.asset_id)
    }
}

// ── Bounded-collection caps ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub history_capacity: usize,
    pub chat_turn_cap: usize,
    pub fault_event_cap: usize,
    pub session_cap: usize,
}

impl BoundsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            history_capacity: profiled_env_usize(p, "HISTORY_CAPACITY", 60),
            chat_turn_cap: profiled_env_usize(p, "CHAT_TURN_CAP", 20),
            fault_event_cap: profiled_env_usize(p, "FAULT_EVENT_CAP", 256),
            session_cap: profiled_env_usize(p, "SESSION_CAP", 10_000),
        }
    }
}

// ── LLM (OpenAI / Anthropic / Ollama) ─────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "ollama"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "LLM_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "LLM_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.2")
                .parse()
                .unwrap_or(0.2),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 1024),
        }
    }

    pub fn model_for(&self, provider: &str) -> &str {
        match provider {
            "openai" => &self.openai_model,
            "anthropic" | "claude" => &self.anthropic_model,
            _ => "n/a",
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "LLM_MODEL", "llama3.2"),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "ollama"),
            model: profiled_env_or(p, "EMBED_MODEL", "nomic-embed-text"),
            dimensions: profiled_env_usize(p, "EMBEDDING_DIMENSIONS", 768),
        }
    }
}

// ── Retrieval index persistence ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub index_persist_dir: PathBuf,
    pub reference_document: Option<PathBuf>,
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            index_persist_dir: PathBuf::from(profiled_env_or(p, "INDEX_PERSIST_DIR", "data/index")),
            reference_document: profiled_env_opt(p, "REFERENCE_DOCUMENT").map(PathBuf::from),
        }
    }
}
