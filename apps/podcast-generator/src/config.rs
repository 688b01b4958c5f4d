//! Generator configuration
//!
//! Loaded once at startup from, in increasing precedence:
//! 1. built-in defaults
//! 2. a TOML file (`$PODCAST_STUDIO_CONFIG` or `<config_dir>/podcast-studio/config.toml`)
//! 3. `PODCAST_`-prefixed environment variables, nested with `__`
//! 4. the conventional `OPENAI_API_KEY`, `ELEVENLABS_API_KEY` and `GEMINI_API_KEY`
//!
//! Credential values may be literal or `env:VAR` references.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::duration::EstimatorKind;
use crate::error::ConfigError;
use crate::request::DEFAULT_SYSTEM_PROMPT;
use crate::token_budget::{ProviderCeiling, TokenBudgetPolicy};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "PODCAST_STUDIO_CONFIG";

/// Ceiling the extended profile assumes for its chat model
const EXTENDED_PROVIDER_CEILING: u32 = 4096;

// ============================================================================
// PROFILE
// ============================================================================

/// Named pairing of duration estimator and token budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Structure-aware estimate, 150 tokens/minute, provider enforces its own limit
    #[default]
    Classic,
    /// Word-count estimate, 450 tokens/minute within [1000, 16000], ceiling 4096
    Extended,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Classic, Profile::Extended];

    pub fn label(&self) -> &'static str {
        match self {
            Profile::Classic => "Classic",
            Profile::Extended => "Extended",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Profile::Classic => 0,
            Profile::Extended => 1,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn budget_policy(&self) -> TokenBudgetPolicy {
        match self {
            Profile::Classic => TokenBudgetPolicy::classic(),
            Profile::Extended => TokenBudgetPolicy::extended(),
        }
    }

    pub fn provider_ceiling(&self) -> Option<ProviderCeiling> {
        match self {
            Profile::Classic => None,
            Profile::Extended => Some(ProviderCeiling(EXTENDED_PROVIDER_CEILING)),
        }
    }

    pub fn estimator(&self) -> EstimatorKind {
        match self {
            Profile::Classic => EstimatorKind::StructureAware,
            Profile::Extended => EstimatorKind::WordCount,
        }
    }
}

// ============================================================================
// TABLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Optional overrides applied on top of the active profile's budget
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetOverrides {
    pub tokens_per_minute: Option<f64>,
    pub min_tokens: Option<u32>,
    pub max_tokens: Option<u32>,
    pub provider_ceiling: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub openai_model: String,
    pub openai_api_url: String,
    pub elevenlabs_model: String,
    pub elevenlabs_api_url: String,
    pub gemini_api_url: String,
    pub edge_command: String,
    /// Closing line spoken by the guest after the transcript, empty for none
    pub ending_message: String,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            openai_model: "tts-1-hd".to_string(),
            openai_api_url: "https://api.openai.com/v1".to_string(),
            elevenlabs_model: "eleven_multilingual_v2".to_string(),
            elevenlabs_api_url: "https://api.elevenlabs.io/v1".to_string(),
            gemini_api_url: "https://texttospeech.googleapis.com/v1beta1".to_string(),
            edge_command: "edge-tts".to_string(),
            ending_message: String::new(),
            timeout_secs: 120,
        }
    }
}

/// Service whose API key is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    OpenAi,
    ElevenLabs,
    Gemini,
}

impl Credential {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Credential::OpenAi => "OpenAI",
            Credential::ElevenLabs => "ElevenLabs",
            Credential::Gemini => "Gemini",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Credential::OpenAi => "OPENAI_API_KEY",
            Credential::ElevenLabs => "ELEVENLABS_API_KEY",
            Credential::Gemini => "GEMINI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Resolve `env:VAR` references and drop empty values
    fn resolve(&mut self) {
        for (name, slot) in [
            ("openai", &mut self.openai),
            ("elevenlabs", &mut self.elevenlabs),
            ("gemini", &mut self.gemini),
        ] {
            *slot = slot.take().and_then(|raw| resolve_secret(name, &raw));
        }
    }

    pub fn get(&self, credential: Credential) -> Result<&str, ConfigError> {
        let slot = match credential {
            Credential::OpenAi => &self.openai,
            Credential::ElevenLabs => &self.elevenlabs,
            Credential::Gemini => &self.gemini,
        };
        slot.as_deref().ok_or(ConfigError::MissingApiKey {
            provider: credential.provider_name(),
            env_var: credential.env_var(),
        })
    }
}

// ============================================================================
// GENERATOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub profile: Profile,
    pub estimator: Option<EstimatorKind>,
    pub chat: ChatConfig,
    pub budget: BudgetOverrides,
    pub tts: TtsConfig,
    pub keys: ApiKeys,
    pub output_dir: PathBuf,
    pub default_system_prompt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            estimator: None,
            chat: ChatConfig::default(),
            budget: BudgetOverrides::default(),
            tts: TtsConfig::default(),
            keys: ApiKeys::default(),
            output_dir: PathBuf::from("./output"),
            default_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load from the default locations and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match &path {
            Some(p) if p.exists() => ::log::info!("Loading config from {}", p.display()),
            Some(p) => ::log::info!("No config file at {}, using defaults", p.display()),
            None => ::log::warn!("Cannot determine config directory, using defaults"),
        }

        Self::from_figment(Self::figment(path.as_deref()))
    }

    /// `<config_dir>/podcast-studio/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("podcast-studio");
        path.push("config.toml");
        Some(path)
    }

    /// Provider chain without extraction; a missing file contributes nothing
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed("PODCAST_").split("__"))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY", "ELEVENLABS_API_KEY", "GEMINI_API_KEY"])
                    .map(|key| {
                        let provider = key.as_str().trim_end_matches("_API_KEY").trim_end_matches("_api_key");
                        format!("keys.{}", provider.to_ascii_lowercase()).into()
                    }),
            )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut config: GeneratorConfig = figment.extract()?;
        config.keys.resolve();
        config.validate()?;

        ::log::info!(
            "Config: profile={}, chat model={}, output_dir={}",
            config.profile.label(),
            config.chat.model,
            config.output_dir.display()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.keys.get(Credential::OpenAi)?;

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "chat.temperature",
                reason: format!("{} is outside [0, 2]", self.chat.temperature),
            });
        }
        if let Some(rate) = self.budget.tokens_per_minute {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "budget.tokens_per_minute",
                    reason: format!("{} must be positive", rate),
                });
            }
        }
        for profile in Profile::ALL {
            let policy = self.budget_policy(profile);
            if let (Some(min), Some(max)) = (policy.min_tokens, policy.max_tokens) {
                if min > max {
                    return Err(ConfigError::InvalidValue {
                        key: "budget.min_tokens",
                        reason: format!("{} exceeds max_tokens {} for the {} profile", min, max, profile.label()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Profile preset with any `[budget]` overrides applied
    pub fn budget_policy(&self, profile: Profile) -> TokenBudgetPolicy {
        let mut policy = profile.budget_policy();
        if let Some(rate) = self.budget.tokens_per_minute {
            policy.tokens_per_minute = rate;
        }
        if let Some(min) = self.budget.min_tokens {
            policy.min_tokens = Some(min);
        }
        if let Some(max) = self.budget.max_tokens {
            policy.max_tokens = Some(max);
        }
        policy
    }

    pub fn provider_ceiling(&self, profile: Profile) -> Option<ProviderCeiling> {
        self.budget
            .provider_ceiling
            .map(ProviderCeiling)
            .or_else(|| profile.provider_ceiling())
    }

    pub fn estimator(&self, profile: Profile) -> EstimatorKind {
        self.estimator.unwrap_or_else(|| profile.estimator())
    }
}

// ============================================================================
// SECRETS
// ============================================================================

/// Resolve a literal or `env:VAR` secret, logging only a masked form
pub fn resolve_secret(name: &str, raw: &str) -> Option<String> {
    let value = match raw.trim().strip_prefix("env:") {
        Some(var) => match std::env::var(var) {
            Ok(v) => v.trim().to_string(),
            Err(_) => {
                ::log::warn!("Environment variable {} for {} key not found", var, name);
                return None;
            }
        },
        None => raw.trim().to_string(),
    };

    if value.is_empty() {
        ::log::warn!("{} key resolved to an empty string", name);
        return None;
    }

    ::log::debug!("{} key = {} (len={})", name, mask_secret(&value), value.len());
    Some(value)
}

/// `sk-abcdef123456` becomes `sk-a...3456`; short values are fully masked
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "*".repeat(chars.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load_in(jail: &Jail) -> Result<GeneratorConfig, ConfigError> {
        GeneratorConfig::from_figment(GeneratorConfig::figment(Some(
            &jail.directory().join("podcast.toml"),
        )))
    }

    #[test]
    fn test_defaults_with_key_from_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("OPENAI_API_KEY", "sk-test-1234567890");

            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config.profile, Profile::Classic);
            assert_eq!(config.chat.model, "gpt-4");
            assert_eq!(config.chat.temperature, 0.7);
            assert_eq!(config.tts.openai_model, "tts-1-hd");
            assert_eq!(config.output_dir, PathBuf::from("./output"));
            assert_eq!(config.keys.get(Credential::OpenAi).ok(), Some("sk-test-1234567890"));
            assert!(config.keys.get(Credential::Gemini).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_missing_openai_key_is_fatal() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let err = load_in(jail).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::MissingApiKey { env_var: "OPENAI_API_KEY", .. }
            ));
            Ok(())
        });
    }

    #[test]
    fn test_file_then_prefixed_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "podcast.toml",
                r#"
                    profile = "extended"
                    output_dir = "/tmp/podcasts"

                    [chat]
                    model = "gpt-4o"

                    [keys]
                    openai = "env:MY_OPENAI"
                    elevenlabs = "xi-literal-key"

                    [budget]
                    provider_ceiling = 8000
                "#,
            )?;
            jail.set_env("MY_OPENAI", "sk-from-indirection");
            jail.set_env("PODCAST_CHAT__TEMPERATURE", "0.3");

            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config.profile, Profile::Extended);
            assert_eq!(config.chat.model, "gpt-4o");
            assert_eq!(config.chat.temperature, 0.3);
            assert_eq!(config.output_dir, PathBuf::from("/tmp/podcasts"));
            assert_eq!(config.keys.get(Credential::OpenAi).ok(), Some("sk-from-indirection"));
            assert_eq!(config.keys.get(Credential::ElevenLabs).ok(), Some("xi-literal-key"));
            assert_eq!(config.provider_ceiling(Profile::Extended), Some(ProviderCeiling(8000)));
            assert_eq!(config.estimator(Profile::Extended), EstimatorKind::WordCount);
            Ok(())
        });
    }

    #[test]
    fn test_raw_key_overrides_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("podcast.toml", "[keys]\nopenai = \"sk-file-key-0000\"")?;
            jail.set_env("OPENAI_API_KEY", "sk-env-key-9999");

            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config.keys.get(Credential::OpenAi).ok(), Some("sk-env-key-9999"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("OPENAI_API_KEY", "sk-test-1234567890");
            jail.set_env("PODCAST_CHAT__TEMPERATURE", "3.5");

            let err = load_in(jail).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { key: "chat.temperature", .. }));
            Ok(())
        });
    }

    #[test]
    fn test_budget_overrides_apply_to_profile() {
        let mut config = GeneratorConfig::default();
        config.budget.tokens_per_minute = Some(200.0);
        config.budget.max_tokens = Some(5000);

        let classic = config.budget_policy(Profile::Classic);
        assert_eq!(classic.tokens_for_duration(60.0).completion_tokens, 5000);

        let extended = config.budget_policy(Profile::Extended);
        assert_eq!(extended.min_tokens, Some(1000));
        assert_eq!(extended.tokens_for_duration(10.0).completion_tokens, 2000);
        assert_eq!(config.provider_ceiling(Profile::Classic), None);
        assert_eq!(config.provider_ceiling(Profile::Extended), Some(ProviderCeiling(4096)));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-abcdef123456"), "sk-a...3456");
        assert_eq!(mask_secret("short"), "*****");
    }

    #[test]
    fn test_profile_presets() {
        assert_eq!(Profile::Classic.estimator(), EstimatorKind::StructureAware);
        assert_eq!(Profile::Extended.budget_policy(), TokenBudgetPolicy::extended());
        assert_eq!(Profile::from_index(1), Profile::Extended);
        assert_eq!(Profile::from_index(7), Profile::Classic);
    }
}
