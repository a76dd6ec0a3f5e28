//! Configuration sections

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use super::ConfigError;
use crate::runtime::ResolverOptions;
use crate::syntax::depth::DEFAULT_MAX_DEPTH;
use crate::syntax::parser::{DEFAULT_MAX_IDENTIFIER_LENGTH, DEFAULT_MAX_SOURCE_SIZE, ParserConfig};
use crate::syntax::serializer::SerializerOptions;

/// Largest accepted `limits.maxDepth`. The parser still recurses on the
/// native stack, one frame group per level.
pub const MAX_DEPTH_CEILING: usize = 1_000;
pub const MAX_IDENTIFIER_LENGTH_CEILING: usize = 64 * 1024;
/// 1 GiB.
pub const MAX_SOURCE_SIZE_CEILING: usize = 1 << 30;

/// Top-level configuration.
///
/// ```toml
/// [limits]
/// maxDepth = 100
/// maxIdentifierLength = 256
/// maxSourceSize = 10485760
///
/// [resolver]
/// locale = "en-US"
/// useIsolating = false
///
/// [serializer]
/// validate = true
/// withJunk = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FtlConfig {
    pub limits: LimitsConfiguration,
    pub resolver: ResolverConfiguration,
    pub serializer: SerializerConfiguration,
}

/// Bounds shared by the parser, serializer, traversal and resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitsConfiguration {
    pub max_depth: usize,
    pub max_identifier_length: usize,
    /// In bytes.
    pub max_source_size: usize,
}

impl Default for LimitsConfiguration {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            max_source_size: DEFAULT_MAX_SOURCE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfiguration {
    /// BCP 47 tag used for plural rules and locale-aware functions.
    pub locale: String,
    pub use_isolating: bool,
}

impl Default for ResolverConfiguration {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            use_isolating: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerializerConfiguration {
    pub validate: bool,
    pub with_junk: bool,
}

impl Default for SerializerConfiguration {
    fn default() -> Self {
        Self {
            validate: true,
            with_junk: false,
        }
    }
}

impl FtlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, message: &str| {
            Err(ConfigError::Invalid {
                field,
                message: message.to_string(),
            })
        };
        if !(1..=MAX_DEPTH_CEILING).contains(&self.limits.max_depth) {
            return invalid(
                "limits.maxDepth",
                &format!("must be between 1 and {MAX_DEPTH_CEILING}"),
            );
        }
        if !(1..=MAX_IDENTIFIER_LENGTH_CEILING).contains(&self.limits.max_identifier_length) {
            return invalid(
                "limits.maxIdentifierLength",
                &format!("must be between 1 and {MAX_IDENTIFIER_LENGTH_CEILING}"),
            );
        }
        if !(1..=MAX_SOURCE_SIZE_CEILING).contains(&self.limits.max_source_size) {
            return invalid(
                "limits.maxSourceSize",
                &format!("must be between 1 and {MAX_SOURCE_SIZE_CEILING}"),
            );
        }
        self.locale().map(|_| ())
    }

    pub fn locale(&self) -> Result<LanguageIdentifier, ConfigError> {
        self.resolver
            .locale
            .parse()
            .map_err(|err| ConfigError::Invalid {
                field: "resolver.locale",
                message: format!("`{}` is not a valid language tag: {}", self.resolver.locale, err),
            })
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            max_depth: self.limits.max_depth,
            max_identifier_length: self.limits.max_identifier_length,
            max_source_size: self.limits.max_source_size,
        }
    }

    pub fn serializer_options(&self) -> SerializerOptions {
        SerializerOptions {
            validate: self.serializer.validate,
            with_junk: self.serializer.with_junk,
            max_depth: self.limits.max_depth,
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_depth: self.limits.max_depth,
            use_isolating: self.resolver.use_isolating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FtlConfig::default();
        assert_eq!(config.limits.max_depth, 100);
        assert_eq!(config.resolver.locale, "en-US");
        assert!(!config.resolver.use_isolating);
        assert!(config.serializer.validate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = FtlConfig::from_toml_str("[limits]\nmaxDepth = 20\n").unwrap();
        assert_eq!(config.limits.max_depth, 20);
        assert_eq!(config.limits.max_identifier_length, 256);
        assert_eq!(config.parser_config().max_depth, 20);
        assert_eq!(config.serializer_options().max_depth, 20);
        assert_eq!(config.resolver_options().max_depth, 20);
    }

    #[test]
    fn test_json() {
        let config =
            FtlConfig::from_json_str(r#"{"resolver": {"locale": "pl", "useIsolating": true}}"#)
                .unwrap();
        assert_eq!(config.locale().unwrap().to_string(), "pl");
        assert!(config.resolver_options().use_isolating);
    }

    #[test]
    fn test_validation() {
        let mut config = FtlConfig::default();
        config.limits.max_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "limits.maxDepth",
                ..
            })
        ));

        let mut config = FtlConfig::default();
        config.limits.max_depth = MAX_DEPTH_CEILING + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "limits.maxDepth",
                ..
            })
        ));

        let mut config = FtlConfig::default();
        config.resolver.locale = "not a locale!".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "resolver.locale",
                ..
            })
        ));
    }

    #[test]
    fn test_hostile_limits_rejected_at_load() {
        let config = FtlConfig::from_json_str(&format!(
            r#"{{"limits": {{"maxIdentifierLength": {}}}}}"#,
            usize::MAX
        ))
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "limits.maxIdentifierLength",
                ..
            })
        ));

        let config = FtlConfig::from_toml_str("[limits]\nmaxSourceSize = 2147483648\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "limits.maxSourceSize",
                ..
            })
        ));

        let mut config = FtlConfig::default();
        config.limits.max_depth = MAX_DEPTH_CEILING;
        config.limits.max_identifier_length = MAX_IDENTIFIER_LENGTH_CEILING;
        config.limits.max_source_size = MAX_SOURCE_SIZE_CEILING;
        assert!(config.validate().is_ok());
    }
}
