//! Interceptor settings.
//!
//! Deserialized from whatever configuration source the host uses. Every key is
//! optional; unknown keys are rejected.
//!
//! ```
//! use data_permission::{FaultPolicy, Settings};
//!
//! let settings: Settings = serde_json::from_str(
//!     r#"{"enabled": true, "target_type": "api::Response", "target_field": "data"}"#,
//! )
//! .unwrap();
//! assert!(settings.validate().is_ok());
//! assert_eq!(settings.fault_policy, FaultPolicy::FailOpen);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigurationError,
    redaction::{FaultPolicy, DEFAULT_MAX_DEPTH},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Master switch. Off unless set.
    pub enabled: bool,
    /// Record type of the response wrapper, e.g. `api::Response`.
    pub target_type: String,
    /// Member of the wrapper holding the payload.
    pub target_field: String,
    /// Comma-separated record type prefixes accepted by discovery.
    pub discovery_scope: Option<String>,
    pub fault_policy: FaultPolicy,
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            target_type: String::new(),
            target_field: String::new(),
            discovery_scope: None,
            fault_policy: FaultPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Settings {
    /// Checks the settings an enabled interceptor depends on.
    ///
    /// Disabled settings only need a usable depth and scope.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::ZeroDepth);
        }
        if self.scope().is_some_and(|prefixes| prefixes.is_empty()) {
            return Err(ConfigurationError::EmptyScope);
        }
        if !self.enabled {
            return Ok(());
        }
        if self.target_type.trim().is_empty() {
            return Err(ConfigurationError::MissingTargetType);
        }
        if self.target_field.trim().is_empty() {
            return Err(ConfigurationError::MissingTargetField);
        }
        Ok(())
    }

    /// Discovery scope split into trimmed, non-empty prefixes.
    pub fn scope(&self) -> Option<Vec<&str>> {
        self.discovery_scope.as_deref().map(|scope| {
            scope
                .split(',')
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> Settings {
        Settings {
            enabled: true,
            target_type: "api::Response".into(),
            target_field: "data".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn defaults_are_disabled_and_valid() {
        let settings = Settings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn enabled_requires_target() {
        let settings = Settings {
            target_type: " ".into(),
            ..enabled()
        };
        assert_eq!(settings.validate(), Err(ConfigurationError::MissingTargetType));

        let settings = Settings {
            target_field: String::new(),
            ..enabled()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigurationError::MissingTargetField)
        );
    }

    #[test]
    fn zero_depth_is_rejected() {
        let settings = Settings {
            max_depth: 0,
            ..enabled()
        };
        assert_eq!(settings.validate(), Err(ConfigurationError::ZeroDepth));
    }

    #[test]
    fn scope_is_split_on_commas() {
        let settings = Settings {
            discovery_scope: Some("shop::orders, shop::billing,".into()),
            ..enabled()
        };
        assert_eq!(
            settings.scope(),
            Some(vec!["shop::orders", "shop::billing"])
        );

        let settings = Settings {
            discovery_scope: Some(" , ".into()),
            ..enabled()
        };
        assert_eq!(settings.validate(), Err(ConfigurationError::EmptyScope));
    }

    #[test]
    fn deserializes_strict_policy() {
        let settings: Settings =
            serde_json::from_str(r#"{"fault_policy": "strict", "max_depth": 8}"#).unwrap();
        assert_eq!(settings.fault_policy, FaultPolicy::Strict);
        assert_eq!(settings.max_depth, 8);
        assert!(serde_json::from_str::<Settings>(r#"{"unknown": 1}"#).is_err());
    }
}
