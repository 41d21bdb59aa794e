//! Container configuration.
//!
//! Options can be built in code, read from the environment, or (with the
//! `config` feature) deserialized from JSON.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable read by [`ContainerOptions::from_env`] for
/// [`ContainerOptions::dispose_on_drop`].
pub const ENV_DISPOSE_ON_DROP: &str = "SCOPEWIRE_DISPOSE_ON_DROP";

/// Environment variable read by [`ContainerOptions::from_env`] for
/// [`ContainerOptions::label`].
pub const ENV_LABEL: &str = "SCOPEWIRE_LABEL";

/// Behavioural options of a [`Container`](crate::Container) and its scopes.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, ContainerOptions, ResolverCore};
///
/// let options = ContainerOptions::new().label("orders").dispose_on_drop(false);
/// let container = Container::with_options(options);
/// assert!(container.context_name().starts_with("orders container #"));
/// assert!(!container.options().dispose_on_drop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Dispose the container or scope when it is dropped.
    pub dispose_on_drop: bool,
    /// Prefix for context names in logs and errors.
    pub label: Option<String>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            dispose_on_drop: true,
            label: None,
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispose_on_drop(mut self, enabled: bool) -> Self {
        self.dispose_on_drop = enabled;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reads options from `SCOPEWIRE_DISPOSE_ON_DROP` and `SCOPEWIRE_LABEL`.
    ///
    /// Unset variables keep their defaults; unparseable values are logged
    /// and ignored.
    ///
    /// ```
    /// use scopewire::ContainerOptions;
    ///
    /// std::env::remove_var("SCOPEWIRE_DISPOSE_ON_DROP");
    /// std::env::remove_var("SCOPEWIRE_LABEL");
    ///
    /// let options = ContainerOptions::from_env();
    /// assert!(options.dispose_on_drop);
    /// assert_eq!(options.label, None);
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// ```
    /// use scopewire::ContainerOptions;
    ///
    /// let options = ContainerOptions::from_lookup(|key| match key {
    ///     "SCOPEWIRE_DISPOSE_ON_DROP" => Some("off".to_string()),
    ///     _ => None,
    /// });
    /// assert!(!options.dispose_on_drop);
    /// assert_eq!(options.label, None);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(raw) = lookup(ENV_DISPOSE_ON_DROP) {
            match parse_flag(&raw) {
                Some(enabled) => options.dispose_on_drop = enabled,
                None => warn!(variable = ENV_DISPOSE_ON_DROP, value = %raw, "ignoring invalid flag"),
            }
        }
        if let Some(label) = lookup(ENV_LABEL).filter(|label| !label.trim().is_empty()) {
            options.label = Some(label.trim().to_string());
        }
        options
    }

    /// Parses options from JSON; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
