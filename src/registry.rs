//! The active rule set and its reloads.

use crate::config::RulesConfig;
use crate::error::{ConfigError, ReloadError};
use crate::rules::Rules;
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;

/// Holds the active [`Rules`] and replaces them on reload.
///
/// Spawn evaluations take a snapshot with [`current`](Self::current) and
/// never block a reload. A reload builds a complete new rule set before
/// swapping it in, so a failing reload leaves the previous rules active.
/// Reloads are not re-entrant: a reload requested while another one runs
/// fails with [`ReloadError::InProgress`] instead of waiting.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{RuleRegistry, RulesConfig};
///
/// let registry = RuleRegistry::new();
/// assert!(registry.current().world("overworld").is_none());
///
/// registry
///     .reload(|| {
///         RulesConfig::from_toml(
///             r#"
///             [worlds.overworld.variables]
///             level = "1"
///             [entities.ZOMBIE.variants.plain]
///             weight = 1
///             "#,
///         )
///     })
///     .unwrap();
/// assert!(registry.current().world("overworld").is_some());
/// ```
#[derive(Debug, Default)]
pub struct RuleRegistry {
    active: RwLock<Arc<Rules>>,
    reload_guard: Mutex<()>,
}

impl RuleRegistry {
    /// Create a registry with an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given rules active.
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            active: RwLock::new(Arc::new(rules)),
            reload_guard: Mutex::new(()),
        }
    }

    /// A snapshot of the active rules.
    pub fn current(&self) -> Arc<Rules> {
        Arc::clone(&self.active.read())
    }

    /// Load a configuration, build it and make it active.
    pub fn reload<F>(&self, load: F) -> Result<Arc<Rules>, ReloadError>
    where
        F: FnOnce() -> Result<RulesConfig, ConfigError>,
    {
        let Some(_guard) = self.reload_guard.try_lock() else {
            tracing::warn!("reload rejected: another reload is in progress");
            return Err(ReloadError::InProgress);
        };

        match load().and_then(|config| config.build()) {
            Ok(rules) => {
                let rules = Arc::new(rules);
                *self.active.write() = Arc::clone(&rules);
                tracing::info!(
                    "rules reloaded: {} world(s), {} entity type(s)",
                    rules.worlds().count(),
                    rules.entity_types().count()
                );
                Ok(rules)
            }
            Err(err) => {
                tracing::error!("invalid configuration, keeping previous rules: {}", err);
                Err(err.into())
            }
        }
    }

    /// Reload from a TOML or JSON file.
    pub fn reload_from_path(&self, path: &Path) -> Result<Arc<Rules>, ReloadError> {
        self.reload(|| RulesConfig::from_path(path))
    }
}
