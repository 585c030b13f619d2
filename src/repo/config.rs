//! repo::config
//!
//! Read/compare/write-back editing of repository configuration.
//!
//! # Design
//!
//! The engine keeps an opened repository's configuration in memory and
//! persists it only on an explicit write. The editor builds the
//! idempotent cycle on top: read the current value, compare against the
//! desired one, and stage + persist only on a mismatch. Repeated calls
//! with the same desired value therefore perform exactly one persisted
//! write, which is what makes flag-style settings safe to re-apply.

use crate::engine::ConfigValue;
use crate::error::{adapt_config_write, Error};
use crate::repo::Repository;

/// Editor over an open repository's persisted configuration.
///
/// Borrowed from a [`Repository`] via [`Repository::config`]; all
/// operations validate the handle's open state first.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use cairn::engine::mock::MockEngine;
/// use cairn::repo::Repository;
///
/// let mock = MockEngine::new();
/// mock.register_repo("/data/repo");
/// let repo = Repository::open(Arc::new(mock), "/data/repo").unwrap();
///
/// let config = repo.config();
/// assert!(!config.get_bool("core", "tombstone-commits").unwrap());
/// config
///     .set_bool_if_changed("core", "tombstone-commits", true)
///     .unwrap();
/// assert!(config.get_bool("core", "tombstone-commits").unwrap());
/// ```
#[derive(Debug)]
pub struct ConfigEditor<'r> {
    repo: &'r Repository,
}

impl<'r> ConfigEditor<'r> {
    pub(crate) fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    /// Read a boolean flag.
    ///
    /// An unset key (and a key holding a non-boolean value) reads as
    /// `false`.
    pub fn get_bool(&self, group: &str, key: &str) -> Result<bool, Error> {
        let token = self.repo.require_open("config.get_bool")?;
        Ok(self
            .repo
            .engine()
            .get_config_value(token, group, key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    /// Read a scalar value. `None` means the key is unset.
    pub fn get_value(&self, group: &str, key: &str) -> Result<Option<ConfigValue>, Error> {
        let token = self.repo.require_open("config.get_value")?;
        Ok(self.repo.engine().get_config_value(token, group, key))
    }

    /// Persist a boolean flag only if it differs from the stored value.
    pub fn set_bool_if_changed(&self, group: &str, key: &str, desired: bool) -> Result<(), Error> {
        self.set_value_if_changed(group, key, ConfigValue::Bool(desired))
    }

    /// Persist a scalar only if it differs from the stored value.
    ///
    /// A write happens unless the key is already set to exactly
    /// `desired`; an unset key always triggers one. On a write failure
    /// the engine's diagnostic surfaces as
    /// [`Error::ConfigWriteFailed`], verbatim. Note that the engine's
    /// config is a live view: a failed persist leaves the new value
    /// staged, so re-applying the same edit compares against the
    /// staged value and does not retry the write.
    pub fn set_value_if_changed(
        &self,
        group: &str,
        key: &str,
        desired: ConfigValue,
    ) -> Result<(), Error> {
        let token = self.repo.require_open("config.set_value_if_changed")?;
        let engine = self.repo.engine();

        let current = engine.get_config_value(token, group, key);
        if current.as_ref() == Some(&desired) {
            log::debug!("config {group}.{key} unchanged, skipping write");
            return Ok(());
        }

        engine.set_config_value(token, group, key, desired);
        engine
            .write_config(token)
            .map_err(|e| adapt_config_write(Some(e)))?;
        log::debug!("config {group}.{key} written");
        Ok(())
    }
}
