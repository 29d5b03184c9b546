//! A mutable convenience layer over the pure keyset rotation functions.
//!
//! 基于纯 Keyset 轮换函数的可变便捷层。

use super::{Key, KeyData, KeyStatus, Keyset, OutputPrefixType};
use crate::error::{KeysetValidationError, Result};
use crate::handle::KeysetHandle;
use crate::registry::{KeyTemplate, Registry};
use rand::{rngs::OsRng, TryRngCore};

/// Picks a random, non-zero key id not yet used by `keyset`.
pub(crate) fn new_key_id(keyset: Option<&Keyset>) -> Result<u32> {
    loop {
        let id = OsRng.try_next_u32()?;
        let taken = keyset.is_some_and(|keyset| keyset.key(id).is_some());
        if id != 0 && !taken {
            return Ok(id);
        }
    }
}

/// Builds up or rotates a keyset step by step.
///
/// Each step goes through the validating functional update on [`Keyset`], so
/// a failed step leaves the manager unchanged.
///
/// 逐步构建或轮换 Keyset。每一步都经过 [`Keyset`] 上带校验的函数式更新，失败的步骤不会改变管理器状态。
#[derive(Clone, Debug, Default)]
pub struct KeysetManager {
    keyset: Option<Keyset>,
}

impl KeysetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_handle(handle: &KeysetHandle) -> Self {
        Self {
            keyset: Some(handle.keyset().clone()),
        }
    }

    /// Generates a key from `template` and adds it. The first key added to an
    /// empty manager becomes the primary.
    pub fn add(&mut self, template: &KeyTemplate, registry: &Registry) -> Result<u32> {
        let data = registry.new_key_from_template(template)?;
        self.insert(data, template.prefix_type, false)
    }

    /// Generates a key from `template`, adds it and makes it the primary.
    pub fn rotate(&mut self, template: &KeyTemplate, registry: &Registry) -> Result<u32> {
        let data = registry.new_key_from_template(template)?;
        self.insert(data, template.prefix_type, true)
    }

    /// Adds existing key data, e.g. a reference to a remote key.
    pub fn import(
        &mut self,
        key_data: KeyData,
        prefix_type: OutputPrefixType,
        make_primary: bool,
    ) -> Result<u32> {
        self.insert(key_data, prefix_type, make_primary)
    }

    fn insert(
        &mut self,
        data: KeyData,
        prefix_type: OutputPrefixType,
        make_primary: bool,
    ) -> Result<u32> {
        let id = new_key_id(self.keyset.as_ref())?;
        let key = Key::enabled(id, data, prefix_type);
        let next = match &self.keyset {
            Some(keyset) => keyset.rotate_add(key, make_primary)?,
            None => Keyset::with_primary(key)?,
        };
        self.keyset = Some(next);
        Ok(id)
    }

    fn update(
        &mut self,
        step: impl FnOnce(&Keyset) -> std::result::Result<Keyset, KeysetValidationError>,
    ) -> Result<()> {
        let keyset = self
            .keyset
            .as_ref()
            .ok_or(KeysetValidationError::NoPrimary)?;
        self.keyset = Some(step(keyset)?);
        Ok(())
    }

    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        self.update(|keyset| keyset.set_primary(key_id))
    }

    pub fn enable(&mut self, key_id: u32) -> Result<()> {
        self.update(|keyset| keyset.set_status(key_id, KeyStatus::Enabled))
    }

    pub fn disable(&mut self, key_id: u32) -> Result<()> {
        self.update(|keyset| keyset.set_status(key_id, KeyStatus::Disabled))
    }

    pub fn destroy(&mut self, key_id: u32) -> Result<()> {
        self.update(|keyset| keyset.destroy(key_id))
    }

    pub fn delete(&mut self, key_id: u32) -> Result<()> {
        self.update(|keyset| keyset.delete(key_id))
    }

    pub fn key_count(&self) -> usize {
        self.keyset.as_ref().map_or(0, Keyset::len)
    }

    pub fn handle(&self) -> Result<KeysetHandle> {
        let keyset = self
            .keyset
            .clone()
            .unwrap_or_else(|| Keyset::new(Vec::new(), 0));
        KeysetHandle::new(keyset)
    }
}
