//! The keyset data model and its invariant-preserving rotation operations.
//!
//! Every rotation operation is a pure function: it takes `&self` and returns a
//! freshly validated `Keyset`, leaving the original untouched.
//!
//! Keyset 数据模型及其保持不变量的轮换操作。
//! 每个轮换操作都是纯函数：接收 `&self` 并返回一个重新校验过的新 `Keyset`，原值保持不变。

use crate::error::KeysetValidationError;
use std::collections::HashSet;

pub mod info;
pub mod key;
pub mod manager;

pub use info::{KeyInfo, KeysetInfo};
pub use key::{Key, KeyData, KeyMaterialKind, KeyStatus, OutputPrefixType};
pub use manager::KeysetManager;

type ValidationResult<T> = std::result::Result<T, KeysetValidationError>;

/// An ordered collection of keys plus the id of the primary key.
///
/// Key order is registration order, not priority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyset {
    keys: Vec<Key>,
    primary_key_id: u32,
}

impl Keyset {
    /// Assembles a keyset without validating it. Call [`Keyset::validate`]
    /// before relying on the invariants.
    pub fn new(keys: Vec<Key>, primary_key_id: u32) -> Self {
        Self {
            keys,
            primary_key_id,
        }
    }

    /// A keyset holding a single enabled primary key.
    pub fn with_primary(key: Key) -> ValidationResult<Self> {
        let primary_key_id = key.id();
        Self::new(vec![key], primary_key_id).validated()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn primary_key_id(&self) -> u32 {
        self.primary_key_id
    }

    pub fn key(&self, key_id: u32) -> Option<&Key> {
        self.keys.iter().find(|key| key.id() == key_id)
    }

    pub fn primary_key(&self) -> Option<&Key> {
        self.key(self.primary_key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn info(&self) -> KeysetInfo {
        KeysetInfo::from(self)
    }

    /// Checks the keyset invariants.
    ///
    /// Key ids must be unique, exactly one key must carry the primary id and
    /// that key must be enabled. Non-destroyed keys must carry key data.
    ///
    /// 检查 Keyset 不变量：密钥 ID 唯一，恰好一个密钥拥有主密钥 ID，且该密钥处于启用状态。
    pub fn validate(&self) -> ValidationResult<()> {
        let mut seen = HashSet::with_capacity(self.keys.len());
        for key in &self.keys {
            if !seen.insert(key.id()) {
                return Err(KeysetValidationError::DuplicateKeyId(key.id()));
            }
            if key.status() != KeyStatus::Destroyed && key.data().is_none() {
                return Err(KeysetValidationError::MissingKeyData(key.id()));
            }
        }

        let primary = self
            .primary_key()
            .ok_or(KeysetValidationError::NoPrimary)?;
        if !primary.is_enabled() {
            return Err(KeysetValidationError::PrimaryNotEnabled);
        }
        Ok(())
    }

    fn validated(self) -> ValidationResult<Self> {
        self.validate()?;
        Ok(self)
    }

    fn position(&self, key_id: u32) -> ValidationResult<usize> {
        self.keys
            .iter()
            .position(|key| key.id() == key_id)
            .ok_or(KeysetValidationError::KeyNotFound(key_id))
    }

    /// Appends `new_key`, optionally making it the primary.
    ///
    /// 追加 `new_key`，并可选地将其设为主密钥。
    pub fn rotate_add(&self, new_key: Key, make_primary: bool) -> ValidationResult<Self> {
        if self.key(new_key.id()).is_some() {
            return Err(KeysetValidationError::DuplicateKeyId(new_key.id()));
        }
        let primary_key_id = if make_primary {
            new_key.id()
        } else {
            self.primary_key_id
        };
        let mut keys = self.keys.clone();
        keys.push(new_key);
        Self::new(keys, primary_key_id).validated()
    }

    /// Changes the status of a key. The primary can only stay enabled, and a
    /// destroyed key can never come back.
    pub fn set_status(&self, key_id: u32, new_status: KeyStatus) -> ValidationResult<Self> {
        let index = self.position(key_id)?;
        if key_id == self.primary_key_id && new_status != KeyStatus::Enabled {
            return Err(KeysetValidationError::PrimaryCannotBeDisabled);
        }
        let current = &self.keys[index];
        if current.status() == KeyStatus::Destroyed && new_status != KeyStatus::Destroyed {
            return Err(KeysetValidationError::KeyDestroyed(key_id));
        }

        let mut keys = self.keys.clone();
        keys[index] = current.with_status(new_status);
        Self::new(keys, self.primary_key_id).validated()
    }

    /// Irreversibly destroys a key, erasing its key data.
    pub fn destroy(&self, key_id: u32) -> ValidationResult<Self> {
        self.set_status(key_id, KeyStatus::Destroyed)
    }

    pub fn set_primary(&self, key_id: u32) -> ValidationResult<Self> {
        let index = self.position(key_id)?;
        match self.keys[index].status() {
            KeyStatus::Enabled => Self::new(self.keys.clone(), key_id).validated(),
            KeyStatus::Destroyed => Err(KeysetValidationError::KeyDestroyed(key_id)),
            KeyStatus::Disabled => Err(KeysetValidationError::PrimaryNotEnabled),
        }
    }

    /// Removes a non-primary key entirely.
    pub fn delete(&self, key_id: u32) -> ValidationResult<Self> {
        let index = self.position(key_id)?;
        if key_id == self.primary_key_id {
            return Err(KeysetValidationError::PrimaryCannotBeDisabled);
        }
        let mut keys = self.keys.clone();
        keys.remove(index);
        Self::new(keys, self.primary_key_id).validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(tag: u8) -> KeyData {
        KeyData::new("test/aead", vec![tag; 32], KeyMaterialKind::Symmetric)
    }

    fn single(id: u32) -> Keyset {
        Keyset::with_primary(Key::enabled(id, data(1), OutputPrefixType::Tink)).unwrap()
    }

    #[test]
    fn test_validate_detects_each_invariant() {
        let dup = Keyset::new(
            vec![
                Key::enabled(1, data(1), OutputPrefixType::Tink),
                Key::enabled(1, data(2), OutputPrefixType::Raw),
            ],
            1,
        );
        assert_eq!(dup.validate(), Err(KeysetValidationError::DuplicateKeyId(1)));

        let no_primary = Keyset::new(vec![Key::enabled(1, data(1), OutputPrefixType::Tink)], 9);
        assert_eq!(no_primary.validate(), Err(KeysetValidationError::NoPrimary));

        let disabled_primary = Keyset::new(
            vec![Key::new(1, data(1), KeyStatus::Disabled, OutputPrefixType::Tink)],
            1,
        );
        assert_eq!(
            disabled_primary.validate(),
            Err(KeysetValidationError::PrimaryNotEnabled)
        );

        assert_eq!(Keyset::new(vec![], 0).validate(), Err(KeysetValidationError::NoPrimary));
    }

    #[test]
    fn test_rotate_add_rejects_duplicate_id() {
        let keyset = single(1);
        let err = keyset
            .rotate_add(Key::enabled(1, data(2), OutputPrefixType::Tink), false)
            .unwrap_err();
        assert_eq!(err, KeysetValidationError::DuplicateKeyId(1));
    }

    #[test]
    fn test_rotate_add_keeps_order_and_original() {
        let keyset = single(1);
        let rotated = keyset
            .rotate_add(Key::enabled(2, data(2), OutputPrefixType::Tink), true)
            .unwrap();
        assert_eq!(rotated.primary_key_id(), 2);
        assert_eq!(
            rotated.keys().iter().map(Key::id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        // The source value is untouched.
        assert_eq!(keyset.primary_key_id(), 1);
        assert_eq!(keyset.len(), 1);
    }

    #[test]
    fn test_adding_disabled_key_as_primary_fails() {
        let keyset = single(1);
        let err = keyset
            .rotate_add(
                Key::new(2, data(2), KeyStatus::Disabled, OutputPrefixType::Tink),
                true,
            )
            .unwrap_err();
        assert_eq!(err, KeysetValidationError::PrimaryNotEnabled);
    }

    #[test]
    fn test_primary_cannot_be_disabled() {
        let keyset = single(1);
        assert_eq!(
            keyset.set_status(1, KeyStatus::Disabled),
            Err(KeysetValidationError::PrimaryCannotBeDisabled)
        );
        assert_eq!(
            keyset.destroy(1),
            Err(KeysetValidationError::PrimaryCannotBeDisabled)
        );
        assert_eq!(
            keyset.delete(1),
            Err(KeysetValidationError::PrimaryCannotBeDisabled)
        );
    }

    #[test]
    fn test_destroy_is_irreversible() {
        let keyset = single(1)
            .rotate_add(Key::enabled(2, data(2), OutputPrefixType::Tink), false)
            .unwrap()
            .destroy(2)
            .unwrap();
        let destroyed = keyset.key(2).unwrap();
        assert_eq!(destroyed.status(), KeyStatus::Destroyed);
        assert!(destroyed.data().is_none());

        assert_eq!(
            keyset.set_status(2, KeyStatus::Enabled),
            Err(KeysetValidationError::KeyDestroyed(2))
        );
        assert_eq!(keyset.set_primary(2), Err(KeysetValidationError::KeyDestroyed(2)));
    }

    #[test]
    fn test_set_primary_and_delete() {
        let keyset = single(1)
            .rotate_add(Key::enabled(2, data(2), OutputPrefixType::Raw), false)
            .unwrap();
        let switched = keyset.set_primary(2).unwrap();
        assert_eq!(switched.primary_key_id(), 2);

        let pruned = switched.delete(1).unwrap();
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.delete(7), Err(KeysetValidationError::KeyNotFound(7)));

        let disabled = keyset.set_status(2, KeyStatus::Disabled).unwrap();
        assert_eq!(
            disabled.set_primary(2),
            Err(KeysetValidationError::PrimaryNotEnabled)
        );
    }
}
