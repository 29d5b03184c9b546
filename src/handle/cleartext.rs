//! The explicit-risk path for raw keysets.
//!
//! This is the only way to turn a [`Keyset`] value into a [`KeysetHandle`] or
//! to get one back out. Serialized cleartext is a separate path:
//! [`KeysetHandle::read`] and [`KeysetHandle::write`] without a master AEAD
//! also move unencrypted key material, and log a warning when they do.
//!
//! 原始 Keyset 的显式风险路径。只有此模块能在 [`Keyset`] 值与 [`KeysetHandle`] 之间相互转换。
//! 序列化的明文是另一条路径：不带主 AEAD 调用 [`KeysetHandle::read`] 和 [`KeysetHandle::write`]
//! 同样会传输未加密的密钥材料，并在此时记录警告。

use super::KeysetHandle;
use crate::error::Result;
use crate::keyset::Keyset;
use tracing::warn;

/// Wraps a cleartext keyset in a handle after validating it.
pub fn from_cleartext(keyset: Keyset) -> Result<KeysetHandle> {
    warn!(keys = keyset.len(), "importing a cleartext keyset");
    KeysetHandle::new(keyset)
}

/// Exports a copy of the raw keyset behind `handle`.
pub fn export_cleartext(handle: &KeysetHandle) -> Keyset {
    warn!(keys = handle.keyset().len(), "exporting a cleartext keyset");
    handle.keyset().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, KeysetValidationError};
    use crate::keyset::{Key, KeyData, KeyMaterialKind, OutputPrefixType};

    #[test]
    fn test_from_cleartext_validates() {
        let data = KeyData::new("test/aead", vec![1u8; 16], KeyMaterialKind::Symmetric);
        let invalid = Keyset::new(vec![Key::enabled(1, data.clone(), OutputPrefixType::Tink)], 2);
        assert!(matches!(
            from_cleartext(invalid),
            Err(Error::Validation(KeysetValidationError::NoPrimary))
        ));

        let keyset = Keyset::new(vec![Key::enabled(1, data, OutputPrefixType::Tink)], 1);
        let handle = from_cleartext(keyset.clone()).unwrap();
        assert_eq!(export_cleartext(&handle), keyset);
    }
}
