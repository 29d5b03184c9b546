//! Key-level value types: key data, status and output prefix style.
//!
//! 密钥层面的值类型：密钥数据、状态与输出前缀风格。
use bincode::{Decode, Encode};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// What kind of material a `KeyData` carries.
///
/// `KeyData` 所携带材料的类别。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Decode, Encode)]
pub enum KeyMaterialKind {
    Symmetric,
    AsymmetricPrivate,
    AsymmetricPublic,
    /// The operation is delegated to an external service such as a KMS.
    ///
    /// 密码学操作委托给外部服务（例如 KMS）。
    Remote,
}

/// Governs whether and how an identifying prefix is attached to outputs.
///
/// 决定是否以及如何在输出前附加标识前缀。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Decode, Encode)]
pub enum OutputPrefixType {
    Tink,
    Legacy,
    Crunchy,
    Raw,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Decode, Encode)]
pub enum KeyStatus {
    Enabled,
    Disabled,
    Destroyed,
}

/// Opaque key material tagged with the key type that understands it.
///
/// The material is held in a zeroizing buffer and never printed.
///
/// 带有密钥类型标签的不透明密钥材料。材料保存在自动清零的缓冲区中，且永不打印。
#[derive(Clone, PartialEq, Eq)]
pub struct KeyData {
    type_id: String,
    material: Zeroizing<Vec<u8>>,
    material_kind: KeyMaterialKind,
}

impl KeyData {
    pub fn new(
        type_id: impl Into<String>,
        material: impl Into<Zeroizing<Vec<u8>>>,
        material_kind: KeyMaterialKind,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            material: material.into(),
            material_kind,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn material(&self) -> &[u8] {
        &self.material
    }

    pub fn material_kind(&self) -> KeyMaterialKind {
        self.material_kind
    }
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_id", &self.type_id)
            .field("material_kind", &self.material_kind)
            .field("material", &"[REDACTED]")
            .finish()
    }
}

/// A single key of a keyset.
///
/// A destroyed key keeps its id, status and prefix type only; its data is
/// dropped (and zeroized) on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    id: u32,
    data: Option<KeyData>,
    status: KeyStatus,
    prefix_type: OutputPrefixType,
}

impl Key {
    pub fn new(
        id: u32,
        data: KeyData,
        status: KeyStatus,
        prefix_type: OutputPrefixType,
    ) -> Self {
        Self::from_parts(id, Some(data), status, prefix_type)
    }

    /// Shorthand for an enabled key.
    pub fn enabled(id: u32, data: KeyData, prefix_type: OutputPrefixType) -> Self {
        Self::new(id, data, KeyStatus::Enabled, prefix_type)
    }

    pub(crate) fn from_parts(
        id: u32,
        data: Option<KeyData>,
        status: KeyStatus,
        prefix_type: OutputPrefixType,
    ) -> Self {
        let data = if status == KeyStatus::Destroyed { None } else { data };
        Self {
            id,
            data,
            status,
            prefix_type,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// `None` only for destroyed keys.
    pub fn data(&self) -> Option<&KeyData> {
        self.data.as_ref()
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn prefix_type(&self) -> OutputPrefixType {
        self.prefix_type
    }

    pub fn is_enabled(&self) -> bool {
        self.status == KeyStatus::Enabled
    }

    /// Same key with a different status. Destroying drops the data.
    pub(crate) fn with_status(&self, status: KeyStatus) -> Self {
        Self::from_parts(self.id, self.data.clone(), status, self.prefix_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> KeyData {
        KeyData::new("test/key", vec![7u8; 16], KeyMaterialKind::Symmetric)
    }

    #[test]
    fn test_destroyed_key_drops_data() {
        let key = Key::new(3, sample_data(), KeyStatus::Destroyed, OutputPrefixType::Tink);
        assert!(key.data().is_none());
        assert_eq!(key.id(), 3);
        assert_eq!(key.prefix_type(), OutputPrefixType::Tink);

        let enabled = Key::enabled(4, sample_data(), OutputPrefixType::Raw);
        let destroyed = enabled.with_status(KeyStatus::Destroyed);
        assert!(destroyed.data().is_none());
        assert_eq!(destroyed.status(), KeyStatus::Destroyed);
    }

    #[test]
    fn test_key_data_debug_is_redacted() {
        let rendered = format!("{:?}", sample_data());
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("7, 7"));
    }
}
