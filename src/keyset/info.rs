use super::key::{KeyStatus, OutputPrefixType};
use super::Keyset;
use bincode::{Decode, Encode};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metadata about one key, without any key material.
///
/// 单个密钥的元数据，不含任何密钥材料。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct KeyInfo {
    pub key_id: u32,
    pub type_id: Option<String>,
    pub status: KeyStatus,
    pub prefix_type: OutputPrefixType,
}

/// Metadata about a keyset. Safe to log and to store next to an encrypted keyset.
///
/// Keyset 的元数据。可以安全地记录日志，也可以与加密后的 Keyset 一同存储。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct KeysetInfo {
    pub primary_key_id: u32,
    pub key_info: Vec<KeyInfo>,
}

impl From<&Keyset> for KeysetInfo {
    fn from(keyset: &Keyset) -> Self {
        Self {
            primary_key_id: keyset.primary_key_id(),
            key_info: keyset
                .keys()
                .iter()
                .map(|key| KeyInfo {
                    key_id: key.id(),
                    type_id: key.data().map(|data| data.type_id().to_string()),
                    status: key.status(),
                    prefix_type: key.prefix_type(),
                })
                .collect(),
        }
    }
}
