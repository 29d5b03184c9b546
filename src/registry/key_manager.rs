//! The capability surface each concrete key type implementation exposes.
//!
//! 每个具体密钥类型实现所暴露的能力接口。

use crate::error::{Error, Result};
use crate::keyset::{KeyData, OutputPrefixType};
use crate::primitives::{Aead, HybridDecrypt, HybridEncrypt, Mac, Signer, Verifier};
use bincode::{Decode, Encode};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The family of primitive a key type produces.
///
/// 密钥类型所产生的原语类别。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Decode, Encode)]
pub enum PrimitiveKind {
    Aead,
    Mac,
    Signer,
    Verifier,
    HybridEncrypt,
    HybridDecrypt,
}

/// A primitive instantiated from one key, tagged with its kind.
///
/// 由单个密钥实例化出的原语，并带有其类别标签。
pub enum Primitive {
    Aead(Box<dyn Aead>),
    Mac(Box<dyn Mac>),
    Signer(Box<dyn Signer>),
    Verifier(Box<dyn Verifier>),
    HybridEncrypt(Box<dyn HybridEncrypt>),
    HybridDecrypt(Box<dyn HybridDecrypt>),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Aead(_) => PrimitiveKind::Aead,
            Self::Mac(_) => PrimitiveKind::Mac,
            Self::Signer(_) => PrimitiveKind::Signer,
            Self::Verifier(_) => PrimitiveKind::Verifier,
            Self::HybridEncrypt(_) => PrimitiveKind::HybridEncrypt,
            Self::HybridDecrypt(_) => PrimitiveKind::HybridDecrypt,
        }
    }
}

/// Describes how to generate a new key: which key type, the manager-specific
/// parameters and the output prefix style of the resulting key.
///
/// 描述如何生成新密钥：密钥类型、管理器特定参数以及生成密钥的输出前缀风格。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct KeyTemplate {
    pub type_id: String,
    pub params: Vec<u8>,
    pub prefix_type: OutputPrefixType,
}

impl KeyTemplate {
    pub fn new(
        type_id: impl Into<String>,
        params: Vec<u8>,
        prefix_type: OutputPrefixType,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            params,
            prefix_type,
        }
    }

    /// Same template with another output prefix style.
    pub fn with_prefix_type(mut self, prefix_type: OutputPrefixType) -> Self {
        self.prefix_type = prefix_type;
        self
    }
}

/// A key manager turns `KeyData` of the types it supports into primitives,
/// and optionally generates fresh key data.
///
/// Users can implement this for their own algorithms or remote services and
/// register it in a [`Registry`](crate::registry::Registry).
///
/// 密钥管理器将其支持类型的 `KeyData` 转换为原语，并可选地生成新的密钥数据。
/// 用户可以为自己的算法或远程服务实现此 trait，并将其注册到注册表中。
pub trait KeyManager: Send + Sync {
    /// The key type this manager is normally registered under.
    fn type_id(&self) -> &str;

    /// The kind of primitive [`KeyManager::primitive`] returns.
    fn primitive_kind(&self) -> PrimitiveKind;

    fn supports(&self, type_id: &str) -> bool {
        type_id == self.type_id()
    }

    /// Instantiates a primitive from key data. May block, e.g. for a remote
    /// key whose primitive is obtained from a key management service.
    fn primitive(&self, key_data: &KeyData) -> Result<Primitive>;

    fn new_key_data(&self, _params: &[u8]) -> Result<KeyData> {
        Err(Error::UnsupportedOperation(format!(
            "key type `{}` does not support key generation",
            self.type_id()
        )))
    }

    /// Derives the public counterpart of a private key. Only private key
    /// managers implement this.
    fn public_key_data(&self, _private_key_data: &KeyData) -> Result<KeyData> {
        Err(Error::NotAsymmetric)
    }
}
