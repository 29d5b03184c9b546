//! Keys that live in a remote key management service.
//!
//! A remote key's material is only a key URI. Instantiating it asks the
//! injected [`KmsClient`] for an [`Aead`] bound to that URI, which may block
//! on network I/O. Remote keys cannot be generated locally; add them to a
//! keyset with [`KeysetManager::import`](crate::keyset::KeysetManager::import).
//!
//! 存放在远程密钥管理服务中的密钥。其材料仅为密钥 URI，实例化时通过注入的 [`KmsClient`] 获取 AEAD，
//! 可能阻塞于网络 I/O。远程密钥无法在本地生成。

use super::KMS_AEAD_TYPE_ID;
use crate::error::{Error, PrimitiveConstructionError, Result};
use crate::keyset::{KeyData, KeyMaterialKind};
use crate::primitives::Aead;
use crate::registry::{KeyManager, Primitive, PrimitiveKind};
use std::fmt;
use std::sync::Arc;

/// A client of a key management service.
///
/// 密钥管理服务客户端。
pub trait KmsClient: Send + Sync {
    /// Whether this client can serve `key_uri`.
    fn supports(&self, key_uri: &str) -> bool;

    /// Returns an AEAD whose key never leaves the service.
    fn aead(&self, key_uri: &str) -> Result<Box<dyn Aead>>;
}

/// Builds the key data of a remote AEAD key.
pub fn key_data(key_uri: &str) -> KeyData {
    KeyData::new(
        KMS_AEAD_TYPE_ID,
        key_uri.as_bytes().to_vec(),
        KeyMaterialKind::Remote,
    )
}

/// Delegates AEAD keys to the first client that supports their URI.
#[derive(Clone)]
pub struct KmsAeadKeyManager {
    clients: Vec<Arc<dyn KmsClient>>,
}

impl fmt::Debug for KmsAeadKeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsAeadKeyManager")
            .field("clients", &self.clients.len())
            .finish()
    }
}

impl KmsAeadKeyManager {
    pub fn new(clients: Vec<Arc<dyn KmsClient>>) -> Self {
        Self { clients }
    }
}

impl KeyManager for KmsAeadKeyManager {
    fn type_id(&self) -> &str {
        KMS_AEAD_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Aead
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let key_uri = std::str::from_utf8(key_data.material()).map_err(|_| {
            PrimitiveConstructionError::InvalidKeyMaterial("key URI is not UTF-8".to_string())
        })?;
        let client = self
            .clients
            .iter()
            .find(|client| client.supports(key_uri))
            .ok_or_else(|| Error::Kms(format!("no KMS client supports `{key_uri}`")))?;
        Ok(Primitive::Aead(client.aead(key_uri)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoClient;

    impl KmsClient for NoClient {
        fn supports(&self, _key_uri: &str) -> bool {
            false
        }

        fn aead(&self, key_uri: &str) -> Result<Box<dyn Aead>> {
            Err(Error::Kms(format!("unexpected request for {key_uri}")))
        }
    }

    #[test]
    fn test_unsupported_uri() {
        let manager = KmsAeadKeyManager::new(vec![Arc::new(NoClient)]);
        assert!(matches!(
            manager.primitive(&key_data("fake-kms://a")),
            Err(Error::Kms(_))
        ));
        assert!(matches!(
            manager.new_key_data(&[]),
            Err(Error::UnsupportedOperation(_))
        ));
    }
}
