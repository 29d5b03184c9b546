//! Selects which built-in key managers get registered into a [`Registry`].
//!
//! 选择将哪些内置密钥管理器注册到 [`Registry`] 中。

use crate::algorithms::hybrid::{X25519HkdfPrivateKeyManager, X25519HkdfPublicKeyManager};
use crate::algorithms::mac::HmacSha256KeyManager;
use crate::algorithms::remote::{KmsAeadKeyManager, KmsClient};
use crate::algorithms::signature::{Ed25519PrivateKeyManager, Ed25519PublicKeyManager};
use crate::algorithms::symmetric::{
    AesGcmKeyManager, ChaCha20Poly1305KeyManager, XChaCha20Poly1305KeyManager,
};
use crate::algorithms::KMS_AEAD_TYPE_ID;
use crate::error::Result;
use crate::registry::{KeyManager, PrimitiveKind, RegisterOptions, Registry};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct ConfigIndex {
    aead: bool,
    mac: bool,
    signature: bool,
    hybrid: bool,
    kms_clients: Vec<Arc<dyn KmsClient>>,
    allow_override: bool,
}

/// An immutable, cheaply clonable registration plan.
///
/// 不可变且可廉价克隆的注册配置。
#[derive(Clone)]
pub struct Config {
    index: Arc<ConfigIndex>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("aead", &self.index.aead)
            .field("mac", &self.index.mac)
            .field("signature", &self.index.signature)
            .field("hybrid", &self.index.hybrid)
            .field("kms_clients", &self.index.kms_clients.len())
            .field("allow_override", &self.index.allow_override)
            .finish()
    }
}

impl Config {
    pub fn allow_override(&self) -> bool {
        self.index.allow_override
    }

    fn managers(&self) -> Vec<Arc<dyn KeyManager>> {
        let index = &self.index;
        let mut managers: Vec<Arc<dyn KeyManager>> = Vec::new();
        if index.aead {
            managers.push(Arc::new(AesGcmKeyManager::new()));
            managers.push(Arc::new(ChaCha20Poly1305KeyManager::new()));
            managers.push(Arc::new(XChaCha20Poly1305KeyManager::new()));
        }
        if index.mac {
            managers.push(Arc::new(HmacSha256KeyManager::new()));
        }
        if index.signature {
            managers.push(Arc::new(Ed25519PrivateKeyManager::new()));
            managers.push(Arc::new(Ed25519PublicKeyManager::new()));
        }
        if index.hybrid {
            managers.push(Arc::new(X25519HkdfPrivateKeyManager::new()));
            managers.push(Arc::new(X25519HkdfPublicKeyManager::new()));
        }
        managers
    }

    /// Registers every selected key manager into `registry`.
    ///
    /// Stops at the first failed registration; registrations made before it
    /// stay in place.
    ///
    /// 将所有选中的密钥管理器注册到 `registry`。遇到第一个失败时停止，之前的注册保留。
    pub fn register(&self, registry: &Registry) -> Result<()> {
        let allow_override = self.index.allow_override;
        let managers = self.managers();
        let count = managers.len();
        for manager in managers {
            registry.register_key_manager(manager, allow_override)?;
        }

        if !self.index.kms_clients.is_empty() {
            registry.register_with(
                KMS_AEAD_TYPE_ID,
                Arc::new(KmsAeadKeyManager::new(self.index.kms_clients.clone())),
                PrimitiveKind::Aead,
                RegisterOptions {
                    allow_override,
                    allow_new_key: false,
                },
            )?;
        }

        debug!(
            managers = count,
            kms_clients = self.index.kms_clients.len(),
            "registered built-in key managers"
        );
        Ok(())
    }
}

/// Builder for [`Config`]. Every built-in catalog is selected by default.
///
/// [`Config`] 的构建器。默认选中所有内置类别。
pub struct ConfigBuilder {
    aead: bool,
    mac: bool,
    signature: bool,
    hybrid: bool,
    kms_clients: Vec<Arc<dyn KmsClient>>,
    allow_override: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            aead: true,
            mac: true,
            signature: true,
            hybrid: true,
            kms_clients: Vec::new(),
            allow_override: false,
        }
    }

    pub fn with_aead(mut self, enabled: bool) -> Self {
        self.aead = enabled;
        self
    }

    pub fn with_mac(mut self, enabled: bool) -> Self {
        self.mac = enabled;
        self
    }

    pub fn with_signature(mut self, enabled: bool) -> Self {
        self.signature = enabled;
        self
    }

    pub fn with_hybrid(mut self, enabled: bool) -> Self {
        self.hybrid = enabled;
        self
    }

    /// Adds a KMS client; the remote AEAD key manager is registered once at
    /// least one client is present.
    pub fn with_kms_client(mut self, client: Arc<dyn KmsClient>) -> Self {
        self.kms_clients.push(client);
        self
    }

    pub fn allow_override(mut self, allow_override: bool) -> Self {
        self.allow_override = allow_override;
        self
    }

    pub fn build(self) -> Config {
        Config {
            index: Arc::new(ConfigIndex {
                aead: self.aead,
                mac: self.mac,
                signature: self.signature,
                hybrid: self.hybrid,
                kms_clients: self.kms_clients,
                allow_override: self.allow_override,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{AES_GCM_TYPE_ID, ED25519_PUBLIC_TYPE_ID, HMAC_SHA256_TYPE_ID};
    use crate::error::{Error, RegistrationError};

    #[test]
    fn test_register_selected_catalogs() {
        let registry = Registry::new();
        ConfigBuilder::new()
            .with_mac(false)
            .build()
            .register(&registry)
            .unwrap();

        assert!(registry.is_registered(AES_GCM_TYPE_ID));
        assert!(registry.is_registered(ED25519_PUBLIC_TYPE_ID));
        assert!(!registry.is_registered(HMAC_SHA256_TYPE_ID));
        assert!(!registry.is_registered(KMS_AEAD_TYPE_ID));
    }

    #[test]
    fn test_second_registration_requires_override() {
        let registry = Registry::new();
        Config::default().register(&registry).unwrap();
        assert!(matches!(
            Config::default().register(&registry),
            Err(Error::Registration(RegistrationError::DuplicateRegistration(_)))
        ));

        let overriding = Registry::new();
        let config = ConfigBuilder::new().allow_override(true).build();
        config.register(&overriding).unwrap();
        config.register(&overriding).unwrap();
    }
}
