//! The key type registry: maps a key type id to the manager that can
//! instantiate and generate keys of that type.
//!
//! Readers load an immutable snapshot of the map and never block. Writers are
//! serialized by a mutex and publish a new snapshot atomically, so a
//! registration is either fully visible or not visible at all.
//!
//! 密钥类型注册表：将密钥类型 ID 映射到能够实例化和生成该类型密钥的管理器。
//! 读取方加载不可变快照，永不阻塞；写入方由互斥锁串行化，并原子地发布新快照。

use crate::error::{Error, PrimitiveConstructionError, RegistrationError, Result};
use crate::keyset::KeyData;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub mod key_manager;

pub use key_manager::{KeyManager, KeyTemplate, Primitive, PrimitiveKind};

/// Options recorded with a registration.
///
/// 注册时记录的选项。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Whether this registration may replace, and may later be replaced by,
    /// another registration of the same key type.
    pub allow_override: bool,
    /// Whether `new_key` may generate keys of this type.
    pub allow_new_key: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            allow_override: false,
            allow_new_key: true,
        }
    }
}

#[derive(Clone)]
struct RegistryEntry {
    manager: Arc<dyn KeyManager>,
    kind: PrimitiveKind,
    options: RegisterOptions,
}

type Snapshot = HashMap<String, RegistryEntry>;

/// A constructible registry. Most code passes an explicit `&Registry`;
/// [`global`] offers a process-wide default instance.
pub struct Registry {
    entries: ArcSwap<Snapshot>,
    write_lock: Mutex<()>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.entries.load();
        let mut type_ids: Vec<&String> = snapshot.keys().collect();
        type_ids.sort();
        f.debug_struct("Registry").field("type_ids", &type_ids).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Registers `manager` for `type_id`.
    ///
    /// Fails with `DuplicateRegistration` if the type is already registered and
    /// either the existing or the new registration does not allow overriding.
    ///
    /// 为 `type_id` 注册 `manager`。若该类型已注册，且现有或新注册任一方不允许覆盖，则返回 `DuplicateRegistration`。
    pub fn register(
        &self,
        type_id: impl Into<String>,
        manager: Arc<dyn KeyManager>,
        kind: PrimitiveKind,
        allow_override: bool,
    ) -> std::result::Result<(), RegistrationError> {
        self.register_with(
            type_id,
            manager,
            kind,
            RegisterOptions {
                allow_override,
                ..RegisterOptions::default()
            },
        )
    }

    /// Registers a manager under the type id and primitive kind it declares.
    pub fn register_key_manager(
        &self,
        manager: Arc<dyn KeyManager>,
        allow_override: bool,
    ) -> std::result::Result<(), RegistrationError> {
        let type_id = manager.type_id().to_string();
        let kind = manager.primitive_kind();
        self.register(type_id, manager, kind, allow_override)
    }

    pub fn register_with(
        &self,
        type_id: impl Into<String>,
        manager: Arc<dyn KeyManager>,
        kind: PrimitiveKind,
        options: RegisterOptions,
    ) -> std::result::Result<(), RegistrationError> {
        let type_id = type_id.into();
        if !manager.supports(&type_id) {
            return Err(RegistrationError::UnsupportedKeyType(type_id));
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let current = self.entries.load_full();
        if let Some(existing) = current.get(&type_id) {
            if !(existing.options.allow_override && options.allow_override) {
                return Err(RegistrationError::DuplicateRegistration(type_id));
            }
            warn!(type_id = %type_id, "overriding registered key manager");
        }

        let mut next = (*current).clone();
        next.insert(
            type_id.clone(),
            RegistryEntry {
                manager,
                kind,
                options,
            },
        );
        self.entries.store(Arc::new(next));
        debug!(type_id = %type_id, ?kind, "registered key manager");
        Ok(())
    }

    fn entry(
        &self,
        type_id: &str,
    ) -> std::result::Result<RegistryEntry, PrimitiveConstructionError> {
        self.entries
            .load()
            .get(type_id)
            .cloned()
            .ok_or_else(|| PrimitiveConstructionError::UnknownKeyType(type_id.to_string()))
    }

    /// Returns the manager registered for `type_id` and the primitive kind it
    /// was registered with.
    pub fn lookup(
        &self,
        type_id: &str,
    ) -> std::result::Result<(Arc<dyn KeyManager>, PrimitiveKind), PrimitiveConstructionError> {
        self.entry(type_id).map(|entry| (entry.manager, entry.kind))
    }

    pub fn is_registered(&self, type_id: &str) -> bool {
        self.entries.load().contains_key(type_id)
    }

    /// Generates fresh key data of `type_id` with manager-specific `params`.
    ///
    /// 使用管理器特定的 `params` 生成 `type_id` 类型的新密钥数据。
    pub fn new_key(&self, type_id: &str, params: &[u8]) -> Result<KeyData> {
        let entry = self.entry(type_id)?;
        if !entry.options.allow_new_key {
            return Err(Error::UnsupportedOperation(format!(
                "key generation is disabled for key type `{type_id}`"
            )));
        }
        entry.manager.new_key_data(params)
    }

    pub fn new_key_from_template(&self, template: &KeyTemplate) -> Result<KeyData> {
        self.new_key(&template.type_id, &template.params)
    }

    /// Instantiates a primitive from key data through its registered manager.
    pub fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let (manager, _) = self.lookup(key_data.type_id())?;
        manager.primitive(key_data)
    }

    /// Derives public key data from private key data.
    pub fn public_key_data(&self, private_key_data: &KeyData) -> Result<KeyData> {
        let (manager, _) = self.lookup(private_key_data.type_id())?;
        manager.public_key_data(private_key_data)
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide default registry. It starts empty; populate it once at
/// start-up, e.g. with [`Config::register`](crate::config::Config::register).
///
/// 进程级默认注册表。初始为空，应在启动时填充一次。
pub fn global() -> &'static Registry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::KeyMaterialKind;
    use crate::primitives::Mac;

    struct FixedMac(u8);

    impl Mac for FixedMac {
        fn compute_mac(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![self.0])
        }

        fn verify_mac(&self, mac: &[u8], _data: &[u8]) -> Result<()> {
            if mac == [self.0] {
                Ok(())
            } else {
                Err(Error::Crypto("mismatch".into()))
            }
        }
    }

    struct FixedMacManager(u8);

    impl KeyManager for FixedMacManager {
        fn type_id(&self) -> &str {
            "test/fixed-mac"
        }

        fn primitive_kind(&self) -> PrimitiveKind {
            PrimitiveKind::Mac
        }

        fn primitive(&self, _key_data: &KeyData) -> Result<Primitive> {
            Ok(Primitive::Mac(Box::new(FixedMac(self.0))))
        }
    }

    fn key_data() -> KeyData {
        KeyData::new("test/fixed-mac", vec![0u8; 4], KeyMaterialKind::Symmetric)
    }

    fn tag_of(registry: &Registry) -> Vec<u8> {
        match registry.primitive(&key_data()).unwrap() {
            Primitive::Mac(mac) => mac.compute_mac(b"").unwrap(),
            _ => panic!("expected a MAC primitive"),
        }
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = Registry::new();
        registry
            .register_key_manager(Arc::new(FixedMacManager(1)), false)
            .unwrap();
        let err = registry
            .register_key_manager(Arc::new(FixedMacManager(2)), false)
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateRegistration("test/fixed-mac".into())
        );
        // A locked registration cannot be replaced even by an overriding one.
        assert!(registry
            .register_key_manager(Arc::new(FixedMacManager(2)), true)
            .is_err());
        assert_eq!(tag_of(&registry), vec![1]);
    }

    #[test]
    fn test_override_when_both_registrations_allow_it() {
        let registry = Registry::new();
        registry
            .register_key_manager(Arc::new(FixedMacManager(1)), true)
            .unwrap();
        registry
            .register_key_manager(Arc::new(FixedMacManager(2)), true)
            .unwrap();
        let (manager, kind) = registry.lookup("test/fixed-mac").unwrap();
        assert_eq!(kind, PrimitiveKind::Mac);
        assert_eq!(manager.type_id(), "test/fixed-mac");
        assert_eq!(tag_of(&registry), vec![2]);
    }

    #[test]
    fn test_unknown_type_and_unsupported_generation() {
        let registry = Registry::new();
        assert_eq!(
            registry.lookup("missing").err(),
            Some(PrimitiveConstructionError::UnknownKeyType("missing".into()))
        );

        registry
            .register_key_manager(Arc::new(FixedMacManager(1)), false)
            .unwrap();
        assert!(matches!(
            registry.new_key("test/fixed-mac", &[]),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_manager_must_support_type_id() {
        let registry = Registry::new();
        let err = registry
            .register("other/type", Arc::new(FixedMacManager(1)), PrimitiveKind::Mac, false)
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnsupportedKeyType("other/type".into()));
    }

    #[test]
    fn test_concurrent_readers_see_complete_registrations() {
        let registry = Registry::new();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                registry
                    .register_key_manager(Arc::new(FixedMacManager(9)), false)
                    .unwrap();
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        if let Ok((_, kind)) = registry.lookup("test/fixed-mac") {
                            assert_eq!(kind, PrimitiveKind::Mac);
                        }
                    }
                });
            }
        });
        assert!(registry.is_registered("test/fixed-mac"));
    }
}
