//! Remote keys: the keyset holds only a key URI and a fake KMS client performs
//! the cryptography.

use seal_keyset::algorithms::remote::{self, KmsClient};
use seal_keyset::algorithms::KMS_AEAD_TYPE_ID;
use seal_keyset::error::ConsumeError;
use seal_keyset::prelude::*;
use seal_keyset::Error;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const KEY_URI: &str = "fake-kms://projects/test/keys/master";

/// Serves each known URI with a locally held AEAD.
struct FakeKms {
    keys: HashMap<String, KeysetHandle>,
    registry: Registry,
    requests: AtomicUsize,
}

impl FakeKms {
    fn new(uris: &[&str]) -> anyhow::Result<Self> {
        let registry = Registry::new();
        ConfigBuilder::new()
            .with_mac(false)
            .with_signature(false)
            .with_hybrid(false)
            .build()
            .register(&registry)?;

        let mut keys = HashMap::new();
        for uri in uris {
            let handle = KeysetHandle::generate_new_with(&templates::aes256_gcm()?, &registry)?;
            keys.insert(uri.to_string(), handle);
        }
        Ok(Self {
            keys,
            registry,
            requests: AtomicUsize::new(0),
        })
    }
}

impl KmsClient for FakeKms {
    fn supports(&self, key_uri: &str) -> bool {
        key_uri.starts_with("fake-kms://")
    }

    fn aead(&self, key_uri: &str) -> seal_keyset::Result<Box<dyn Aead>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let handle = self
            .keys
            .get(key_uri)
            .ok_or_else(|| Error::Kms(format!("unknown key {key_uri}")))?;
        let aead: KeysetAead = handle.primitive_with(&self.registry)?;
        Ok(Box::new(aead))
    }
}

fn registry(kms: Arc<FakeKms>) -> anyhow::Result<Registry> {
    let registry = Registry::new();
    ConfigBuilder::new()
        .with_kms_client(kms)
        .build()
        .register(&registry)?;
    Ok(registry)
}

#[test]
fn test_remote_key_round_trip() -> anyhow::Result<()> {
    let kms = Arc::new(FakeKms::new(&[KEY_URI])?);
    let registry = registry(kms.clone())?;

    let mut manager = KeysetManager::new();
    manager.import(remote::key_data(KEY_URI), OutputPrefixType::Tink, true)?;
    let handle = manager.handle()?;

    let aead: KeysetAead = handle.primitive_with(&registry)?;
    assert_eq!(kms.requests.load(Ordering::SeqCst), 1);

    let ciphertext = aead.encrypt(b"wrapped", b"ad")?;
    assert_eq!(aead.decrypt(&ciphertext, b"ad")?, b"wrapped");
    assert!(matches!(
        aead.decrypt(&ciphertext, b"wrong"),
        Err(Error::Consume(ConsumeError::AuthenticationFailed))
    ));
    Ok(())
}

#[test]
fn test_remote_keys_cannot_be_generated() -> anyhow::Result<()> {
    let registry = registry(Arc::new(FakeKms::new(&[])?))?;
    assert!(matches!(
        registry.new_key(KMS_AEAD_TYPE_ID, &[]),
        Err(Error::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn test_unknown_remote_key_fails_build() -> anyhow::Result<()> {
    let registry = registry(Arc::new(FakeKms::new(&[])?))?;
    let mut manager = KeysetManager::new();
    manager.import(
        remote::key_data("fake-kms://projects/test/keys/missing"),
        OutputPrefixType::Raw,
        true,
    )?;
    let result: seal_keyset::Result<KeysetAead> = manager.handle()?.primitive_with(&registry);
    assert!(matches!(result, Err(Error::Kms(_))));
    Ok(())
}

#[test]
fn test_remote_master_key_encrypts_stored_keyset() -> anyhow::Result<()> {
    let kms = Arc::new(FakeKms::new(&[KEY_URI])?);
    let registry = registry(kms)?;

    let mut master_manager = KeysetManager::new();
    master_manager.import(remote::key_data(KEY_URI), OutputPrefixType::Raw, true)?;
    let master: KeysetAead = master_manager.handle()?.primitive_with(&registry)?;

    let handle = KeysetHandle::generate_new_with(&templates::hmac_sha256_tag32()?, &registry)?;
    let mut stored = Vec::new();
    handle.write(&mut stored, Some(&master))?;

    let restored = KeysetHandle::read(stored.as_slice(), Some(&master))?;
    assert_eq!(restored.keyset_info(), handle.keyset_info());
    Ok(())
}
