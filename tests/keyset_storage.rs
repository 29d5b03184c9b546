//! Writing and reading keysets, encrypted and in cleartext, through files and
//! in-memory buffers.

use seal_keyset::error::ConsumeError;
use seal_keyset::handle::cleartext;
use seal_keyset::prelude::*;
use seal_keyset::Error;
use std::fs::File;
use std::io::Cursor;

fn registry() -> anyhow::Result<Registry> {
    let registry = Registry::new();
    Config::default().register(&registry)?;
    Ok(registry)
}

fn master_aead(registry: &Registry) -> anyhow::Result<KeysetAead> {
    let handle = KeysetHandle::generate_new_with(&templates::aes256_gcm()?, registry)?;
    Ok(handle.primitive_with(registry)?)
}

fn rotated_handle(registry: &Registry) -> anyhow::Result<KeysetHandle> {
    let mut manager = KeysetManager::new();
    manager.add(&templates::chacha20_poly1305(), registry)?;
    manager.rotate(&templates::aes128_gcm()?, registry)?;
    let disabled = manager.add(&templates::xchacha20_poly1305(), registry)?;
    manager.disable(disabled)?;
    Ok(manager.handle()?)
}

#[test]
fn test_encrypted_file_round_trip() -> anyhow::Result<()> {
    let registry = registry()?;
    let master = master_aead(&registry)?;
    let handle = rotated_handle(&registry)?;
    let aead: KeysetAead = handle.primitive_with(&registry)?;
    let ciphertext = aead.encrypt(b"stored data", b"")?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keyset.bin");
    handle.write(File::create(&path)?, Some(&master))?;

    let restored = KeysetHandle::read(File::open(&path)?, Some(&master))?;
    assert_eq!(restored.keyset_info(), handle.keyset_info());
    let restored_aead: KeysetAead = restored.primitive_with(&registry)?;
    assert_eq!(restored_aead.decrypt(&ciphertext, b"")?, b"stored data");
    Ok(())
}

#[test]
fn test_encrypted_keyset_does_not_contain_key_material() -> anyhow::Result<()> {
    let registry = registry()?;
    let master = master_aead(&registry)?;
    let handle = rotated_handle(&registry)?;

    let mut stored = Vec::new();
    handle.write(&mut stored, Some(&master))?;

    let keyset = cleartext::export_cleartext(&handle);
    for key in keyset.keys() {
        let material = key.data().map(KeyData::material).unwrap_or_default();
        assert!(!stored.windows(material.len()).any(|window| window == material));
    }
    Ok(())
}

#[test]
fn test_wrong_master_key_fails() -> anyhow::Result<()> {
    let registry = registry()?;
    let handle = rotated_handle(&registry)?;

    let mut stored = Vec::new();
    handle.write(&mut stored, Some(&master_aead(&registry)?))?;

    let other = master_aead(&registry)?;
    assert!(matches!(
        KeysetHandle::read(Cursor::new(&stored), Some(&other)),
        Err(Error::DecryptError)
    ));
    Ok(())
}

#[test]
fn test_associated_data_binding() -> anyhow::Result<()> {
    let registry = registry()?;
    let master = master_aead(&registry)?;
    let handle = rotated_handle(&registry)?;

    let mut stored = Vec::new();
    handle.write_with_associated_data(&mut stored, &master, b"tenant-a")?;

    let restored =
        KeysetHandle::read_with_associated_data(Cursor::new(&stored), &master, b"tenant-a")?;
    assert_eq!(restored.primary_key_id(), handle.primary_key_id());
    assert!(matches!(
        KeysetHandle::read_with_associated_data(Cursor::new(&stored), &master, b"tenant-b"),
        Err(Error::DecryptError)
    ));
    // The stored associated data is used when the caller supplies none.
    assert!(KeysetHandle::read(Cursor::new(&stored), Some(&master)).is_ok());
    Ok(())
}

#[test]
fn test_cleartext_round_trip_and_format_mismatch() -> anyhow::Result<()> {
    let registry = registry()?;
    let master = master_aead(&registry)?;
    let handle = rotated_handle(&registry)?;

    let mut plain = Vec::new();
    handle.write(&mut plain, None)?;
    let restored = KeysetHandle::read(Cursor::new(&plain), None)?;
    assert_eq!(
        cleartext::export_cleartext(&restored),
        cleartext::export_cleartext(&handle)
    );

    assert!(matches!(
        KeysetHandle::read(Cursor::new(&plain), Some(&master)),
        Err(Error::UnsupportedOperation(_))
    ));

    let mut encrypted = Vec::new();
    handle.write(&mut encrypted, Some(&master))?;
    assert!(matches!(
        KeysetHandle::read(Cursor::new(&encrypted), None),
        Err(Error::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn test_truncated_input_is_rejected() -> anyhow::Result<()> {
    let registry = registry()?;
    let handle = rotated_handle(&registry)?;
    let mut plain = Vec::new();
    handle.write(&mut plain, None)?;

    plain.truncate(plain.len() / 2);
    assert!(KeysetHandle::read(Cursor::new(&plain), None).is_err());
    Ok(())
}

#[test]
fn test_oversized_length_prefix_is_rejected() -> anyhow::Result<()> {
    // Cleartext tag, then a key count of 2^40.
    let mut bytes = vec![0x00, 0xFD];
    bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
    assert!(matches!(
        KeysetHandle::read(Cursor::new(&bytes), None),
        Err(Error::BincodeError(_))
    ));

    // Encrypted tag, then a ciphertext length of 2^40.
    let registry = registry()?;
    let master = master_aead(&registry)?;
    bytes[0] = 0x01;
    assert!(matches!(
        KeysetHandle::read(Cursor::new(&bytes), Some(&master)),
        Err(Error::BincodeError(_))
    ));
    Ok(())
}

#[test]
fn test_decrypt_with_stale_keyset_fails_opaquely() -> anyhow::Result<()> {
    let registry = registry()?;
    let handle = rotated_handle(&registry)?;
    let aead: KeysetAead = handle.primitive_with(&registry)?;
    let ciphertext = aead.encrypt(b"data", b"")?;

    let unrelated = KeysetHandle::generate_new_with(&templates::aes128_gcm()?, &registry)?;
    let unrelated: KeysetAead = unrelated.primitive_with(&registry)?;
    assert!(matches!(
        unrelated.decrypt(&ciphertext, b""),
        Err(Error::Consume(ConsumeError::AuthenticationFailed))
    ));
    Ok(())
}

#[cfg(feature = "async")]
mod asynchronous {
    use super::*;

    #[tokio::test]
    async fn test_async_file_round_trip() -> anyhow::Result<()> {
        let registry = registry()?;
        let master = master_aead(&registry)?;
        let handle = rotated_handle(&registry)?;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keyset.async.bin");
        let file = tokio::fs::File::create(&path).await?;
        handle.write_async(file, Some(&master)).await?;

        let file = tokio::fs::File::open(&path).await?;
        let restored = KeysetHandle::read_async(file, Some(&master)).await?;
        assert_eq!(restored.keyset_info(), handle.keyset_info());
        Ok(())
    }

    #[tokio::test]
    async fn test_async_matches_sync_format() -> anyhow::Result<()> {
        let registry = registry()?;
        let handle = rotated_handle(&registry)?;

        let mut sync_bytes = Vec::new();
        handle.write(&mut sync_bytes, None)?;

        let restored = KeysetHandle::read_async(sync_bytes.as_slice(), None).await?;
        assert_eq!(
            cleartext::export_cleartext(&restored),
            cleartext::export_cleartext(&handle)
        );
        Ok(())
    }
}
