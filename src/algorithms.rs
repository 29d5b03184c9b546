//! Built-in key managers and key templates.
//!
//! Each submodule provides the [`KeyManager`](crate::registry::KeyManager)s
//! for one primitive family. They are registered into a
//! [`Registry`](crate::registry::Registry) through
//! [`ConfigBuilder`](crate::config::ConfigBuilder), or individually.
//!
//! 内置密钥管理器与密钥模板。每个子模块提供一类原语的密钥管理器，可通过 `ConfigBuilder` 或单独注册到注册表中。

use crate::codec::CONFIG;
use crate::error::{Error, PrimitiveConstructionError, Result};
use bincode::{Decode, Encode};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroizing;

pub mod hybrid;
pub mod mac;
pub mod remote;
pub mod signature;
pub mod symmetric;
pub mod templates;

pub const AES_GCM_TYPE_ID: &str = "seal.keyset.AesGcmKey";
pub const CHACHA20_POLY1305_TYPE_ID: &str = "seal.keyset.ChaCha20Poly1305Key";
pub const XCHACHA20_POLY1305_TYPE_ID: &str = "seal.keyset.XChaCha20Poly1305Key";
pub const HMAC_SHA256_TYPE_ID: &str = "seal.keyset.HmacSha256Key";
pub const ED25519_PRIVATE_TYPE_ID: &str = "seal.keyset.Ed25519PrivateKey";
pub const ED25519_PUBLIC_TYPE_ID: &str = "seal.keyset.Ed25519PublicKey";
pub const X25519_HKDF_PRIVATE_TYPE_ID: &str = "seal.keyset.X25519HkdfSha256Aes256GcmPrivateKey";
pub const X25519_HKDF_PUBLIC_TYPE_ID: &str = "seal.keyset.X25519HkdfSha256Aes256GcmPublicKey";
pub const KMS_AEAD_TYPE_ID: &str = "seal.keyset.KmsAeadKey";

fn random_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

fn encode_params<T: Encode>(params: &T) -> Result<Vec<u8>> {
    Ok(bincode::encode_to_vec(params, CONFIG)?)
}

fn decode_params<T: Decode<()>>(params: &[u8]) -> Result<T> {
    let (params, _) = bincode::decode_from_slice(params, CONFIG)
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;
    Ok(params)
}

/// Reads a fixed-size key from raw material.
fn fixed_key<const N: usize>(type_id: &str, material: &[u8]) -> Result<Zeroizing<[u8; N]>> {
    let bytes: [u8; N] = material.try_into().map_err(|_| {
        PrimitiveConstructionError::InvalidKeyMaterial(format!(
            "`{type_id}` expects {N} bytes of key material, got {}",
            material.len()
        ))
    })?;
    Ok(Zeroizing::new(bytes))
}
