//! ECIES-style hybrid encryption: X25519 key agreement, HKDF-SHA256 key
//! derivation and AES-256-GCM.
//!
//! Ciphertext layout: `ephemeral_public_key (32) || nonce (12) || ciphertext || tag`.
//! HKDF uses the ephemeral public key as salt and `context_info` as info, so
//! the context is bound to the derived key.
//!
//! 混合加密：X25519 密钥协商、HKDF-SHA256 密钥派生与 AES-256-GCM。
//! 密文布局为 `临时公钥 (32) || nonce (12) || 密文 || 标签`。

use super::symmetric::AeadCipher;
use super::{fixed_key, random_bytes, X25519_HKDF_PRIVATE_TYPE_ID, X25519_HKDF_PUBLIC_TYPE_ID};
use crate::error::{ConsumeError, Error, Result};
use crate::keyset::{KeyData, KeyMaterialKind};
use crate::primitives::{Aead, HybridDecrypt, HybridEncrypt};
use crate::registry::{KeyManager, Primitive, PrimitiveKind};
use aes_gcm::Aes256Gcm;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

const X25519_KEY_SIZE: usize = 32;
const DEM_KEY_SIZE: usize = 32;

fn derive_dem(
    shared_secret: &[u8],
    ephemeral_public: &[u8; X25519_KEY_SIZE],
    context_info: &[u8],
) -> Result<AeadCipher<Aes256Gcm>> {
    let mut okm = Zeroizing::new([0u8; DEM_KEY_SIZE]);
    Hkdf::<Sha256>::new(Some(ephemeral_public.as_slice()), shared_secret)
        .expand(context_info, &mut okm[..])
        .map_err(|e| Error::Crypto(e.to_string()))?;
    AeadCipher::new(X25519_HKDF_PRIVATE_TYPE_ID, &okm[..])
}

struct X25519HybridEncrypt {
    recipient: PublicKey,
}

impl HybridEncrypt for X25519HybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let mut ephemeral_bytes = Zeroizing::new([0u8; X25519_KEY_SIZE]);
        OsRng.try_fill_bytes(&mut ephemeral_bytes[..])?;
        let ephemeral = StaticSecret::from(*ephemeral_bytes);
        let ephemeral_public = PublicKey::from(&ephemeral);

        let shared = ephemeral.diffie_hellman(&self.recipient);
        if !shared.was_contributory() {
            return Err(Error::Crypto(
                "recipient public key is a low-order point".to_string(),
            ));
        }

        let dem = derive_dem(shared.as_bytes(), ephemeral_public.as_bytes(), context_info)?;
        let sealed = dem.encrypt(plaintext, &[])?;

        let mut output = Vec::with_capacity(X25519_KEY_SIZE + sealed.len());
        output.extend_from_slice(ephemeral_public.as_bytes());
        output.extend_from_slice(&sealed);
        Ok(output)
    }
}

struct X25519HybridDecrypt {
    secret: StaticSecret,
}

impl HybridDecrypt for X25519HybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < X25519_KEY_SIZE {
            return Err(ConsumeError::AuthenticationFailed.into());
        }
        let (ephemeral, sealed) = ciphertext.split_at(X25519_KEY_SIZE);
        let ephemeral: [u8; X25519_KEY_SIZE] = ephemeral
            .try_into()
            .map_err(|_| ConsumeError::AuthenticationFailed)?;

        let shared = self.secret.diffie_hellman(&PublicKey::from(ephemeral));
        if !shared.was_contributory() {
            return Err(ConsumeError::AuthenticationFailed.into());
        }

        derive_dem(shared.as_bytes(), &ephemeral, context_info)?
            .decrypt(sealed, &[])
            .map_err(|_| ConsumeError::AuthenticationFailed.into())
    }
}

fn static_secret(key_data: &KeyData) -> Result<StaticSecret> {
    let bytes = fixed_key::<X25519_KEY_SIZE>(X25519_HKDF_PRIVATE_TYPE_ID, key_data.material())?;
    Ok(StaticSecret::from(*bytes))
}

/// Produces [`HybridDecrypt`]s and derives the matching public keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct X25519HkdfPrivateKeyManager;

impl X25519HkdfPrivateKeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for X25519HkdfPrivateKeyManager {
    fn type_id(&self) -> &str {
        X25519_HKDF_PRIVATE_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridDecrypt
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        Ok(Primitive::HybridDecrypt(Box::new(X25519HybridDecrypt {
            secret: static_secret(key_data)?,
        })))
    }

    fn new_key_data(&self, _params: &[u8]) -> Result<KeyData> {
        Ok(KeyData::new(
            X25519_HKDF_PRIVATE_TYPE_ID,
            random_bytes(X25519_KEY_SIZE)?,
            KeyMaterialKind::AsymmetricPrivate,
        ))
    }

    fn public_key_data(&self, private_key_data: &KeyData) -> Result<KeyData> {
        let public = PublicKey::from(&static_secret(private_key_data)?);
        Ok(KeyData::new(
            X25519_HKDF_PUBLIC_TYPE_ID,
            public.as_bytes().to_vec(),
            KeyMaterialKind::AsymmetricPublic,
        ))
    }
}

/// Produces [`HybridEncrypt`]s from recipient public keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct X25519HkdfPublicKeyManager;

impl X25519HkdfPublicKeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for X25519HkdfPublicKeyManager {
    fn type_id(&self) -> &str {
        X25519_HKDF_PUBLIC_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::HybridEncrypt
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let bytes = fixed_key::<X25519_KEY_SIZE>(X25519_HKDF_PUBLIC_TYPE_ID, key_data.material())?;
        Ok(Primitive::HybridEncrypt(Box::new(X25519HybridEncrypt {
            recipient: PublicKey::from(*bytes),
        })))
    }
}
