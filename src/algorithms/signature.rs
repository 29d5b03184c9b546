//! Ed25519 signatures.
//!
//! Private key material is the 32-byte seed; public key material is the
//! 32-byte compressed point. Verification uses the strict variant, which
//! rejects malleable and small-order encodings.
//!
//! Ed25519 签名。私钥材料为 32 字节种子，公钥材料为 32 字节压缩点。验证采用严格模式。

use super::{fixed_key, random_bytes, ED25519_PRIVATE_TYPE_ID, ED25519_PUBLIC_TYPE_ID};
use crate::error::{ConsumeError, PrimitiveConstructionError, Result};
use crate::keyset::{KeyData, KeyMaterialKind};
use crate::primitives::{Signer, Verifier};
use crate::registry::{KeyManager, Primitive, PrimitiveKind};
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};

struct Ed25519Signer {
    key: SigningKey,
}

impl Signer for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(data).to_bytes().to_vec())
    }
}

struct Ed25519Verifier {
    key: VerifyingKey,
}

impl Verifier for Ed25519Verifier {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        let signature =
            Signature::from_slice(signature).map_err(|_| ConsumeError::VerificationFailed)?;
        self.key
            .verify_strict(data, &signature)
            .map_err(|_| ConsumeError::VerificationFailed.into())
    }
}

fn signing_key(key_data: &KeyData) -> Result<SigningKey> {
    let seed = fixed_key::<SECRET_KEY_LENGTH>(ED25519_PRIVATE_TYPE_ID, key_data.material())?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Produces [`Signer`]s and derives the matching public keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519PrivateKeyManager;

impl Ed25519PrivateKeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for Ed25519PrivateKeyManager {
    fn type_id(&self) -> &str {
        ED25519_PRIVATE_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Signer
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        Ok(Primitive::Signer(Box::new(Ed25519Signer {
            key: signing_key(key_data)?,
        })))
    }

    fn new_key_data(&self, _params: &[u8]) -> Result<KeyData> {
        Ok(KeyData::new(
            ED25519_PRIVATE_TYPE_ID,
            random_bytes(SECRET_KEY_LENGTH)?,
            KeyMaterialKind::AsymmetricPrivate,
        ))
    }

    fn public_key_data(&self, private_key_data: &KeyData) -> Result<KeyData> {
        let public = signing_key(private_key_data)?.verifying_key();
        Ok(KeyData::new(
            ED25519_PUBLIC_TYPE_ID,
            public.to_bytes().to_vec(),
            KeyMaterialKind::AsymmetricPublic,
        ))
    }
}

/// Produces [`Verifier`]s from public keys. Public keys are derived, never
/// generated.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519PublicKeyManager;

impl Ed25519PublicKeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for Ed25519PublicKeyManager {
    fn type_id(&self) -> &str {
        ED25519_PUBLIC_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Verifier
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let bytes = fixed_key::<32>(ED25519_PUBLIC_TYPE_ID, key_data.material())?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| {
            PrimitiveConstructionError::InvalidKeyMaterial(
                "not a valid Ed25519 public key".to_string(),
            )
        })?;
        Ok(Primitive::Verifier(Box::new(Ed25519Verifier { key })))
    }
}
