//! AEAD key managers: AES-GCM, ChaCha20-Poly1305 and XChaCha20-Poly1305.
//!
//! Ciphertexts are `nonce || ciphertext || tag` with a fresh random nonce per
//! message.
//!
//! AEAD 密钥管理器。密文格式为 `nonce || ciphertext || tag`，每条消息使用新的随机 nonce。

use super::{
    decode_params, random_bytes, AES_GCM_TYPE_ID, CHACHA20_POLY1305_TYPE_ID,
    XCHACHA20_POLY1305_TYPE_ID,
};
use crate::error::{ConsumeError, Error, PrimitiveConstructionError, Result};
use crate::keyset::{KeyData, KeyMaterialKind};
use crate::primitives::Aead;
use crate::registry::{KeyManager, Primitive, PrimitiveKind};
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead as AeadCipherOps, AeadCore, KeyInit, Nonce, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use bincode::{Decode, Encode};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};
use rand::rngs::OsRng;
use rand::TryRngCore;

/// Parameters of an AES-GCM key template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Decode, Encode)]
pub struct AesGcmParams {
    /// 16 or 32.
    pub key_size: u32,
}

/// A RustCrypto AEAD cipher exposed through the [`Aead`] primitive.
pub(crate) struct AeadCipher<C> {
    cipher: C,
}

impl<C: KeyInit> AeadCipher<C> {
    pub(crate) fn new(type_id: &str, key: &[u8]) -> Result<Self> {
        let cipher = C::new_from_slice(key).map_err(|_| {
            PrimitiveConstructionError::InvalidKeyMaterial(format!(
                "invalid key length {} for `{type_id}`",
                key.len()
            ))
        })?;
        Ok(Self { cipher })
    }
}

impl<C> Aead for AeadCipher<C>
where
    C: AeadCipherOps + AeadCore + Send + Sync,
{
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = Nonce::<C>::default();
        OsRng.try_fill_bytes(&mut nonce)?;
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|_| Error::Crypto("AEAD encryption failed".to_string()))?;

        let mut output = Vec::with_capacity(nonce.len() + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let nonce_size = C::NonceSize::USIZE;
        if ciphertext.len() < nonce_size + C::TagSize::USIZE {
            return Err(ConsumeError::AuthenticationFailed.into());
        }
        let (nonce, body) = ciphertext.split_at(nonce_size);
        self.cipher
            .decrypt(
                Nonce::<C>::from_slice(nonce),
                Payload {
                    msg: body,
                    aad: associated_data,
                },
            )
            .map_err(|_| ConsumeError::AuthenticationFailed.into())
    }
}

macro_rules! impl_aead_key_manager {
    ($manager:ident, $type_id:expr, $key_size:expr, $cipher:ty) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $manager;

        impl $manager {
            pub fn new() -> Self {
                Self
            }
        }

        impl KeyManager for $manager {
            fn type_id(&self) -> &str {
                $type_id
            }

            fn primitive_kind(&self) -> PrimitiveKind {
                PrimitiveKind::Aead
            }

            fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
                let cipher = AeadCipher::<$cipher>::new($type_id, key_data.material())?;
                Ok(Primitive::Aead(Box::new(cipher)))
            }

            fn new_key_data(&self, _params: &[u8]) -> Result<KeyData> {
                Ok(KeyData::new(
                    $type_id,
                    random_bytes($key_size)?,
                    KeyMaterialKind::Symmetric,
                ))
            }
        }
    };
}

impl_aead_key_manager!(
    ChaCha20Poly1305KeyManager,
    CHACHA20_POLY1305_TYPE_ID,
    32,
    ChaCha20Poly1305
);
impl_aead_key_manager!(
    XChaCha20Poly1305KeyManager,
    XCHACHA20_POLY1305_TYPE_ID,
    32,
    XChaCha20Poly1305
);

/// AES-GCM with 128- or 256-bit keys, chosen by the key material length.
#[derive(Clone, Copy, Debug, Default)]
pub struct AesGcmKeyManager;

impl AesGcmKeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for AesGcmKeyManager {
    fn type_id(&self) -> &str {
        AES_GCM_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Aead
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let material = key_data.material();
        let aead: Box<dyn Aead> = match material.len() {
            16 => Box::new(AeadCipher::<Aes128Gcm>::new(AES_GCM_TYPE_ID, material)?),
            32 => Box::new(AeadCipher::<Aes256Gcm>::new(AES_GCM_TYPE_ID, material)?),
            len => {
                return Err(PrimitiveConstructionError::InvalidKeyMaterial(format!(
                    "AES-GCM key must be 16 or 32 bytes, got {len}"
                ))
                .into())
            }
        };
        Ok(Primitive::Aead(aead))
    }

    fn new_key_data(&self, params: &[u8]) -> Result<KeyData> {
        let params: AesGcmParams = decode_params(params)?;
        if !matches!(params.key_size, 16 | 32) {
            return Err(Error::InvalidParameters(format!(
                "unsupported AES-GCM key size {}",
                params.key_size
            )));
        }
        Ok(KeyData::new(
            AES_GCM_TYPE_ID,
            random_bytes(params.key_size as usize)?,
            KeyMaterialKind::Symmetric,
        ))
    }
}
