use super::{with_prefix, KeysetPrimitive};
use crate::error::{ConsumeError, Result};
use crate::primitive_set::PrimitiveSet;
use crate::primitives::Aead;
use std::sync::Arc;

/// An [`Aead`] backed by every enabled key of a keyset.
///
/// 由 Keyset 中所有启用密钥支撑的 [`Aead`]。
#[derive(Clone)]
pub struct KeysetAead {
    set: Arc<PrimitiveSet<Box<dyn Aead>>>,
}

impl KeysetPrimitive for KeysetAead {
    type Primitive = Box<dyn Aead>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl Aead for KeysetAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let primary = self.set.primary();
        let ciphertext = primary.primitive().encrypt(plaintext, associated_data)?;
        Ok(with_prefix(primary.prefix(), ciphertext))
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        self.set
            .find_map(ciphertext, |entry, payload| {
                entry.primitive().decrypt(payload, associated_data)
            })
            .ok_or_else(|| ConsumeError::AuthenticationFailed.into())
    }
}
