use super::{with_prefix, KeysetPrimitive};
use crate::error::{ConsumeError, Result};
use crate::primitive_set::PrimitiveSet;
use crate::primitives::{HybridDecrypt, HybridEncrypt};
use std::sync::Arc;

#[derive(Clone)]
pub struct KeysetHybridEncrypt {
    set: Arc<PrimitiveSet<Box<dyn HybridEncrypt>>>,
}

impl KeysetPrimitive for KeysetHybridEncrypt {
    type Primitive = Box<dyn HybridEncrypt>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl HybridEncrypt for KeysetHybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let primary = self.set.primary();
        let ciphertext = primary.primitive().encrypt(plaintext, context_info)?;
        Ok(with_prefix(primary.prefix(), ciphertext))
    }
}

#[derive(Clone)]
pub struct KeysetHybridDecrypt {
    set: Arc<PrimitiveSet<Box<dyn HybridDecrypt>>>,
}

impl KeysetPrimitive for KeysetHybridDecrypt {
    type Primitive = Box<dyn HybridDecrypt>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl HybridDecrypt for KeysetHybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        self.set
            .find_map(ciphertext, |entry, payload| {
                entry.primitive().decrypt(payload, context_info)
            })
            .ok_or_else(|| ConsumeError::AuthenticationFailed.into())
    }
}
