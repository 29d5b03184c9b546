use super::{legacy_aware_data, with_prefix, KeysetPrimitive};
use crate::error::{ConsumeError, Result};
use crate::primitive_set::PrimitiveSet;
use crate::primitives::{Signer, Verifier};
use std::sync::Arc;

/// Signs with the primary key of a private keyset.
///
/// 使用私钥 Keyset 的主密钥签名。
#[derive(Clone)]
pub struct KeysetSigner {
    set: Arc<PrimitiveSet<Box<dyn Signer>>>,
}

impl KeysetPrimitive for KeysetSigner {
    type Primitive = Box<dyn Signer>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl Signer for KeysetSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let primary = self.set.primary();
        let signature = primary.primitive().sign(&legacy_aware_data(primary, data))?;
        Ok(with_prefix(primary.prefix(), signature))
    }
}

/// Verifies signatures made by any enabled key of a public keyset.
///
/// 验证由公钥 Keyset 中任一启用密钥生成的签名。
#[derive(Clone)]
pub struct KeysetVerifier {
    set: Arc<PrimitiveSet<Box<dyn Verifier>>>,
}

impl KeysetPrimitive for KeysetVerifier {
    type Primitive = Box<dyn Verifier>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl Verifier for KeysetVerifier {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        self.set
            .find_map(signature, |entry, raw_signature| {
                entry
                    .primitive()
                    .verify(raw_signature, &legacy_aware_data(entry, data))
            })
            .ok_or_else(|| ConsumeError::VerificationFailed.into())
    }
}
