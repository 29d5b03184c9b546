//! Defines the primitive interfaces callers program against.
//!
//! Every concrete algorithm, and every keyset-backed dispatcher, is reached
//! through one of these object-safe traits.
//!
//! 定义调用方所面向的原语接口。所有具体算法以及基于 Keyset 的分发器都通过这些对象安全的 trait 访问。

use crate::error::Result;
use crate::registry::{Primitive, PrimitiveKind};

/// Authenticated encryption with associated data.
///
/// 带关联数据的认证加密。
pub trait Aead: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Message authentication codes.
///
/// 消息认证码。
pub trait Mac: Send + Sync {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Succeeds only if `mac` is a valid tag for `data`.
    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()>;
}

/// Produces digital signatures.
pub trait Signer: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Verifies digital signatures.
pub trait Verifier: Send + Sync {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()>;
}

/// Public-key encryption of arbitrary plaintexts.
///
/// 混合加密（公钥加密任意明文）。
pub trait HybridEncrypt: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

pub trait HybridDecrypt: Send + Sync {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

/// Links a primitive interface to its [`PrimitiveKind`] tag so that generic
/// code can pull the right variant out of a [`Primitive`].
///
/// 将原语接口与其 [`PrimitiveKind`] 标签关联，使泛型代码能够从 [`Primitive`] 中取出正确的变体。
pub trait FromPrimitive: Sized + Send + Sync + 'static {
    const KIND: PrimitiveKind;

    fn from_primitive(primitive: Primitive) -> Option<Self>;
}

macro_rules! impl_from_primitive {
    ($trait:ident, $kind:ident) => {
        impl FromPrimitive for Box<dyn $trait> {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            fn from_primitive(primitive: Primitive) -> Option<Self> {
                match primitive {
                    Primitive::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_from_primitive!(Aead, Aead);
impl_from_primitive!(Mac, Mac);
impl_from_primitive!(Signer, Signer);
impl_from_primitive!(Verifier, Verifier);
impl_from_primitive!(HybridEncrypt, HybridEncrypt);
impl_from_primitive!(HybridDecrypt, HybridDecrypt);
