//! Keyset-backed primitives.
//!
//! Each wrapper owns a shared, immutable [`PrimitiveSet`] and implements the
//! matching primitive trait. Producing operations always use the primary key
//! and prepend its output prefix. Consuming operations try every candidate
//! key and collapse all failures into one opaque [`ConsumeError`].
//!
//! 基于 Keyset 的原语。每个包装器持有一个共享的不可变 [`PrimitiveSet`]，并实现相应的原语 trait。
//! 生成类操作总是使用主密钥并附加其输出前缀；消费类操作尝试每个候选密钥，并将所有失败合并为单一的不透明错误。
//!
//! [`ConsumeError`]: crate::error::ConsumeError

use crate::error::Result;
use crate::keyset::OutputPrefixType;
use crate::primitive_set::prefix::LEGACY_FORMAT_SUFFIX;
use crate::primitive_set::{Entry, PrimitiveSet};
use crate::primitives::FromPrimitive;
use std::borrow::Cow;

pub mod aead;
pub mod hybrid;
pub mod mac;
pub mod signature;

pub use aead::KeysetAead;
pub use hybrid::{KeysetHybridDecrypt, KeysetHybridEncrypt};
pub use mac::KeysetMac;
pub use signature::{KeysetSigner, KeysetVerifier};

/// A primitive that can be assembled from a [`PrimitiveSet`].
///
/// 可以由 [`PrimitiveSet`] 组装而成的原语。
pub trait KeysetPrimitive: Sized {
    type Primitive: FromPrimitive;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self>;
}

fn with_prefix(prefix: &[u8], output: Vec<u8>) -> Vec<u8> {
    if prefix.is_empty() {
        return output;
    }
    let mut prefixed = Vec::with_capacity(prefix.len() + output.len());
    prefixed.extend_from_slice(prefix);
    prefixed.extend_from_slice(&output);
    prefixed
}

/// MAC and signature keys with a `Legacy` prefix authenticate `data || 0x00`.
fn legacy_aware_data<'a, P>(entry: &Entry<P>, data: &'a [u8]) -> Cow<'a, [u8]> {
    match entry.prefix_type() {
        OutputPrefixType::Legacy => {
            let mut extended = Vec::with_capacity(data.len() + 1);
            extended.extend_from_slice(data);
            extended.push(LEGACY_FORMAT_SUFFIX);
            Cow::Owned(extended)
        }
        _ => Cow::Borrowed(data),
    }
}
