//! Compiles a keyset into an immutable dispatch structure.
//!
//! A `PrimitiveSet` holds one instantiated primitive per enabled key, indexed
//! by output prefix, plus a handle on the primary entry. Once built it is never
//! mutated and carries no locks, so it can be shared freely across threads.
//!
//! 将 Keyset 编译为不可变的分发结构。`PrimitiveSet` 为每个启用的密钥保存一个实例化的原语，
//! 按输出前缀建立索引，并记录主密钥条目。构建完成后永不修改、不含锁，可在线程间自由共享。

use crate::error::{KeysetValidationError, PrimitiveConstructionError, Result};
use crate::handle::KeysetHandle;
use crate::keyset::{Key, KeyStatus, Keyset, OutputPrefixType};
use crate::primitives::FromPrimitive;
use crate::registry::Registry;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

pub mod prefix;

pub use prefix::{output_prefix, NON_RAW_PREFIX_SIZE};

/// One instantiated key inside a [`PrimitiveSet`].
pub struct Entry<P> {
    primitive: P,
    key_id: u32,
    type_id: String,
    status: KeyStatus,
    prefix_type: OutputPrefixType,
    prefix: Vec<u8>,
    is_primary: bool,
}

impl<P> Entry<P> {
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Always [`KeyStatus::Enabled`]; other keys never get an entry.
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn prefix_type(&self) -> OutputPrefixType {
        self.prefix_type
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

pub struct PrimitiveSet<P> {
    entries: Vec<Entry<P>>,
    by_prefix: HashMap<Vec<u8>, Vec<usize>>,
    primary: usize,
}

impl<P: FromPrimitive> PrimitiveSet<P> {
    /// Resolves every enabled key of `handle` through `registry`.
    ///
    /// Any key that cannot be instantiated aborts the whole build.
    ///
    /// 通过 `registry` 解析 `handle` 中每个启用的密钥。任一密钥实例化失败都会使整个构建失败。
    pub fn build(handle: &KeysetHandle, registry: &Registry) -> Result<Self> {
        Self::from_keyset(handle.keyset(), registry)
    }

    pub(crate) fn from_keyset(keyset: &Keyset, registry: &Registry) -> Result<Self> {
        let enabled: Vec<&Key> = keyset.keys().iter().filter(|key| key.is_enabled()).collect();

        // Remote managers may block here, so instantiate keys in parallel.
        let primitives = enabled
            .par_iter()
            .map(|key| instantiate::<P>(key, registry))
            .collect::<Result<Vec<P>>>()?;

        let mut entries = Vec::with_capacity(primitives.len());
        let mut by_prefix: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();
        for (key, primitive) in enabled.into_iter().zip(primitives) {
            let prefix = output_prefix(key.prefix_type(), key.id());
            by_prefix.entry(prefix.clone()).or_default().push(entries.len());
            entries.push(Entry {
                primitive,
                key_id: key.id(),
                type_id: key
                    .data()
                    .map(|data| data.type_id().to_string())
                    .unwrap_or_default(),
                status: key.status(),
                prefix_type: key.prefix_type(),
                prefix,
                is_primary: false,
            });
        }

        let mut primaries = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.key_id == keyset.primary_key_id())
            .map(|(index, _)| index);
        let primary = match (primaries.next(), primaries.next()) {
            (Some(index), None) => index,
            (None, _) => {
                return Err(PrimitiveConstructionError::InvariantViolation(
                    "no entry for the primary key",
                )
                .into())
            }
            (Some(_), Some(_)) => {
                return Err(PrimitiveConstructionError::InvariantViolation(
                    "more than one entry for the primary key",
                )
                .into())
            }
        };
        entries[primary].is_primary = true;

        let set = Self {
            entries,
            by_prefix,
            primary,
        };
        debug!(
            kind = ?P::KIND,
            entries = set.len(),
            raw_entries = set.raw_entries().count(),
            primary_key_id = keyset.primary_key_id(),
            "built primitive set"
        );
        Ok(set)
    }
}

fn instantiate<P: FromPrimitive>(key: &Key, registry: &Registry) -> Result<P> {
    let data = key
        .data()
        .ok_or(KeysetValidationError::MissingKeyData(key.id()))?;
    let (manager, kind) = registry.lookup(data.type_id())?;
    if kind != P::KIND {
        return Err(PrimitiveConstructionError::PrimitiveKindMismatch {
            type_id: data.type_id().to_string(),
            expected: P::KIND,
            actual: kind,
        }
        .into());
    }

    let primitive = manager.primitive(data)?;
    let actual = primitive.kind();
    P::from_primitive(primitive).ok_or_else(|| {
        PrimitiveConstructionError::PrimitiveKindMismatch {
            type_id: data.type_id().to_string(),
            expected: P::KIND,
            actual,
        }
        .into()
    })
}

impl<P> PrimitiveSet<P> {
    pub fn primary(&self) -> &Entry<P> {
        &self.entries[self.primary]
    }

    /// All entries in keyset order.
    pub fn entries(&self) -> &[Entry<P>] {
        &self.entries
    }

    /// Entries whose output prefix is exactly `prefix`, in keyset order.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &[u8],
    ) -> impl Iterator<Item = &'a Entry<P>> + 'a {
        self.by_prefix
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&index| &self.entries[index])
    }

    /// Entries sharing the empty prefix.
    pub fn raw_entries(&self) -> impl Iterator<Item = &Entry<P>> + '_ {
        self.entries_with_prefix(&[])
    }

    pub fn has_raw(&self) -> bool {
        self.by_prefix.contains_key::<[u8]>(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs a consuming operation against the candidate entries for `input`.
    ///
    /// First every entry whose prefix matches the leading bytes of `input` is
    /// tried on the remainder; then every raw entry is tried on the whole
    /// input. Returns the first success. Individual failures are discarded.
    ///
    /// 对 `input` 的候选条目执行消费操作：先以前缀匹配的条目处理剩余部分，再以所有 RAW 条目处理完整输入。
    pub(crate) fn find_map<T>(
        &self,
        input: &[u8],
        mut attempt: impl FnMut(&Entry<P>, &[u8]) -> Result<T>,
    ) -> Option<T> {
        if input.len() >= NON_RAW_PREFIX_SIZE {
            let (prefix, rest) = input.split_at(NON_RAW_PREFIX_SIZE);
            for entry in self.entries_with_prefix(prefix) {
                if let Ok(output) = attempt(entry, rest) {
                    return Some(output);
                }
            }
        }
        if self.has_raw() {
            for entry in self.raw_entries() {
                if let Ok(output) = attempt(entry, input) {
                    return Some(output);
                }
            }
        }
        None
    }
}

impl<P> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field(
                "key_ids",
                &self.entries.iter().map(|entry| entry.key_id).collect::<Vec<_>>(),
            )
            .field("primary_key_id", &self.primary().key_id)
            .finish()
    }
}
