//! `KeysetHandle`: the access-controlled gateway to a keyset.
//!
//! A handle never hands its keyset to general code. The primitive-set builder
//! reads it internally, and the [`cleartext`] module is the single, separately
//! named place that can export or import raw [`Keyset`] values. Reading or
//! writing without a master AEAD stores cleartext and logs a warning.
//!
//! `KeysetHandle`：访问受控的 Keyset 入口。句柄从不将其 Keyset 交给一般代码；
//! 只有原语集合构建器在内部读取它，而 [`cleartext`] 模块是唯一可以导入或导出原始 Keyset 值的地方。
//! 不带主 AEAD 的读写会以明文存储并记录警告。

use crate::error::{Error, Result};
use crate::keyset::manager::new_key_id;
use crate::keyset::{Key, KeyMaterialKind, KeyStatus, Keyset, KeysetInfo};
use crate::primitive_set::PrimitiveSet;
use crate::primitives::{Aead, FromPrimitive};
use crate::registry::{self, KeyTemplate, Registry};
use crate::wrapper::KeysetPrimitive;
use envelope::{decode_keyset, encode_keyset, EncryptedKeyset, StoredKeyset};
use std::fmt;
use std::io::{Read, Write};
use tracing::{debug, warn};

#[cfg(feature = "async")]
pub mod asynchronous;
pub mod cleartext;
pub mod envelope;

pub struct KeysetHandle {
    keyset: Keyset,
}

impl KeysetHandle {
    pub(crate) fn new(keyset: Keyset) -> Result<Self> {
        keyset.validate()?;
        Ok(Self { keyset })
    }

    pub(crate) fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    /// Generates a handle holding one fresh primary key, using the global registry.
    ///
    /// 使用全局注册表生成一个只含一个新主密钥的句柄。
    pub fn generate_new(template: &KeyTemplate) -> Result<Self> {
        Self::generate_new_with(template, registry::global())
    }

    pub fn generate_new_with(template: &KeyTemplate, registry: &Registry) -> Result<Self> {
        let data = registry.new_key_from_template(template)?;
        let key = Key::enabled(new_key_id(None)?, data, template.prefix_type);
        Self::new(Keyset::with_primary(key)?)
    }

    /// Reads a keyset from `reader`.
    ///
    /// With a master AEAD the source must hold an encrypted keyset, which is
    /// decrypted with the associated data stored beside it. Without one the
    /// source must hold a cleartext keyset.
    ///
    /// 从 `reader` 读取 Keyset。提供主 AEAD 时，源数据必须是加密的 Keyset；否则必须是明文 Keyset。
    pub fn read<R: Read>(mut reader: R, master_aead: Option<&dyn Aead>) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_stored_bytes(&bytes, master_aead, None)
    }

    /// Reads an encrypted keyset, decrypting it with the caller's associated data.
    pub fn read_with_associated_data<R: Read>(
        mut reader: R,
        master_aead: &dyn Aead,
        associated_data: &[u8],
    ) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_stored_bytes(&bytes, Some(master_aead), Some(associated_data))
    }

    /// Writes the keyset to `writer`, encrypted when a master AEAD is given.
    pub fn write<W: Write>(&self, mut writer: W, master_aead: Option<&dyn Aead>) -> Result<()> {
        let bytes = self.to_stored_bytes(master_aead, &[])?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_with_associated_data<W: Write>(
        &self,
        mut writer: W,
        master_aead: &dyn Aead,
        associated_data: &[u8],
    ) -> Result<()> {
        let bytes = self.to_stored_bytes(Some(master_aead), associated_data)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub(crate) fn from_stored_bytes(
        bytes: &[u8],
        master_aead: Option<&dyn Aead>,
        associated_data: Option<&[u8]>,
    ) -> Result<Self> {
        let keyset = match (StoredKeyset::decode_from_slice(bytes)?, master_aead) {
            (StoredKeyset::Encrypted(encrypted), Some(master_aead)) => {
                let associated_data =
                    associated_data.unwrap_or(encrypted.associated_data.as_slice());
                let cleartext = zeroize::Zeroizing::new(
                    master_aead
                        .decrypt(&encrypted.encrypted_keyset, associated_data)
                        .map_err(|_| Error::DecryptError)?,
                );
                decode_keyset(&cleartext)?
            }
            (StoredKeyset::Cleartext(record), None) => {
                warn!("reading a cleartext keyset");
                Keyset::from(&record)
            }
            (StoredKeyset::Encrypted(_), None) => {
                return Err(Error::UnsupportedOperation(
                    "keyset is encrypted; a master AEAD is required".into(),
                ))
            }
            (StoredKeyset::Cleartext(_), Some(_)) => {
                return Err(Error::UnsupportedOperation(
                    "expected an encrypted keyset but found a cleartext one".into(),
                ))
            }
        };
        let handle = Self::new(keyset)?;
        debug!(keys = handle.keyset.len(), "read keyset");
        Ok(handle)
    }

    pub(crate) fn to_stored_bytes(
        &self,
        master_aead: Option<&dyn Aead>,
        associated_data: &[u8],
    ) -> Result<Vec<u8>> {
        let stored = match master_aead {
            Some(master_aead) => {
                let cleartext = encode_keyset(&self.keyset)?;
                StoredKeyset::Encrypted(EncryptedKeyset {
                    encrypted_keyset: master_aead.encrypt(&cleartext, associated_data)?,
                    associated_data: associated_data.to_vec(),
                    keyset_info: Some(self.keyset_info()),
                })
            }
            None => {
                warn!("writing a cleartext keyset");
                StoredKeyset::Cleartext((&self.keyset).into())
            }
        };
        debug!(keys = self.keyset.len(), encrypted = master_aead.is_some(), "wrote keyset");
        stored.encode_to_vec()
    }

    /// Returns a handle carrying the public halves of every private key, using
    /// the global registry.
    pub fn public_keyset_handle(&self) -> Result<Self> {
        self.public_keyset_handle_with(registry::global())
    }

    /// Fails with `NotAsymmetric` unless every key that still has data holds
    /// asymmetric private material. Destroyed keys are carried over as they are.
    ///
    /// 除非所有仍有数据的密钥都是非对称私钥，否则返回 `NotAsymmetric`。已销毁的密钥原样保留。
    pub fn public_keyset_handle_with(&self, registry: &Registry) -> Result<Self> {
        let keys = self
            .keyset
            .keys()
            .iter()
            .map(|key| match key.data() {
                None => Ok(key.clone()),
                Some(data) if data.material_kind() == KeyMaterialKind::AsymmetricPrivate => {
                    let public = registry.public_key_data(data)?;
                    Ok(Key::from_parts(
                        key.id(),
                        Some(public),
                        key.status(),
                        key.prefix_type(),
                    ))
                }
                Some(_) => Err(Error::NotAsymmetric),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(Keyset::new(keys, self.keyset.primary_key_id()))
    }

    pub fn keyset_info(&self) -> KeysetInfo {
        self.keyset.info()
    }

    pub fn primary_key_id(&self) -> u32 {
        self.keyset.primary_key_id()
    }

    pub fn key_status(&self, key_id: u32) -> Option<KeyStatus> {
        self.keyset.key(key_id).map(Key::status)
    }

    pub fn primitive_set<P: FromPrimitive>(&self, registry: &Registry) -> Result<PrimitiveSet<P>> {
        PrimitiveSet::build(self, registry)
    }

    /// Builds a keyset-backed primitive, e.g. [`KeysetAead`](crate::wrapper::KeysetAead),
    /// using the global registry.
    pub fn primitive<W: KeysetPrimitive>(&self) -> Result<W> {
        self.primitive_with(registry::global())
    }

    /// 使用给定注册表构建基于 Keyset 的原语。
    pub fn primitive_with<W: KeysetPrimitive>(&self, registry: &Registry) -> Result<W> {
        W::from_primitive_set(self.primitive_set(registry)?)
    }
}

impl fmt::Debug for KeysetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetHandle")
            .field("info", &self.keyset_info())
            .finish()
    }
}
