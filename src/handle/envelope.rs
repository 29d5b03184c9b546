//! Persisted layout of keysets.
//!
//! 持久化的 Keyset 布局。

use crate::codec::CONFIG;
use crate::error::Result;
use crate::keyset::{
    Key, KeyData, KeyMaterialKind, KeyStatus, Keyset, KeysetInfo, OutputPrefixType,
};
use bincode::{Decode, Encode};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[derive(Decode, Encode, Zeroize, ZeroizeOnDrop)]
struct KeyDataRecord {
    type_id: String,
    #[zeroize(skip)]
    material_kind: KeyMaterialKind,
    material: Vec<u8>,
}

#[derive(Decode, Encode)]
struct KeyRecord {
    id: u32,
    data: Option<KeyDataRecord>,
    status: KeyStatus,
    prefix_type: OutputPrefixType,
}

/// `{ keys: [{id, type_id, material_kind, material_bytes, status, prefix_type}], primary_key_id }`
#[derive(Decode, Encode)]
pub(crate) struct KeysetRecord {
    keys: Vec<KeyRecord>,
    primary_key_id: u32,
}

/// A keyset encrypted under a master AEAD.
///
/// `encrypted_keyset = master_aead.encrypt(serialize(keyset), associated_data)`.
/// `keyset_info` is stored in the clear and never holds key material.
///
/// 使用主 AEAD 加密的 Keyset。`keyset_info` 以明文存储，且不含任何密钥材料。
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct EncryptedKeyset {
    pub encrypted_keyset: Vec<u8>,
    pub associated_data: Vec<u8>,
    pub keyset_info: Option<KeysetInfo>,
}

/// The top-level stored form; the tag tells readers which path to take.
#[derive(Decode, Encode)]
pub(crate) enum StoredKeyset {
    Cleartext(KeysetRecord),
    Encrypted(EncryptedKeyset),
}

impl From<&Keyset> for KeysetRecord {
    fn from(keyset: &Keyset) -> Self {
        Self {
            keys: keyset
                .keys()
                .iter()
                .map(|key| KeyRecord {
                    id: key.id(),
                    data: key.data().map(|data| KeyDataRecord {
                        type_id: data.type_id().to_string(),
                        material_kind: data.material_kind(),
                        material: data.material().to_vec(),
                    }),
                    status: key.status(),
                    prefix_type: key.prefix_type(),
                })
                .collect(),
            primary_key_id: keyset.primary_key_id(),
        }
    }
}

impl From<&KeysetRecord> for Keyset {
    fn from(record: &KeysetRecord) -> Self {
        let keys = record
            .keys
            .iter()
            .map(|key| {
                let data = key.data.as_ref().map(|data| {
                    KeyData::new(
                        data.type_id.clone(),
                        Zeroizing::new(data.material.clone()),
                        data.material_kind,
                    )
                });
                Key::from_parts(key.id, data, key.status, key.prefix_type)
            })
            .collect();
        Keyset::new(keys, record.primary_key_id)
    }
}

pub(crate) fn encode_keyset(keyset: &Keyset) -> Result<Zeroizing<Vec<u8>>> {
    let record = KeysetRecord::from(keyset);
    Ok(Zeroizing::new(bincode::encode_to_vec(&record, CONFIG)?))
}

pub(crate) fn decode_keyset(bytes: &[u8]) -> Result<Keyset> {
    let (record, _): (KeysetRecord, usize) = bincode::decode_from_slice(bytes, CONFIG)?;
    Ok(Keyset::from(&record))
}

impl StoredKeyset {
    pub(crate) fn encode_to_vec(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, CONFIG)?)
    }

    pub(crate) fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let (stored, _) = bincode::decode_from_slice(bytes, CONFIG)?;
        Ok(stored)
    }
}
