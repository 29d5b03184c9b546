//! HMAC-SHA256 with truncated tags.

use super::{decode_params, random_bytes, HMAC_SHA256_TYPE_ID};
use crate::codec::CONFIG;
use crate::error::{ConsumeError, Error, PrimitiveConstructionError, Result};
use crate::keyset::{KeyData, KeyMaterialKind};
use crate::primitives::Mac;
use crate::registry::{KeyManager, Primitive, PrimitiveKind};
use bincode::{Decode, Encode};
use hmac::{Hmac, Mac as _};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const MIN_KEY_SIZE: u32 = 16;
const MIN_TAG_SIZE: u32 = 10;
const MAX_TAG_SIZE: u32 = 32;

type HmacSha256 = Hmac<Sha256>;

/// Parameters of an HMAC-SHA256 key template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Decode, Encode)]
pub struct HmacParams {
    pub key_size: u32,
    pub tag_size: u32,
}

#[derive(Decode, Encode, Zeroize, ZeroizeOnDrop)]
struct HmacKeyMaterial {
    tag_size: u32,
    key: Vec<u8>,
}

struct HmacSha256Tag {
    key: Zeroizing<Vec<u8>>,
    tag_size: usize,
}

impl HmacSha256Tag {
    fn hmac(&self, data: &[u8]) -> Result<HmacSha256> {
        let mut mac = <HmacSha256 as hmac::Mac>::new_from_slice(&self.key)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        mac.update(data);
        Ok(mac)
    }
}

impl Mac for HmacSha256Tag {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tag = self.hmac(data)?.finalize().into_bytes();
        Ok(tag[..self.tag_size].to_vec())
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        if mac.len() != self.tag_size {
            return Err(ConsumeError::AuthenticationFailed.into());
        }
        self.hmac(data)?
            .verify_truncated_left(mac)
            .map_err(|_| ConsumeError::AuthenticationFailed.into())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha256KeyManager;

impl HmacSha256KeyManager {
    pub fn new() -> Self {
        Self
    }
}

impl KeyManager for HmacSha256KeyManager {
    fn type_id(&self) -> &str {
        HMAC_SHA256_TYPE_ID
    }

    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Mac
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        let (material, _): (HmacKeyMaterial, usize) =
            bincode::decode_from_slice(key_data.material(), CONFIG)
                .map_err(|e| PrimitiveConstructionError::InvalidKeyMaterial(e.to_string()))?;
        if !(MIN_TAG_SIZE..=MAX_TAG_SIZE).contains(&material.tag_size)
            || material.key.len() < MIN_KEY_SIZE as usize
        {
            return Err(PrimitiveConstructionError::InvalidKeyMaterial(
                "HMAC key or tag size out of range".to_string(),
            )
            .into());
        }
        Ok(Primitive::Mac(Box::new(HmacSha256Tag {
            key: Zeroizing::new(material.key.clone()),
            tag_size: material.tag_size as usize,
        })))
    }

    fn new_key_data(&self, params: &[u8]) -> Result<KeyData> {
        let params: HmacParams = decode_params(params)?;
        if params.key_size < MIN_KEY_SIZE {
            return Err(Error::InvalidParameters(format!(
                "HMAC key must be at least {MIN_KEY_SIZE} bytes"
            )));
        }
        if !(MIN_TAG_SIZE..=MAX_TAG_SIZE).contains(&params.tag_size) {
            return Err(Error::InvalidParameters(format!(
                "HMAC-SHA256 tag size must be between {MIN_TAG_SIZE} and {MAX_TAG_SIZE}"
            )));
        }

        let record = HmacKeyMaterial {
            tag_size: params.tag_size,
            key: random_bytes(params.key_size as usize)?.to_vec(),
        };
        let material = Zeroizing::new(bincode::encode_to_vec(&record, CONFIG)?);
        Ok(KeyData::new(
            HMAC_SHA256_TYPE_ID,
            material,
            KeyMaterialKind::Symmetric,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::encode_params;

    fn mac(tag_size: u32) -> Box<dyn Mac> {
        let params = encode_params(&HmacParams {
            key_size: 32,
            tag_size,
        })
        .unwrap();
        let manager = HmacSha256KeyManager::new();
        let key_data = manager.new_key_data(&params).unwrap();
        match manager.primitive(&key_data).unwrap() {
            Primitive::Mac(mac) => mac,
            _ => panic!("expected a MAC primitive"),
        }
    }

    #[test]
    fn test_truncated_tag() {
        let mac = mac(16);
        let tag = mac.compute_mac(b"data").unwrap();
        assert_eq!(tag.len(), 16);
        mac.verify_mac(&tag, b"data").unwrap();
        assert!(mac.verify_mac(&tag, b"other").is_err());
        assert!(mac.verify_mac(&tag[..15], b"data").is_err());
    }

    #[test]
    fn test_tag_size_bounds() {
        let params = encode_params(&HmacParams {
            key_size: 32,
            tag_size: 8,
        })
        .unwrap();
        assert!(matches!(
            HmacSha256KeyManager::new().new_key_data(&params),
            Err(Error::InvalidParameters(_))
        ));
    }
}
