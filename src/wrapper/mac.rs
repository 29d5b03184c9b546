use super::{legacy_aware_data, with_prefix, KeysetPrimitive};
use crate::error::{ConsumeError, Result};
use crate::primitive_set::PrimitiveSet;
use crate::primitives::Mac;
use std::sync::Arc;

#[derive(Clone)]
pub struct KeysetMac {
    set: Arc<PrimitiveSet<Box<dyn Mac>>>,
}

impl KeysetPrimitive for KeysetMac {
    type Primitive = Box<dyn Mac>;

    fn from_primitive_set(set: PrimitiveSet<Self::Primitive>) -> Result<Self> {
        Ok(Self { set: Arc::new(set) })
    }
}

impl Mac for KeysetMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let primary = self.set.primary();
        let tag = primary
            .primitive()
            .compute_mac(&legacy_aware_data(primary, data))?;
        Ok(with_prefix(primary.prefix(), tag))
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        self.set
            .find_map(mac, |entry, tag| {
                entry
                    .primitive()
                    .verify_mac(tag, &legacy_aware_data(entry, data))
            })
            .ok_or_else(|| ConsumeError::AuthenticationFailed.into())
    }
}
