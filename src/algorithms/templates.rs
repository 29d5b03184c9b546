//! Predefined key templates.
//!
//! 预定义的密钥模板。

use super::mac::HmacParams;
use super::symmetric::AesGcmParams;
use super::{
    encode_params, AES_GCM_TYPE_ID, CHACHA20_POLY1305_TYPE_ID, ED25519_PRIVATE_TYPE_ID,
    HMAC_SHA256_TYPE_ID, X25519_HKDF_PRIVATE_TYPE_ID, XCHACHA20_POLY1305_TYPE_ID,
};
use crate::error::Result;
use crate::keyset::OutputPrefixType;
use crate::registry::KeyTemplate;

fn aes_gcm(key_size: u32, prefix_type: OutputPrefixType) -> Result<KeyTemplate> {
    Ok(KeyTemplate::new(
        AES_GCM_TYPE_ID,
        encode_params(&AesGcmParams { key_size })?,
        prefix_type,
    ))
}

fn hmac_sha256(tag_size: u32) -> Result<KeyTemplate> {
    Ok(KeyTemplate::new(
        HMAC_SHA256_TYPE_ID,
        encode_params(&HmacParams {
            key_size: 32,
            tag_size,
        })?,
        OutputPrefixType::Tink,
    ))
}

pub fn aes128_gcm() -> Result<KeyTemplate> {
    aes_gcm(16, OutputPrefixType::Tink)
}

pub fn aes256_gcm() -> Result<KeyTemplate> {
    aes_gcm(32, OutputPrefixType::Tink)
}

/// AES-256-GCM without an output prefix, for ciphertexts consumed by other
/// libraries.
pub fn aes256_gcm_raw() -> Result<KeyTemplate> {
    aes_gcm(32, OutputPrefixType::Raw)
}

pub fn chacha20_poly1305() -> KeyTemplate {
    KeyTemplate::new(CHACHA20_POLY1305_TYPE_ID, Vec::new(), OutputPrefixType::Tink)
}

pub fn xchacha20_poly1305() -> KeyTemplate {
    KeyTemplate::new(XCHACHA20_POLY1305_TYPE_ID, Vec::new(), OutputPrefixType::Tink)
}

pub fn hmac_sha256_tag16() -> Result<KeyTemplate> {
    hmac_sha256(16)
}

pub fn hmac_sha256_tag32() -> Result<KeyTemplate> {
    hmac_sha256(32)
}

pub fn ed25519() -> KeyTemplate {
    KeyTemplate::new(ED25519_PRIVATE_TYPE_ID, Vec::new(), OutputPrefixType::Tink)
}

pub fn ed25519_raw() -> KeyTemplate {
    ed25519().with_prefix_type(OutputPrefixType::Raw)
}

/// Ed25519 signing over `data || 0x00` with a legacy prefix.
pub fn ed25519_legacy() -> KeyTemplate {
    ed25519().with_prefix_type(OutputPrefixType::Legacy)
}

pub fn x25519_hkdf_sha256_aes256_gcm() -> KeyTemplate {
    KeyTemplate::new(X25519_HKDF_PRIVATE_TYPE_ID, Vec::new(), OutputPrefixType::Tink)
}
