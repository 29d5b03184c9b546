//! `seal-keyset` manages cryptographic keys as keysets: ordered collections
//! of keys with exactly one primary key, rotated without breaking data
//! produced under older keys.
//!
//! Pluggable key managers are registered by type id in a [`registry::Registry`].
//! A [`handle::KeysetHandle`] wraps a validated keyset and compiles it into a
//! keyset-backed primitive: producing operations (encrypt, sign, MAC) use the
//! primary key and tag the output with a 5-byte key prefix, consuming
//! operations (decrypt, verify) route by that prefix and fall back to keys
//! without one.
//!
//! ```no_run
//! use seal_keyset::prelude::*;
//!
//! # fn main() -> seal_keyset::Result<()> {
//! let registry = Registry::new();
//! Config::default().register(&registry)?;
//!
//! let handle = KeysetHandle::generate_new_with(&templates::aes256_gcm()?, &registry)?;
//! let aead: KeysetAead = handle.primitive_with(&registry)?;
//! let ciphertext = aead.encrypt(b"message", b"context")?;
//! assert_eq!(aead.decrypt(&ciphertext, b"context")?, b"message");
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
mod codec;
pub mod config;
pub mod error;
pub mod handle;
pub mod keyset;
pub mod primitive_set;
pub mod primitives;
pub mod registry;
pub mod wrapper;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::algorithms::remote::KmsClient;
    pub use crate::algorithms::templates;
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::handle::KeysetHandle;
    pub use crate::keyset::{
        Key, KeyData, KeyMaterialKind, KeyStatus, Keyset, KeysetInfo, KeysetManager,
        OutputPrefixType,
    };
    pub use crate::primitive_set::PrimitiveSet;
    pub use crate::primitives::{Aead, HybridDecrypt, HybridEncrypt, Mac, Signer, Verifier};
    pub use crate::registry::{KeyManager, KeyTemplate, PrimitiveKind, Registry};
    pub use crate::wrapper::{
        KeysetAead, KeysetHybridDecrypt, KeysetHybridEncrypt, KeysetMac, KeysetPrimitive,
        KeysetSigner, KeysetVerifier,
    };
}
