use crate::registry::PrimitiveKind;
use rand::rand_core::OsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BincodeError {
    #[error("Encode error: {0}")]
    Enc(#[source] Box<bincode::error::EncodeError>),
    #[error("Decode error: {0}")]
    Dec(#[source] Box<bincode::error::DecodeError>),
}

impl From<bincode::error::EncodeError> for BincodeError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BincodeError::Enc(Box::from(err))
    }
}

impl From<bincode::error::DecodeError> for BincodeError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BincodeError::Dec(Box::from(err))
    }
}

/// Failures raised while mutating the key type registry.
///
/// 修改密钥类型注册表时产生的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("key type `{0}` is already registered")]
    DuplicateRegistration(String),

    #[error("key manager does not support key type `{0}`")]
    UnsupportedKeyType(String),
}

/// Violations of the keyset invariants.
///
/// 违反 Keyset 不变量的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeysetValidationError {
    #[error("keyset has no key matching the primary key id")]
    NoPrimary,

    #[error("key id {0} appears more than once in the keyset")]
    DuplicateKeyId(u32),

    #[error("the primary key is not enabled")]
    PrimaryNotEnabled,

    #[error("the primary key cannot be disabled, destroyed or deleted")]
    PrimaryCannotBeDisabled,

    #[error("key id {0} not found in keyset")]
    KeyNotFound(u32),

    #[error("key id {0} has been destroyed")]
    KeyDestroyed(u32),

    #[error("key id {0} is not destroyed but carries no key data")]
    MissingKeyData(u32),
}

/// Failures while compiling a keyset into a primitive set.
///
/// 将 Keyset 编译为原语集合时产生的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveConstructionError {
    #[error("no key manager registered for key type `{0}`")]
    UnknownKeyType(String),

    #[error("key type `{type_id}` produces {actual:?}, but {expected:?} was requested")]
    PrimitiveKindMismatch {
        type_id: String,
        expected: PrimitiveKind,
        actual: PrimitiveKind,
    },

    #[error("primitive set invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("invalid key material for key type `{0}`")]
    InvalidKeyMaterial(String),
}

/// The only failures a consuming operation ever reports.
///
/// They never name the key or the stage that failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("signature verification failed")]
    VerificationFailed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("OS-level random number generation failed: {0}")]
    OsRngError(#[from] OsError),

    #[error("底层I/O操作失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("数据序列化或反序列化失败: {0}")]
    BincodeError(#[from] BincodeError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Validation(#[from] KeysetValidationError),

    #[error(transparent)]
    Construction(#[from] PrimitiveConstructionError),

    #[error(transparent)]
    Consume(#[from] ConsumeError),

    #[error("无法解密已加密的 Keyset")]
    DecryptError,

    #[error("不支持的操作: {0}")]
    UnsupportedOperation(String),

    #[error("keyset contains keys that are not asymmetric private keys")]
    NotAsymmetric,

    #[error("invalid key parameters: {0}")]
    InvalidParameters(String),

    #[error("cryptographic operation failed: {0}")]
    Crypto(String),

    #[error("remote key management service failed: {0}")]
    Kms(String),
}

impl From<bincode::error::EncodeError> for Error {
    fn from(err: bincode::error::EncodeError) -> Self {
        Error::from(BincodeError::Enc(Box::from(err)))
    }
}

impl From<bincode::error::DecodeError> for Error {
    fn from(err: bincode::error::DecodeError) -> Self {
        Error::from(BincodeError::Dec(Box::from(err)))
    }
}

// 定义一个统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;
