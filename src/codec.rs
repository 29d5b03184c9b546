//! Shared bincode configuration for everything the crate persists.
//!
//! Decoding is bounded so a corrupted length prefix is reported as an error
//! instead of driving a huge allocation.
//!
//! 本 crate 所有持久化数据共用的 bincode 配置。解码设有上限，损坏的长度前缀会返回错误，而不会触发巨大的内存分配。

use bincode::config::{Configuration, Limit, LittleEndian, Varint};

/// Upper bound on the bytes a single decode may claim.
///
/// 单次解码可申请的最大字节数。
pub(crate) const DECODE_LIMIT: usize = 1 << 20;

pub(crate) static CONFIG: Configuration<LittleEndian, Varint, Limit<DECODE_LIMIT>> =
    bincode::config::standard().with_limit::<DECODE_LIMIT>();

#[cfg(test)]
mod tests {
    use super::*;
    use bincode::error::DecodeError;

    #[test]
    fn test_huge_length_prefix_is_rejected() {
        let mut bytes = vec![0xFD];
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());

        let result: Result<(Vec<u8>, usize), _> = bincode::decode_from_slice(&bytes, CONFIG);
        assert!(matches!(result, Err(DecodeError::LimitExceeded)));
    }

    #[test]
    fn test_limit_does_not_change_the_wire_format() {
        let value = (7u32, b"material".to_vec(), Some(String::from("type")));
        let limited = bincode::encode_to_vec(&value, CONFIG).unwrap();
        let standard = bincode::encode_to_vec(&value, bincode::config::standard()).unwrap();
        assert_eq!(limited, standard);
    }
}
