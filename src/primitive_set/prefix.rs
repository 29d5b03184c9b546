//! Output prefix encoding.
//!
//! | prefix type | bytes |
//! |---|---|
//! | `Raw` | empty |
//! | `Tink` | `0x01` followed by the big-endian key id |
//! | `Legacy`, `Crunchy` | `0x00` followed by the big-endian key id |

use crate::keyset::OutputPrefixType;

/// Length of every non-empty prefix.
pub const NON_RAW_PREFIX_SIZE: usize = 5;

pub const TINK_START_BYTE: u8 = 0x01;

pub const LEGACY_START_BYTE: u8 = 0x00;

/// Byte appended to the data before computing or verifying a tag with a
/// `Legacy` MAC or signature key.
pub const LEGACY_FORMAT_SUFFIX: u8 = 0x00;

pub fn output_prefix(prefix_type: OutputPrefixType, key_id: u32) -> Vec<u8> {
    let start = match prefix_type {
        OutputPrefixType::Raw => return Vec::new(),
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
    };
    let mut prefix = Vec::with_capacity(NON_RAW_PREFIX_SIZE);
    prefix.push(start);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_bytes() {
        assert_eq!(
            output_prefix(OutputPrefixType::Tink, 1),
            vec![0x01, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(
            output_prefix(OutputPrefixType::Legacy, 0x0102_0304),
            vec![0x00, 0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(
            output_prefix(OutputPrefixType::Crunchy, 0x0102_0304),
            output_prefix(OutputPrefixType::Legacy, 0x0102_0304)
        );
        assert!(output_prefix(OutputPrefixType::Raw, 42).is_empty());
    }
}
