//! Typed decoding of the hex-encoded fields the ledger hands back.
//!
//! All numeric RPC fields arrive as `0x`-prefixed hex strings; nothing else
//! in the crate converts them ad hoc — it goes through these functions so a
//! bad field always surfaces as a `DecodeError`.

use crate::domain::errors::DecodeError;

/// Decode a hex string as a little-endian unsigned 128-bit integer.
///
/// This is the encoding SUDT cells use for their balance in the output
/// data field. Inputs shorter than 16 bytes are zero-extended; longer
/// inputs are accepted only when the extra bytes are zero.
pub fn decode_uint128_le(hex_str: &str) -> Result<u128, DecodeError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes =
        hex::decode(digits).map_err(|_| DecodeError::MalformedHex(hex_str.to_string()))?;

    if bytes.len() > 16 && bytes[16..].iter().any(|b| *b != 0) {
        return Err(DecodeError::Overflow(hex_str.to_string()));
    }

    let mut buf = [0u8; 16];
    let len = bytes.len().min(16);
    buf[..len].copy_from_slice(&bytes[..len]);
    Ok(u128::from_le_bytes(buf))
}

/// Decode a big-endian hex number (block numbers, capacities, indices,
/// median times) into a u64.
pub fn decode_hex_u64(hex_str: &str) -> Result<u64, DecodeError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if digits.is_empty() {
        return Err(DecodeError::MalformedHex(hex_str.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| DecodeError::MalformedHex(hex_str.to_string()))
}

/// Narrow a millisecond timestamp into the signed width the store holds.
pub fn millis_to_i64(value: u64) -> Result<i64, DecodeError> {
    i64::try_from(value)
        .map_err(|_| DecodeError::FieldOutOfRange(format!("timestamp out of range: {}", value)))
}

/// Fields packed into a commitment lock script's args: a 20-byte pubkey
/// hash, a little-endian u64 delay epoch, a little-endian u64 version,
/// then zero or more serialized HTLCs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentLockArgs {
    pub pubkey_hash: String,
    pub delay_epoch: u64,
    pub version: u64,
    pub have_htlcs: bool,
}

pub fn parse_commitment_lock_args(args: &str) -> Result<CommitmentLockArgs, DecodeError> {
    let digits = args.strip_prefix("0x").unwrap_or(args);
    let bytes = hex::decode(digits).map_err(|_| DecodeError::MalformedHex(args.to_string()))?;

    if bytes.len() < 36 {
        return Err(DecodeError::FieldOutOfRange(format!(
            "commitment lock args too short: {} bytes",
            bytes.len()
        )));
    }

    let mut delay_epoch = [0u8; 8];
    delay_epoch.copy_from_slice(&bytes[20..28]);
    let mut version = [0u8; 8];
    version.copy_from_slice(&bytes[28..36]);

    Ok(CommitmentLockArgs {
        pubkey_hash: format!("0x{}", hex::encode(&bytes[..20])),
        delay_epoch: u64::from_le_bytes(delay_epoch),
        version: u64::from_le_bytes(version),
        have_htlcs: bytes.len() > 36,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_uint128_le(value: u128) -> String {
        format!("0x{}", hex::encode(value.to_le_bytes()))
    }

    #[test]
    fn uint128_le_known_vectors() {
        assert_eq!(
            decode_uint128_le("0x01000000000000000000000000000000").unwrap(),
            1
        );
        assert_eq!(
            decode_uint128_le("0x00e87648170000000000000000000000").unwrap(),
            100_000_000_000
        );
        assert_eq!(decode_uint128_le("0x").unwrap(), 0);
        // Prefix is optional
        assert_eq!(decode_uint128_le("0a00").unwrap(), 10);
    }

    #[test]
    fn uint128_le_round_trip() {
        for value in [0u128, 1, 255, 256, u64::MAX as u128, u128::MAX] {
            assert_eq!(decode_uint128_le(&encode_uint128_le(value)).unwrap(), value);
        }
    }

    #[test]
    fn uint128_le_rejects_bad_input() {
        assert!(matches!(
            decode_uint128_le("0x123"),
            Err(DecodeError::MalformedHex(_))
        ));
        assert!(matches!(
            decode_uint128_le("0xzz"),
            Err(DecodeError::MalformedHex(_))
        ));
        // 17 bytes with a significant high byte
        let oversized = format!("0x{}01", "00".repeat(16));
        assert!(matches!(
            decode_uint128_le(&oversized),
            Err(DecodeError::Overflow(_))
        ));
        // 17 bytes of trailing zeros still fit
        let padded = format!("0x2a{}", "00".repeat(16));
        assert_eq!(decode_uint128_le(&padded).unwrap(), 42);
    }

    #[test]
    fn hex_u64_parsing() {
        assert_eq!(decode_hex_u64("0x0").unwrap(), 0);
        assert_eq!(decode_hex_u64("0x11a0aa5").unwrap(), 18_483_877);
        assert!(decode_hex_u64("0x").is_err());
        assert!(decode_hex_u64("0xnope").is_err());
    }

    #[test]
    fn millis_narrowing_is_range_checked() {
        assert_eq!(millis_to_i64(1_700_000_000_000).unwrap(), 1_700_000_000_000);
        assert_eq!(millis_to_i64(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(millis_to_i64(i64::MAX as u64 + 1).is_err());
        assert!(millis_to_i64(u64::MAX).is_err());
    }

    #[test]
    fn commitment_lock_args_without_htlcs() {
        let args = format!(
            "0x{}{}{}",
            "aa".repeat(20),
            hex::encode(42u64.to_le_bytes()),
            hex::encode(3u64.to_le_bytes()),
        );
        let parsed = parse_commitment_lock_args(&args).unwrap();
        assert_eq!(parsed.pubkey_hash, format!("0x{}", "aa".repeat(20)));
        assert_eq!(parsed.delay_epoch, 42);
        assert_eq!(parsed.version, 3);
        assert!(!parsed.have_htlcs);
    }

    #[test]
    fn commitment_lock_args_with_htlcs() {
        let args = format!(
            "0x{}{}{}beef",
            "aa".repeat(20),
            hex::encode(42u64.to_le_bytes()),
            hex::encode(3u64.to_le_bytes()),
        );
        assert!(parse_commitment_lock_args(&args).unwrap().have_htlcs);
    }

    #[test]
    fn commitment_lock_args_too_short() {
        assert!(parse_commitment_lock_args("0x1234").is_err());
    }
}
