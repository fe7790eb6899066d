//! Hex loading utilities for kinto-admit

use std::{fs, io::Read};

use alloy_primitives::{hex, Bytes};

use super::{AdmitError, Result};

/// Load hex-encoded bytes from an argument or a file. If the file is a dash (-), read from stdin.
/// Priority: arg > file. Returns empty bytes if neither is provided.
pub fn load_hex(arg: Option<&str>, file: Option<&str>) -> Result<Bytes> {
    let hex_string = match (arg, file) {
        (Some(arg), _) => arg.to_string(),
        (None, Some("-")) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (None, Some(file)) => fs::read_to_string(file)?,
        (None, None) => return Ok(Bytes::new()),
    };

    decode_hex(&hex_string).map(Bytes::from)
}

/// Decode hex string, handling optional 0x prefix
fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.len() % 2 != 0 {
        return Err(AdmitError::InvalidInput(format!(
            "Invalid hex string length: {} (must be even)",
            hex_str.len()
        )));
    }

    Ok(hex::decode(hex_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("0x", &[])]
    #[case("0xd0e30db0", &[0xd0, 0xe3, 0x0d, 0xb0])]
    #[case("  D0E30DB0\n", &[0xd0, 0xe3, 0x0d, 0xb0])]
    fn test_decode_hex(#[case] input: &str, #[case] expected: &[u8]) {
        assert_eq!(decode_hex(input).unwrap(), expected);
    }

    #[rstest]
    #[case("0xabc")]
    #[case("zz")]
    fn test_decode_hex_invalid(#[case] input: &str) {
        assert!(decode_hex(input).is_err());
    }

    #[test]
    fn test_arg_takes_priority_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.hex");
        fs::write(&path, "0x1234").unwrap();
        let path = path.to_str().unwrap();

        assert_eq!(load_hex(Some("0xff"), Some(path)).unwrap(), Bytes::from_static(&[0xff]));
        assert_eq!(load_hex(None, Some(path)).unwrap(), Bytes::from_static(&[0x12, 0x34]));
        assert_eq!(load_hex(None, None).unwrap(), Bytes::new());
    }
}
