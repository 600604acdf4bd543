//! Text form of wire tokens: `st1.` + unpadded URL-safe base64.
//!
//! The prefix names the v1 plaintext layout. Binary wire tokens carry no
//! version; text that does not start with a known prefix is rejected before
//! any cryptography runs.

use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Prefix of armored v1 tokens.
pub const ARMOR_PREFIX: &str = "st1.";

/// Encode a wire token as text.
pub fn armor(wire: &[u8]) -> String {
    format!("{ARMOR_PREFIX}{}", URL_SAFE_NO_PAD.encode(wire))
}

/// Decode text produced by [`armor`] back into a wire token.
pub fn dearmor(text: &str) -> Result<Vec<u8>, TokenError> {
    let encoded = text
        .trim()
        .strip_prefix(ARMOR_PREFIX)
        .ok_or_else(|| {
            TokenError::InvalidInput("unsupported token format".to_string())
        })?;

    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| TokenError::InvalidInput(format!("token is not valid base64url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_armor_shape() {
        let text = armor(&[0xfb, 0xff, 0x00]);
        assert_eq!(text, "st1.-_8A");
        assert_eq!(dearmor(&text).unwrap(), vec![0xfb, 0xff, 0x00]);
    }

    #[test]
    fn test_dearmor_trims_whitespace() {
        assert_eq!(dearmor("  st1.AQI\n").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        assert!(matches!(
            dearmor("st2.AQI"),
            Err(TokenError::InvalidInput(_))
        ));
        assert!(matches!(dearmor("AQI"), Err(TokenError::InvalidInput(_))));
    }

    #[test]
    fn test_bad_base64_rejected() {
        assert!(matches!(
            dearmor("st1.***"),
            Err(TokenError::InvalidInput(_))
        ));
    }
}
