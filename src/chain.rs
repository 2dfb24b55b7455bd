use log::warn;
use serde_json::Value;

/// Decodes a chain id as wallets report it.
///
/// Wallets send `eth_chainId` and `chainChanged` payloads as `0x`-prefixed hex
/// strings, a few send plain numbers. Anything that does not decode completely
/// (empty string, `null`, stray characters, overflow) is an unknown chain and
/// yields `None`.
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let parsed = parse_hex_chain_id(s);
            if parsed.is_none() && !s.is_empty() {
                warn!("Unreadable chain id {s:?}");
            }
            parsed
        }
        _ => None,
    }
}

fn parse_hex_chain_id(s: &str) -> Option<u64> {
    let digits = s.trim();
    let digits =
        digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")).unwrap_or(digits);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_hex_strings() {
        assert_eq!(parse_chain_id(&json!("0x1")), Some(1));
        assert_eq!(parse_chain_id(&json!("0X89")), Some(137));
        assert_eq!(parse_chain_id(&json!("0xaa36a7")), Some(11_155_111));
        assert_eq!(parse_chain_id(&json!("1")), Some(1));
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_chain_id(&json!(10)), Some(10));
        assert_eq!(parse_chain_id(&json!(0)), Some(0));
    }

    #[test]
    fn malformed_input_is_unknown_chain() {
        assert_eq!(parse_chain_id(&json!("")), None);
        assert_eq!(parse_chain_id(&json!("0x")), None);
        assert_eq!(parse_chain_id(&json!("0xzz")), None);
        assert_eq!(parse_chain_id(&json!("0x1zz")), None);
        assert_eq!(parse_chain_id(&json!("0x10000000000000000")), None);
        assert_eq!(parse_chain_id(&json!(-1)), None);
        assert_eq!(parse_chain_id(&json!(1.5)), None);
        assert_eq!(parse_chain_id(&Value::Null), None);
        assert_eq!(parse_chain_id(&json!(["0x1"])), None);
    }
}
