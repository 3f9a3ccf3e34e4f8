use alloy_json_abi::Function;
use alloy_primitives::{hex::ToHexExt, keccak256};
use chrono::Utc;

/// Selector placeholder stored for transactions without a function signature.
pub const EMPTY_SELECTOR: &str = "0x";

/// Returns the 4-byte selector of a human-readable function signature, `0x`-prefixed.
///
/// Accepts both `transfer(address,uint256)` and
/// `function transfer(address to, uint256 amount)`. An empty signature yields [`EMPTY_SELECTOR`].
pub fn function_selector(func: &str) -> String {
    let func = func.trim();
    if func.is_empty() {
        return EMPTY_SELECTOR.to_string();
    }

    match Function::parse(func) {
        Ok(function) => function.selector().encode_hex_with_prefix(),
        Err(_) => (&keccak256(func.as_bytes())[..4]).encode_hex_with_prefix(),
    }
}

pub fn unix_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Serde adapter writing addresses in their EIP-55 checksummed form.
pub mod checksummed {
    use alloy_primitives::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    use std::str::FromStr;

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&address.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter writing a `U256` as a plain JSON integer.
///
/// Values above `u64::MAX` cannot be represented as JSON numbers without loss and are
/// written as decimal strings instead. Reading accepts numbers, decimal strings and
/// `0x`-prefixed hex strings.
pub mod plain_integer {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(*value) {
            Ok(v) => serializer.serialize_u64(v),
            Err(_) => serializer.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(U256::from(n)),
            NumberOrString::String(s) => U256::from_str(s.trim()).map_err(serde::de::Error::custom),
        }
    }
}
