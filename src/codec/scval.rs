//! Conversions between contract values (`ScVal`) and native Rust values.

use stellar_xdr::curr::{
    Int128Parts, Limits, ReadXdr, ScBytes, ScMap, ScString, ScVal, ScVec, WriteXdr,
};

use crate::codec::address::{address_to_string, sc_address};
use crate::codec::CodecError;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn i128_val(value: i128) -> ScVal {
    ScVal::I128(Int128Parts {
        hi: (value >> 64) as i64,
        lo: value as u64,
    })
}

pub fn u64_val(value: u64) -> ScVal {
    ScVal::U64(value)
}

pub fn u32_val(value: u32) -> ScVal {
    ScVal::U32(value)
}

pub fn address_val(address: &str) -> Result<ScVal, CodecError> {
    Ok(ScVal::Address(sc_address(address)?))
}

pub fn string_val(value: &str) -> Result<ScVal, CodecError> {
    Ok(ScVal::String(ScString(value.to_string().try_into()?)))
}

pub fn bytes_val(value: &[u8]) -> Result<ScVal, CodecError> {
    Ok(ScVal::Bytes(ScBytes(value.to_vec().try_into()?)))
}

pub fn address_vec_val(addresses: &[String]) -> Result<ScVal, CodecError> {
    let items = addresses
        .iter()
        .map(|a| address_val(a))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ScVal::Vec(Some(ScVec(items.try_into()?))))
}

pub fn to_base64(value: &ScVal) -> Result<String, CodecError> {
    Ok(value.to_xdr_base64(Limits::none())?)
}

pub fn from_base64(encoded: &str) -> Result<ScVal, CodecError> {
    Ok(ScVal::from_xdr_base64(encoded, Limits::none())?)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn unexpected(expected: &'static str, found: &ScVal) -> CodecError {
    CodecError::UnexpectedType {
        expected,
        found: found.name().to_string(),
    }
}

/// Integer amounts; contracts return these as i128 but small counters may
/// come back as narrower types.
pub fn to_i128(value: &ScVal) -> Result<i128, CodecError> {
    match value {
        ScVal::I128(Int128Parts { hi, lo }) => Ok(((*hi as i128) << 64) | (*lo as i128)),
        ScVal::U64(v) => Ok(*v as i128),
        ScVal::I64(v) => Ok(*v as i128),
        ScVal::U32(v) => Ok(*v as i128),
        ScVal::I32(v) => Ok(*v as i128),
        other => Err(unexpected("i128", other)),
    }
}

pub fn to_u64(value: &ScVal) -> Result<u64, CodecError> {
    match value {
        ScVal::U64(v) => Ok(*v),
        ScVal::U32(v) => Ok(*v as u64),
        other => {
            let wide = to_i128(other)?;
            u64::try_from(wide).map_err(|_| unexpected("u64", other))
        }
    }
}

/// Small counters such as token decimals.
pub fn to_u32(value: &ScVal) -> Result<u32, CodecError> {
    match value {
        ScVal::U32(v) => Ok(*v),
        other => {
            let wide = to_i128(other)?;
            u32::try_from(wide).map_err(|_| unexpected("u32", other))
        }
    }
}

pub fn to_address(value: &ScVal) -> Result<String, CodecError> {
    match value {
        ScVal::Address(address) => Ok(address_to_string(address)),
        other => Err(unexpected("address", other)),
    }
}

pub fn to_string(value: &ScVal) -> Result<String, CodecError> {
    match value {
        ScVal::String(s) => Ok(s.0.to_utf8_string_lossy()),
        ScVal::Symbol(s) => Ok(s.0.to_utf8_string_lossy()),
        other => Err(unexpected("string", other)),
    }
}

/// Elements of a vector; `Void` decodes as empty.
pub fn to_vec(value: &ScVal) -> Result<Vec<ScVal>, CodecError> {
    match value {
        ScVal::Vec(Some(ScVec(items))) => Ok(items.to_vec()),
        ScVal::Vec(None) | ScVal::Void => Ok(Vec::new()),
        other => Err(unexpected("vec", other)),
    }
}

/// `None` for `Void`, the value otherwise.
pub fn to_option(value: &ScVal) -> Option<&ScVal> {
    match value {
        ScVal::Void => None,
        other => Some(other),
    }
}

/// Field of a contract struct, which is encoded as a map keyed by symbol.
pub fn field<'a>(value: &'a ScVal, name: &str) -> Result<&'a ScVal, CodecError> {
    let entries = match value {
        ScVal::Map(Some(ScMap(entries))) => entries,
        other => return Err(unexpected("map", other)),
    };
    entries
        .iter()
        .find(|entry| match &entry.key {
            ScVal::Symbol(sym) => sym.0.to_utf8_string_lossy() == name,
            _ => false,
        })
        .map(|entry| &entry.val)
        .ok_or_else(|| CodecError::MissingField(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::address::PLACEHOLDER_ACCOUNT;
    use stellar_xdr::curr::{ScMapEntry, ScSymbol};

    fn symbol(name: &str) -> ScVal {
        ScVal::Symbol(ScSymbol(name.to_string().try_into().unwrap()))
    }

    #[test]
    fn test_i128_parts() {
        for value in [0i128, 1, -1, 10_000_000, i128::MAX, i128::MIN, 1 << 70] {
            assert_eq!(to_i128(&i128_val(value)).unwrap(), value);
        }
        assert_eq!(to_i128(&ScVal::U32(5)).unwrap(), 5);
        assert!(to_i128(&ScVal::Bool(true)).is_err());
    }

    #[test]
    fn test_u64_from_i128() {
        assert_eq!(to_u64(&i128_val(86_400)).unwrap(), 86_400);
        assert!(to_u64(&i128_val(-1)).is_err());
    }

    #[test]
    fn test_u32_decimals() {
        assert_eq!(to_u32(&u32_val(7)).unwrap(), 7);
        assert_eq!(to_u32(&i128_val(18)).unwrap(), 18);
        assert!(to_u32(&i128_val(1 << 40)).is_err());
    }

    #[test]
    fn test_struct_field_lookup() {
        let entries = vec![
            ScMapEntry {
                key: symbol("shares"),
                val: i128_val(42),
            },
            ScMapEntry {
                key: symbol("unlock_time"),
                val: u64_val(1_700_000_000),
            },
        ];
        let value = ScVal::Map(Some(ScMap(entries.try_into().unwrap())));

        assert_eq!(to_i128(field(&value, "shares").unwrap()).unwrap(), 42);
        assert_eq!(
            to_u64(field(&value, "unlock_time").unwrap()).unwrap(),
            1_700_000_000
        );
        assert!(matches!(
            field(&value, "borrowed"),
            Err(CodecError::MissingField(_))
        ));
    }

    #[test]
    fn test_address_vec() {
        let value = address_vec_val(&[PLACEHOLDER_ACCOUNT.to_string()]).unwrap();
        let items = to_vec(&value).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(to_address(&items[0]).unwrap(), PLACEHOLDER_ACCOUNT);
        assert!(to_vec(&ScVal::Void).unwrap().is_empty());
    }

    #[test]
    fn test_base64_roundtrip_string() {
        let value = string_val("Vault USDC").unwrap();
        let decoded = from_base64(&to_base64(&value).unwrap()).unwrap();
        assert_eq!(to_string(&decoded).unwrap(), "Vault USDC");
    }
}
