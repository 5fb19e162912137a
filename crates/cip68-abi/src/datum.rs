//! CIP68 inline-datum codec: constructor records over CBOR.
//!
//! The reference token's datum is a constructor-0 record holding the metadata
//! map (keys and values as byte strings) and a format version. The owner key
//! hash under `_pk` is stored as its raw bytes (callers pass and receive it
//! hex-encoded); every other value is stored as UTF-8. Redeemer values for
//! the mint and store validators are fieldless constructor records. Only the
//! record layout and the owner-field lookup live here; the CBOR data model
//! itself is `ciborium`'s.

use ciborium::value::{Integer, Value};

use crate::error::Cip68Error;
use crate::schema::Metadata;

/// Metadata key holding the owner public-key hash.
pub const OWNER_KEY: &str = "_pk";

/// CIP68 datum format version written alongside the metadata map.
pub const METADATA_VERSION: u64 = 1;

/// CBOR tag of constructor 0; constructors 0..=6 map to tags 121..=127.
const CONSTR_TAG_BASE: u64 = 121;

/// CBOR tag of constructor 7; constructors 7..=127 map to tags 1280..=1400.
const CONSTR_TAG_HIGH_BASE: u64 = 1280;

/// Encode a constructor record with the given index and fields.
pub fn encode_constr(index: u64, fields: Vec<Value>) -> Result<Vec<u8>, Cip68Error> {
    let tag = if index < 7 {
        CONSTR_TAG_BASE + index
    } else {
        CONSTR_TAG_HIGH_BASE + (index - 7)
    };

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&Value::Tag(tag, Box::new(Value::Array(fields))), &mut bytes)
        .map_err(|error| Cip68Error::DatumEncode(error.to_string()))?;

    Ok(bytes)
}

fn constr_index_from_tag(tag: u64) -> Option<u64> {
    match tag {
        CONSTR_TAG_BASE..=127 => Some(tag - CONSTR_TAG_BASE),
        CONSTR_TAG_HIGH_BASE..=1400 => Some(tag - CONSTR_TAG_HIGH_BASE + 7),
        _ => None,
    }
}

fn decode_constr(bytes: &[u8]) -> Result<(u64, Vec<Value>), Cip68Error> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|error| Cip68Error::MalformedDatum(error.to_string()))?;

    let Value::Tag(tag, payload) = value else {
        return Err(Cip68Error::MalformedDatum(
            "payload is not a tagged constructor record".to_string(),
        ));
    };
    let Some(index) = constr_index_from_tag(tag) else {
        return Err(Cip68Error::MalformedDatum(format!(
            "tag {tag} is not a constructor tag"
        )));
    };
    let Value::Array(fields) = *payload else {
        return Err(Cip68Error::MalformedDatum(
            "constructor payload is not an array".to_string(),
        ));
    };

    Ok((index, fields))
}

fn metadata_value_bytes(key: &str, value: &str) -> Result<Vec<u8>, Cip68Error> {
    if key == OWNER_KEY {
        Ok(hex::decode(value)?)
    } else {
        Ok(value.as_bytes().to_vec())
    }
}

/// Encode caller-supplied metadata as the reference token's inline datum.
///
/// # Errors
///
/// Returns [`Cip68Error::InvalidHex`] when the `_pk` value is not a valid
/// hex-encoded key hash.
pub fn encode_metadata(metadata: &Metadata) -> Result<Vec<u8>, Cip68Error> {
    let entries = metadata
        .iter()
        .map(|(key, value)| {
            Ok((
                Value::Bytes(key.as_bytes().to_vec()),
                Value::Bytes(metadata_value_bytes(key, value)?),
            ))
        })
        .collect::<Result<Vec<_>, Cip68Error>>()?;

    encode_constr(
        0,
        vec![
            Value::Map(entries),
            Value::Integer(Integer::from(METADATA_VERSION)),
        ],
    )
}

/// Hex form of [`encode_metadata`], as carried in a `produce_output`
/// instruction.
pub fn encode_metadata_hex(metadata: &Metadata) -> Result<String, Cip68Error> {
    Ok(hex::encode(encode_metadata(metadata)?))
}

fn metadata_entries(bytes: &[u8]) -> Result<Vec<(Value, Value)>, Cip68Error> {
    let (index, fields) = decode_constr(bytes)?;
    if index != 0 {
        return Err(Cip68Error::MalformedDatum(format!(
            "unexpected constructor index {index}"
        )));
    }

    match fields.into_iter().next() {
        Some(Value::Map(entries)) => Ok(entries),
        _ => Err(Cip68Error::MalformedDatum(
            "first constructor field is not a map".to_string(),
        )),
    }
}

/// Decode a reference-token inline datum back into its metadata map.
pub fn decode_metadata(bytes: &[u8]) -> Result<Metadata, Cip68Error> {
    let mut metadata = Metadata::new();
    for (key, value) in metadata_entries(bytes)? {
        let (Value::Bytes(key), Value::Bytes(value)) = (key, value) else {
            return Err(Cip68Error::MalformedDatum(
                "metadata entry is not a pair of byte strings".to_string(),
            ));
        };
        let key = String::from_utf8(key)
            .map_err(|_| Cip68Error::MalformedDatum("metadata key is not UTF-8".to_string()))?;
        let value = if key == OWNER_KEY {
            hex::encode(value)
        } else {
            String::from_utf8(value).map_err(|_| {
                Cip68Error::MalformedDatum("metadata value is not UTF-8".to_string())
            })?
        };
        metadata.insert(key, value);
    }

    Ok(metadata)
}

/// Extract the owner public-key hash recorded under `_pk` from a hex-encoded
/// inline datum.
///
/// Returns the value hex-encoded, or `None` when the field is absent.
///
/// # Errors
///
/// Returns [`Cip68Error::InvalidHex`] on a non-hex payload and
/// [`Cip68Error::MalformedDatum`] when the payload does not decode as a
/// constructor record with a leading map field.
pub fn owner_key_hash(datum_hex: &str) -> Result<Option<String>, Cip68Error> {
    let bytes = hex::decode(datum_hex)?;

    for (key, value) in metadata_entries(&bytes)? {
        let Value::Bytes(key) = key else { continue };
        if key.as_slice() != OWNER_KEY.as_bytes() {
            continue;
        }
        let Value::Bytes(value) = value else {
            return Err(Cip68Error::MalformedDatum(
                "owner field is not a byte string".to_string(),
            ));
        };
        return Ok(Some(hex::encode(value)));
    }

    Ok(None)
}
