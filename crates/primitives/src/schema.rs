//! Declarative field schemas.
//!
//! A schema is a static, ordered table of [`FieldSpec`]s. The order of the table is the order in
//! which the fields are laid out, RLP encoded and hashed. Construction from a named map, decoding
//! from a raw field array and validated assignment all go through [`FieldSpec::check`], so a
//! schema entry is the single place where a field's constraints live.

use crate::{FieldError, GotExpected};
use alloy_primitives::{Bytes, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use serde::{ser::SerializeMap, Serializer};
use std::collections::HashMap;

/// Maximum number of bytes of a field read as an unsigned integer.
pub const MAX_INTEGER_BYTES: usize = 32;

/// How the bytes of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A value of at most the given number of bytes, e.g. a hash or an address.
    Fixed(usize),
    /// A big-endian unsigned integer of at most [`MAX_INTEGER_BYTES`] bytes. The empty value is
    /// zero.
    Integer,
    /// Opaque bytes of any length.
    Bytes,
}

/// Whether a field may hold the empty byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRule {
    /// The empty value is explicitly allowed.
    Allowed,
    /// The empty value is rejected.
    Forbidden,
    /// The field carries no emptiness rule and is not checked for it.
    Unchecked,
}

/// One entry of a field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name of the field, as used in named maps and the JSON projection.
    pub name: &'static str,
    /// How the bytes of the field are interpreted.
    pub kind: FieldKind,
    /// Value used when the field is not provided.
    pub default: &'static [u8],
    /// Whether the field may be left out of a named map, in which case `default` is used.
    pub allow_zero: bool,
    /// Whether the field may be empty.
    pub empty: EmptyRule,
}

impl FieldSpec {
    /// Maximum number of bytes the field may hold, if bounded.
    pub const fn max_len(&self) -> Option<usize> {
        match self.kind {
            FieldKind::Fixed(len) => Some(len),
            FieldKind::Integer => Some(MAX_INTEGER_BYTES),
            FieldKind::Bytes => None,
        }
    }

    /// Checks a value against this entry.
    pub fn check(&self, value: &[u8]) -> Result<(), FieldError> {
        if let Some(max) = self.max_len() {
            if value.len() > max {
                return Err(FieldError::TooLong { name: self.name, max, len: value.len() })
            }
        }
        if self.empty == EmptyRule::Forbidden && value.is_empty() {
            return Err(FieldError::Empty { name: self.name })
        }
        Ok(())
    }

    /// Returns the default value of the field.
    pub fn default_value(&self) -> Bytes {
        Bytes::from_static(self.default)
    }
}

/// Reads a big-endian unsigned integer field. The empty value is zero.
///
/// # Panics
///
/// If `bytes` is longer than [`MAX_INTEGER_BYTES`]. Fields of kind [`FieldKind::Integer`] are
/// checked against this bound on construction.
pub fn bytes_to_integer(bytes: &[u8]) -> U256 {
    U256::from_be_slice(bytes)
}

/// Minimal big-endian encoding of an unsigned integer. Zero is the empty value.
pub fn integer_to_bytes(value: U256) -> Bytes {
    let bytes = value.to_be_bytes::<MAX_INTEGER_BYTES>();
    let start = bytes.iter().position(|byte| *byte != 0).unwrap_or(bytes.len());
    Bytes::copy_from_slice(&bytes[start..])
}

/// Returns the default value of every field in schema order.
pub fn default_fields(schema: &[FieldSpec]) -> Vec<Bytes> {
    schema.iter().map(FieldSpec::default_value).collect()
}

/// Builds a field array from a map of field names to values.
///
/// Fields left out of the map fall back to their default if the schema allows it. Names that are
/// not part of the schema are ignored.
pub fn fields_from_map(
    schema: &[FieldSpec],
    mut values: HashMap<String, Bytes>,
) -> Result<Vec<Bytes>, FieldError> {
    schema
        .iter()
        .map(|spec| match values.remove(spec.name) {
            Some(value) => spec.check(&value).map(|_| value),
            None if spec.allow_zero => Ok(spec.default_value()),
            None => Err(FieldError::Missing { name: spec.name }),
        })
        .collect()
}

/// Checks a raw field array against the schema. Position `i` maps to schema entry `i`.
pub fn fields_from_list(
    schema: &[FieldSpec],
    values: Vec<Bytes>,
) -> Result<Vec<Bytes>, FieldError> {
    if values.len() != schema.len() {
        return Err(FieldError::Arity(GotExpected::new(values.len(), schema.len())))
    }
    for (spec, value) in schema.iter().zip(&values) {
        spec.check(value)?;
    }
    Ok(values)
}

/// Length of the RLP list payload of a field array.
pub fn fields_payload_length(fields: &[Bytes]) -> usize {
    fields.iter().map(Encodable::length).sum()
}

/// RLP encodes a field array as a list of byte strings.
pub fn encode_fields(fields: &[Bytes], out: &mut dyn BufMut) {
    alloy_rlp::Header { list: true, payload_length: fields_payload_length(fields) }.encode(out);
    for field in fields {
        field.encode(out);
    }
}

/// Length of the RLP encoding of a field array.
pub fn fields_length(fields: &[Bytes]) -> usize {
    let payload_length = fields_payload_length(fields);
    payload_length + alloy_rlp::length_of_length(payload_length)
}

/// Decodes an RLP list of byte strings, without checking it against a schema.
pub fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Vec<Bytes>> {
    let header = alloy_rlp::Header::decode(buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString)
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort)
    }
    let (mut payload, rest) = buf.split_at(header.payload_length);
    let mut fields = Vec::new();
    while !payload.is_empty() {
        fields.push(Bytes::decode(&mut payload)?);
    }
    *buf = rest;
    Ok(fields)
}

/// Serializes a field array as a map of field names to hex strings, in schema order.
pub fn serialize_fields<S: Serializer>(
    schema: &[FieldSpec],
    fields: &[Bytes],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(schema.len()))?;
    for (spec, value) in schema.iter().zip(fields) {
        map.serialize_entry(spec.name, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SCHEMA: [FieldSpec; 3] = [
        FieldSpec {
            name: "hash",
            kind: FieldKind::Fixed(4),
            default: &[0; 4],
            allow_zero: false,
            empty: EmptyRule::Forbidden,
        },
        FieldSpec {
            name: "amount",
            kind: FieldKind::Integer,
            default: &[],
            allow_zero: true,
            empty: EmptyRule::Allowed,
        },
        FieldSpec {
            name: "blob",
            kind: FieldKind::Bytes,
            default: &[0xaa],
            allow_zero: true,
            empty: EmptyRule::Unchecked,
        },
    ];

    fn map(entries: Vec<(&str, Vec<u8>)>) -> HashMap<String, Bytes> {
        entries.into_iter().map(|(k, v)| (k.to_string(), Bytes::from(v))).collect()
    }

    #[test]
    fn fills_defaults_for_zero_fields() {
        let fields = fields_from_map(&SCHEMA, map(vec![("hash", vec![1, 2, 3, 4])])).unwrap();
        assert_eq!(
            fields,
            vec![Bytes::from(vec![1, 2, 3, 4]), Bytes::new(), Bytes::from(vec![0xaa])]
        );
    }

    #[test]
    fn rejects_missing_required_field() {
        assert_eq!(
            fields_from_map(&SCHEMA, map(vec![("amount", vec![1])])),
            Err(FieldError::Missing { name: "hash" })
        );
    }

    #[test]
    fn rejects_overlong_values() {
        assert_matches!(
            fields_from_map(&SCHEMA, map(vec![("hash", vec![1, 2, 3, 4, 5])])),
            Err(FieldError::TooLong { name: "hash", max: 4, len: 5 })
        );
        assert_matches!(
            fields_from_map(&SCHEMA, map(vec![("hash", vec![1]), ("amount", vec![1; 33])])),
            Err(FieldError::TooLong { name: "amount", max: 32, len: 33 })
        );
    }

    #[test]
    fn shorter_fixed_values_and_unknown_names_pass() {
        let fields =
            fields_from_map(&SCHEMA, map(vec![("hash", vec![7]), ("unknown", vec![1, 2])])).unwrap();
        assert_eq!(fields[0], Bytes::from(vec![7]));
    }

    #[test]
    fn emptiness_rules() {
        assert_eq!(
            fields_from_map(&SCHEMA, map(vec![("hash", vec![])])),
            Err(FieldError::Empty { name: "hash" })
        );
        // `blob` has no emptiness rule
        assert!(fields_from_map(&SCHEMA, map(vec![("hash", vec![1]), ("blob", vec![])])).is_ok());
    }

    #[test]
    fn minimal_integers() {
        assert_eq!(integer_to_bytes(U256::ZERO), Bytes::new());
        assert_eq!(integer_to_bytes(U256::from(0x0102)), Bytes::from(vec![1, 2]));
        assert_eq!(bytes_to_integer(&[]), U256::ZERO);
        assert_eq!(bytes_to_integer(&[0, 1, 2]), U256::from(0x0102));
    }

    #[test]
    fn list_arity_mismatch() {
        assert_eq!(
            fields_from_list(&SCHEMA, vec![Bytes::from(vec![1])]),
            Err(FieldError::Arity(GotExpected::new(1, 3)))
        );
    }

    #[test]
    fn field_list_rlp() {
        let fields = vec![Bytes::from(vec![1, 2, 3, 4]), Bytes::new(), Bytes::from(vec![0xaa])];
        let mut buf = Vec::new();
        encode_fields(&fields, &mut buf);
        assert_eq!(buf, [0xc8, 0x84, 1, 2, 3, 4, 0x80, 0x81, 0xaa]);
        assert_eq!(fields_length(&fields), buf.len());
        assert_eq!(decode_fields(&mut buf.as_slice()).unwrap(), fields);
    }

    #[test]
    fn decode_rejects_string() {
        assert_eq!(decode_fields(&mut &[0x82, 1, 2][..]), Err(alloy_rlp::Error::UnexpectedString));
    }
}
