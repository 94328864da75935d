use crate::{
    constants::{EMPTY_LIST_HASH, EMPTY_ROOT_HASH, MAINNET_GENESIS_STATE_ROOT},
    schema::{self, EmptyRule, FieldKind, FieldSpec},
    ChainConfig, FieldError,
};
use alloy_primitives::{hex, keccak256, Address, Bytes, FixedBytes, B256, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use tracing::trace;

const ZERO_HASH: [u8; 32] = [0; 32];
const ZERO_ADDRESS: [u8; 20] = [0; 20];
const ZERO_BLOOM: [u8; 256] = [0; 256];
const ZERO_NONCE: [u8; 8] = [0; 8];
const EMPTY_LIST_HASH_BYTES: [u8; 32] = EMPTY_LIST_HASH.0;
const EMPTY_ROOT_HASH_BYTES: [u8; 32] = EMPTY_ROOT_HASH.0;
const DEFAULT_GAS_LIMIT: [u8; 7] = [0xff; 7];

/// The header field schema, in canonical order.
pub const HEADER_FIELDS: [FieldSpec; 15] = [
    FieldSpec {
        name: "parentHash",
        kind: FieldKind::Fixed(32),
        default: &ZERO_HASH,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "uncleHash",
        kind: FieldKind::Fixed(32),
        default: &EMPTY_LIST_HASH_BYTES,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "coinbase",
        kind: FieldKind::Fixed(20),
        default: &ZERO_ADDRESS,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "stateRoot",
        kind: FieldKind::Fixed(32),
        default: &ZERO_HASH,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "transactionsTrie",
        kind: FieldKind::Fixed(32),
        default: &EMPTY_ROOT_HASH_BYTES,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "receiptTrie",
        kind: FieldKind::Fixed(32),
        default: &EMPTY_ROOT_HASH_BYTES,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "bloom",
        kind: FieldKind::Fixed(256),
        default: &ZERO_BLOOM,
        allow_zero: true,
        empty: EmptyRule::Unchecked,
    },
    FieldSpec {
        name: "difficulty",
        kind: FieldKind::Integer,
        default: &[],
        allow_zero: false,
        empty: EmptyRule::Unchecked,
    },
    FieldSpec {
        name: "number",
        kind: FieldKind::Integer,
        default: &[],
        allow_zero: false,
        empty: EmptyRule::Allowed,
    },
    FieldSpec {
        name: "gasLimit",
        kind: FieldKind::Integer,
        default: &DEFAULT_GAS_LIMIT,
        allow_zero: false,
        empty: EmptyRule::Forbidden,
    },
    FieldSpec {
        name: "gasUsed",
        kind: FieldKind::Integer,
        default: &[],
        allow_zero: true,
        empty: EmptyRule::Allowed,
    },
    FieldSpec {
        name: "timestamp",
        kind: FieldKind::Integer,
        default: &[],
        allow_zero: false,
        empty: EmptyRule::Allowed,
    },
    FieldSpec {
        name: "extraData",
        kind: FieldKind::Bytes,
        default: &[],
        allow_zero: true,
        empty: EmptyRule::Allowed,
    },
    FieldSpec {
        name: "mixHash",
        kind: FieldKind::Fixed(32),
        default: &ZERO_HASH,
        allow_zero: true,
        empty: EmptyRule::Unchecked,
    },
    FieldSpec {
        name: "nonce",
        kind: FieldKind::Bytes,
        default: &ZERO_NONCE,
        allow_zero: true,
        empty: EmptyRule::Allowed,
    },
];

/// A field of a block header. The discriminant is the position of the field in the canonical
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    /// Hash of the parent block.
    ParentHash,
    /// Hash of the uncle header list.
    UncleHash,
    /// Beneficiary address.
    Coinbase,
    /// Root of the state trie after execution.
    StateRoot,
    /// Root of the transaction trie.
    TransactionsTrie,
    /// Root of the receipt trie.
    ReceiptTrie,
    /// Logs bloom.
    Bloom,
    /// Proof of work difficulty.
    Difficulty,
    /// Block number.
    Number,
    /// Gas limit.
    GasLimit,
    /// Gas used.
    GasUsed,
    /// Unix timestamp.
    Timestamp,
    /// Arbitrary extra data.
    ExtraData,
    /// Proof of work mix hash.
    MixHash,
    /// Proof of work nonce.
    Nonce,
}

impl HeaderField {
    /// All header fields in canonical order.
    pub const ALL: [Self; 15] = [
        Self::ParentHash,
        Self::UncleHash,
        Self::Coinbase,
        Self::StateRoot,
        Self::TransactionsTrie,
        Self::ReceiptTrie,
        Self::Bloom,
        Self::Difficulty,
        Self::Number,
        Self::GasLimit,
        Self::GasUsed,
        Self::Timestamp,
        Self::ExtraData,
        Self::MixHash,
        Self::Nonce,
    ];

    /// Position of the field in the canonical encoding.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Schema entry of the field.
    pub const fn spec(self) -> &'static FieldSpec {
        &HEADER_FIELDS[self.index()]
    }

    /// Name of the field.
    pub const fn name(self) -> &'static str {
        self.spec().name
    }
}

/// Ethereum block header.
///
/// Holds one byte string per entry of [`HEADER_FIELDS`]. Every value has passed its schema check,
/// so the typed accessors never see a value longer than its field allows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    fields: Vec<Bytes>,
}

impl Default for Header {
    fn default() -> Self {
        Self { fields: schema::default_fields(&HEADER_FIELDS) }
    }
}

impl Header {
    /// Builds a header from a map of field names to values. Omitted fields fall back to their
    /// default where the schema allows it.
    pub fn from_fields(values: HashMap<String, Bytes>) -> Result<Self, FieldError> {
        Ok(Self { fields: schema::fields_from_map(&HEADER_FIELDS, values)? })
    }

    /// Builds a header from its raw field array. Position `i` maps to schema entry `i`.
    pub fn from_raw(fields: Vec<Bytes>) -> Result<Self, FieldError> {
        Ok(Self { fields: schema::fields_from_list(&HEADER_FIELDS, fields)? })
    }

    /// The raw field array in canonical order.
    pub fn raw(&self) -> &[Bytes] {
        &self.fields
    }

    /// Consumes the header and returns its raw field array.
    pub fn into_raw(self) -> Vec<Bytes> {
        self.fields
    }

    /// Raw value of a single field.
    pub fn field(&self, field: HeaderField) -> &Bytes {
        &self.fields[field.index()]
    }

    /// Assigns a single field after checking it against its schema entry.
    pub fn set(&mut self, field: HeaderField, value: impl Into<Bytes>) -> Result<(), FieldError> {
        let value = value.into();
        field.spec().check(&value)?;
        self.fields[field.index()] = value;
        Ok(())
    }

    /// Assigns an integer field using its minimal big-endian encoding.
    pub fn set_integer(&mut self, field: HeaderField, value: U256) -> Result<(), FieldError> {
        self.set(field, schema::integer_to_bytes(value))
    }

    fn hash_field(&self, field: HeaderField) -> B256 {
        B256::left_padding_from(self.field(field))
    }

    fn integer_field(&self, field: HeaderField) -> U256 {
        schema::bytes_to_integer(self.field(field))
    }

    /// Hash of the parent block.
    pub fn parent_hash(&self) -> B256 {
        self.hash_field(HeaderField::ParentHash)
    }

    /// Hash of the uncle header list.
    pub fn uncle_hash(&self) -> B256 {
        self.hash_field(HeaderField::UncleHash)
    }

    /// Beneficiary address.
    pub fn coinbase(&self) -> Address {
        Address::from(FixedBytes::<20>::left_padding_from(self.field(HeaderField::Coinbase)))
    }

    /// State root.
    pub fn state_root(&self) -> B256 {
        self.hash_field(HeaderField::StateRoot)
    }

    /// Transaction trie root.
    pub fn transactions_trie(&self) -> B256 {
        self.hash_field(HeaderField::TransactionsTrie)
    }

    /// Receipt trie root.
    pub fn receipt_trie(&self) -> B256 {
        self.hash_field(HeaderField::ReceiptTrie)
    }

    /// Declared difficulty.
    pub fn difficulty(&self) -> U256 {
        self.integer_field(HeaderField::Difficulty)
    }

    /// Block number.
    pub fn number(&self) -> U256 {
        self.integer_field(HeaderField::Number)
    }

    /// Gas limit.
    pub fn gas_limit(&self) -> U256 {
        self.integer_field(HeaderField::GasLimit)
    }

    /// Gas used.
    pub fn gas_used(&self) -> U256 {
        self.integer_field(HeaderField::GasUsed)
    }

    /// Timestamp.
    pub fn timestamp(&self) -> U256 {
        self.integer_field(HeaderField::Timestamp)
    }

    /// Extra data.
    pub fn extra_data(&self) -> &Bytes {
        self.field(HeaderField::ExtraData)
    }

    /// Mix hash.
    pub fn mix_hash(&self) -> B256 {
        self.hash_field(HeaderField::MixHash)
    }

    /// Keccak-256 hash of the RLP encoded header.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Returns `true` if the number field is the empty byte string.
    ///
    /// Genesis headers are exempt from every parent-relative check.
    pub fn is_genesis(&self) -> bool {
        self.field(HeaderField::Number).is_empty()
    }

    /// Returns `true` if the header is at or past the Homestead fork.
    pub fn is_homestead(&self, config: &ChainConfig) -> bool {
        config.is_homestead_active_at_block(self.number())
    }

    /// Returns `true` if the header is at or past the Homestead gas reprice fork.
    pub fn is_homestead_reprice(&self, config: &ChainConfig) -> bool {
        config.is_homestead_reprice_active_at_block(self.number())
    }

    /// The mainnet genesis header.
    pub fn mainnet_genesis() -> Self {
        let mut fields = schema::default_fields(&HEADER_FIELDS);
        fields[HeaderField::StateRoot.index()] =
            Bytes::copy_from_slice(MAINNET_GENESIS_STATE_ROOT.as_slice());
        fields[HeaderField::Difficulty.index()] = Bytes::copy_from_slice(&hex!("0400000000"));
        fields[HeaderField::GasLimit.index()] = Bytes::copy_from_slice(&hex!("1388"));
        fields[HeaderField::ExtraData.index()] = Bytes::copy_from_slice(&hex!(
            "11bbe8db4e347b4e8c937c1c8370e4b5ed33adb3db69cbdb7a38e1e50b1b82fa"
        ));
        fields[HeaderField::Nonce.index()] = Bytes::copy_from_slice(&hex!("0000000000000042"));
        Self { fields }
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn BufMut) {
        schema::encode_fields(&self.fields, out)
    }

    fn length(&self) -> usize {
        schema::fields_length(&self.fields)
    }
}

/// A well formed list that breaks the field schema decodes to [`alloy_rlp::Error::Custom`]. The
/// offending field is logged at trace level; [`Header::from_raw`] returns it as a [`FieldError`].
impl Decodable for Header {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Self::from_raw(schema::decode_fields(buf)?).map_err(|err| {
            trace!(target: "primitives::header", %err, "Header violates the field schema");
            alloy_rlp::Error::Custom("header violates the field schema")
        })
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema::serialize_fields(&HEADER_FIELDS, &self.fields, serializer)
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = HashMap::<String, Bytes>::deserialize(deserializer)?;
        Self::from_fields(values).map_err(serde::de::Error::custom)
    }
}
