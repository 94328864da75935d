use super::{util::secp256k1, BlockTransaction, InvalidTransactionError};
use crate::{
    constants::{
        SECP256K1N, SECP256K1N_HALF, TX_CREATE_GAS, TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS,
    },
    keccak256,
    schema::{self, EmptyRule, FieldKind, FieldSpec},
    Address, Bytes, FieldError, B256, U256,
};
use alloy_primitives::FixedBytes;
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use tracing::trace;

const fn integer_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Integer,
        default: &[],
        allow_zero: true,
        empty: EmptyRule::Allowed,
    }
}

/// The legacy transaction field schema, in canonical order.
pub const TX_FIELDS: [FieldSpec; 9] = [
    integer_field("nonce"),
    integer_field("gasPrice"),
    integer_field("gasLimit"),
    FieldSpec {
        name: "to",
        kind: FieldKind::Fixed(20),
        default: &[],
        allow_zero: true,
        empty: EmptyRule::Allowed,
    },
    integer_field("value"),
    FieldSpec {
        name: "data",
        kind: FieldKind::Bytes,
        default: &[],
        allow_zero: true,
        empty: EmptyRule::Allowed,
    },
    integer_field("v"),
    integer_field("r"),
    integer_field("s"),
];

/// Number of leading fields covered by the signing hash.
const UNSIGNED_FIELDS: usize = 6;

const NONCE: usize = 0;
const GAS_PRICE: usize = 1;
const GAS_LIMIT: usize = 2;
const TO: usize = 3;
const VALUE: usize = 4;
const DATA: usize = 5;
const V: usize = 6;
const R: usize = 7;
const S: usize = 8;

/// Legacy transaction, `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
///
/// An empty `to` field creates a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyTransaction {
    fields: Vec<Bytes>,
}

impl Default for LegacyTransaction {
    fn default() -> Self {
        Self { fields: schema::default_fields(&TX_FIELDS) }
    }
}

impl LegacyTransaction {
    /// Creates an unsigned transaction.
    pub fn new(
        nonce: U256,
        gas_price: U256,
        gas_limit: U256,
        to: Option<Address>,
        value: U256,
        data: Bytes,
    ) -> Self {
        let mut fields = schema::default_fields(&TX_FIELDS);
        fields[NONCE] = schema::integer_to_bytes(nonce);
        fields[GAS_PRICE] = schema::integer_to_bytes(gas_price);
        fields[GAS_LIMIT] = schema::integer_to_bytes(gas_limit);
        fields[TO] = to.map(|to| Bytes::copy_from_slice(to.as_slice())).unwrap_or_default();
        fields[VALUE] = schema::integer_to_bytes(value);
        fields[DATA] = data;
        Self { fields }
    }

    /// Builds a transaction from a map of field names to values.
    pub fn from_fields(values: HashMap<String, Bytes>) -> Result<Self, FieldError> {
        Ok(Self { fields: schema::fields_from_map(&TX_FIELDS, values)? })
    }

    fn integer(&self, index: usize) -> U256 {
        schema::bytes_to_integer(&self.fields[index])
    }

    /// Sender nonce.
    pub fn nonce(&self) -> U256 {
        self.integer(NONCE)
    }

    /// Gas price.
    pub fn gas_price(&self) -> U256 {
        self.integer(GAS_PRICE)
    }

    /// Gas limit.
    pub fn gas_limit(&self) -> U256 {
        self.integer(GAS_LIMIT)
    }

    /// Recipient, or `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        let to = &self.fields[TO];
        (!to.is_empty()).then(|| Address::from(FixedBytes::<20>::left_padding_from(to)))
    }

    /// Transferred value.
    pub fn value(&self) -> U256 {
        self.integer(VALUE)
    }

    /// Call data or init code.
    pub fn data(&self) -> &Bytes {
        &self.fields[DATA]
    }

    /// Signature `v` value, `27` or `28` for a valid signature.
    pub fn v(&self) -> U256 {
        self.integer(V)
    }

    /// Signature `r` value.
    pub fn r(&self) -> U256 {
        self.integer(R)
    }

    /// Signature `s` value.
    pub fn s(&self) -> U256 {
        self.integer(S)
    }

    /// Returns `true` if the transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.fields[TO].is_empty()
    }

    /// Hash that is signed by the sender: keccak256 of the RLP list of the first six fields.
    pub fn signature_hash(&self) -> B256 {
        let unsigned = &self.fields[..UNSIGNED_FIELDS];
        let mut buf = Vec::with_capacity(schema::fields_length(unsigned));
        schema::encode_fields(unsigned, &mut buf);
        keccak256(buf)
    }

    /// Signs the transaction with the given secret key, filling in `v`, `r` and `s`.
    pub fn sign(&mut self, secret: B256) -> Result<(), InvalidTransactionError> {
        let (data, rec_id) = secp256k1::sign_message(secret, self.signature_hash())
            .map_err(|_| InvalidTransactionError::InvalidSignature)?;
        self.fields[V] = schema::integer_to_bytes(U256::from(27 + rec_id));
        self.fields[R] = schema::integer_to_bytes(U256::from_be_slice(&data[..32]));
        self.fields[S] = schema::integer_to_bytes(U256::from_be_slice(&data[32..]));
        Ok(())
    }

    /// Recovers the sender from the signature.
    pub fn sender(&self) -> Result<Address, InvalidTransactionError> {
        let (v, r, s) = (self.v(), self.r(), self.s());
        if v != U256::from(27) && v != U256::from(28) {
            return Err(InvalidTransactionError::InvalidSignature)
        }
        if r.is_zero() || s.is_zero() || r >= SECP256K1N || s >= SECP256K1N {
            return Err(InvalidTransactionError::InvalidSignature)
        }

        let mut sig = [0u8; 65];
        sig[..32].copy_from_slice(&r.to_be_bytes::<32>());
        sig[32..64].copy_from_slice(&s.to_be_bytes::<32>());
        sig[64] = if v == U256::from(28) { 1 } else { 0 };
        secp256k1::recover_signer(&sig, &self.signature_hash())
            .map_err(|_| InvalidTransactionError::InvalidSignature)
    }

    /// Gas charged before execution starts.
    pub fn intrinsic_gas(&self, homestead: bool) -> U256 {
        let data_gas: u64 = self
            .data()
            .iter()
            .map(|byte| if *byte == 0 { TX_DATA_ZERO_GAS } else { TX_DATA_NON_ZERO_GAS })
            .sum();
        let mut gas = U256::from(TX_GAS) + U256::from(data_gas);
        if homestead && self.is_create() {
            gas += U256::from(TX_CREATE_GAS);
        }
        gas
    }
}

impl BlockTransaction for LegacyTransaction {
    fn from_raw(fields: Vec<Bytes>) -> Result<Self, FieldError> {
        Ok(Self { fields: schema::fields_from_list(&TX_FIELDS, fields)? })
    }

    fn raw(&self) -> &[Bytes] {
        &self.fields
    }

    fn validate(&self, homestead: bool) -> Result<(), InvalidTransactionError> {
        self.sender()?;
        if homestead && self.s() > SECP256K1N_HALF {
            return Err(InvalidTransactionError::HighS)
        }

        let intrinsic_gas = self.intrinsic_gas(homestead);
        let gas_limit = self.gas_limit();
        if gas_limit < intrinsic_gas {
            return Err(InvalidTransactionError::GasLimitTooLow { intrinsic_gas, gas_limit })
        }
        Ok(())
    }
}

impl Encodable for LegacyTransaction {
    fn encode(&self, out: &mut dyn BufMut) {
        schema::encode_fields(&self.fields, out)
    }

    fn length(&self) -> usize {
        schema::fields_length(&self.fields)
    }
}

/// Schema violations decode to [`alloy_rlp::Error::Custom`]; use
/// [`BlockTransaction::from_raw`] for the [`FieldError`].
impl Decodable for LegacyTransaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Self::from_raw(schema::decode_fields(buf)?).map_err(|err| {
            trace!(
                target: "primitives::transaction",
                %err,
                "Transaction violates the field schema"
            );
            alloy_rlp::Error::Custom("transaction violates the field schema")
        })
    }
}

impl Serialize for LegacyTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema::serialize_fields(&TX_FIELDS, &self.fields, serializer)
    }
}

impl<'de> Deserialize<'de> for LegacyTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = HashMap::<String, Bytes>::deserialize(deserializer)?;
        Self::from_fields(values).map_err(serde::de::Error::custom)
    }
}
