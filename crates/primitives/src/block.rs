use crate::{
    proofs::calculate_uncles_hash, BlockDecodeError, BlockTransaction, Bytes, Header,
    LegacyTransaction, B256,
};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// Ethereum full block, `[header, transactions, uncleHeaders]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<T = LegacyTransaction> {
    /// Block header.
    pub header: Header,
    /// Transactions in this block.
    pub transactions: Vec<T>,
    /// Uncle headers.
    pub uncle_headers: Vec<Header>,
}

/// The undecoded tree of a block: every header and transaction as its raw field array.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct RawBlock {
    /// Raw header fields.
    pub header: Vec<Bytes>,
    /// Raw fields of every transaction.
    pub transactions: Vec<Vec<Bytes>>,
    /// Raw fields of every uncle header.
    pub uncle_headers: Vec<Vec<Bytes>>,
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        Self { header: Header::default(), transactions: Vec::new(), uncle_headers: Vec::new() }
    }
}

impl<T> Block<T> {
    /// Creates a block from its parts.
    pub const fn new(header: Header, transactions: Vec<T>, uncle_headers: Vec<Header>) -> Self {
        Self { header, transactions, uncle_headers }
    }

    /// Hash of the block header.
    pub fn hash(&self) -> B256 {
        self.header.hash()
    }

    /// Hash of the uncle header list, as it should be recorded in the header.
    pub fn uncles_hash(&self) -> B256 {
        calculate_uncles_hash(&self.uncle_headers)
    }
}

impl<T: BlockTransaction> Block<T> {
    /// Builds a block from its undecoded tree, checking the header, every uncle header and every
    /// transaction against their field schema.
    pub fn from_raw(raw: RawBlock) -> Result<Self, BlockDecodeError> {
        let header = Header::from_raw(raw.header)?;
        let transactions =
            raw.transactions.into_iter().map(T::from_raw).collect::<Result<Vec<_>, _>>()?;
        let uncle_headers =
            raw.uncle_headers.into_iter().map(Header::from_raw).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, transactions, uncle_headers })
    }

    /// Decodes a wire encoded block. The input must hold exactly one block.
    pub fn decode_bytes(mut data: &[u8]) -> Result<Self, BlockDecodeError> {
        let raw = RawBlock::decode(&mut data)?;
        if !data.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength.into())
        }
        Self::from_raw(raw)
    }

    /// The undecoded tree of the block.
    pub fn raw(&self) -> RawBlock {
        RawBlock {
            header: self.header.raw().to_vec(),
            transactions: self.transactions.iter().map(|tx| tx.raw().to_vec()).collect(),
            uncle_headers: self.uncle_headers.iter().map(|uncle| uncle.raw().to_vec()).collect(),
        }
    }

    /// Wire encoding of the block.
    pub fn encoded(&self) -> Bytes {
        alloy_rlp::encode(self).into()
    }

    fn payload_length(&self) -> usize {
        self.header.length() + self.transactions.length() + self.uncle_headers.length()
    }
}

impl<T: BlockTransaction> Encodable for Block<T> {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header { list: true, payload_length: self.payload_length() }.encode(out);
        self.header.encode(out);
        self.transactions.encode(out);
        self.uncle_headers.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

impl<T: BlockTransaction> Decodable for Block<T> {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();
        let this = Self {
            header: Decodable::decode(buf)?,
            transactions: Decodable::decode(buf)?,
            uncle_headers: Decodable::decode(buf)?,
        };
        let consumed = started_len - buf.len();
        if consumed != rlp_head.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: rlp_head.payload_length,
                got: consumed,
            })
        }
        Ok(this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, FieldError, HeaderField, U256};
    use assert_matches::assert_matches;

    fn block() -> Block {
        let mut tx = LegacyTransaction::new(
            U256::from(1),
            U256::from(50_000_000_000u64),
            U256::from(21_000),
            Some(Address::repeat_byte(0x01)),
            U256::from(10),
            Bytes::new(),
        );
        tx.sign(B256::repeat_byte(0x07)).unwrap();

        let mut header = Header::mainnet_genesis();
        header.set_integer(HeaderField::Number, U256::from(9)).unwrap();
        let mut uncle = Header::mainnet_genesis();
        uncle.set_integer(HeaderField::Number, U256::from(7)).unwrap();

        Block::new(header, vec![tx], vec![uncle])
    }

    #[test]
    fn rlp_roundtrip() {
        let block = block();
        let encoded = block.encoded();
        assert_eq!(encoded.len(), block.length());
        assert_eq!(Block::<LegacyTransaction>::decode_bytes(&encoded).unwrap(), block);
        assert_eq!(Block::<LegacyTransaction>::decode(&mut &encoded[..]).unwrap(), block);
    }

    #[test]
    fn raw_tree_matches_wire_encoding() {
        let block = block();
        let raw = block.raw();
        assert_eq!(raw.header.len(), 15);
        assert_eq!(raw.transactions[0].len(), 9);
        assert_eq!(Bytes::from(alloy_rlp::encode(&raw)), block.encoded());
        assert_eq!(Block::<LegacyTransaction>::from_raw(raw).unwrap(), block);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut encoded = block().encoded().to_vec();
        encoded.push(0x80);
        assert_matches!(
            Block::<LegacyTransaction>::decode_bytes(&encoded),
            Err(BlockDecodeError::Rlp(alloy_rlp::Error::UnexpectedLength))
        );
    }

    #[test]
    fn uncle_schema_violation() {
        let mut raw = block().raw();
        raw.uncle_headers[0].pop();
        assert_matches!(
            Block::<LegacyTransaction>::from_raw(raw),
            Err(BlockDecodeError::Field(FieldError::Arity(_)))
        );
    }

    #[test]
    fn empty_block() {
        let block = Block::<LegacyTransaction>::default();
        assert_eq!(block.uncles_hash(), crate::EMPTY_LIST_HASH);
        assert_eq!(Block::<LegacyTransaction>::decode_bytes(&block.encoded()).unwrap(), block);
    }

    #[test]
    fn json_projection() {
        let block = block();
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["uncleHeaders"][0]["number"], "0x07");
        assert_eq!(json["transactions"][0]["nonce"], "0x01");
        let decoded: Block = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, block);
    }
}
