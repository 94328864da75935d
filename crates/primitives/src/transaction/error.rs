use crate::U256;

/// Represents error variants that can happen when validating a
/// [`BlockTransaction`](crate::BlockTransaction) on its own, without any state.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidTransactionError {
    /// The signature values are out of range or the signer can not be recovered.
    #[error("invalid signature")]
    InvalidSignature,
    /// From Homestead on, the `s` value of a signature must be in the lower half of the curve
    /// order.
    #[error("invalid signature: s value is greater than secp256k1n/2")]
    HighS,
    /// The transaction is specified to use less gas than required to start the invocation.
    #[error("gas limit {gas_limit} is too low, the intrinsic gas is {intrinsic_gas}")]
    GasLimitTooLow {
        /// Intrinsic gas of the transaction.
        intrinsic_gas: U256,
        /// Gas limit of the transaction.
        gas_limit: U256,
    },
}
