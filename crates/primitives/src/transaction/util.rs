pub(crate) mod secp256k1 {
    use crate::{keccak256, Address, B256};
    pub(crate) use ::secp256k1::Error;
    use ::secp256k1::{
        ecdsa::{RecoverableSignature, RecoveryId},
        Message, PublicKey, SecretKey, SECP256K1,
    };

    /// Recovers the address of the sender using secp256k1 pubkey recovery.
    ///
    /// `sig` is the compact `r || s` signature followed by the recovery id.
    pub(crate) fn recover_signer(sig: &[u8; 65], msg: &B256) -> Result<Address, Error> {
        let sig =
            RecoverableSignature::from_compact(&sig[0..64], RecoveryId::from_i32(sig[64] as i32)?)?;

        let public = SECP256K1.recover_ecdsa(&Message::from_digest_slice(msg.as_slice())?, &sig)?;
        Ok(public_key_to_address(public))
    }

    /// Signs message with the given secret key.
    ///
    /// Returns the compact `r || s` signature and the recovery id.
    pub(crate) fn sign_message(secret: B256, message: B256) -> Result<([u8; 64], u8), Error> {
        let sec = SecretKey::from_slice(secret.as_ref())?;
        let s = SECP256K1.sign_ecdsa_recoverable(&Message::from_digest_slice(&message[..])?, &sec);
        let (rec_id, data) = s.serialize_compact();
        Ok((data, rec_id.to_i32() as u8))
    }

    /// Converts a public key into an ethereum address by hashing the encoded public key with
    /// keccak256.
    pub(crate) fn public_key_to_address(public: PublicKey) -> Address {
        // strip out the first byte because that should be the SECP256K1_TAG_PUBKEY_UNCOMPRESSED
        // tag returned by libsecp's uncompressed pubkey serialization
        let hash = keccak256(&public.serialize_uncompressed()[1..]);
        Address::from_slice(&hash[12..])
    }
}
