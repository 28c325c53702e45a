//! Hashing and curve primitives used across the interop surface.

use p256::PublicKey;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{InteropError, InteropResult};
use crate::types::{UInt160, UInt256};

/// SHA-256 of the input.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Double SHA-256, interpreted as a little-endian ledger hash.
pub fn hash256(data: &[u8]) -> UInt256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    UInt256::from_le_bytes(out)
}

/// RIPEMD-160 of SHA-256, interpreted as a little-endian script hash.
pub fn hash160(data: &[u8]) -> UInt160 {
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd);
    UInt160::from_le_bytes(out)
}

/// Builds the single-signature redeem script for a compressed
/// secp256r1 public key: `PUSHBYTES33 <key> CHECKSIG`.
pub fn single_signature_redeem_script(pubkey: &[u8; 33]) -> Vec<u8> {
    let mut script = Vec::with_capacity(35);
    script.push(0x21);
    script.extend_from_slice(pubkey);
    script.push(0xAC);
    script
}

/// Maps a compressed secp256r1 public key to the script hash of its
/// single-signature redeem script. Fails when the bytes do not encode
/// a point on the curve.
pub fn script_hash_of_pubkey(pubkey: &[u8]) -> InteropResult<UInt160> {
    let bytes: [u8; 33] = pubkey.try_into().map_err(|_| {
        InteropError::invalid_argument("a 33-byte public key", format!("{} bytes", pubkey.len()))
    })?;
    PublicKey::from_sec1_bytes(&bytes).map_err(|_| {
        InteropError::invalid_argument("a point on secp256r1", "an invalid encoding")
    })?;
    Ok(hash160(&single_signature_redeem_script(&bytes)))
}
