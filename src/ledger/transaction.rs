use once_cell::sync::OnceCell;

use crate::crypto;
use crate::io::BinaryWriter;
use crate::types::{Fixed8, UInt160, UInt256};

/// Wire discriminant of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionType {
    Miner = 0x00,
    Contract = 0x80,
    Invocation = 0xD1,
}

/// Reference to a prior transaction output being spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinReference {
    pub prev_hash: UInt256,
    pub prev_index: u16,
}

/// A spendable output: asset, exact Fixed8 amount, owner script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOutput {
    pub asset_id: UInt256,
    pub value: Fixed8,
    pub script_hash: UInt160,
}

/// Free-form attribute attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAttribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

/// A `(verification_script, invocation_script)` pair. The hash of the
/// verification script is the identity a contract can assert with
/// `Runtime.CheckWitness`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub invocation_script: Vec<u8>,
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn script_hash(&self) -> UInt160 {
        crypto::hash160(&self.verification_script)
    }
}

/// A transaction. The hash covers the unsigned body (everything but
/// the witnesses) and is computed once and cached.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub tx_type: TransactionType,
    pub version: u8,
    pub attributes: Vec<TransactionAttribute>,
    pub inputs: Vec<CoinReference>,
    pub outputs: Vec<TransactionOutput>,
    pub witnesses: Vec<Witness>,
    hash: OnceCell<UInt256>,
}

impl Transaction {
    pub fn new(tx_type: TransactionType) -> Self {
        Self {
            tx_type,
            version: 0,
            attributes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            witnesses: Vec::new(),
            hash: OnceCell::new(),
        }
    }

    fn write_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.tx_type as u8);
        writer.write_u8(self.version);
        writer.write_var_int(self.attributes.len() as u64);
        for attribute in &self.attributes {
            writer.write_u8(attribute.usage);
            writer.write_var_bytes(&attribute.data);
        }
        writer.write_var_int(self.inputs.len() as u64);
        for input in &self.inputs {
            writer.write_bytes(input.prev_hash.as_le_bytes());
            writer.write_u16(input.prev_index);
        }
        writer.write_var_int(self.outputs.len() as u64);
        for output in &self.outputs {
            writer.write_bytes(output.asset_id.as_le_bytes());
            writer.write_i64(output.value.raw());
            writer.write_bytes(output.script_hash.as_le_bytes());
        }
    }

    pub fn hash(&self) -> UInt256 {
        *self.hash.get_or_init(|| {
            let mut writer = BinaryWriter::new();
            self.write_unsigned(&mut writer);
            crypto::hash256(writer.as_slice())
        })
    }

    /// Script hashes declared by this transaction's witnesses, i.e.
    /// the identities whose signatures authorize it.
    pub fn witness_hashes(&self) -> Vec<UInt160> {
        self.witnesses.iter().map(Witness::script_hash).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_covers_outputs_but_not_witnesses() {
        let mut a = Transaction::new(TransactionType::Contract);
        a.outputs.push(TransactionOutput {
            asset_id: UInt256::zero(),
            value: Fixed8::ONE,
            script_hash: UInt160::zero(),
        });
        let mut b = a.clone();
        b.hash = OnceCell::new();
        b.witnesses.push(Witness {
            invocation_script: vec![0x01],
            verification_script: vec![0x02],
        });
        assert_eq!(a.hash(), b.hash());

        let mut c = Transaction::new(TransactionType::Contract);
        c.outputs.push(TransactionOutput {
            asset_id: UInt256::zero(),
            value: Fixed8::from_raw(2 * Fixed8::SCALE),
            script_hash: UInt160::zero(),
        });
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn witness_hashes_follow_verification_scripts() {
        let mut tx = Transaction::new(TransactionType::Invocation);
        tx.witnesses.push(Witness {
            invocation_script: Vec::new(),
            verification_script: b"verify-me".to_vec(),
        });
        assert_eq!(tx.witness_hashes(), vec![crypto::hash160(b"verify-me")]);
    }
}
