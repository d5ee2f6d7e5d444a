//! Base-layer to rollup short address translation.
//!
//! A Godwoken account is identified by the hash of its layer-2 lock script:
//! `{ code_hash: eth_account_lock_code_hash, hash_type: type,
//!    args: rollup_type_hash ++ eth_address }`. The short address is the first
//! 20 bytes of that script hash.

use anyhow::{Context, Result};
use shared::domain::{decode_fixed_hex, EthAddress, ShortAddress};

use crate::config::RollupConfig;

const CKB_HASH_PERSONALIZATION: &[u8] = b"ckb-default-hash";
const SCRIPT_HASH_TYPE_TYPE: u8 = 1;
const SHORT_ADDRESS_LEN: usize = 20;

pub trait AddressTranslator: Send + Sync {
    fn eth_address_to_godwoken_short_address(&self, address: &EthAddress)
        -> Result<ShortAddress>;
}

#[derive(Debug, Clone)]
pub struct GodwokenAddressTranslator {
    rollup_type_hash: [u8; 32],
    eth_account_lock_code_hash: [u8; 32],
}

impl GodwokenAddressTranslator {
    pub fn new(config: &RollupConfig) -> Result<Self> {
        Ok(Self {
            rollup_type_hash: decode_fixed_hex(&config.rollup_type_hash)
                .context("invalid rollup type hash")?,
            eth_account_lock_code_hash: decode_fixed_hex(&config.eth_account_lock_code_hash)
                .context("invalid eth account lock code hash")?,
        })
    }

    fn layer2_lock_args(&self, eth_address: &[u8; 20]) -> Vec<u8> {
        let mut args = Vec::with_capacity(32 + 20);
        args.extend_from_slice(&self.rollup_type_hash);
        args.extend_from_slice(eth_address);
        args
    }
}

impl AddressTranslator for GodwokenAddressTranslator {
    fn eth_address_to_godwoken_short_address(
        &self,
        address: &EthAddress,
    ) -> Result<ShortAddress> {
        let eth_address: [u8; 20] = decode_fixed_hex(address.as_str())
            .with_context(|| format!("invalid eth address '{address}'"))?;
        let script = serialize_script(
            &self.eth_account_lock_code_hash,
            SCRIPT_HASH_TYPE_TYPE,
            &self.layer2_lock_args(&eth_address),
        );
        let script_hash = ckb_blake2b_256(&script);
        Ok(ShortAddress(format!(
            "0x{}",
            hex::encode(&script_hash[..SHORT_ADDRESS_LEN])
        )))
    }
}

/// Molecule `Script` table: header (total size + three field offsets),
/// then `code_hash: Byte32`, `hash_type: byte`, `args: Bytes`.
fn serialize_script(code_hash: &[u8; 32], hash_type: u8, args: &[u8]) -> Vec<u8> {
    const HEADER_LEN: usize = 4 * 4;
    let args_len = 4 + args.len();
    let total = HEADER_LEN + code_hash.len() + 1 + args_len;

    let code_hash_offset = HEADER_LEN;
    let hash_type_offset = code_hash_offset + code_hash.len();
    let args_offset = hash_type_offset + 1;

    let mut out = Vec::with_capacity(total);
    for word in [total, code_hash_offset, hash_type_offset, args_offset] {
        out.extend_from_slice(&(word as u32).to_le_bytes());
    }
    out.extend_from_slice(code_hash);
    out.push(hash_type);
    out.extend_from_slice(&(args.len() as u32).to_le_bytes());
    out.extend_from_slice(args);
    out
}

fn ckb_blake2b_256(data: &[u8]) -> [u8; 32] {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(CKB_HASH_PERSONALIZATION)
        .hash(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}
