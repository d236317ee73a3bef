//! Byte layouts of the on-chain accounts this crate reads.
//!
//! The AMM programs ship no IDL for these accounts; offsets below follow the
//! published client layouts. All integers are little-endian. Every decoder
//! validates the full account length once up front, so the field reads after
//! that are plain slice copies.

use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::{Account as TokenAccount, Mint};

use crate::domain::pricing::{CurveSample, StableCurveTable, MAX_CURVE_SAMPLES};
use crate::shared::errors::LayoutError;

/// Length of a v4 AMM state account.
pub const AMM_V4_STATE_LEN: usize = 752;
/// Length of a v5 (stable) AMM state account.
pub const AMM_V5_STATE_LEN: usize = 784;

const CURVE_HEADER_LEN: usize = 32;
const CURVE_SAMPLE_LEN: usize = 24;

/// Quoting-relevant fields of a v4 AMM account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmStateV4 {
    pub status: u64,
    pub base_decimals: u64,
    pub quote_decimals: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub base_need_take_pnl: u64,
    pub quote_need_take_pnl: u64,
    pub pool_open_time: u64,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub lp_reserve: u64,
}

/// Quoting-relevant fields of a v5 AMM account.
///
/// The stable program's fee is protocol-fixed, so the fee fields are not
/// carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmStateV5 {
    pub status: u64,
    pub base_decimals: u64,
    pub quote_decimals: u64,
    pub base_need_take_pnl: u64,
    pub quote_need_take_pnl: u64,
    pub pool_open_time: u64,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub model_data_account: Pubkey,
}

pub fn decode_amm_state_v4(account: &Pubkey, data: &[u8]) -> Result<AmmStateV4, LayoutError> {
    if data.len() < AMM_V4_STATE_LEN {
        return Err(LayoutError::TooShort {
            account: *account,
            field: "state",
            needed: AMM_V4_STATE_LEN,
            len: data.len(),
        });
    }
    Ok(AmmStateV4 {
        status: u64_at(data, 0),
        base_decimals: u64_at(data, 32),
        quote_decimals: u64_at(data, 40),
        trade_fee_numerator: u64_at(data, 144),
        trade_fee_denominator: u64_at(data, 152),
        base_need_take_pnl: u64_at(data, 192),
        quote_need_take_pnl: u64_at(data, 200),
        pool_open_time: u64_at(data, 224),
        base_vault: pubkey_at(data, 336),
        quote_vault: pubkey_at(data, 368),
        base_mint: pubkey_at(data, 400),
        quote_mint: pubkey_at(data, 432),
        lp_mint: pubkey_at(data, 464),
        lp_reserve: u64_at(data, 720),
    })
}

pub fn decode_amm_state_v5(account: &Pubkey, data: &[u8]) -> Result<AmmStateV5, LayoutError> {
    if data.len() < AMM_V5_STATE_LEN {
        return Err(LayoutError::TooShort {
            account: *account,
            field: "state",
            needed: AMM_V5_STATE_LEN,
            len: data.len(),
        });
    }
    Ok(AmmStateV5 {
        status: u64_at(data, 8),
        base_decimals: u64_at(data, 40),
        quote_decimals: u64_at(data, 48),
        base_need_take_pnl: u64_at(data, 224),
        quote_need_take_pnl: u64_at(data, 232),
        pool_open_time: u64_at(data, 256),
        base_vault: pubkey_at(data, 368),
        quote_vault: pubkey_at(data, 400),
        base_mint: pubkey_at(data, 432),
        quote_mint: pubkey_at(data, 464),
        lp_mint: pubkey_at(data, 496),
        model_data_account: pubkey_at(data, 528),
    })
}

/// Decodes the stable-swap model table: a 32-byte header followed by
/// `valid_data_count` packed `(x, y, price)` samples.
pub fn decode_curve_table(account: &Pubkey, data: &[u8]) -> Result<StableCurveTable, LayoutError> {
    if data.len() < CURVE_HEADER_LEN {
        return Err(LayoutError::TooShort {
            account: *account,
            field: "header",
            needed: CURVE_HEADER_LEN,
            len: data.len(),
        });
    }
    let multiplier = u64_at(data, 16);
    let valid_data_count = u64_at(data, 24) as usize;
    if valid_data_count > MAX_CURVE_SAMPLES {
        return Err(LayoutError::invalid_field(*account, "valid_data_count", &data[24..32]));
    }
    let needed = CURVE_HEADER_LEN + valid_data_count * CURVE_SAMPLE_LEN;
    if data.len() < needed {
        return Err(LayoutError::TooShort {
            account: *account,
            field: "samples",
            needed,
            len: data.len(),
        });
    }
    let mut samples = Vec::with_capacity(valid_data_count);
    for index in 0..valid_data_count {
        let start = CURVE_HEADER_LEN + index * CURVE_SAMPLE_LEN;
        let sample: CurveSample = bytemuck::pod_read_unaligned(&data[start..start + CURVE_SAMPLE_LEN]);
        samples.push(sample);
    }
    Ok(StableCurveTable { multiplier, samples })
}

/// Reads the balance of an SPL token account (a pool vault).
pub fn decode_token_amount(account: &Pubkey, data: &[u8]) -> Result<u64, LayoutError> {
    let token_account = TokenAccount::unpack(data)
        .map_err(|_| LayoutError::invalid_field(*account, "token_account", data))?;
    Ok(token_account.amount)
}

/// Reads supply and decimals of an SPL mint (a pool's LP mint).
pub fn decode_mint_supply(account: &Pubkey, data: &[u8]) -> Result<(u64, u8), LayoutError> {
    let mint =
        Mint::unpack(data).map_err(|_| LayoutError::invalid_field(*account, "mint", data))?;
    Ok((mint.supply, mint.decimals))
}

fn u64_at(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn pubkey_at(data: &[u8], offset: usize) -> Pubkey {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(buf)
}
