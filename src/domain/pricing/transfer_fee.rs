//! Transfer-fee adjustment for fee-on-transfer (token-2022) mints.

use num_bigint::BigUint;
use solana_sdk::epoch_info::EpochInfo;

use crate::shared::math::{ceil_div, mul_div_ceil};

const BPS_DENOMINATOR: u64 = 10_000;
const MS_PER_SLOT: u64 = 400;

/// One epoch-scheduled transfer-fee setting of a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFee {
    /// First epoch in which this setting applies.
    pub epoch: u64,
    pub transfer_fee_basis_points: u16,
    pub maximum_fee: u64,
}

/// A mint's fee schedule: the setting in force and the queued replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFeeConfig {
    pub older: TransferFee,
    pub newer: TransferFee,
}

impl TransferFeeConfig {
    /// The setting active at `epoch`.
    pub fn active_at(&self, epoch: u64) -> &TransferFee {
        if epoch < self.newer.epoch {
            &self.older
        } else {
            &self.newer
        }
    }
}

/// A transfer-fee adjusted amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedAmount {
    /// The gross transfer amount. Equals the input when deducting; grossed
    /// up when the caller needs the input to arrive net of fee.
    pub amount: BigUint,
    /// The fee the transfer will take, never above the schedule's maximum.
    pub fee: BigUint,
    /// Seconds until the queued schedule replaces the applied one. `None`
    /// when the applied schedule has no pending replacement.
    pub expiration_seconds: Option<u64>,
}

/// Computes transfer-fee-inclusive amounts against a fee schedule.
///
/// Fees always round up. A fee rounded down here would make the on-chain
/// transfer deliver less than the swap expects and revert the trade.
pub struct FeeAdjuster;

impl FeeAdjuster {
    /// Adjusts `amount` under `config` at the current epoch.
    ///
    /// With `add_fee` false, `amount` is the gross transfer and the fee is
    /// carved out of it. With `add_fee` true, `amount` is the net the
    /// recipient must receive and the returned gross covers the fee on top.
    pub fn adjust(
        amount: &BigUint,
        config: &TransferFeeConfig,
        epoch_info: &EpochInfo,
        add_fee: bool,
    ) -> AdjustedAmount {
        let active = config.active_at(epoch_info.epoch);
        let expiration_seconds = Self::expiration_seconds(config, epoch_info);
        let bps = BigUint::from(active.transfer_fee_basis_points);
        let denominator = BigUint::from(BPS_DENOMINATOR);
        let max_fee = BigUint::from(active.maximum_fee);

        if u64::from(active.transfer_fee_basis_points) >= BPS_DENOMINATOR {
            // A 100% rate always charges the maximum fee; the complement
            // would be a zero divisor.
            let gross = if add_fee { amount + &max_fee } else { amount.clone() };
            return AdjustedAmount { amount: gross, fee: max_fee, expiration_seconds };
        }

        if !add_fee {
            let fee = mul_div_ceil(amount, &bps, &denominator)
                .unwrap_or_default()
                .min(max_fee);
            return AdjustedAmount { amount: amount.clone(), fee, expiration_seconds };
        }

        let complement = &denominator - &bps;
        let naive_gross = ceil_div(&(amount * &denominator), &complement).unwrap_or_default();
        let naive_fee = &naive_gross - amount;
        let gross = if naive_fee > max_fee { amount + &max_fee } else { naive_gross };
        let fee = mul_div_ceil(&gross, &bps, &denominator)
            .unwrap_or_default()
            .min(max_fee);
        AdjustedAmount { amount: gross, fee, expiration_seconds }
    }

    /// Seconds until the queued schedule takes over, at 400 ms per slot.
    fn expiration_seconds(config: &TransferFeeConfig, epoch_info: &EpochInfo) -> Option<u64> {
        if epoch_info.epoch >= config.newer.epoch {
            return None;
        }
        let boundary_slot = config.newer.epoch.saturating_mul(epoch_info.slots_in_epoch);
        let remaining_slots = boundary_slot.saturating_sub(epoch_info.absolute_slot);
        Some(remaining_slots.saturating_mul(MS_PER_SLOT) / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use rand::{Rng, SeedableRng};

    fn epoch_info(epoch: u64, absolute_slot: u64) -> EpochInfo {
        EpochInfo {
            epoch,
            slot_index: 0,
            slots_in_epoch: 432_000,
            absolute_slot,
            block_height: 0,
            transaction_count: None,
        }
    }

    fn config(older_bps: u16, newer_bps: u16, newer_epoch: u64, max_fee: u64) -> TransferFeeConfig {
        TransferFeeConfig {
            older: TransferFee {
                epoch: newer_epoch.saturating_sub(1),
                transfer_fee_basis_points: older_bps,
                maximum_fee: max_fee,
            },
            newer: TransferFee {
                epoch: newer_epoch,
                transfer_fee_basis_points: newer_bps,
                maximum_fee: max_fee,
            },
        }
    }

    #[test]
    fn test_deduct_mode_rounds_up() {
        let cfg = config(100, 100, 0, 1_000_000);
        let info = epoch_info(10, 0);
        // ceil(9_999 * 100 / 10_000) = 100
        let adjusted = FeeAdjuster::adjust(&BigUint::from(9_999u32), &cfg, &info, false);
        assert_eq!(adjusted.fee, BigUint::from(100u32));
        assert_eq!(adjusted.amount, BigUint::from(9_999u32));
    }

    #[test]
    fn test_gross_up_covers_net_amount() {
        let cfg = config(100, 100, 0, 1_000_000);
        let info = epoch_info(10, 0);
        let net = BigUint::from(10_000u32);
        let adjusted = FeeAdjuster::adjust(&net, &cfg, &info, true);
        // ceil(10_000 * 10_000 / 9_900) = 10_102, fee = ceil(10_102 * 1%) = 102
        assert_eq!(adjusted.amount, BigUint::from(10_102u32));
        assert_eq!(adjusted.fee, BigUint::from(102u32));
        assert!(&adjusted.amount - &adjusted.fee >= net);
    }

    #[test]
    fn test_max_fee_clamps_gross_up() {
        let cfg = config(5_000, 5_000, 0, 50);
        let info = epoch_info(10, 0);
        let net = BigUint::from(10_000u32);
        let adjusted = FeeAdjuster::adjust(&net, &cfg, &info, true);
        // The naive 50% gross-up fee far exceeds the 50-unit cap.
        assert_eq!(adjusted.amount, BigUint::from(10_050u32));
        assert_eq!(adjusted.fee, BigUint::from(50u32));
    }

    #[test]
    fn test_hundred_percent_rate_charges_maximum() {
        let cfg = config(10_000, 10_000, 0, 777);
        let info = epoch_info(10, 0);
        let deducted = FeeAdjuster::adjust(&BigUint::from(5u32), &cfg, &info, false);
        assert_eq!(deducted.fee, BigUint::from(777u32));
        assert_eq!(deducted.amount, BigUint::from(5u32));
        let grossed = FeeAdjuster::adjust(&BigUint::from(5u32), &cfg, &info, true);
        assert_eq!(grossed.amount, BigUint::from(782u32));
        assert_eq!(grossed.fee, BigUint::from(777u32));
    }

    #[test]
    fn test_schedule_selection_and_expiration() {
        let cfg = config(10, 300, 501, 1_000_000);
        // Mid-epoch 500: older schedule applies, newer pending.
        let info = epoch_info(500, 500 * 432_000 + 100_000);
        let adjusted = FeeAdjuster::adjust(&BigUint::from(1_000_000u32), &cfg, &info, false);
        // ceil(1_000_000 * 10 / 10_000) = 1_000 under the older 10 bps.
        assert_eq!(adjusted.fee, BigUint::from(1_000u32));
        // 332_000 slots to the boundary at 400 ms each.
        assert_eq!(adjusted.expiration_seconds, Some(132_800));

        // At epoch 501 the newer schedule applies and nothing is pending.
        let info = epoch_info(501, 501 * 432_000);
        let adjusted = FeeAdjuster::adjust(&BigUint::from(1_000_000u32), &cfg, &info, false);
        assert_eq!(adjusted.fee, BigUint::from(30_000u32));
        assert_eq!(adjusted.expiration_seconds, None);
    }

    #[test]
    fn test_zero_amount_has_zero_fee() {
        let cfg = config(100, 100, 0, 1_000);
        let info = epoch_info(10, 0);
        let adjusted = FeeAdjuster::adjust(&BigUint::zero(), &cfg, &info, true);
        assert!(adjusted.amount.is_zero());
        assert!(adjusted.fee.is_zero());
    }

    #[test]
    fn test_fee_never_exceeds_maximum() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let info = epoch_info(10, 0);
        for _ in 0..500 {
            let bps: u16 = rng.gen_range(0..=10_000);
            let max_fee: u64 = rng.gen_range(0..1_000_000);
            let amount = BigUint::from(rng.gen_range(0u64..u64::MAX / 2));
            let cfg = config(bps, bps, 0, max_fee);
            for add_fee in [false, true] {
                let adjusted = FeeAdjuster::adjust(&amount, &cfg, &info, add_fee);
                assert!(
                    adjusted.fee <= BigUint::from(max_fee),
                    "bps={bps} max={max_fee} add={add_fee}"
                );
                if add_fee {
                    assert!(&adjusted.amount - &adjusted.fee >= amount);
                }
            }
        }
    }
}
