use std::collections::BTreeSet;

use cl_ledger::{Bank, ConcentratedPool, Dec, LedgerError, PositionKey, structure::pool::pool_address};

use super::common::*;

fn withdraw(keeper: &mut TestKeeper, liquidity: Dec, incentive_ids: &[u64]) -> Result<(u128, u128), LedgerError> {
    keeper.withdraw_position(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, liquidity, incentive_ids)
}

fn default_key(incentive_ids: &[u64]) -> PositionKey {
    let ids = incentive_ids.iter().copied().collect::<BTreeSet<_>>();
    PositionKey::new(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, &ids)
}

#[test]
fn full_withdrawal_returns_deposit_and_removes_position() {
    let (mut keeper, _) = setup();
    let eth_before = keeper.bank().balance(OWNER, "eth");
    let usdc_before = keeper.bank().balance(OWNER, "usdc");

    let created = create_default(&mut keeper, &[]);
    let (amount0, amount1) = withdraw(&mut keeper, created.liquidity, &[]).unwrap();

    assert_eq!((amount0, amount1), (created.amount0, created.amount1));
    assert_eq!(keeper.position(&default_key(&[])), Err(LedgerError::PositionNotFound {
        pool_id:    POOL_ID,
        lower_tick: DEFAULT_LOWER,
        upper_tick: DEFAULT_UPPER
    }));

    assert_eq!(keeper.bank().balance(OWNER, "eth"), eth_before);
    assert_eq!(keeper.bank().balance(OWNER, "usdc"), usdc_before);
    assert_eq!(keeper.bank().balance(pool_address(POOL_ID), "eth"), 0);

    let lower = keeper.tick_info(POOL_ID, DEFAULT_LOWER).unwrap();
    assert_eq!(lower.liquidity_gross, Dec::ZERO);
    assert_eq!(lower.liquidity_net, Dec::ZERO);
    assert_eq!(keeper.pool(POOL_ID).unwrap().liquidity(), Dec::ZERO);
    assert_eq!(keeper.net_liquidity_sum(POOL_ID).unwrap(), Dec::ZERO);
}

#[test]
fn partial_withdrawals() {
    let (mut keeper, _) = setup();
    let created = create_default(&mut keeper, &[1]);
    let half = created.liquidity.checked_quo(Dec::from(2u64)).unwrap();

    let (first0, first1) = withdraw(&mut keeper, half, &[1]).unwrap();
    let remaining = keeper.position(&default_key(&[1])).unwrap();
    assert_eq!(remaining.liquidity, created.liquidity - half);
    assert_eq!(keeper.pool(POOL_ID).unwrap().liquidity(), remaining.liquidity);
    assert_eq!(
        keeper.tick_info(POOL_ID, DEFAULT_UPPER).unwrap().incentive_records[&1].liquidity_gross,
        remaining.liquidity
    );

    let (second0, second1) = withdraw(&mut keeper, remaining.liquidity, &[1]).unwrap();
    assert!(keeper.position(&default_key(&[1])).is_err());

    // each half is truncated on its own
    assert!(first0 + second0 <= created.amount0 && first0 + second0 + 2 >= created.amount0);
    assert!(first1 + second1 <= created.amount1 && first1 + second1 + 2 >= created.amount1);
    assert_eq!(keeper.net_liquidity_sum(POOL_ID).unwrap(), Dec::ZERO);
}

#[test]
fn missing_positions() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    let not_found =
        LedgerError::PositionNotFound { pool_id: POOL_ID, lower_tick: DEFAULT_LOWER, upper_tick: DEFAULT_UPPER };

    assert_eq!(
        keeper.withdraw_position(POOL_ID, OTHER_OWNER, DEFAULT_LOWER, DEFAULT_UPPER, Dec::ONE, &[]),
        Err(not_found.clone())
    );
    // asking for an incentivized position looks under a different key
    assert_eq!(withdraw(&mut keeper, Dec::ONE, &[1]), Err(not_found));
    assert_eq!(
        keeper.withdraw_position(9, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, Dec::ONE, &[]),
        Err(LedgerError::PoolNotFound { pool_id: 9 })
    );
    assert!(matches!(
        keeper.withdraw_position(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER + 5, Dec::ONE, &[]),
        Err(LedgerError::TickSpacing { .. })
    ));
}

#[test]
fn commitment_must_match() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[1]);

    assert_eq!(
        withdraw(&mut keeper, Dec::ONE, &[2]),
        Err(LedgerError::IncentiveCommitmentMismatch { committed: vec![1], requested: vec![2] })
    );
}

#[test]
fn invalid_amounts_leave_position_unchanged() {
    let (mut keeper, _) = setup();
    let created = create_default(&mut keeper, &[]);
    let too_much = created.liquidity + Dec::ONE;

    assert_eq!(withdraw(&mut keeper, Dec::ZERO, &[]), Err(LedgerError::ZeroLiquidityDelta));
    assert_eq!(withdraw(&mut keeper, -Dec::ONE, &[]), Err(LedgerError::ZeroLiquidityDelta));
    assert_eq!(
        withdraw(&mut keeper, too_much, &[]),
        Err(LedgerError::InsufficientLiquidity { actual: too_much, available: created.liquidity })
    );

    assert_eq!(keeper.position(&default_key(&[])).unwrap().liquidity, created.liquidity);
    assert_eq!(keeper.pool(POOL_ID).unwrap().liquidity(), created.liquidity);
}

#[test]
fn out_of_range_withdrawal_pays_single_token() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);
    let above = keeper.create_position(POOL_ID, OWNER, DEFAULT_AMOUNT0, DEFAULT_AMOUNT1, 0, 0, 86140, 87000, &[]).unwrap();

    let (amount0, amount1) =
        keeper.withdraw_position(POOL_ID, OWNER, 86140, 87000, above.liquidity, &[]).unwrap();
    assert_eq!((amount0, amount1), (above.amount0, 0));
}
