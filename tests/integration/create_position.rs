use cl_ledger::{
    Bank, ConcentratedPool, Dec, LedgerError, LedgerStore, MathError, PositionKey,
    structure::pool::pool_address
};

use super::common::*;

fn create(
    keeper: &mut TestKeeper,
    amounts: (u128, u128),
    minimums: (u128, u128),
    range: (i64, i64),
    incentive_ids: &[u64]
) -> Result<cl_ledger::CreatedPosition, LedgerError> {
    keeper.create_position(POOL_ID, OWNER, amounts.0, amounts.1, minimums.0, minimums.1, range.0, range.1, incentive_ids)
}

fn defaults(keeper: &mut TestKeeper, range: (i64, i64)) -> Result<cl_ledger::CreatedPosition, LedgerError> {
    create(keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (0, 0), range, &[])
}

#[test]
fn first_position_matches_reference_values() {
    let (mut keeper, _) = setup();
    let created = create_default(&mut keeper, &[]);

    assert_eq!(created.liquidity, dec("1514719247.706887470270366521"));
    assert_eq!(created.amount0, 997568);
    assert_eq!(created.amount1, 4_999_999_999);

    let pool = keeper.pool(POOL_ID).unwrap();
    assert_eq!(pool.current_tick(), INITIAL_TICK);
    assert_eq!(pool.current_sqrt_price(), dec("70.710678118654752440"));
    assert_eq!(pool.liquidity(), created.liquidity);

    let key = PositionKey::new(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, &Default::default());
    assert_eq!(keeper.position(&key).unwrap().liquidity, created.liquidity);

    let lower = keeper.tick_info(POOL_ID, DEFAULT_LOWER).unwrap();
    let upper = keeper.tick_info(POOL_ID, DEFAULT_UPPER).unwrap();
    assert_eq!(lower.liquidity_gross, created.liquidity);
    assert_eq!(lower.liquidity_net, created.liquidity);
    assert_eq!(upper.liquidity_net, -created.liquidity);
    assert_eq!(keeper.net_liquidity_sum(POOL_ID).unwrap(), Dec::ZERO);
}

#[test]
fn deposit_moves_tokens_into_pool_custody() {
    let (mut keeper, _) = setup();
    let owner_eth = keeper.bank().balance(OWNER, "eth");
    let owner_usdc = keeper.bank().balance(OWNER, "usdc");

    let created = create_default(&mut keeper, &[]);

    let custody = pool_address(POOL_ID);
    assert_eq!(keeper.bank().balance(custody, "eth"), created.amount0);
    assert_eq!(keeper.bank().balance(custody, "usdc"), created.amount1);
    assert_eq!(keeper.bank().balance(OWNER, "eth"), owner_eth - created.amount0);
    assert_eq!(keeper.bank().balance(OWNER, "usdc"), owner_usdc - created.amount1);
}

#[test]
fn nearby_ranges_produce_expected_liquidity() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    let created = defaults(&mut keeper, (84230, 86120)).unwrap();
    assert!(created.amount0 > 0 && created.amount1 > 0);
    assert_eq!(keeper.net_liquidity_sum(POOL_ID).unwrap(), Dec::ZERO);

    // entirely above the price: token0 only, no change to active liquidity
    let active = keeper.pool(POOL_ID).unwrap().liquidity();
    let above = defaults(&mut keeper, (85180, 87400)).unwrap();
    assert!(above.amount0 > 0);
    assert_eq!(above.amount1, 0);
    assert_eq!(keeper.pool(POOL_ID).unwrap().liquidity(), active);

    // entirely below the price: token1 only
    let below = defaults(&mut keeper, (80000, 85000)).unwrap();
    assert_eq!(below.amount0, 0);
    assert!(below.amount1 > 0);
}

#[test]
fn unknown_pool() {
    let (mut keeper, _) = setup();
    assert_eq!(
        keeper.create_position(9, OWNER, 1, 1, 0, 0, DEFAULT_LOWER, DEFAULT_UPPER, &[]),
        Err(LedgerError::PoolNotFound { pool_id: 9 })
    );
}

#[test]
fn range_errors() {
    let (mut keeper, _) = setup();

    assert!(matches!(defaults(&mut keeper, (84221, DEFAULT_UPPER)), Err(LedgerError::TickSpacing { .. })));
    assert!(matches!(defaults(&mut keeper, (DEFAULT_LOWER, 86131)), Err(LedgerError::TickSpacing { .. })));
    assert_eq!(
        defaults(&mut keeper, (-887280, DEFAULT_UPPER)),
        Err(LedgerError::InvalidTick { tick: -887280, is_lower: true })
    );
    assert_eq!(
        defaults(&mut keeper, (DEFAULT_LOWER, 887280)),
        Err(LedgerError::InvalidTick { tick: 887280, is_lower: false })
    );
    assert_eq!(
        defaults(&mut keeper, (DEFAULT_UPPER, DEFAULT_LOWER)),
        Err(LedgerError::InvalidLowerUpperTick { lower_tick: DEFAULT_UPPER, upper_tick: DEFAULT_LOWER })
    );
    assert_eq!(
        defaults(&mut keeper, (DEFAULT_LOWER, DEFAULT_LOWER)),
        Err(LedgerError::InvalidLowerUpperTick { lower_tick: DEFAULT_LOWER, upper_tick: DEFAULT_LOWER })
    );
}

#[test]
fn first_position_needs_both_assets() {
    let (mut keeper, _) = setup();

    assert_eq!(
        create(&mut keeper, (0, DEFAULT_AMOUNT1), (0, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::InitialLiquidityZero { amount0: 0, amount1: DEFAULT_AMOUNT1 })
    );
    assert_eq!(
        create(&mut keeper, (DEFAULT_AMOUNT0, 0), (0, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::InitialLiquidityZero { amount0: DEFAULT_AMOUNT0, amount1: 0 })
    );

    let pool = keeper.pool(POOL_ID).unwrap();
    assert_eq!(pool.current_sqrt_price(), Dec::ZERO);
    assert_eq!(pool.current_tick(), 0);
}

#[test]
fn minimum_amounts_apply_to_every_position() {
    let (mut keeper, _) = setup();

    assert_eq!(
        create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (997569, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::InsufficientLiquidityCreated { actual: 997568, minimum: 997569, is_token_zero: true })
    );
    assert!(matches!(
        create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (0, 5_000_000_001), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::InsufficientLiquidityCreated { minimum: 5_000_000_001, is_token_zero: false, .. })
    ));
    // the failed first deposits did not price the pool
    assert_eq!(keeper.pool(POOL_ID).unwrap().current_sqrt_price(), Dec::ZERO);

    create_default(&mut keeper, &[]);
    assert!(matches!(
        create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (1_000_000, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::InsufficientLiquidityCreated { is_token_zero: true, .. })
    ));
}

#[test]
fn zero_liquidity_is_rejected() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    assert_eq!(
        create(&mut keeper, (0, 0), (0, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[]),
        Err(LedgerError::ZeroLiquidityDelta)
    );
}

#[test]
fn incentive_commitments() {
    let (mut keeper, _) = setup();

    assert_eq!(
        create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (0, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[3]),
        Err(LedgerError::IncentiveNotFound { pool_id: POOL_ID, incentive_id: 3 })
    );

    let created = create_default(&mut keeper, &[1]);
    let lower = keeper.tick_info(POOL_ID, DEFAULT_LOWER).unwrap();
    assert_eq!(lower.incentive_records[&1].liquidity_gross, created.liquidity);
    assert_eq!(lower.incentive_records[&2].liquidity_gross, Dec::ZERO);

    assert_eq!(
        create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (0, 0), (DEFAULT_LOWER, DEFAULT_UPPER), &[1, 2]),
        Err(LedgerError::IncentiveCommitmentMismatch { committed: vec![1], requested: vec![1, 2] })
    );

    // an unincentivized position over the same range is a separate record
    let plain = create_default(&mut keeper, &[]);
    let plain_key = PositionKey::new(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, &Default::default());
    assert_eq!(keeper.position(&plain_key).unwrap().liquidity, plain.liquidity);
    assert_eq!(keeper.store().ticks(POOL_ID).len(), 2);
}

#[test]
fn ranges_far_below_the_price() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    // prices here underflow 18 digits but the sqrt prices do not
    let deep = defaults(&mut keeper, (-800000, -790000)).unwrap();
    assert_eq!(deep.amount0, 0);
    assert_eq!(deep.amount1, DEFAULT_AMOUNT1);
    assert_eq!(deep.liquidity, dec("1666666666666666666666666666.666666666666666667"));

    assert_eq!(
        defaults(&mut keeper, (-887270, -887000)),
        Err(LedgerError::Math(MathError::SqrtPriceUnderflow { tick: -887270 }))
    );
    assert_eq!(
        defaults(&mut keeper, (-828980, -828970)),
        Err(LedgerError::Math(MathError::SqrtPriceUnderflow { tick: -828980 }))
    );
    assert_eq!(keeper.net_liquidity_sum(POOL_ID).unwrap(), Dec::ZERO);
}

#[test]
fn failed_create_changes_nothing() {
    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    let ticks_before = keeper.initialized_ticks(POOL_ID).unwrap();
    let pool_before = keeper.pool(POOL_ID).unwrap();
    let balance_before = keeper.bank().balance(OWNER, "eth");

    assert!(create(&mut keeper, (DEFAULT_AMOUNT0, DEFAULT_AMOUNT1), (0, 0), (84000, 86000), &[7]).is_err());
    assert!(create(&mut keeper, (u128::MAX / 2, u128::MAX / 2), (0, 0), (84000, 86000), &[]).is_err());

    assert_eq!(keeper.initialized_ticks(POOL_ID).unwrap(), ticks_before);
    assert_eq!(keeper.pool(POOL_ID).unwrap(), pool_before);
    assert_eq!(keeper.bank().balance(OWNER, "eth"), balance_before);
}
