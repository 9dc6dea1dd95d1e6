use std::time::Duration;

use cl_ledger::{Metrics, keeper::metrics::UNKNOWN_SOURCE};
use serial_test::serial;

use super::common::*;

#[test]
#[serial(global_metrics)]
fn keeper_reports_to_global_metrics() {
    let metrics = Metrics::global();
    metrics.reset();

    let (mut keeper, clock) = setup_with(test_config().with_metrics(true));
    let created = create_default(&mut keeper, &[]);
    clock.advance(Duration::from_secs(5));
    keeper.cross_tick(POOL_ID, DEFAULT_UPPER).unwrap();
    keeper
        .withdraw_position(POOL_ID, OWNER, DEFAULT_LOWER, DEFAULT_UPPER, created.liquidity, &[])
        .unwrap();

    let values = metrics.values();
    let local = &values[UNKNOWN_SOURCE];
    assert_eq!(local["create_position"], "1");
    assert_eq!(local["withdraw_position"], "1");
    assert_eq!(local["cross_tick"], "1");
    assert_eq!(local["liquidity_added"], local["liquidity_removed"]);

    metrics.reset();
    assert!(metrics.values().is_empty());
}

#[test]
#[serial(global_metrics)]
fn disabled_metrics_record_nothing() {
    let metrics = Metrics::global();
    metrics.reset();

    let (mut keeper, _) = setup();
    create_default(&mut keeper, &[]);

    assert!(metrics.values().is_empty());
}
