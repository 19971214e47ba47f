use crate::constants::FEASIBILITY_TOLERANCE;
use crate::logic::{ArbitrageRouter, ArbitrageRouterBuilder};
use crate::pools::{Curve, IncidenceMatrix, Pool, PoolSpec, pools_from_specs};
use crate::solver::Solution;

fn five_pools() -> eyre::Result<Vec<Pool>> {
    Ok(vec![
        Pool::weighted(vec![0, 1, 2, 3], vec![4.0, 4.0, 4.0, 4.0], vec![4.0, 3.0, 2.0, 1.0], 0.998)?,
        Pool::constant_product(vec![0, 1], vec![10.0, 1.0], 0.997)?,
        Pool::constant_product(vec![1, 2], vec![1.0, 5.0], 0.997)?,
        Pool::constant_product(vec![2, 3], vec![40.0, 50.0], 0.997)?,
        Pool::constant_sum(vec![2, 3], vec![10.0, 10.0], 0.999)?,
    ])
}

const MARKET_VALUE: [f64; 4] = [1.5, 10.0, 2.0, 3.0];

fn net_flows(n: usize, pools: &[Pool], solution: &Solution) -> eyre::Result<Vec<f64>> {
    let mut psi = vec![0.0; n];
    for (pool, (deltas, lambdas)) in pools.iter().zip(solution.deltas.iter().zip(&solution.lambdas)) {
        let matrix = IncidenceMatrix::new(n, pool.local_indices())?;
        let local: Vec<f64> = lambdas.iter().zip(deltas).map(|(l, d)| l - d).collect();
        for (total, flow) in psi.iter_mut().zip(matrix.scatter(&local)?) {
            *total += flow;
        }
    }
    Ok(psi)
}

fn assert_invariants_hold(pools: &[Pool], solution: &Solution) {
    for (pool, (deltas, lambdas)) in pools.iter().zip(solution.deltas.iter().zip(&solution.lambdas)) {
        let after = pool.reserves_after(deltas, lambdas);
        let before = pool.curve().invariant(pool.reserves());
        assert!(pool.curve().invariant(&after) >= before * (1.0 - 1e-5), "{pool} invariant decreased");
        if matches!(pool.curve(), Curve::ConstantSum) {
            assert!(after.iter().all(|r| *r >= -FEASIBILITY_TOLERANCE), "{pool} reserve went negative");
        }
        assert!(deltas.iter().chain(lambdas).all(|v| *v >= -FEASIBILITY_TOLERANCE));
    }
}

#[test]
fn test_five_pool_arbitrage() -> eyre::Result<()> {
    let pools = five_pools()?;
    let router = ArbitrageRouter::default();

    let outcome = router.optimize_arbitrage(4, &pools, &MARKET_VALUE)?;
    let solution = &outcome.solution;

    assert!(solution.optimal_value >= -FEASIBILITY_TOLERANCE);
    assert!(solution.psi.iter().all(|psi| *psi >= -FEASIBILITY_TOLERANCE));

    let recomputed = net_flows(4, &pools, solution)?;
    for (psi, flow) in solution.psi.iter().zip(&recomputed) {
        assert!((psi - flow).abs() < 1e-6);
    }
    let value: f64 = MARKET_VALUE.iter().zip(&solution.psi).map(|(v, p)| v * p).sum();
    assert!((value - solution.optimal_value).abs() < 1e-6);

    assert_invariants_hold(&pools, solution);

    // token 1 is cheap in pool 1 and dear at market, so something trades
    assert!(!outcome.analysis.is_idle());
    assert!(outcome.analysis.fees_paid > 0.0);
    Ok(())
}

#[test]
fn test_liquidation_into_target() -> eyre::Result<()> {
    let pools = vec![
        Pool::constant_product(vec![0, 2], vec![10.0, 10.0], 0.997)?,
        Pool::constant_product(vec![1, 2], vec![10.0, 10.0], 0.997)?,
    ];
    let assets = [1.0, 2.0, 0.0];
    let router = ArbitrageRouter::default();

    let liquidation = router.rebalance(3, &pools, &assets, 2)?;
    let psi = &liquidation.solution.psi;

    assert!((psi[0] + assets[0]).abs() < 1e-6);
    assert!((psi[1] + assets[1]).abs() < 1e-6);
    assert_eq!(liquidation.value, psi[2]);

    // each holding can only leave through its own pool
    let swap_out = |amount_in: f64| 10.0 - 100.0 / (10.0 + 0.997 * amount_in);
    let expected = swap_out(1.0) + swap_out(2.0);
    assert!((liquidation.value - expected).abs() < 1e-4);

    assert_invariants_hold(&pools, &liquidation.solution);
    Ok(())
}

#[test]
fn test_five_pool_liquidation() -> eyre::Result<()> {
    let pools = five_pools()?;
    let assets = [0.5, 0.1, 1.0, 0.0];
    let router = ArbitrageRouterBuilder::new().with_max_iter(500).build();

    let liquidation = router.rebalance(4, &pools, &assets, 3)?;
    let psi = &liquidation.solution.psi;

    for token in 0..3 {
        assert!((psi[token] + assets[token]).abs() < 1e-6);
    }
    assert!(liquidation.value > 0.0);
    assert_invariants_hold(&pools, &liquidation.solution);
    Ok(())
}

#[test]
fn test_pools_from_json() -> eyre::Result<()> {
    let specs: Vec<PoolSpec> = serde_json::from_str(
        r#"[
            {"local_indices": [0, 1], "reserves": [100.0, 10.0], "fee": 0.997, "curve_type": "uniswap_v2"},
            {"local_indices": [0, 1], "reserves": [100.0, 5.0], "fee": 0.997, "curve_type": "Balancer", "weights": [1.0, 1.0]}
        ]"#,
    )?;
    let pools = pools_from_specs(specs)?;
    let router = ArbitrageRouter::default();

    let outcome = router.optimize_arbitrage(2, &pools, &[1.0, 12.0])?;

    assert!(outcome.solution.optimal_value > 0.0);
    assert_eq!(outcome.analysis.active_pools.len(), 2);
    assert!(outcome.analysis.net_value() > 0.0);
    Ok(())
}

#[test]
fn test_constant_sum_reserve_floor() -> eyre::Result<()> {
    // linear curve alone would let the pool pay out 30, the reserve floor caps it at 10
    let pools = vec![Pool::constant_sum(vec![0, 1], vec![10.0, 10.0], 1.0)?];
    let router = ArbitrageRouter::default();

    let liquidation = router.rebalance(2, &pools, &[30.0, 0.0], 1)?;
    let psi = &liquidation.solution.psi;

    assert!((liquidation.value - 10.0).abs() < 1e-5);
    assert!((psi[0] + 30.0).abs() < 1e-6);
    assert_invariants_hold(&pools, &liquidation.solution);
    Ok(())
}
