use std::collections::BTreeMap;
use std::time::Duration;

use squad_optimizer::domain::normalize::PositionField;
use squad_optimizer::domain::validate::verify_selection;
use squad_optimizer::{
    build_constraint_set, create_solver, ClubCap, ConfigError, EngineError, NormalizeOptions,
    ObjectiveMetric, PlayerRecord, Position, QuotaMode, RawPlayerRow, SolveOptions, SolveStatus,
    SolverType, SquadConfig, SquadOptimizer,
};

fn glpk() -> SquadOptimizer {
    SquadOptimizer::new(create_solver(SolverType::Glpk), SolveOptions::default())
}

fn one_each() -> BTreeMap<Position, u32> {
    Position::ALL.into_iter().map(|p| (p, 1)).collect()
}

fn four_player_pool() -> Vec<PlayerRecord> {
    vec![
        PlayerRecord::new(1, "a", "Arsenal", Position::Goalkeeper, 4.0, 100.0),
        PlayerRecord::new(2, "b", "Chelsea", Position::Defender, 5.0, 90.0),
        PlayerRecord::new(3, "c", "Liverpool", Position::Midfielder, 6.0, 80.0),
        PlayerRecord::new(4, "d", "Spurs", Position::Forward, 5.0, 70.0),
    ]
}

fn four_player_config(budget: f64) -> SquadConfig {
    SquadConfig {
        squad_size: 4,
        quota_mode: QuotaMode::Exact,
        quotas: one_each(),
        budget,
        max_per_team: ClubCap::Uniform(3),
        price_scale: Some(10),
    }
}

/// Deterministic pseudo-random pool, spread across positions and a few clubs.
fn synthetic_pool(size: u32, seed: u64) -> Vec<PlayerRecord> {
    let mut state = seed;
    let mut next = move |modulo: u64| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) % modulo
    };
    let clubs = ["Arsenal", "Chelsea", "Everton", "Fulham", "Brentford", "Wolves"];
    (0..size)
        .map(|i| {
            let position = Position::ALL[(i % 4) as usize];
            let club = clubs[next(clubs.len() as u64) as usize];
            let price = 4.0 + next(60) as f64 / 10.0;
            let value = 20.0 + next(200) as f64 + next(10) as f64 / 10.0;
            PlayerRecord::new(i + 1, format!("p{}", i + 1), club, position, price, value)
        })
        .collect()
}

/// Best total value over every subset that passes the same checks as the extractor.
fn exhaustive_best(pool: &[PlayerRecord], config: &SquadConfig) -> Option<f64> {
    let constraints = build_constraint_set(pool, config).unwrap();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << pool.len()) {
        if mask.count_ones() != config.squad_size {
            continue;
        }
        let squad: Vec<PlayerRecord> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, p)| p.clone())
            .collect();
        if verify_selection(&squad, &constraints).is_ok() {
            let value: f64 = squad.iter().map(|p| p.value).sum();
            best = Some(best.map_or(value, |b: f64| b.max(value)));
        }
    }
    best
}

#[test]
fn test_four_player_pool_selects_everyone() {
    let result = glpk()
        .optimize(&four_player_pool(), &four_player_config(25.0))
        .unwrap();

    assert_eq!(result.status, SolveStatus::Optimal);
    let ids: Vec<u32> = result.selected.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!((result.total_price - 20.0).abs() < 1e-9);
    assert!((result.total_value - 340.0).abs() < 1e-9);
}

#[test]
fn test_four_player_pool_over_budget_is_infeasible() {
    let result = glpk()
        .optimize(&four_player_pool(), &four_player_config(10.0))
        .unwrap();

    assert_eq!(result.status, SolveStatus::Infeasible);
    assert!(result.selected.is_empty());
}

#[test]
fn test_quota_and_squad_size_mismatch_is_configuration_error() {
    let mut config = four_player_config(25.0);
    config.squad_size = 3;
    let err = glpk().optimize(&four_player_pool(), &config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Configuration(ConfigError::QuotasExceedSquadSize {
            quota_total: 4,
            squad_size: 3
        })
    ));
}

#[test]
fn test_optimal_squads_satisfy_every_rule_and_match_exhaustive_search() {
    let configs = [
        SquadConfig {
            squad_size: 4,
            quota_mode: QuotaMode::Exact,
            quotas: one_each(),
            budget: 24.0,
            max_per_team: ClubCap::Uniform(2),
            price_scale: Some(10),
        },
        SquadConfig {
            squad_size: 5,
            quota_mode: QuotaMode::Minimum,
            quotas: BTreeMap::from([(Position::Goalkeeper, 1), (Position::Defender, 2)]),
            budget: 30.0,
            max_per_team: ClubCap::PerClub {
                caps: BTreeMap::from([("Arsenal".to_string(), 1)]),
                default: Some(2),
            },
            price_scale: Some(10),
        },
    ];

    let optimizer = glpk();
    for seed in [3, 17, 42] {
        let pool = synthetic_pool(12, seed);
        for config in &configs {
            let result = optimizer.optimize(&pool, config).unwrap();
            match exhaustive_best(&pool, config) {
                Some(best) => {
                    assert_eq!(result.status, SolveStatus::Optimal, "seed {}", seed);
                    let constraints = build_constraint_set(&pool, config).unwrap();
                    assert!(verify_selection(&result.selected, &constraints).is_ok());
                    assert!(
                        (result.total_value - best).abs() < 1e-6,
                        "seed {}: solver {} vs exhaustive {}",
                        seed,
                        result.total_value,
                        best
                    );
                }
                None => assert_eq!(result.status, SolveStatus::Infeasible, "seed {}", seed),
            }
        }
    }
}

#[test]
fn test_rerunning_gives_the_same_total_value() {
    let pool = synthetic_pool(40, 7);
    let config = SquadConfig {
        squad_size: 11,
        quota_mode: QuotaMode::Minimum,
        quotas: BTreeMap::from([
            (Position::Goalkeeper, 1),
            (Position::Defender, 3),
            (Position::Midfielder, 3),
            (Position::Forward, 1),
        ]),
        budget: 84.0,
        max_per_team: ClubCap::Uniform(3),
        price_scale: Some(10),
    };
    let optimizer = glpk();
    let first = optimizer.optimize(&pool, &config).unwrap();
    let second = optimizer.optimize(&pool, &config).unwrap();

    assert_eq!(first.status, SolveStatus::Optimal);
    assert!((first.total_value - second.total_value).abs() < 1e-9);
}

#[test]
fn test_exact_pool_is_selected_and_removing_a_player_is_infeasible() {
    // minimum quotas leave one free slot, filled by the only spare defender
    let mut pool = four_player_pool();
    pool.push(PlayerRecord::new(5, "e", "Everton", Position::Defender, 4.5, 10.0));
    let config = SquadConfig {
        squad_size: 5,
        quota_mode: QuotaMode::Minimum,
        quotas: one_each(),
        budget: 25.0,
        max_per_team: ClubCap::Uniform(3),
        price_scale: Some(10),
    };

    let optimizer = glpk();
    let result = optimizer.optimize(&pool, &config).unwrap();
    assert_eq!(result.status, SolveStatus::Optimal);
    assert_eq!(result.selected.len(), 5);
    assert!((result.total_price - 24.5).abs() < 1e-9);

    pool.pop();
    let result = optimizer.optimize(&pool, &config).unwrap();
    assert_eq!(result.status, SolveStatus::Infeasible);
}

#[test]
fn test_removing_the_only_goalkeeper_fails_the_supply_check() {
    let mut pool = four_player_pool();
    pool.remove(0);
    let err = glpk()
        .optimize(&pool, &four_player_config(25.0))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Configuration(ConfigError::InsufficientSupply {
            position: Position::Goalkeeper,
            quota: 1,
            available: 0
        })
    ));
}

#[test]
fn test_club_cap_forces_a_cheaper_choice() {
    let pool = vec![
        PlayerRecord::new(1, "a", "Arsenal", Position::Goalkeeper, 4.0, 100.0),
        PlayerRecord::new(2, "b", "Arsenal", Position::Defender, 5.0, 90.0),
        PlayerRecord::new(3, "c", "Chelsea", Position::Defender, 5.0, 50.0),
        PlayerRecord::new(4, "d", "Chelsea", Position::Midfielder, 6.0, 80.0),
        PlayerRecord::new(5, "e", "Chelsea", Position::Forward, 5.0, 70.0),
    ];
    let mut config = four_player_config(25.0);
    config.max_per_team = ClubCap::PerClub {
        caps: BTreeMap::from([("Arsenal".to_string(), 1)]),
        default: Some(3),
    };

    let result = glpk().optimize(&pool, &config).unwrap();
    assert_eq!(result.status, SolveStatus::Optimal);
    let ids: Vec<u32> = result.selected.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3, 4, 5]);
    assert!((result.total_value - 300.0).abs() < 1e-9);
}

#[test]
fn test_zero_time_limit_reports_solver_error() {
    let pool = synthetic_pool(80, 11);
    let optimizer = SquadOptimizer::new(
        create_solver(SolverType::Glpk),
        SolveOptions {
            time_limit: Some(Duration::ZERO),
        },
    );
    let result = optimizer.optimize(&pool, &SquadConfig::full_squad()).unwrap();

    assert_eq!(result.status, SolveStatus::SolverError);
    assert!(result.selected.is_empty());
    assert!(result.detail.is_some());
}

#[test]
fn test_generous_time_limit_still_solves() {
    let optimizer = SquadOptimizer::new(
        create_solver(SolverType::Glpk),
        SolveOptions {
            time_limit: Some(Duration::from_secs(30)),
        },
    );
    let result = optimizer
        .optimize(&four_player_pool(), &four_player_config(25.0))
        .unwrap();
    assert_eq!(result.status, SolveStatus::Optimal);
    assert!((result.total_value - 340.0).abs() < 1e-9);
}

#[test]
fn test_prices_below_a_tenth_are_not_rounded_out_of_budget() {
    let pool = vec![
        PlayerRecord::new(1, "a", "Arsenal", Position::Goalkeeper, 2.25, 100.0),
        PlayerRecord::new(2, "b", "Chelsea", Position::Defender, 2.25, 90.0),
        PlayerRecord::new(3, "c", "Liverpool", Position::Midfielder, 2.25, 80.0),
        PlayerRecord::new(4, "d", "Spurs", Position::Forward, 2.25, 70.0),
    ];
    let mut config = four_player_config(9.0);
    config.price_scale = None;

    let result = glpk().optimize(&pool, &config).unwrap();
    assert_eq!(result.status, SolveStatus::Optimal);
    assert!((result.total_price - 9.0).abs() < 1e-9);

    config.price_scale = Some(10);
    let err = glpk().optimize(&pool, &config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Configuration(ConfigError::OffGridPrice { price_scale: 10, .. })
    ));
}

#[test]
fn test_budget_far_above_the_pool_still_solves() {
    let result = glpk()
        .optimize(&four_player_pool(), &four_player_config(1e9))
        .unwrap();
    assert_eq!(result.status, SolveStatus::Optimal);
    assert!((result.total_value - 340.0).abs() < 1e-9);
}

fn raw(id: i64, team: &str, code: u8, price: f64, points: f64, minutes: f64) -> RawPlayerRow {
    RawPlayerRow {
        id: Some(id),
        name: Some(format!("p{}", id)),
        team: Some(team.to_string()),
        position: Some(PositionField::Code(code)),
        price: Some(price),
        stats: BTreeMap::from([
            ("total_points".to_string(), points),
            ("minutes".to_string(), minutes),
        ]),
    }
}

#[test]
fn test_objective_order_does_not_change_results() {
    let rows = vec![
        raw(1, "Arsenal", 1, 4.0, 100.0, 3000.0),
        raw(2, "Chelsea", 2, 5.0, 90.0, 2500.0),
        raw(3, "Liverpool", 3, 6.0, 80.0, 2000.0),
        raw(4, "Spurs", 4, 5.0, 70.0, 0.0),
        raw(5, "Everton", 4, 5.0, 10.0, 900.0),
    ];
    let config = four_player_config(25.0);
    let options = NormalizeOptions::default();
    let optimizer = glpk();

    let alone = optimizer
        .optimize_objectives(&rows, &config, &[ObjectiveMetric::TotalPoints], &options)
        .unwrap();
    let after_per_minute = optimizer
        .optimize_objectives(
            &rows,
            &config,
            &[ObjectiveMetric::PointsPerMinute, ObjectiveMetric::TotalPoints],
            &options,
        )
        .unwrap();

    // the zero-minute forward cannot be valued per minute
    let per_minute = &after_per_minute[0];
    assert_eq!(per_minute.result.status, SolveStatus::Optimal);
    assert_eq!(per_minute.pool.dropped(), 1);
    assert!(per_minute.result.selected.iter().any(|p| p.id == 5));

    let points = &after_per_minute[1];
    assert_eq!(points.pool.dropped(), 0);
    assert_eq!(points.result.selected, alone[0].result.selected);
    assert!((points.result.total_value - 340.0).abs() < 1e-9);
}
