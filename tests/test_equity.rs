use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;

use plo_equity::cards::{parse_board, parse_hand, remaining_deck};
use plo_equity::chunk::{run_chunk, ChunkSpec};
use plo_equity::error::PloError;
use plo_equity::orchestrator::{calculate_equity, CancelToken, SimOptions};
use plo_equity::request::{PlayerHand, SimulationRequest};
use plo_equity::sampler::BoardSampler;

fn hand(notation: &str) -> PlayerHand {
    PlayerHand::new(parse_hand(notation).unwrap())
}

fn seeded(seed: u64) -> SimOptions {
    SimOptions {
        seed: Some(seed),
        ..SimOptions::default()
    }
}

fn total_equity(report: &plo_equity::request::EquityReport) -> f64 {
    report.players.iter().map(|p| p.equity()).sum()
}

// --- early-termination path -----------------------------------------------

#[test]
fn test_resolved_board_trip_sevens_beat_kings() {
    // AKQJ double-suited holds a pair of kings; 2277 makes trip sevens
    let request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("2c2h7s7d")],
        parse_board("Kd8c7h3s2d").unwrap(),
        100_000,
    );
    let report = calculate_equity(&request, &SimOptions::default()).unwrap();
    assert_eq!(report.trials, 1);
    assert_abs_diff_eq!(report.players[0].win_fraction, 0.0);
    assert_abs_diff_eq!(report.players[1].win_fraction, 1.0);
    assert_abs_diff_eq!(report.equity(1), 1.0);
}

#[test]
fn test_resolved_board_split() {
    // both hands play the same two overcards on a trips board
    let request = SimulationRequest::single_board(
        vec![hand("AsKs2h3d"), hand("AdKd2s3c"), hand("9h8h7c6s")],
        parse_board("QcQdQhJsJc").unwrap(),
        100_000,
    );
    let report = calculate_equity(&request, &SimOptions::default()).unwrap();
    assert_eq!(report.trials, 1);
    assert_abs_diff_eq!(report.equity(0), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(report.equity(1), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(report.equity(2), 0.0);
    assert_abs_diff_eq!(report.players[0].win_fraction, 0.0);
    assert_abs_diff_eq!(report.players[0].split_fraction, 0.5, epsilon = 1e-12);
}

#[test]
fn test_double_board_scoop() {
    // aces and kings in the hole fill up on both boards
    let request = SimulationRequest::double_board(
        vec![hand("AsAdKsKd"), hand("2c2h7s7d")],
        parse_board("AcAhQs9c3d").unwrap(),
        parse_board("KcKh8d5s4h").unwrap(),
        100_000,
    );
    let report = calculate_equity(&request, &SimOptions::default()).unwrap();
    assert_eq!(report.trials, 1);
    assert!(report.double_board);
    assert_abs_diff_eq!(report.players[0].scoop_fraction.unwrap(), 1.0);
    assert_abs_diff_eq!(report.players[1].scoop_fraction.unwrap(), 0.0);
    assert_abs_diff_eq!(report.players[0].win_fraction, 1.0);
}

#[test]
fn test_early_termination_matches_forced_single_trial() {
    let request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("2c2h7s7d")],
        parse_board("Kd8c7h3s2d").unwrap(),
        100_000,
    );
    let report = calculate_equity(&request, &SimOptions::default()).unwrap();

    // the general sampling path with zero unknowns and one trial
    let sampler = BoardSampler::new(&request).unwrap();
    let acc = run_chunk(&request, &sampler, ChunkSpec { trials: 1, seed: 0 }).unwrap();
    for i in 0..2 {
        assert_abs_diff_eq!(report.players[i].win_fraction, acc.wins[i] as f64);
        assert_abs_diff_eq!(report.players[i].split_fraction, acc.split_equity[i]);
    }
}

// --- sampled paths --------------------------------------------------------

#[test]
fn test_equity_sums_to_one_single_board() {
    let request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d"), hand("7s6s5h4h")],
        parse_board("Th8s2c").unwrap(),
        20_000,
    );
    let report = calculate_equity(&request, &seeded(42)).unwrap();
    assert_abs_diff_eq!(total_equity(&report), 1.0, epsilon = 1e-9);
}

#[test]
fn test_equity_sums_to_one_double_board() {
    let request = SimulationRequest::double_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d"), hand("7s6s5h4h")],
        parse_board("Th8s2c").unwrap(),
        parse_board("").unwrap(),
        20_000,
    );
    let report = calculate_equity(&request, &seeded(43)).unwrap();
    assert_abs_diff_eq!(total_equity(&report), 1.0, epsilon = 1e-9);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d")],
        parse_board("Th8s2c").unwrap(),
        10_000,
    );
    let a = calculate_equity(&request, &seeded(7)).unwrap();
    let b = calculate_equity(&request, &seeded(7)).unwrap();
    assert_eq!(a.trials, b.trials);
    for (pa, pb) in a.players.iter().zip(&b.players) {
        assert_abs_diff_eq!(pa.win_fraction, pb.win_fraction);
        assert_abs_diff_eq!(pa.split_fraction, pb.split_fraction);
    }
}

#[test]
fn test_convergence_toward_enumerated_river() {
    // turn is dealt: exact equity is the average over the 40 live rivers
    let p1 = "AsAdJh9h";
    let p2 = "KcQcJc8d";
    let turn = parse_board("Th8s2c4d").unwrap();

    let committed: Vec<_> = parse_hand(p1)
        .unwrap()
        .into_iter()
        .chain(parse_hand(p2).unwrap())
        .chain(turn.iter().copied())
        .collect();
    let rivers = remaining_deck(&committed);
    assert_eq!(rivers.len(), 40);

    let mut exact = 0.0;
    for river in &rivers {
        let mut board = turn.clone();
        board.push(*river);
        let request =
            SimulationRequest::single_board(vec![hand(p1), hand(p2)], board, 1);
        let report = calculate_equity(&request, &SimOptions::default()).unwrap();
        exact += report.equity(0);
    }
    exact /= rivers.len() as f64;

    let request = |iters| {
        SimulationRequest::single_board(
            vec![hand(p1), hand(p2)],
            turn.clone(),
            iters,
        )
    };
    let coarse = calculate_equity(&request(150), &seeded(1)).unwrap();
    let fine = calculate_equity(&request(30_000), &seeded(1)).unwrap();

    assert!((coarse.equity(0) - exact).abs() < 0.15);
    assert!((fine.equity(0) - exact).abs() < 0.03);
}

#[test]
fn test_folded_hand_gets_zero_equity() {
    let mut request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d"), hand("7s6s5h4h")],
        parse_board("Th8s2c").unwrap(),
        5_000,
    );
    request.hands[2].folded = true;
    let report = calculate_equity(&request, &seeded(9)).unwrap();
    assert!(report.players[2].folded);
    assert_abs_diff_eq!(report.equity(2), 0.0);
    assert_abs_diff_eq!(total_equity(&report), 1.0, epsilon = 1e-9);
}

#[test]
fn test_quick_mode_trims_trials() {
    let mut request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d")],
        parse_board("").unwrap(),
        500_000,
    );
    request.quick = true;
    let report = calculate_equity(&request, &seeded(3)).unwrap();
    assert!(report.trials <= 10_000);
}

#[test]
fn test_progress_reaches_total() {
    let seen: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let options = SimOptions {
        seed: Some(5),
        progress: Some(Arc::new(move |done, total| {
            sink.lock().unwrap().push((done, total));
        })),
        ..SimOptions::default()
    };
    let request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d")],
        parse_board("Th8s2c").unwrap(),
        20_000,
    );
    let report = calculate_equity(&request, &options).unwrap();
    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    let total = seen[0].1;
    assert_eq!(report.trials, total);
    assert!(seen.iter().any(|&(done, _)| done == total));
}

#[test]
fn test_report_display() {
    let request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("2c2h7s7d")],
        parse_board("Kd8c7h3s2d").unwrap(),
        1,
    );
    let report = calculate_equity(&request, &SimOptions::default()).unwrap();
    let s = format!("{}", report);
    assert!(s.contains("Win"));
    assert!(s.contains("trials"));
}

// --- cancellation ---------------------------------------------------------

#[test]
fn test_pre_cancelled_request_fails() {
    let token = CancelToken::new();
    token.cancel();
    let options = SimOptions {
        cancel: Some(token),
        ..SimOptions::default()
    };
    let request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d")],
        parse_board("").unwrap(),
        50_000,
    );
    assert!(matches!(
        calculate_equity(&request, &options),
        Err(PloError::Cancelled { .. })
    ));
}

#[test]
fn test_pre_cancelled_best_effort_still_fails_with_no_trials() {
    let token = CancelToken::new();
    token.cancel();
    let options = SimOptions {
        cancel: Some(token),
        best_effort_on_cancel: true,
        ..SimOptions::default()
    };
    let request = SimulationRequest::single_board(
        vec![hand("AsAdJh9h"), hand("KcQcJc8d")],
        parse_board("").unwrap(),
        50_000,
    );
    assert!(matches!(
        calculate_equity(&request, &options),
        Err(PloError::Cancelled { .. })
    ));
}

// --- validation -----------------------------------------------------------

#[test]
fn test_duplicate_card_across_hands_rejected() {
    let request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("AsKdQh2c")],
        parse_board("").unwrap(),
        1_000,
    );
    assert!(matches!(
        calculate_equity(&request, &SimOptions::default()),
        Err(PloError::DuplicateCard(_))
    ));
}

#[test]
fn test_duplicate_card_in_dead_set_rejected() {
    let mut request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("2c2h7s7d")],
        parse_board("Kd8c7h").unwrap(),
        1_000,
    );
    request.dead_cards = parse_board("Kd").unwrap();
    assert!(matches!(
        calculate_equity(&request, &SimOptions::default()),
        Err(PloError::DuplicateCard(_))
    ));
}

#[test]
fn test_insufficient_deck_rejected() {
    use plo_equity::cards::Card;
    // 8 hands consume 32 cards; 11 dead leave 9 live for 10 open slots
    let mut hands = Vec::new();
    for i in 0..8 {
        let cards = [
            Card::from_index(i * 4).unwrap(),
            Card::from_index(i * 4 + 1).unwrap(),
            Card::from_index(i * 4 + 2).unwrap(),
            Card::from_index(i * 4 + 3).unwrap(),
        ];
        hands.push(PlayerHand::new(cards));
    }
    let mut request =
        SimulationRequest::double_board(hands, Vec::new(), Vec::new(), 1_000);
    request.dead_cards = (32..43).map(|i| Card::from_index(i).unwrap()).collect();
    assert!(matches!(
        calculate_equity(&request, &SimOptions::default()),
        Err(PloError::InsufficientDeck { .. })
    ));
}

#[test]
fn test_too_many_players_rejected() {
    use plo_equity::cards::Card;
    let mut hands = Vec::new();
    for i in 0..9 {
        let cards = [
            Card::from_index(i * 4).unwrap(),
            Card::from_index(i * 4 + 1).unwrap(),
            Card::from_index(i * 4 + 2).unwrap(),
            Card::from_index(i * 4 + 3).unwrap(),
        ];
        hands.push(PlayerHand::new(cards));
    }
    let request = SimulationRequest::single_board(hands, Vec::new(), 1_000);
    assert!(matches!(
        calculate_equity(&request, &SimOptions::default()),
        Err(PloError::InvalidHandShape(_))
    ));
}

#[test]
fn test_single_active_hand_rejected() {
    let mut request = SimulationRequest::single_board(
        vec![hand("AsKsQdJd"), hand("2c2h7s7d")],
        parse_board("").unwrap(),
        1_000,
    );
    request.hands[1].folded = true;
    assert!(calculate_equity(&request, &SimOptions::default()).is_err());
}
