use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use holdem_tables::{
    TableConfig,
    game::{
        Action, BestHandEvaluator, Blinds, Deck, Hand, HandEvaluator, PlayerId, Table, TableEvent,
        apply_event, apply_raw,
        entities::{Card, Seat, Suit},
        project_all,
    },
};
use rand::{SeedableRng, rngs::StdRng};

/// A seeded table with `n_players` seated and the first hand dealt
fn setup_table_with_players(n_players: usize) -> Table {
    let config = TableConfig {
        seed: Some(1),
        ..TableConfig::default()
    };
    let mut table = Table::new(config);
    for i in 0..n_players {
        apply_event(
            &mut table,
            TableEvent::PlayerJoined {
                player_id: PlayerId::new(&format!("player{i}")),
                nickname: format!("player{i}"),
            },
        );
    }
    apply_event(
        &mut table,
        TableEvent::StartTable {
            player_id: PlayerId::new("player0"),
        },
    );
    table
}

/// Benchmark hand evaluation with 7 cards (hole cards + board)
fn bench_hand_eval_7_cards(c: &mut Criterion) {
    let cards = vec![
        Card(14, Suit::Spade),
        Card(13, Suit::Spade),
        Card(12, Suit::Spade),
        Card(11, Suit::Spade),
        Card(10, Suit::Spade),
        Card(2, Suit::Heart),
        Card(3, Suit::Diamond),
    ];

    c.bench_function("hand_eval_7_cards", |b| {
        b.iter(|| BestHandEvaluator.evaluate(&cards));
    });
}

/// Benchmark the evaluator seam on 100 shuffled 7-card hands
fn bench_evaluator_100_hands(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let hands: Vec<Vec<Card>> = (0..100)
        .map(|_| {
            let mut deck = Deck::shuffled_with(&mut rng);
            (0..7).filter_map(|_| deck.draw().ok()).collect()
        })
        .collect();

    c.bench_function("evaluator_100_hands", |b| {
        b.iter(|| {
            let strengths: Vec<_> = hands.iter().map(|h| BestHandEvaluator.evaluate(h)).collect();
            BestHandEvaluator.winners(&strengths)
        });
    });
}

/// Benchmark picking winners among already evaluated hands
fn bench_hand_comparison(c: &mut Criterion) {
    let board = [
        Card(2, Suit::Club),
        Card(7, Suit::Diamond),
        Card(9, Suit::Heart),
        Card(11, Suit::Spade),
        Card(12, Suit::Diamond),
    ];
    let holes = [
        [Card(14, Suit::Heart), Card(3, Suit::Club)],
        [Card(2, Suit::Heart), Card(2, Suit::Diamond)],
        [Card(9, Suit::Club), Card(7, Suit::Club)],
        [Card(10, Suit::Club), Card(8, Suit::Spade)],
    ];
    let strengths: Vec<_> = holes
        .iter()
        .map(|hole| {
            let cards: Vec<Card> = hole.iter().chain(&board).copied().collect();
            BestHandEvaluator.evaluate(&cards)
        })
        .collect();

    c.bench_function("hand_comparison_4_hands", |b| {
        b.iter(|| BestHandEvaluator.winners(&strengths));
    });
}

/// Benchmark dealing a hand with different seat counts
fn bench_deal(c: &mut Criterion) {
    let mut group = c.benchmark_group("deal");

    for n_players in [2, 6, 10] {
        let seats: Vec<Seat> = (0..n_players)
            .map(|i| Seat::new(PlayerId::new(&format!("player{i}")), "bot", 1000))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n_players), &seats, |b, seats| {
            b.iter_batched(
                || Deck::shuffled_with(&mut StdRng::seed_from_u64(9)),
                |deck| Hand::deal(seats, 0, Blinds::default(), deck, &BestHandEvaluator),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark view projection for every seat
fn bench_view_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_generation");

    for n_players in [2, 4, 6, 8, 10] {
        let table = setup_table_with_players(n_players);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_players}_players")),
            &table,
            |b, table| b.iter(|| project_all(table)),
        );
    }

    group.finish();
}

/// Benchmark calling a hand down to showdown through the event path
fn bench_play_hand(c: &mut Criterion) {
    let mut group = c.benchmark_group("play_hand");

    for n_players in [2, 10] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_players}_players")),
            &n_players,
            |b, &n| {
                b.iter_batched(
                    || setup_table_with_players(n),
                    |mut table| {
                        while let Some(player_id) = table
                            .hand()
                            .and_then(|hand| hand.action_idx)
                            .map(|idx| table.seats()[idx].player_id.clone())
                        {
                            apply_event(
                                &mut table,
                                TableEvent::PlayerAction {
                                    player_id,
                                    action: Action::Call,
                                },
                            );
                        }
                        table
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark decoding and applying a JSON action
fn bench_raw_event(c: &mut Criterion) {
    let raw = r#"{"type":"PLAYER_ACTION","payload":{"player_id":"player0","action":{"type":"CALL"}}}"#;
    c.bench_function("apply_raw_call", |b| {
        b.iter_batched(
            || setup_table_with_players(3),
            |mut table| apply_raw(&mut table, raw),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    hand_evaluation,
    bench_hand_eval_7_cards,
    bench_evaluator_100_hands,
    bench_hand_comparison,
);

criterion_group!(
    table_operations,
    bench_deal,
    bench_view_generation,
    bench_play_hand,
    bench_raw_event,
);

criterion_main!(hand_evaluation, table_operations);
