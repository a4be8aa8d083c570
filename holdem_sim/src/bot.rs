//! Bot decision-making for simulated seats.

use holdem_tables::game::{
    Action, BestHandEvaluator, Card, Chips, HandEvaluator, HandView, Phase, TableView,
    entities::Rank,
};
use rand::Rng;

// === Hand Strength Base Values ===

/// Strength before any made hand is known (preflop, unpaired)
const STRENGTH_UNMADE: f64 = 0.15;

/// Preflop pocket pair
const STRENGTH_POCKET_PAIR: f64 = 0.45;

/// Folding probability is scaled by how weak the hand is
const MAX_FOLD_PROBABILITY: f64 = 0.6;

/// Raise only with hands at least this strong
const RAISE_THRESHOLD: f64 = 0.5;

/// Share of strong hands that are actually raised
const RAISE_FREQUENCY: f64 = 0.5;

/// Seat-level decision maker. Only sees what its own view reveals.
#[derive(Debug)]
pub struct Bot<R: Rng> {
    rng: R,
    evaluator: BestHandEvaluator,
}

impl<R: Rng> Bot<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            evaluator: BestHandEvaluator,
        }
    }

    /// Pick a legal action for the recipient of `view`.
    pub fn decide_action(&mut self, view: &TableView) -> Action {
        let Some(me) = view
            .seats
            .iter()
            .find(|seat| seat.player_id == view.my_player_id)
        else {
            return Action::Fold;
        };
        let HandView::Cards(hole) = &me.hand else {
            return Action::Fold;
        };

        let strength = self.estimate_hand_strength(hole, &view.community_cards, view.phase);
        let to_call = view.current_bet.saturating_sub(me.bet_in_round);
        let wants_raise = strength >= RAISE_THRESHOLD && self.rng.random_bool(RAISE_FREQUENCY);

        if to_call == 0 {
            return if wants_raise && me.chips > 0 {
                Action::Bet(raise_size(view.min_raise, me.chips))
            } else {
                Action::Check
            };
        }

        let fold_probability = (1.0 - strength) * MAX_FOLD_PROBABILITY;
        if self.rng.random_bool(fold_probability.clamp(0.0, 1.0)) {
            Action::Fold
        } else if wants_raise && me.chips > to_call {
            Action::Bet(raise_size(to_call + view.min_raise, me.chips))
        } else {
            Action::Call
        }
    }

    /// Rough 0..=1 strength of the best hand the bot can see.
    fn estimate_hand_strength(&self, hole: &[Card], board: &[Card], phase: Phase) -> f64 {
        if phase == Phase::Preflop || board.is_empty() {
            return match hole {
                [a, b] if a.0 == b.0 => STRENGTH_POCKET_PAIR,
                [a, b] => STRENGTH_UNMADE + f64::from(a.0.max(b.0)) / 100.0,
                _ => STRENGTH_UNMADE,
            };
        }

        let cards: Vec<Card> = hole.iter().chain(board).copied().collect();
        match self.evaluator.evaluate(&cards).kind() {
            Rank::HighCard => 0.1,
            Rank::OnePair => 0.25,
            Rank::TwoPair => 0.4,
            Rank::ThreeOfAKind => 0.55,
            Rank::Straight => 0.7,
            Rank::Flush => 0.75,
            Rank::FullHouse => 0.85,
            Rank::FourOfAKind => 0.95,
            Rank::StraightFlush => 0.99,
        }
    }
}

fn raise_size(target: Chips, stack: Chips) -> Chips {
    target.max(1).min(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_tables::{
        game::{Table, TableEvent, apply_event, project},
        table::TableConfig,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn started_table(seed: u64) -> Table {
        let mut table = Table::new(TableConfig {
            seed: Some(seed),
            ..TableConfig::default()
        });
        for id in ["a", "b", "c"] {
            apply_event(
                &mut table,
                TableEvent::PlayerJoined {
                    player_id: id.into(),
                    nickname: id.to_string(),
                },
            );
        }
        apply_event(&mut table, TableEvent::StartTable { player_id: "a".into() });
        table
    }

    #[test]
    fn test_bot_actions_are_always_accepted() {
        for seed in 0..20 {
            let mut table = started_table(seed);
            let mut bot = Bot::new(StdRng::seed_from_u64(seed));
            let mut actions = 0;
            while table.is_hand_in_progress() {
                let hand = table.hand().unwrap();
                let seat = hand.action_idx.unwrap();
                let player_id = table.seats()[seat].player_id.clone();
                let action = bot.decide_action(&project(&table, seat));
                assert_eq!(table.take_action(&player_id, action), Ok(()), "seed {seed}");
                actions += 1;
                assert!(actions < 1000, "hand did not finish");
            }
            assert_eq!(table.phase(), Phase::Showdown);
            // Odd split remainders are dropped.
            assert!(table.total_chips() <= 3000);
        }
    }

    #[test]
    fn test_unseated_view_folds() {
        let table = started_table(1);
        let mut view = project(&table, 0);
        view.my_player_id = "nobody".into();
        let mut bot = Bot::new(StdRng::seed_from_u64(1));
        assert_eq!(bot.decide_action(&view), Action::Fold);
    }

    #[test]
    fn test_raise_size_capped_by_stack() {
        assert_eq!(raise_size(40, 25), 25);
        assert_eq!(raise_size(0, 25), 1);
        assert_eq!(raise_size(40, 100), 40);
    }
}
