//! Seam between the hand engine and hand ranking.
//!
//! Ranking itself is done by `rs_poker`; this module only converts cards and
//! labels the result.

use std::fmt::Debug;

use rs_poker::core::{
    Card as RsCard, Hand as RsHand, Rank as RsRank, Rankable, Suit as RsSuit, Value as RsValue,
};

use super::entities::{Card, Rank, Suit};

/// Comparable strength of one seat's cards at showdown.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct HandStrength {
    pub rank: RsRank,
}

impl HandStrength {
    /// Hand category without its tie-break value.
    pub fn kind(&self) -> Rank {
        match self.rank {
            RsRank::HighCard(_) => Rank::HighCard,
            RsRank::OnePair(_) => Rank::OnePair,
            RsRank::TwoPair(_) => Rank::TwoPair,
            RsRank::ThreeOfAKind(_) => Rank::ThreeOfAKind,
            RsRank::Straight(_) => Rank::Straight,
            RsRank::Flush(_) => Rank::Flush,
            RsRank::FullHouse(_) => Rank::FullHouse,
            RsRank::FourOfAKind(_) => Rank::FourOfAKind,
            RsRank::StraightFlush(_) => Rank::StraightFlush,
        }
    }

    /// Human-readable category, e.g. "Two Pair".
    pub fn category(&self) -> String {
        self.kind().to_string()
    }
}

/// Ranks showdown hands. The engine only ever asks two questions: how strong
/// is this set of cards, and which of these strengths tie for best.
pub trait HandEvaluator: Debug + Send + Sync {
    /// `cards` is two hole cards followed by up to five community cards.
    fn evaluate(&self, cards: &[Card]) -> HandStrength;

    /// Indices of the strengths that tie for best, ascending.
    fn winners(&self, strengths: &[HandStrength]) -> Vec<usize> {
        let Some(best) = strengths.iter().max() else {
            return vec![];
        };
        strengths
            .iter()
            .enumerate()
            .filter(|(_, strength)| *strength == best)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Default evaluator: best five-card hand out of everything available.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestHandEvaluator;

impl HandEvaluator for BestHandEvaluator {
    fn evaluate(&self, cards: &[Card]) -> HandStrength {
        let cards: Vec<RsCard> = cards.iter().filter_map(|&card| to_rs_poker(card)).collect();
        HandStrength {
            rank: RsHand::new_with_cards(cards).rank(),
        }
    }
}

fn to_rs_poker(Card(value, suit): Card) -> Option<RsCard> {
    let value = match value {
        2 => RsValue::Two,
        3 => RsValue::Three,
        4 => RsValue::Four,
        5 => RsValue::Five,
        6 => RsValue::Six,
        7 => RsValue::Seven,
        8 => RsValue::Eight,
        9 => RsValue::Nine,
        10 => RsValue::Ten,
        11 => RsValue::Jack,
        12 => RsValue::Queen,
        13 => RsValue::King,
        1 | 14 => RsValue::Ace,
        other => {
            log::warn!("Ignoring card with value {other} during evaluation");
            return None;
        }
    };
    let suit = match suit {
        Suit::Club => RsSuit::Club,
        Suit::Spade => RsSuit::Spade,
        Suit::Diamond => RsSuit::Diamond,
        Suit::Heart => RsSuit::Heart,
    };
    Some(RsCard { value, suit })
}
