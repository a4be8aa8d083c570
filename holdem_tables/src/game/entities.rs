use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::{constants, errors::EngineError};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "c",
            Self::Spade => "s",
            Self::Diamond => "d",
            Self::Heart => "h",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2u8, ace is 14u8.
pub type Value = u8;

const VALUE_CHARS: &str = "23456789TJQKA";

/// A card is a tuple of a value and a suit. On the wire a card is its
/// two-character token, value first (`"As"`, `"Td"`, `"2c"`).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = VALUE_CHARS
            .chars()
            .nth(usize::from(self.0.saturating_sub(2)))
            .unwrap_or('?');
        write!(f, "{value}{}", self.1)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("invalid card token {0:?}")]
pub struct ParseCardError(String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(value), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError(s.to_string()));
        };
        let value = VALUE_CHARS
            .find(value.to_ascii_uppercase())
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let suit = match suit.to_ascii_lowercase() {
            'c' => Suit::Club,
            's' => Suit::Spade,
            'd' => Suit::Diamond,
            'h' => Suit::Heart,
            _ => return Err(ParseCardError(s.to_string())),
        };
        Ok(Self(value as Value + 2, suit))
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hand category, weakest first.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        };
        write!(f, "{repr}")
    }
}

/// Cards still to be dealt. The last element of `cards` is the top of the
/// deck.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A full deck shuffled with the thread-local RNG.
    pub fn new_shuffled() -> Self {
        Self::shuffled_with(&mut rand::rng())
    }

    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(rng);
        deck
    }

    /// A stacked deck that deals `cards` in the given order. Used to script
    /// hands.
    pub fn from_top(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Result<Card, EngineError> {
        self.cards.pop().ok_or(EngineError::DeckExhausted)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let cards = Suit::ALL
            .into_iter()
            .flat_map(|suit| (2u8..=14).map(move |value| Card(value, suit)))
            .collect();
        Self { cards }
    }
}

/// Type alias for whole chips. Stacks, bets and pots are never fractional.
pub type Chips = u32;

/// Type alias for seat positions at a table.
pub type SeatIndex = usize;

/// Opaque identifier assigned to a player by the transport layer. Kept
/// exactly as received; two ids name the same seat only if they are equal.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Trim and bound a display name. Falls back to a name derived from the
/// player id when nothing printable is left.
pub fn sanitize_nickname(nickname: &str, player_id: &PlayerId) -> String {
    let cleaned: String = nickname
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(constants::MAX_NICKNAME_LENGTH)
        .collect();
    if cleaned.is_empty() {
        let prefix: String = player_id.as_str().chars().take(4).collect();
        format!("Player_{prefix}")
    } else {
        cleaned
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl Default for Blinds {
    fn default() -> Self {
        Self {
            small: constants::SMALL_BLIND,
            big: constants::BIG_BLIND,
        }
    }
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// A player decision. `Bet` carries the chips added this action, not the
/// resulting total.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "fold"),
            Self::Check => write!(f, "check"),
            Self::Call => write!(f, "call"),
            Self::Bet(amount) => write!(f, "bet {amount}"),
        }
    }
}

/// Loosely typed action as received from a client. The amount is kept raw
/// so a negative or non-numeric amount can be rejected as an illegal action
/// instead of a malformed event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
}

impl TryFrom<ActionPayload> for Action {
    type Error = EngineError;

    fn try_from(payload: ActionPayload) -> Result<Self, Self::Error> {
        match payload.kind.to_ascii_uppercase().as_str() {
            "FOLD" => Ok(Self::Fold),
            "CHECK" => Ok(Self::Check),
            "CALL" => Ok(Self::Call),
            "BET" | "RAISE" => {
                let amount = payload
                    .amount
                    .ok_or_else(|| EngineError::illegal("bet requires an amount"))?;
                let amount = amount
                    .as_u64()
                    .ok_or_else(|| EngineError::illegal(format!("invalid bet amount {amount}")))?;
                let amount = Chips::try_from(amount)
                    .map_err(|_| EngineError::illegal("bet amount too large"))?;
                Ok(Self::Bet(amount))
            }
            other => Err(EngineError::illegal(format!("unknown action {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    WaitingForPlayers,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    GameOver,
}

impl Phase {
    /// Phases in which seats are asked to act.
    pub fn is_betting(&self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "waiting_for_players",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::GameOver => "game_over",
        };
        write!(f, "{repr}")
    }
}

/// A seat at a table. The stack persists across hands.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub nickname: String,
    pub chips: Chips,
    pub connected: bool,
}

impl Seat {
    pub fn new(player_id: PlayerId, nickname: &str, chips: Chips) -> Self {
        let nickname = sanitize_nickname(nickname, &player_id);
        Self {
            player_id,
            nickname,
            chips,
            connected: true,
        }
    }
}

/// Per-seat state for one dealt hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerHandState {
    pub player_id: PlayerId,
    pub nickname: String,
    pub hole: Vec<Card>,
    pub chips: Chips,
    pub bet_in_round: Chips,
    /// Everything this seat put into the pot during the hand.
    pub total_bet: Chips,
    pub acted_this_round: bool,
    pub folded: bool,
    pub all_in: bool,
}

impl PlayerHandState {
    pub fn new(seat: &Seat) -> Self {
        let funded = seat.chips > 0;
        Self {
            player_id: seat.player_id.clone(),
            nickname: seat.nickname.clone(),
            hole: Vec::with_capacity(2),
            chips: seat.chips,
            bet_in_round: 0,
            total_bet: 0,
            acted_this_round: false,
            folded: !funded,
            all_in: false,
        }
    }

    /// Seat can still be asked for a decision.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in && self.chips > 0
    }

    /// Move up to `amount` chips from the stack into the current round.
    /// Returns what was actually paid.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.bet_in_round += paid;
        self.total_bet += paid;
        if self.chips == 0 {
            self.all_in = true;
        }
        paid
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Winner {
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub nickname: String,
    pub category: String,
    pub amount: Chips,
    pub hand: Vec<Card>,
}
