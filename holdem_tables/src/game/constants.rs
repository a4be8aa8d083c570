use super::entities::Chips;

/// Stack every seat starts a game with.
pub const STARTING_CHIPS: Chips = 1000;
pub const SMALL_BLIND: Chips = 10;
pub const BIG_BLIND: Chips = 20;

/// Two hole cards per seat plus five community cards must fit in one
/// 52-card deck.
pub const MAX_PLAYERS: usize = 23;
pub const DEFAULT_MAX_PLAYERS: usize = 10;

pub const MAX_NICKNAME_LENGTH: usize = 32;

pub const FLOP_CARDS: usize = 3;
pub const BOARD_CARDS: usize = 5;
