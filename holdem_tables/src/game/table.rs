//! Long-lived table aggregate: seats, stacks, the button and the current
//! hand.

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use std::{fmt, sync::Arc};
use uuid::Uuid;

use super::{
    entities::{Action, Chips, Deck, Phase, PlayerId, Seat, SeatIndex},
    errors::EngineError,
    evaluator::{BestHandEvaluator, HandEvaluator},
    hand::Hand,
    seats::next_eligible_seat,
};
use crate::table::TableConfig;

pub type TableId = String;

pub const NOT_ENOUGH_PLAYERS: &str = "Not enough active players with chips to continue.";

pub struct Table {
    id: TableId,
    config: TableConfig,
    seats: Vec<Seat>,
    button: Option<SeatIndex>,
    hand: Option<Hand>,
    /// Phase reported while no hand is dealt.
    idle_phase: Phase,
    idle_note: Option<String>,
    last_activity: DateTime<Utc>,
    hand_count: u64,
    rng: StdRng,
    evaluator: Arc<dyn HandEvaluator>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("seats", &self.seats.len())
            .field("phase", &self.phase())
            .field("hand_count", &self.hand_count)
            .finish()
    }
}

fn new_table_id() -> TableId {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        Self::with_evaluator(config, Arc::new(BestHandEvaluator))
    }

    pub fn with_evaluator(config: TableConfig, evaluator: Arc<dyn HandEvaluator>) -> Self {
        let rng = config
            .seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_os_rng);
        Self {
            id: new_table_id(),
            config,
            seats: vec![],
            button: None,
            hand: None,
            idle_phase: Phase::WaitingForPlayers,
            idle_note: None,
            last_activity: Utc::now(),
            hand_count: 0,
            rng,
            evaluator,
        }
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    pub fn button(&self) -> Option<SeatIndex> {
        self.button
    }

    pub fn hand_count(&self) -> u64 {
        self.hand_count
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn phase(&self) -> Phase {
        self.hand.as_ref().map_or(self.idle_phase, |hand| hand.phase)
    }

    pub fn last_action(&self) -> Option<&str> {
        match &self.hand {
            Some(hand) => Some(hand.last_action.as_str()),
            None => self.idle_note.as_deref(),
        }
    }

    pub fn seat_of(&self, player_id: &PlayerId) -> Option<SeatIndex> {
        self.seats.iter().position(|s| &s.player_id == player_id)
    }

    /// A hand is dealt and still has betting to do.
    pub fn is_hand_in_progress(&self) -> bool {
        self.hand.as_ref().is_some_and(|hand| !hand.is_complete())
    }

    /// Every chip on the table, including the pot of a running hand.
    pub fn total_chips(&self) -> Chips {
        match &self.hand {
            Some(hand) if !hand.is_complete() => {
                let sitting_out: Chips = self.seats[hand.players.len().min(self.seats.len())..]
                    .iter()
                    .map(|s| s.chips)
                    .sum();
                hand.total_chips() + sitting_out
            }
            _ => self.seats.iter().map(|s| s.chips).sum(),
        }
    }

    /// Seat a player with the starting stack, or reconnect a known one.
    /// Players seated while a hand runs wait for the next hand.
    pub fn seat_player(
        &mut self,
        player_id: PlayerId,
        nickname: &str,
    ) -> Result<SeatIndex, EngineError> {
        if let Some(idx) = self.seat_of(&player_id) {
            let seat = &mut self.seats[idx];
            if !seat.connected {
                seat.connected = true;
                log::info!("Table {}: {} reconnected", self.id, seat.nickname);
            }
            self.touch();
            return Ok(idx);
        }
        if self.seats.len() >= self.config.max_players {
            return Err(EngineError::TableFull);
        }

        let seat = Seat::new(player_id, nickname, self.config.starting_chips);
        log::info!("Table {}: {} joined", self.id, seat.nickname);
        self.seats.push(seat);
        self.touch();
        Ok(self.seats.len() - 1)
    }

    /// Begin a new game: every seat gets the starting stack back and a hand
    /// is dealt.
    pub fn start_table(&mut self) -> Result<(), EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::WrongPhase {
                expected: Phase::WaitingForPlayers,
                actual: self.phase(),
            });
        }
        self.hand = None;
        for seat in &mut self.seats {
            seat.chips = self.config.starting_chips;
        }
        self.button = None;
        log::info!("Table {}: game started with {} seats", self.id, self.seats.len());
        self.start_hand()
    }

    pub fn request_next_hand(&mut self, player_id: &PlayerId) -> Result<(), EngineError> {
        self.seat_of(player_id).ok_or(EngineError::NotAtTable)?;
        if self.phase() != Phase::Showdown {
            return Err(EngineError::WrongPhase {
                expected: Phase::Showdown,
                actual: self.phase(),
            });
        }
        self.start_hand()
    }

    pub fn take_action(&mut self, player_id: &PlayerId, action: Action) -> Result<(), EngineError> {
        let seat = self.seat_of(player_id).ok_or(EngineError::NotAtTable)?;
        let hand = self.hand.as_mut().ok_or(EngineError::RoundNotOpen)?;
        if seat >= hand.players.len() {
            return Err(EngineError::NotYourTurn);
        }
        let result = hand.apply(seat, action, self.evaluator.as_ref());
        self.after_hand_update(result)
    }

    /// Mark a player gone. A running hand folds them; the seat itself is
    /// removed once no hand is using seat indices.
    pub fn disconnect(&mut self, player_id: &PlayerId) -> Result<(), EngineError> {
        let idx = self.seat_of(player_id).ok_or(EngineError::NotAtTable)?;
        self.seats[idx].connected = false;
        log::info!("Table {}: {} disconnected", self.id, self.seats[idx].nickname);

        match self.hand.as_mut() {
            None => {
                self.remove_seat(idx);
                self.touch();
                Ok(())
            }
            Some(hand) if idx < hand.players.len() => {
                let result = hand.fold_disconnected(idx, self.evaluator.as_ref());
                self.after_hand_update(result)
            }
            Some(_) => {
                self.touch();
                Ok(())
            }
        }
    }

    /// Drop departed seats, move the button and deal.
    fn start_hand(&mut self) -> Result<(), EngineError> {
        self.settle();
        self.hand = None;
        for idx in (0..self.seats.len()).rev() {
            if !self.seats[idx].connected {
                self.remove_seat(idx);
            }
        }

        let seats = &self.seats;
        let len = seats.len();
        let funded = |i: SeatIndex| seats[i].chips > 0;
        // First hand: the button lands on the first funded seat from 0.
        let from = self
            .button
            .filter(|&b| b < len)
            .unwrap_or(len.saturating_sub(1));
        let Some(button) = next_eligible_seat(len, from, funded) else {
            return self.game_over();
        };

        let deck = Deck::shuffled_with(&mut self.rng);
        match Hand::deal(
            &self.seats,
            button,
            self.config.blinds(),
            deck,
            self.evaluator.as_ref(),
        ) {
            Ok(hand) => {
                self.button = Some(button);
                self.hand_count += 1;
                self.idle_note = None;
                log::info!(
                    "Table {}: hand #{} dealt, button on {}",
                    self.id,
                    self.hand_count,
                    self.seats[button].nickname
                );
                self.hand = Some(hand);
                self.settle();
                self.touch();
                Ok(())
            }
            Err(EngineError::InsufficientPlayers) => self.game_over(),
            Err(err) => {
                log::error!("Table {}: could not deal hand: {err}", self.id);
                self.idle_phase = Phase::WaitingForPlayers;
                self.idle_note = Some(format!("Hand aborted: {err}."));
                Err(err)
            }
        }
    }

    fn game_over(&mut self) -> Result<(), EngineError> {
        log::info!("Table {}: {NOT_ENOUGH_PLAYERS}", self.id);
        self.hand = None;
        self.idle_phase = Phase::GameOver;
        self.idle_note = Some(NOT_ENOUGH_PLAYERS.to_string());
        self.touch();
        Err(EngineError::InsufficientPlayers)
    }

    fn after_hand_update(&mut self, result: Result<(), EngineError>) -> Result<(), EngineError> {
        match result {
            Ok(()) => {
                self.settle();
                self.touch();
                Ok(())
            }
            Err(EngineError::DeckExhausted) => {
                self.abort_hand();
                Err(EngineError::DeckExhausted)
            }
            Err(err) => Err(err),
        }
    }

    /// Copy stacks back from a finished hand.
    fn settle(&mut self) {
        let Some(hand) = self.hand.as_ref().filter(|hand| hand.is_complete()) else {
            return;
        };
        for (seat, player) in self.seats.iter_mut().zip(&hand.players) {
            seat.chips = player.chips;
        }
    }

    /// Give every contribution back and forget the hand.
    fn abort_hand(&mut self) {
        let Some(hand) = self.hand.take() else {
            return;
        };
        log::error!(
            "Table {}: deck exhausted during hand #{}, refunding {} chips",
            self.id,
            self.hand_count,
            hand.players.iter().map(|p| p.total_bet).sum::<Chips>()
        );
        for (seat, player) in self.seats.iter_mut().zip(&hand.players) {
            seat.chips = player.chips + player.total_bet;
        }
        self.idle_phase = Phase::WaitingForPlayers;
        self.idle_note = Some("Hand aborted: deck exhausted.".to_string());
        self.touch();
    }

    fn remove_seat(&mut self, idx: SeatIndex) {
        let seat = self.seats.remove(idx);
        log::debug!("Table {}: removed seat of {}", self.id, seat.nickname);
        // Keep the button where it was so rotation resumes with the seat
        // that followed the removed one.
        self.button = match self.button {
            Some(button) if button > idx => Some(button - 1),
            Some(button) if button == idx => match button.checked_sub(1) {
                Some(prev) => Some(prev),
                None => self.seats.len().checked_sub(1),
            },
            other => other,
        };
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}
