//! State machine for a single dealt hand.
//!
//! A [`Hand`] is created by [`Hand::deal`] with blinds posted and hole cards
//! out, mutated only through [`Hand::apply`] and [`Hand::fold_disconnected`],
//! and finished once it reaches [`Phase::Showdown`]. Every call runs the full
//! cascade (round closure, street deal, fast-forward, showdown) before it
//! returns.

use super::{
    constants::{BOARD_CARDS, FLOP_CARDS},
    entities::{
        Action, Blinds, Card, Chips, Deck, Phase, PlayerHandState, Seat, SeatIndex, Winner,
    },
    errors::EngineError,
    evaluator::HandEvaluator,
    seats::next_eligible_seat,
};

pub const UNCONTESTED: &str = "Only one left";

#[derive(Clone, Debug)]
pub struct Hand {
    deck: Deck,
    blinds: Blinds,
    round_open: bool,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    /// Largest raise increment seen this round. Reported, not enforced.
    pub min_raise: Chips,
    pub phase: Phase,
    pub players: Vec<PlayerHandState>,
    pub action_idx: Option<SeatIndex>,
    pub dealer_idx: SeatIndex,
    pub small_blind_idx: SeatIndex,
    pub big_blind_idx: SeatIndex,
    pub last_action: String,
    pub winners: Vec<Winner>,
}

impl Hand {
    /// Start a hand: post blinds, deal hole cards and hand the action to the
    /// first seat after the big blind.
    ///
    /// Seats without chips sit the hand out folded. Fails with
    /// [`EngineError::InsufficientPlayers`] unless at least two seats are
    /// funded.
    pub fn deal(
        seats: &[Seat],
        dealer_idx: SeatIndex,
        blinds: Blinds,
        deck: Deck,
        evaluator: &dyn HandEvaluator,
    ) -> Result<Self, EngineError> {
        let players: Vec<PlayerHandState> = seats.iter().map(PlayerHandState::new).collect();
        let num_funded = players.iter().filter(|p| !p.folded).count();
        if num_funded < 2 || dealer_idx >= players.len() {
            return Err(EngineError::InsufficientPlayers);
        }

        let len = players.len();
        let funded = |i: SeatIndex| !players[i].folded;
        // Heads-up the button posts the small blind.
        let small_blind_idx = if num_funded == 2 && funded(dealer_idx) {
            dealer_idx
        } else {
            next_eligible_seat(len, dealer_idx, funded).ok_or(EngineError::InsufficientPlayers)?
        };
        let big_blind_idx =
            next_eligible_seat(len, small_blind_idx, funded).ok_or(EngineError::InsufficientPlayers)?;

        let mut hand = Self {
            deck,
            blinds,
            round_open: true,
            board: Vec::with_capacity(BOARD_CARDS),
            pot: 0,
            current_bet: 0,
            min_raise: blinds.big,
            phase: Phase::Preflop,
            players,
            action_idx: None,
            dealer_idx,
            small_blind_idx,
            big_blind_idx,
            last_action: String::new(),
            winners: vec![],
        };

        hand.post_blind(small_blind_idx, blinds.small, "small blind");
        hand.post_blind(big_blind_idx, blinds.big, "big blind");
        // A short big blind still leaves the full blind to call.
        hand.current_bet = blinds.big;

        for _ in 0..2 {
            for step in 1..=len {
                let idx = (dealer_idx + step) % len;
                if !hand.players[idx].folded {
                    let card = hand.deck.draw()?;
                    hand.players[idx].hole.push(card);
                }
            }
        }

        log::debug!(
            "Dealt hand: button {}, small blind {}, big blind {}, {} funded seats",
            dealer_idx,
            small_blind_idx,
            big_blind_idx,
            num_funded
        );

        hand.advance_action(big_blind_idx, evaluator)?;
        Ok(hand)
    }

    /// Apply one action from `seat`.
    ///
    /// Rejections leave the hand untouched. On success any resulting round
    /// closure, street deal and showdown has already happened when this
    /// returns.
    pub fn apply(
        &mut self,
        seat: SeatIndex,
        action: Action,
        evaluator: &dyn HandEvaluator,
    ) -> Result<(), EngineError> {
        if !self.round_open || !self.phase.is_betting() {
            return Err(EngineError::RoundNotOpen);
        }
        if self.action_idx != Some(seat) {
            return Err(EngineError::NotYourTurn);
        }
        self.validate(seat, action)?;

        let current_bet = self.current_bet;
        let player = &mut self.players[seat];
        let description = match action {
            Action::Fold => {
                player.folded = true;
                format!("{} folds.", player.nickname)
            }
            Action::Check => format!("{} checks.", player.nickname),
            Action::Call => {
                let owed = current_bet.saturating_sub(player.bet_in_round);
                if owed == 0 {
                    format!("{} calls (effectively checks).", player.nickname)
                } else {
                    let paid = player.commit(owed);
                    self.pot += paid;
                    format!("{} calls {paid}.", player.nickname)
                }
            }
            Action::Bet(amount) => {
                let paid = player.commit(amount);
                self.pot += paid;
                let total = player.bet_in_round;
                let description = format!(
                    "{} bets/raises {paid}. New total bet: {total}",
                    player.nickname
                );
                self.min_raise = self.min_raise.max(total.saturating_sub(current_bet));
                self.current_bet = self.current_bet.max(total);
                self.reopen_round_except(seat);
                description
            }
        };
        self.players[seat].acted_this_round = true;
        log::debug!("Seat {seat}: {description}");
        self.last_action = description;

        self.advance_action(seat, evaluator)
    }

    /// Fold a seat whose player went away. Folding out of turn is allowed
    /// here, unlike [`Hand::apply`].
    pub fn fold_disconnected(
        &mut self,
        seat: SeatIndex,
        evaluator: &dyn HandEvaluator,
    ) -> Result<(), EngineError> {
        if !self.phase.is_betting() {
            return Ok(());
        }
        let Some(player) = self.players.get_mut(seat) else {
            return Ok(());
        };
        if player.folded {
            return Ok(());
        }
        player.folded = true;
        self.last_action = format!("{} disconnected and folded.", player.nickname);

        if self.action_idx == Some(seat) || self.num_contenders() <= 1 || self.is_round_closed() {
            self.advance_action(seat, evaluator)
        } else {
            Ok(())
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Showdown
    }

    /// Pot plus every stack. Constant for the life of a hand until the pot
    /// is awarded.
    pub fn total_chips(&self) -> Chips {
        self.pot + self.players.iter().map(|p| p.chips).sum::<Chips>()
    }

    /// Seats still contesting the pot.
    pub fn num_contenders(&self) -> usize {
        self.players.iter().filter(|p| !p.folded).count()
    }

    /// Betting round closure.
    ///
    /// Closed when every seat that can still act has acted and matched the
    /// current bet, or when at most one such seat is left and it does not
    /// face an unmatched bet.
    pub fn is_round_closed(&self) -> bool {
        let actors: Vec<&PlayerHandState> =
            self.players.iter().filter(|p| p.can_act()).collect();
        match actors.as_slice() {
            [] => true,
            [only] => only.bet_in_round >= self.current_bet,
            _ => actors
                .iter()
                .all(|p| p.acted_this_round && p.bet_in_round == self.current_bet),
        }
    }

    fn validate(&self, seat: SeatIndex, action: Action) -> Result<(), EngineError> {
        let player = &self.players[seat];
        match action {
            Action::Fold | Action::Call => Ok(()),
            Action::Check if player.bet_in_round == self.current_bet => Ok(()),
            Action::Check => Err(EngineError::illegal(format!(
                "cannot check facing a bet of {}",
                self.current_bet
            ))),
            Action::Bet(0) => Err(EngineError::illegal("bet must be positive")),
            Action::Bet(amount) if amount > player.chips => Err(EngineError::illegal(format!(
                "bet of {amount} exceeds stack of {}",
                player.chips
            ))),
            Action::Bet(amount) if player.bet_in_round + amount < self.current_bet => {
                Err(EngineError::illegal(format!(
                    "bet of {amount} does not cover the call of {}",
                    self.current_bet - player.bet_in_round
                )))
            }
            Action::Bet(_) => Ok(()),
        }
    }

    fn post_blind(&mut self, seat: SeatIndex, amount: Chips, label: &str) {
        let player = &mut self.players[seat];
        let paid = player.commit(amount);
        self.pot += paid;
        self.last_action = format!("{} posts {label} of {paid}", player.nickname);
    }

    /// Other seats that can still act must respond to the new bet.
    fn reopen_round_except(&mut self, seat: SeatIndex) {
        for (idx, player) in self.players.iter_mut().enumerate() {
            if idx != seat && player.can_act() {
                player.acted_this_round = false;
            }
        }
    }

    /// Close the round or pass the action clockwise from `from`.
    fn advance_action(
        &mut self,
        from: SeatIndex,
        evaluator: &dyn HandEvaluator,
    ) -> Result<(), EngineError> {
        if self.num_contenders() <= 1 || self.is_round_closed() {
            return self.close_round(evaluator);
        }
        let players = &self.players;
        match next_eligible_seat(players.len(), from, |i| players[i].can_act()) {
            Some(next) => {
                self.action_idx = Some(next);
                Ok(())
            }
            None => self.close_round(evaluator),
        }
    }

    fn close_round(&mut self, evaluator: &dyn HandEvaluator) -> Result<(), EngineError> {
        self.round_open = false;
        self.action_idx = None;

        if self.num_contenders() <= 1 {
            self.award_uncontested();
            return Ok(());
        }

        for player in &mut self.players {
            player.bet_in_round = 0;
            if player.can_act() {
                player.acted_this_round = false;
            }
        }
        self.current_bet = 0;
        self.min_raise = self.blinds.big;

        let (next_phase, num_cards) = match self.phase {
            Phase::Preflop => (Phase::Flop, FLOP_CARDS),
            Phase::Flop => (Phase::Turn, 1),
            Phase::Turn => (Phase::River, 1),
            Phase::River => {
                self.showdown(evaluator);
                return Ok(());
            }
            other => {
                return Err(EngineError::WrongPhase {
                    expected: Phase::River,
                    actual: other,
                });
            }
        };
        let dealt = self.deal_board(num_cards)?;
        self.phase = next_phase;
        self.last_action = match next_phase {
            Phase::Flop => format!("Flop dealt: {}", join_cards(&dealt)),
            Phase::Turn => format!("Turn card: {}", join_cards(&dealt)),
            _ => format!("River card: {}", join_cards(&dealt)),
        };
        log::debug!("{}", self.last_action);

        let num_actors = self.players.iter().filter(|p| p.can_act()).count();
        if num_actors <= 1 {
            self.run_out_board()?;
            self.showdown(evaluator);
            return Ok(());
        }

        self.round_open = true;
        let players = &self.players;
        self.action_idx = next_eligible_seat(players.len(), self.dealer_idx, |i| {
            players[i].can_act()
        });
        Ok(())
    }

    fn deal_board(&mut self, num_cards: usize) -> Result<Vec<Card>, EngineError> {
        let mut dealt = Vec::with_capacity(num_cards);
        for _ in 0..num_cards {
            dealt.push(self.deck.draw()?);
        }
        self.board.extend_from_slice(&dealt);
        Ok(dealt)
    }

    /// Nobody can act anymore: deal the rest of the board without stopping.
    fn run_out_board(&mut self) -> Result<(), EngineError> {
        let missing = BOARD_CARDS.saturating_sub(self.board.len());
        if missing > 0 {
            self.deal_board(missing)?;
        }
        self.phase = Phase::River;
        self.last_action = format!("Board run out: {}", join_cards(&self.board));
        log::debug!("{}", self.last_action);
        Ok(())
    }

    fn award_uncontested(&mut self) {
        self.phase = Phase::Showdown;
        let Some(idx) = self.players.iter().position(|p| !p.folded) else {
            return;
        };
        let pot = std::mem::take(&mut self.pot);
        let player = &mut self.players[idx];
        player.chips += pot;
        self.last_action = format!(
            "{} wins {pot} as the only remaining player.",
            player.nickname
        );
        self.winners = vec![Winner {
            seat: idx,
            player_id: player.player_id.clone(),
            nickname: player.nickname.clone(),
            category: UNCONTESTED.to_string(),
            amount: pot,
            hand: player.hole.clone(),
        }];
        log::info!("{}", self.last_action);
    }

    /// Split the pot evenly between the best hands. The remainder of an
    /// uneven split is not paid out.
    fn showdown(&mut self, evaluator: &dyn HandEvaluator) {
        self.phase = Phase::Showdown;
        self.round_open = false;
        self.action_idx = None;

        let contenders: Vec<SeatIndex> = (0..self.players.len())
            .filter(|&i| !self.players[i].folded)
            .collect();
        let strengths: Vec<_> = contenders
            .iter()
            .map(|&i| {
                let mut cards = self.players[i].hole.clone();
                cards.extend_from_slice(&self.board);
                evaluator.evaluate(&cards)
            })
            .collect();

        let mut best: Vec<usize> = evaluator
            .winners(&strengths)
            .into_iter()
            .filter(|&i| i < contenders.len())
            .collect();
        if best.is_empty() {
            log::warn!("Evaluator picked no winner, splitting between all contenders");
            best = (0..contenders.len()).collect();
        }

        let share = self.pot / best.len().max(1) as Chips;
        let mut summary = String::from("Winner(s): ");
        self.winners = best
            .into_iter()
            .map(|i| {
                let seat = contenders[i];
                let player = &mut self.players[seat];
                player.chips += share;
                let category = strengths[i].category();
                summary.push_str(&format!("{} ({category}) wins {share}. ", player.nickname));
                Winner {
                    seat,
                    player_id: player.player_id.clone(),
                    nickname: player.nickname.clone(),
                    category,
                    amount: share,
                    hand: player.hole.clone(),
                }
            })
            .collect();
        self.pot = 0;
        self.last_action = summary.trim_end().to_string();
        log::info!("{}", self.last_action);
    }
}

fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
