//! Turn engine for the card game: round status, turn order, direction,
//! special-card effects, draw penalties, and end-of-round detection.
//!
//! The engine owns no cards or players itself; the session passes the roster
//! and deck in so every rule check runs before anything is mutated.

use crate::{
    error::GameError,
    state::{
        rng::RandomSource,
        uno::{
            card::{Card, CardValue, Color},
            deck::Deck,
            phase::{EndReason, RoundEvent, RoundStatus, next_status},
            player::{Player, Roster},
        },
    },
};

/// Cards dealt to each player at the start of a round.
pub const HAND_SIZE: usize = 7;
/// Largest table that can be dealt from one deck while leaving a non-wild card
/// to reveal.
pub const MAX_PLAYERS: usize = 12;

/// Turn direction around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending roster positions (+1).
    Forward,
    /// Descending roster positions (-1).
    Backward,
}

impl Direction {
    /// `+1` or `-1`.
    pub fn offset(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A wild card is on the table and its color has not been declared yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingColor {
    /// The player who played the wild declares it, then the turn advances.
    ThenAdvance,
    /// The wild's player left; whoever inherited the turn declares it and keeps
    /// playing.
    KeepTurn,
}

/// Result of a legal card play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The round goes on.
    Continue {
        /// A color must be declared before play resumes.
        awaiting_color: bool,
    },
    /// The player emptied their hand and won.
    Won {
        /// Winner's display name.
        winner: String,
    },
}

/// Result of removing a player from the roster.
#[derive(Debug, Clone)]
pub struct Removal {
    /// The removed player record (hand already returned to the deck).
    pub player: Player,
    /// The removal left fewer than two players and ended the round.
    pub round_ended: bool,
}

/// Card-game state machine.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    status: RoundStatus,
    current: usize,
    direction: Direction,
    wild_color: Option<Color>,
    draw_stack: u32,
    pending_color: Option<PendingColor>,
    winner: Option<String>,
    end_reason: Option<EndReason>,
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self {
            status: RoundStatus::Waiting,
            current: 0,
            direction: Direction::Forward,
            wild_color: None,
            draw_stack: 0,
            pending_color: None,
            winner: None,
            end_reason: None,
        }
    }
}

impl TurnEngine {
    /// Engine waiting for players.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current round status.
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Roster position whose turn it is.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Turn direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Color declared for the wild card on top of the discard pile.
    pub fn wild_color(&self) -> Option<Color> {
        self.wild_color
    }

    /// Accumulated `+2`/`+4` penalty owed by the current player.
    pub fn draw_stack(&self) -> u32 {
        self.draw_stack
    }

    /// Whether a wild color must be declared before play resumes.
    pub fn awaiting_color(&self) -> bool {
        self.pending_color.is_some()
    }

    /// Winner of the last round, if it ended with one.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Why the last round ended.
    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    /// Deal a new round.
    ///
    /// Replaces `deck` with a freshly shuffled one, deals [`HAND_SIZE`] cards to
    /// each player in join order, and reveals the first non-wild card.
    pub fn start(
        &mut self,
        roster: &mut Roster,
        deck: &mut Deck,
        rng: &mut RandomSource,
    ) -> Result<Card, GameError> {
        let next = next_status(self.status, RoundEvent::Start)?;
        let seated = roster.iter().filter(|player| player.connected).count();
        if seated < 2 {
            return Err(GameError::InsufficientPlayers);
        }
        if seated > MAX_PLAYERS {
            return Err(GameError::InvalidState(format!(
                "at most {MAX_PLAYERS} players can be dealt in"
            )));
        }
        // Players still away from the last round give up their seat.
        roster.drop_disconnected();

        let mut fresh = Deck::shuffled(rng);
        for player in roster.iter_mut() {
            player.hand = fresh.deal(HAND_SIZE);
        }
        let top = fresh
            .reveal_first()
            .ok_or_else(|| GameError::Exhausted("no card left to reveal".into()))?;
        *deck = fresh;

        *self = TurnEngine {
            status: next,
            ..TurnEngine::default()
        };
        self.settle_on_connected(roster);

        Ok(top)
    }

    /// Play the card at `card_index` from the hand of the player at `player`.
    pub fn play_card(
        &mut self,
        roster: &mut Roster,
        deck: &mut Deck,
        player: Option<usize>,
        card_index: usize,
    ) -> Result<PlayOutcome, GameError> {
        let seat = self.ensure_turn(player)?;
        if self.pending_color.is_some() {
            return Err(GameError::IllegalMove(
                "choose a color for the wild card first".into(),
            ));
        }

        let top = *deck
            .top()
            .ok_or_else(|| GameError::InvalidState("no card has been revealed".into()))?;
        let acting = roster.get_mut(seat).ok_or(GameError::OutOfTurn)?;
        let card = *acting
            .hand
            .get(card_index)
            .ok_or_else(|| GameError::NotFound(format!("no card at position {card_index}")))?;

        if !card.can_follow(&top, self.wild_color, self.draw_stack) {
            let reason = if self.draw_stack > 0 {
                format!("{card} cannot be stacked on a pending +{}", self.draw_stack)
            } else {
                format!("{card} does not match {top}")
            };
            return Err(GameError::IllegalMove(reason));
        }

        acting.hand.remove(card_index);
        let hand_empty = acting.hand.is_empty();
        let name = acting.name.clone();

        deck.discard(card);
        self.wild_color = None;
        self.draw_stack += card.value.draw_penalty();

        if hand_empty {
            self.finish(EndReason::Winner(name.clone()))?;
            return Ok(PlayOutcome::Won { winner: name });
        }

        match card.value {
            CardValue::Skip => {
                self.advance(roster);
                self.advance(roster);
            }
            CardValue::Reverse => {
                self.direction = self.direction.flipped();
                if roster.len() == 2 {
                    self.advance(roster);
                }
                self.advance(roster);
            }
            CardValue::Wild | CardValue::WildDrawFour => {
                self.pending_color = Some(PendingColor::ThenAdvance);
            }
            _ => self.advance(roster),
        }

        Ok(PlayOutcome::Continue {
            awaiting_color: self.pending_color.is_some(),
        })
    }

    /// Draw `max(draw_stack, 1)` cards for the current player and pass the turn.
    pub fn draw(
        &mut self,
        roster: &mut Roster,
        deck: &mut Deck,
        rng: &mut RandomSource,
        player: Option<usize>,
    ) -> Result<Vec<Card>, GameError> {
        let seat = self.ensure_turn(player)?;
        if self.pending_color.is_some() {
            return Err(GameError::IllegalMove(
                "choose a color for the wild card first".into(),
            ));
        }

        let amount = self.draw_stack.max(1) as usize;
        let drawn = deck.draw(amount, rng);
        let acting = roster.get_mut(seat).ok_or(GameError::OutOfTurn)?;
        acting.hand.extend(drawn.iter().copied());

        self.draw_stack = 0;
        self.advance(roster);
        Ok(drawn)
    }

    /// Declare the color of the wild card on top of the discard pile.
    pub fn choose_color(
        &mut self,
        roster: &Roster,
        player: Option<usize>,
        color: Color,
    ) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        let Some(pending) = self.pending_color else {
            return Err(GameError::IllegalMove(
                "no wild card is waiting for a color".into(),
            ));
        };
        if !color.is_playable() {
            return Err(GameError::InvalidInput(
                "declared color must be red, blue, green, or yellow".into(),
            ));
        }

        self.wild_color = Some(color);
        self.pending_color = None;
        if pending == PendingColor::ThenAdvance {
            self.advance(roster);
        }
        Ok(())
    }

    /// React to the player at `index` losing their connection (already marked
    /// disconnected in the roster).
    pub fn player_disconnected(&mut self, roster: &Roster, index: usize) {
        if self.status == RoundStatus::Playing && index == self.current {
            self.pass_turn_from_absent(roster);
        }
    }

    /// Remove the player at `index`, keeping the current index pointed at the
    /// same player and returning their cards to the bottom of the draw pile.
    pub fn remove_player(
        &mut self,
        roster: &mut Roster,
        deck: &mut Deck,
        index: usize,
    ) -> Option<Removal> {
        if index >= roster.len() {
            return None;
        }

        let playing = self.status == RoundStatus::Playing;
        if playing && index == self.current && roster.len() > 1 {
            self.pass_turn_from_absent(roster);
        }

        let mut player = roster.remove(index)?;
        deck.return_to_bottom(player.hand.drain(..));

        if index < self.current {
            self.current -= 1;
        }
        if self.current >= roster.len() {
            self.current = 0;
        }

        let round_ended =
            playing && roster.len() < 2 && self.finish(EndReason::NotEnoughPlayers).is_ok();

        Some(Removal {
            player,
            round_ended,
        })
    }

    /// Return to the lobby. Hands are cleared, or the roster emptied when
    /// `keep_players` is false.
    pub fn reset(
        &mut self,
        roster: &mut Roster,
        deck: &mut Deck,
        keep_players: bool,
    ) -> Result<(), GameError> {
        let next = next_status(self.status, RoundEvent::Reset)?;
        if keep_players {
            roster.drop_disconnected();
            for player in roster.iter_mut() {
                player.hand.clear();
            }
        } else {
            roster.clear();
        }
        *deck = Deck::empty();
        *self = TurnEngine {
            status: next,
            ..TurnEngine::default()
        };
        Ok(())
    }

    fn finish(&mut self, reason: EndReason) -> Result<(), GameError> {
        self.status = next_status(self.status, RoundEvent::Finish(reason.clone()))?;
        self.winner = match &reason {
            EndReason::Winner(name) => Some(name.clone()),
            EndReason::NotEnoughPlayers => None,
        };
        self.end_reason = Some(reason);
        self.draw_stack = 0;
        self.pending_color = None;
        Ok(())
    }

    fn ensure_turn(&self, player: Option<usize>) -> Result<usize, GameError> {
        if self.status != RoundStatus::Playing {
            return Err(GameError::InvalidState("no round is in progress".into()));
        }
        match player {
            Some(seat) if seat == self.current => Ok(seat),
            _ => Err(GameError::OutOfTurn),
        }
    }

    /// Move the turn away from a player who is no longer at the table. A color
    /// they still owed passes to the next player, who keeps the turn after
    /// declaring it.
    fn pass_turn_from_absent(&mut self, roster: &Roster) {
        if self.pending_color.is_some() {
            self.pending_color = Some(PendingColor::KeepTurn);
        }
        self.advance(roster);
    }

    /// Step by `direction`, skipping disconnected players. After a full lap
    /// without a connected player, the landing seat is accepted.
    fn advance(&mut self, roster: &Roster) {
        let len = roster.len();
        if len == 0 {
            self.current = 0;
            return;
        }
        for _ in 0..len {
            self.current = self.step(self.current, len);
            if roster.is_connected(self.current) {
                return;
            }
        }
    }

    fn settle_on_connected(&mut self, roster: &Roster) {
        if !roster.is_connected(self.current) {
            self.advance(roster);
        }
    }

    fn step(&self, from: usize, len: usize) -> usize {
        (from as isize + self.direction.offset()).rem_euclid(len as isize) as usize
    }
}
