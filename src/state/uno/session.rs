//! In-memory card-game table: roster, piles, turn engine, and chat.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    error::GameError,
    state::{
        ConnectionId,
        rng::RandomSource,
        uno::{
            card::{Card, Color},
            chat::{ChatLog, ChatMessage, MAX_MESSAGE_CHARS},
            deck::Deck,
            engine::{PlayOutcome, Removal, TurnEngine},
            phase::RoundStatus,
            player::{Player, PlayerId, Roster},
        },
    },
};

/// Name used when a player joins without one.
pub const DEFAULT_PLAYER_NAME: &str = "UNO Player";

/// Tunables of the card table.
#[derive(Debug, Clone)]
pub struct UnoSettings {
    /// How long a disconnected player keeps their seat.
    pub disconnect_timeout: Duration,
    /// Chat messages retained.
    pub chat_history: usize,
}

impl Default for UnoSettings {
    fn default() -> Self {
        Self {
            disconnect_timeout: Duration::from_secs(60),
            chat_history: 50,
        }
    }
}

/// Outcome of `uno-join`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Seated player.
    pub player_id: PlayerId,
    /// Token to store client-side; only ever sent to the joiner.
    pub session_token: String,
    /// The joiner reclaimed an existing seat.
    pub reconnected: bool,
}

/// Outcome of a connection closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The player was dropped from the lobby.
    Removed,
    /// The player keeps their seat until the sweep purges them.
    MarkedAway,
}

/// Owner of every piece of card-game state.
#[derive(Debug)]
pub struct UnoSession {
    roster: Roster,
    deck: Deck,
    engine: TurnEngine,
    chat: ChatLog,
    qr_code_url: Option<String>,
    settings: UnoSettings,
    rng: RandomSource,
}

impl UnoSession {
    /// Empty table.
    pub fn new(settings: UnoSettings, rng: RandomSource) -> Self {
        Self {
            roster: Roster::new(),
            deck: Deck::empty(),
            engine: TurnEngine::new(),
            chat: ChatLog::new(settings.chat_history),
            qr_code_url: None,
            settings,
            rng,
        }
    }

    /// Seated players in turn order.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Turn engine state.
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Current round status.
    pub fn status(&self) -> RoundStatus {
        self.engine.status()
    }

    /// Active card on the discard pile.
    pub fn top_card(&self) -> Option<&Card> {
        self.deck.top()
    }

    /// Player whose turn it is, while a round is being played.
    pub fn current_player(&self) -> Option<&Player> {
        match self.engine.status() {
            RoundStatus::Playing => self.roster.get(self.engine.current_index()),
            _ => None,
        }
    }

    /// The last `count` chat messages, oldest first.
    pub fn recent_chat(&self, count: usize) -> impl Iterator<Item = &ChatMessage> {
        self.chat.recent(count)
    }

    /// Cached QR payload for the card-game player page.
    pub fn qr_code_url(&self) -> Option<&str> {
        self.qr_code_url.as_deref()
    }

    /// Store the rendered QR payload.
    pub fn set_qr_code_url(&mut self, url: String) {
        self.qr_code_url = Some(url);
    }

    /// Player seated behind `connection`.
    pub fn player_for(&self, connection: ConnectionId) -> Option<&Player> {
        self.seat_of(connection)
            .and_then(|seat| self.roster.get(seat))
    }

    /// Cards in all piles and hands.
    pub fn cards_in_play(&self) -> usize {
        self.deck.draw_len() + self.deck.discard_len() + self.roster.cards_in_hands()
    }

    /// Seat `connection`, reclaiming an existing seat by token or by
    /// connection before appending a new player.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        player_name: Option<&str>,
        session_token: Option<&str>,
        now: OffsetDateTime,
    ) -> JoinOutcome {
        let session_token = session_token.filter(|token| !token.is_empty());

        // A connection holds at most one seat: taking over another seat by
        // token releases the one it held.
        if let Some(claimed) = session_token.and_then(|token| self.roster.position_of_token(token))
            && self.seat_of(connection).is_some_and(|held| held != claimed)
        {
            self.disconnect(connection, now);
        }

        let reclaimed = session_token
            .and_then(|token| self.roster.position_of_token(token))
            .or_else(|| self.seat_of(connection));

        if let Some(seat) = reclaimed
            && let Some(player) = self.roster.get_mut(seat)
        {
            player.connection = connection;
            player.connected = true;
            player.last_seen = now;
            info!(player = %player.id, name = %player.name, "player reconnected");
            return JoinOutcome {
                player_id: player.id,
                session_token: player.session_token.clone(),
                reconnected: true,
            };
        }

        let name = player_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PLAYER_NAME)
            .to_string();
        let player = Player::new(connection, name, now);
        let outcome = JoinOutcome {
            player_id: player.id,
            session_token: player.session_token.clone(),
            reconnected: false,
        };
        info!(player = %player.id, name = %player.name, "player joined the table");
        self.roster.push(player);
        outcome
    }

    /// Deal a new round; returns the revealed card.
    pub fn start(&mut self) -> Result<Card, GameError> {
        let top = self
            .engine
            .start(&mut self.roster, &mut self.deck, &mut self.rng)?;
        info!(players = self.roster.len(), top = %top, "round started");
        Ok(top)
    }

    /// Play a card for the player behind `connection`.
    pub fn play_card(
        &mut self,
        connection: ConnectionId,
        card_index: usize,
        now: OffsetDateTime,
    ) -> Result<PlayOutcome, GameError> {
        let seat = self.seat_of(connection);
        let outcome = self
            .engine
            .play_card(&mut self.roster, &mut self.deck, seat, card_index)?;
        self.touch(seat, now);
        if let PlayOutcome::Won { winner } = &outcome {
            info!(%winner, "round won");
        }
        Ok(outcome)
    }

    /// Draw for the player behind `connection`; returns the drawn cards.
    pub fn draw_card(
        &mut self,
        connection: ConnectionId,
        now: OffsetDateTime,
    ) -> Result<Vec<Card>, GameError> {
        let seat = self.seat_of(connection);
        let drawn = self
            .engine
            .draw(&mut self.roster, &mut self.deck, &mut self.rng, seat)?;
        self.touch(seat, now);
        Ok(drawn)
    }

    /// Declare the wild color for the player behind `connection`.
    pub fn choose_color(
        &mut self,
        connection: ConnectionId,
        color: Color,
        now: OffsetDateTime,
    ) -> Result<(), GameError> {
        let seat = self.seat_of(connection);
        self.engine.choose_color(&self.roster, seat, color)?;
        self.touch(seat, now);
        Ok(())
    }

    /// Post a chat line from a seated player.
    pub fn chat(
        &mut self,
        connection: ConnectionId,
        text: &str,
        now: OffsetDateTime,
    ) -> Result<ChatMessage, GameError> {
        let seat = self
            .seat_of(connection)
            .ok_or_else(|| GameError::NotFound("you are not seated at the table".into()))?;
        let text = text.trim();
        let chars = text.chars().count();
        if chars == 0 || chars > MAX_MESSAGE_CHARS {
            return Err(GameError::InvalidInput(format!(
                "chat messages must be 1 to {MAX_MESSAGE_CHARS} characters"
            )));
        }

        self.touch(Some(seat), now);
        let player_name = self
            .roster
            .get(seat)
            .map(|player| player.name.clone())
            .unwrap_or_default();
        let message = ChatMessage {
            player_name,
            text: text.to_string(),
            timestamp: now,
        };
        self.chat.push(message.clone());
        Ok(message)
    }

    /// Remove the player with `player_id`.
    pub fn kick(&mut self, player_id: PlayerId) -> Result<Removal, GameError> {
        let seat = self
            .roster
            .position_of(player_id)
            .ok_or_else(|| GameError::NotFound(format!("player {player_id}")))?;
        let removal = self
            .engine
            .remove_player(&mut self.roster, &mut self.deck, seat)
            .ok_or_else(|| GameError::NotFound(format!("player {player_id}")))?;
        info!(player = %player_id, name = %removal.player.name, "player kicked");
        Ok(removal)
    }

    /// React to `connection` closing. Returns `None` when it held no seat.
    pub fn disconnect(
        &mut self,
        connection: ConnectionId,
        now: OffsetDateTime,
    ) -> Option<DisconnectOutcome> {
        let seat = self.seat_of(connection)?;

        if self.engine.status() == RoundStatus::Waiting {
            let removal = self
                .engine
                .remove_player(&mut self.roster, &mut self.deck, seat)?;
            debug!(name = %removal.player.name, "player left the lobby");
            return Some(DisconnectOutcome::Removed);
        }

        let player = self.roster.get_mut(seat)?;
        player.connected = false;
        player.last_seen = now;
        debug!(name = %player.name, "player marked away");
        self.engine.player_disconnected(&self.roster, seat);
        Some(DisconnectOutcome::MarkedAway)
    }

    /// Purge players disconnected for longer than the configured timeout.
    pub fn sweep(&mut self, now: OffsetDateTime) -> Vec<Removal> {
        let timeout = self.settings.disconnect_timeout.as_millis() as i128;
        let expired: Vec<PlayerId> = self
            .roster
            .iter()
            .filter(|player| {
                !player.connected && (now - player.last_seen).whole_milliseconds() > timeout
            })
            .map(|player| player.id)
            .collect();

        let mut removals = Vec::with_capacity(expired.len());
        for id in expired {
            let Some(seat) = self.roster.position_of(id) else {
                continue;
            };
            if let Some(removal) = self
                .engine
                .remove_player(&mut self.roster, &mut self.deck, seat)
            {
                info!(name = %removal.player.name, "removed player after disconnect timeout");
                removals.push(removal);
            }
        }
        removals
    }

    /// Back to the lobby. Chat is kept.
    pub fn reset(&mut self, keep_players: bool) -> Result<(), GameError> {
        self.engine
            .reset(&mut self.roster, &mut self.deck, keep_players)?;
        info!(keep_players, players = self.roster.len(), "card table reset");
        Ok(())
    }

    fn seat_of(&self, connection: ConnectionId) -> Option<usize> {
        self.roster.position_of_connection(connection)
    }

    fn touch(&mut self, seat: Option<usize>, now: OffsetDateTime) {
        if let Some(player) = seat.and_then(|seat| self.roster.get_mut(seat)) {
            player.last_seen = now;
        }
    }
}
