//! In-memory bingo game: identity, drawn balls, issued cards, and which
//! connection is currently looking at which card.

use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    error::GameError,
    state::{
        ConnectionId,
        bingo::{
            card::{BingoCard, generate_card, random_serial},
            drawer::BallDrawer,
            validator::{CardValidation, validate_card},
        },
        rng::RandomSource,
    },
};

/// Name used when a player requests a card without one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";
/// Size of the 4-digit serial space (`1000..=9999`).
const SERIAL_SPACE: usize = 9000;

/// Card request as received from a player.
#[derive(Debug, Clone, Default)]
pub struct CardRequest {
    /// Display name; blank names fall back to [`DEFAULT_PLAYER_NAME`].
    pub player_name: Option<String>,
    /// Serial of a card the client cached earlier.
    pub serial_number: Option<String>,
    /// Game identity the cached card belongs to.
    pub game_id: Option<String>,
}

/// Outcome of a card request.
#[derive(Debug, Clone)]
pub struct CardAssignment {
    /// The card now bound to the requesting connection.
    pub card: BingoCard,
    /// True when a brand-new card was generated.
    pub issued: bool,
}

/// A card together with its match status.
#[derive(Debug, Clone)]
pub struct ValidatedCard {
    /// The stored card.
    pub card: BingoCard,
    /// Match status against the balls drawn so far.
    pub validation: CardValidation,
}

/// Owner of every piece of bingo state.
#[derive(Debug)]
pub struct BingoSession {
    game_id: String,
    drawer: BallDrawer,
    cards: HashMap<String, BingoCard>,
    sessions: HashMap<ConnectionId, String>,
    qr_code_url: Option<String>,
    rng: RandomSource,
}

impl BingoSession {
    /// Fresh game using `rng` for cards and draws.
    pub fn new(mut rng: RandomSource) -> Self {
        let game_id = generate_game_id(&mut rng);
        Self {
            game_id,
            drawer: BallDrawer::new(),
            cards: HashMap::new(),
            sessions: HashMap::new(),
            qr_code_url: None,
            rng,
        }
    }

    /// Current game identity.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Balls drawn so far, in order.
    pub fn drawn_balls(&self) -> &[u8] {
        self.drawer.drawn()
    }

    /// Number of cards issued in this game.
    pub fn active_cards(&self) -> usize {
        self.cards.len()
    }

    /// Cached QR payload for the player page, once rendered.
    pub fn qr_code_url(&self) -> Option<&str> {
        self.qr_code_url.as_deref()
    }

    /// Store the rendered QR payload.
    pub fn set_qr_code_url(&mut self, url: String) {
        self.qr_code_url = Some(url);
    }

    /// Look up an issued card.
    pub fn card(&self, serial_number: &str) -> Option<&BingoCard> {
        self.cards.get(serial_number)
    }

    /// Serial currently bound to `connection`, if any.
    pub fn serial_for(&self, connection: ConnectionId) -> Option<&str> {
        self.sessions.get(&connection).map(String::as_str)
    }

    /// Hand a card to `connection`, recovering a cached one when possible.
    ///
    /// Recovery order: the requested serial when it belongs to the current
    /// game, then the card already bound to the connection, then a new card.
    pub fn request_card(
        &mut self,
        connection: ConnectionId,
        request: CardRequest,
    ) -> Result<CardAssignment, GameError> {
        let supplied_name = request
            .player_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if let Some(serial) = request.serial_number.as_deref() {
            let same_game = request.game_id.as_deref() == Some(self.game_id.as_str());
            if same_game {
                if let Some(card) = self.cards.get_mut(serial) {
                    if let Some(name) = supplied_name {
                        card.player_name = name;
                    }
                    let card = card.clone();
                    self.sessions.insert(connection, card.serial_number.clone());
                    debug!(%connection, serial = %card.serial_number, "recovered bingo card by serial");
                    return Ok(CardAssignment {
                        card,
                        issued: false,
                    });
                }
            }
        }

        if let Some(card) = self
            .sessions
            .get(&connection)
            .and_then(|serial| self.cards.get(serial))
        {
            return Ok(CardAssignment {
                card: card.clone(),
                issued: false,
            });
        }

        if self.cards.len() >= SERIAL_SPACE {
            return Err(GameError::Exhausted(
                "no card serial numbers remain in this game".into(),
            ));
        }

        let name = supplied_name.unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());
        let mut card = generate_card(&mut self.rng, name);
        while self.cards.contains_key(&card.serial_number) {
            card.serial_number = random_serial(&mut self.rng);
        }

        self.cards.insert(card.serial_number.clone(), card.clone());
        self.sessions.insert(connection, card.serial_number.clone());
        info!(%connection, serial = %card.serial_number, player = %card.player_name, "issued bingo card");

        Ok(CardAssignment { card, issued: true })
    }

    /// Draw the next ball.
    pub fn draw_ball(&mut self) -> Result<u8, GameError> {
        self.drawer
            .draw_next(&mut self.rng)
            .ok_or_else(|| GameError::Exhausted("all balls have been drawn".into()))
    }

    /// Validate the card with `serial_number` against the drawn balls.
    pub fn validate(&self, serial_number: &str) -> Result<ValidatedCard, GameError> {
        let card = self
            .cards
            .get(serial_number)
            .ok_or_else(|| GameError::NotFound(format!("card `{serial_number}`")))?;
        Ok(ValidatedCard {
            card: card.clone(),
            validation: validate_card(card, self.drawer.drawn()),
        })
    }

    /// Start a new game: new identity, no balls, no cards. The QR payload is kept.
    pub fn reset(&mut self) {
        self.game_id = generate_game_id(&mut self.rng);
        self.drawer = BallDrawer::new();
        self.cards.clear();
        self.sessions.clear();
        info!(game_id = %self.game_id, "bingo game reset");
    }

    /// Forget the connection's card affinity. The card itself stays issued.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        self.sessions.remove(&connection);
    }
}

fn generate_game_id(rng: &mut RandomSource) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("GAME-{millis}-{}", rng.alphanumeric(9))
}
