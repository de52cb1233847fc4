//! Seated card-game players and the join-ordered roster.

use indexmap::IndexMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::{ConnectionId, uno::card::Card};

/// Public, stable identifier of a seated player.
pub type PlayerId = Uuid;

/// A player seated at the card table.
#[derive(Debug, Clone)]
pub struct Player {
    /// Public identifier, used by moderators to kick.
    pub id: PlayerId,
    /// Connection currently bound to the player; rebound on reconnection.
    pub connection: ConnectionId,
    /// Display name.
    pub name: String,
    /// Cards held. Order is irrelevant to the rules but kept for client indexes.
    pub hand: Vec<Card>,
    /// Whether the bound connection is open.
    pub connected: bool,
    /// Last time the player connected, acted, or disconnected.
    pub last_seen: OffsetDateTime,
    /// Secret used to reclaim the seat. Only ever sent to this player.
    pub session_token: String,
}

impl Player {
    /// Seat a new player bound to `connection`, minting a fresh token.
    pub fn new(connection: ConnectionId, name: String, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            connection,
            name,
            hand: Vec::new(),
            connected: true,
            last_seen: now,
            session_token: Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Players in join order. Turn order follows the roster positions.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: IndexMap<PlayerId, Player>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of seated players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player at turn position `index`.
    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get_index(index).map(|(_, player)| player)
    }

    /// Mutable player at turn position `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_index_mut(index).map(|(_, player)| player)
    }

    /// Whether the player at `index` has an open connection.
    pub fn is_connected(&self, index: usize) -> bool {
        self.get(index).is_some_and(|player| player.connected)
    }

    /// Position of the connected player bound to `connection`.
    pub fn position_of_connection(&self, connection: ConnectionId) -> Option<usize> {
        self.players
            .values()
            .position(|player| player.connected && player.connection == connection)
    }

    /// Position of the player with `id`.
    pub fn position_of(&self, id: PlayerId) -> Option<usize> {
        self.players.get_index_of(&id)
    }

    /// Position of the player holding `token`.
    pub fn position_of_token(&self, token: &str) -> Option<usize> {
        self.players
            .values()
            .position(|player| player.session_token == token)
    }

    /// Append a player at the end of the turn order; returns their position.
    pub fn push(&mut self, player: Player) -> usize {
        let (index, _) = self.players.insert_full(player.id, player);
        index
    }

    /// Remove the player at `index`, shifting later players down by one.
    pub fn remove(&mut self, index: usize) -> Option<Player> {
        self.players
            .shift_remove_index(index)
            .map(|(_, player)| player)
    }

    /// Players in turn order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Mutable players in turn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Drop players whose connection is closed, keeping join order. Returns
    /// how many were dropped.
    pub fn drop_disconnected(&mut self) -> usize {
        let before = self.players.len();
        self.players.retain(|_, player| player.connected);
        before - self.players.len()
    }

    /// Drop every player.
    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// Total cards held across all hands.
    pub fn cards_in_hands(&self) -> usize {
        self.players.values().map(|player| player.hand.len()).sum()
    }
}
