//! Card game played by matching color or value, with skip, reverse, draw, and
//! wild cards.

pub mod card;
pub mod chat;
pub mod deck;
pub mod engine;
pub mod phase;
pub mod player;
pub mod session;
