//! Bingo caller: card generation, ball drawing, and card validation.

pub mod card;
pub mod drawer;
pub mod session;
pub mod validator;
