use crate::state::rng::RandomSource;

/// Highest ball number in the drum.
pub const MAX_BALL: u8 = 90;

/// Draws balls 1–90 without replacement and remembers the draw order.
#[derive(Debug, Clone, Default)]
pub struct BallDrawer {
    drawn: Vec<u8>,
}

impl BallDrawer {
    /// Empty drum state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next ball uniformly from the ones still in the drum.
    ///
    /// Returns `None` once all 90 balls are out.
    pub fn draw_next(&mut self, rng: &mut RandomSource) -> Option<u8> {
        let remaining: Vec<u8> = (1..=MAX_BALL).filter(|ball| !self.is_drawn(*ball)).collect();
        if remaining.is_empty() {
            return None;
        }

        let ball = remaining[rng.index(remaining.len())];
        self.drawn.push(ball);
        Some(ball)
    }

    /// Balls drawn so far, in draw order.
    pub fn drawn(&self) -> &[u8] {
        &self.drawn
    }

    /// Whether `ball` has already been drawn.
    pub fn is_drawn(&self, ball: u8) -> bool {
        self.drawn.contains(&ball)
    }
}
