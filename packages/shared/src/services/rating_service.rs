pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// ELO adjustment for player A against player B.
///
/// `score_a` is 1.0 for a win, 0.5 for a draw and 0.0 for a loss. B's delta is
/// always the negation of A's.
pub fn elo_delta(rating_a: i32, rating_b: i32, score_a: f64, k: f64) -> i32 {
    let expected_a = 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) as f64 / 400.0));
    (k * (score_a - expected_a)).round() as i32
}

#[derive(Clone)]
pub struct RatingService {
    k_factor: f64,
}

impl Default for RatingService {
    fn default() -> Self {
        RatingService::new(DEFAULT_K_FACTOR)
    }
}

impl RatingService {
    pub fn new(k_factor: f64) -> Self {
        RatingService { k_factor }
    }

    /// Deltas for (X, O) given X's score.
    pub fn deltas(&self, rating_x: i32, rating_o: i32, score_x: f64) -> (i32, i32) {
        let delta_x = elo_delta(rating_x, rating_o, score_x, self.k_factor);
        (delta_x, -delta_x)
    }
}
