//! Market sentiment source.
//!
//! Sentiment enters the feature table as one scalar per cycle, broadcast
//! across the window and clamped to [-1, 1]. The only shipped source is a
//! seeded random one standing in for a real news or social pipeline.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

pub trait SentimentSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current sentiment for `symbol`, in [-1, 1].
    fn sentiment(&self, symbol: &str) -> f64;
}

/// Seeded uniform noise in [-0.1, 0.1]. Weak by construction so it nudges
/// the model without dominating the price features.
pub struct RandomSentiment {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomSentiment {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSentiment {
    fn default() -> Self {
        Self::new(42)
    }
}

impl SentimentSource for RandomSentiment {
    fn name(&self) -> &'static str {
        "random"
    }

    fn sentiment(&self, _symbol: &str) -> f64 {
        // A poisoned rng is still a usable rng.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(-0.1..0.1_f64).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_the_weak_band() {
        let source = RandomSentiment::new(1);
        for _ in 0..200 {
            let s = source.sentiment("BTCUSDT");
            assert!((-0.1..0.1).contains(&s));
        }
    }

    #[test]
    fn same_seed_yields_the_same_sequence() {
        let a = RandomSentiment::new(9);
        let b = RandomSentiment::new(9);
        for _ in 0..10 {
            assert_eq!(a.sentiment("BTCUSDT"), b.sentiment("BTCUSDT"));
        }
    }
}
