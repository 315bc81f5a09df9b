use core::fmt;
use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Direction;

/// Supplies prompt targets to the scheduler.
pub trait DirectionSource: fmt::Debug + Send + Sync {
    fn next_direction(&mut self) -> Direction;
}

/// Uniform draw over the four directions; repeats allowed.
#[derive(Debug)]
pub struct RandomDirections { rng: StdRng }

impl RandomDirections {
    pub fn from_entropy() -> Self { Self { rng: StdRng::from_entropy() } }
    pub fn seeded(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }
}

impl DirectionSource for RandomDirections {
    fn next_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}

/// Plays back a fixed sequence, then cycles it. Used by tests and demos.
#[derive(Debug, Clone)]
pub struct ScriptedDirections {
    queue: VecDeque<Direction>,
}

impl ScriptedDirections {
    pub fn new(script: impl IntoIterator<Item = Direction>) -> Self {
        Self { queue: script.into_iter().collect() }
    }

    pub fn repeating(dir: Direction) -> Self { Self::new([dir]) }
}

impl DirectionSource for ScriptedDirections {
    fn next_direction(&mut self) -> Direction {
        // an empty script degenerates to North
        let d = self.queue.pop_front().unwrap_or(Direction::North);
        self.queue.push_back(d);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_draws_cover_all_directions() {
        let mut src = RandomDirections::seeded(42);
        let mut seen = [0u32; 4];
        for _ in 0..4000 {
            let d = src.next_direction();
            seen[Direction::ALL.iter().position(|x| *x == d).unwrap()] += 1;
        }
        // roughly uniform: each bucket near 1000
        for count in seen {
            assert!((800..1200).contains(&count), "skewed draw: {:?}", seen);
        }
    }

    #[test]
    fn script_cycles() {
        let mut src = ScriptedDirections::new([Direction::East, Direction::South]);
        assert_eq!(src.next_direction(), Direction::East);
        assert_eq!(src.next_direction(), Direction::South);
        assert_eq!(src.next_direction(), Direction::East);
    }
}
