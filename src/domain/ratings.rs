//! Star ratings.

use std::fmt;

use super::error::ValidationError;
use super::{Id, Rating};

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// A star count in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stars(u8);

impl Stars {
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(MIN_STARS)..=i64::from(MAX_STARS)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::StarsOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate shown on a recipe card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean stars rounded to one decimal, `None` when unrated.
    pub average: Option<f32>,
    pub count: usize,
}

impl RatingSummary {
    pub fn of(ratings: &[Rating]) -> Self {
        let count = ratings.len();
        if count == 0 {
            return Self {
                average: None,
                count,
            };
        }
        let total: u32 = ratings.iter().map(|rating| u32::from(rating.stars)).sum();
        let mean = total as f32 / count as f32;
        Self {
            average: Some((mean * 10.0).round() / 10.0),
            count,
        }
    }
}

/// The rating `user_id` left, if any.
pub fn rating_by(ratings: &[Rating], user_id: Id) -> Option<&Rating> {
    ratings.iter().find(|rating| rating.user_id == user_id)
}
