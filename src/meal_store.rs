//! Latest detected meal per user.
//!
//! Only the most recent analysis result is kept; a new photo replaces the
//! previous meal and nothing expires for the lifetime of the process.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::nutrition::Nutrient;
use crate::session::UserId;

/// Dish name used when the analyzer could not name the dish
pub const UNRECOGNIZED_DISH: &str = "unrecognized";

/// A meal recognized on a photo, with values per 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMeal {
    pub dish_name: String,
    pub calories_per_100g: Nutrient,
    pub protein_per_100g: Nutrient,
    pub fat_per_100g: Nutrient,
    pub carb_per_100g: Nutrient,
    pub detected_at: DateTime<Utc>,
}

impl DetectedMeal {
    pub fn new(
        dish_name: impl Into<String>,
        calories_per_100g: Nutrient,
        protein_per_100g: Nutrient,
        fat_per_100g: Nutrient,
        carb_per_100g: Nutrient,
    ) -> Self {
        Self {
            dish_name: dish_name.into(),
            calories_per_100g,
            protein_per_100g,
            fat_per_100g,
            carb_per_100g,
            detected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MealStore {
    meals: HashMap<UserId, DetectedMeal>,
}

impl MealStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a meal for the user, replacing any previous one
    pub fn put_meal(&mut self, user_id: UserId, meal: DetectedMeal) {
        debug!("Storing meal '{}' for user {}", meal.dish_name, user_id);
        self.meals.insert(user_id, meal);
    }

    /// Latest meal for the user, `None` if no photo was analyzed yet
    pub fn get_meal(&self, user_id: UserId) -> Option<&DetectedMeal> {
        self.meals.get(&user_id)
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}
