//! # Profile Module
//!
//! User anthropometrics collected during onboarding and the daily calorie and
//! macro targets derived from them with the Mifflin–St Jeor equation.
//!
//! Activity and goal arrive as free-text button labels in whatever language
//! the user chatted in, so both are classified with fuzzy markers rather
//! than exact enum matching:
//!
//! - activity: first word of the label, case-insensitive
//! - goal: case-insensitive substring

use log::debug;
use serde::{Deserialize, Serialize};

use crate::nutrition::round_whole;

/// Calories removed from the daily energy target for weight loss
pub const WEIGHT_LOSS_DEFICIT: i64 = 300;
/// Calories added to the daily energy target for mass gain
pub const MASS_GAIN_SURPLUS: i64 = 300;
/// Protein target in grams per kilogram of body weight
pub const PROTEIN_G_PER_KG: f64 = 1.6;
/// Fat target in grams per kilogram of body weight
pub const FAT_G_PER_KG: f64 = 0.9;

const LOSE_WEIGHT_MARKERS: &[&str] = &["lose", "похуд"];
const GAIN_MASS_MARKERS: &[&str] = &["gain", "mass", "мас"];
const MAINTAIN_MARKERS: &[&str] = &["maintain", "поддерж"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Classify a gender button label
    ///
    /// Labels starting with `M` (Latin or Cyrillic) are male, everything
    /// else is female.
    pub fn from_label(label: &str) -> Self {
        match label.trim().chars().next() {
            Some('M' | 'm' | 'М' | 'м') => Gender::Male,
            _ => Gender::Female,
        }
    }

    /// Sex-specific constant of the Mifflin–St Jeor equation
    pub fn bmr_offset(self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    High,
}

impl ActivityLevel {
    /// Classify an activity label by its first word
    ///
    /// Unrecognized labels fall back to `Sedentary`.
    pub fn from_label(label: &str) -> Self {
        let first = label
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match first.as_str() {
            "sedentary" | "сидячий" => ActivityLevel::Sedentary,
            "light" | "легкая" | "лёгкая" => ActivityLevel::Light,
            "moderate" | "средняя" => ActivityLevel::Moderate,
            "high" | "высокая" => ActivityLevel::High,
            _ => {
                debug!("Unrecognized activity label '{label}', using sedentary factor");
                ActivityLevel::Sedentary
            }
        }
    }

    /// Multiplier applied to the basal metabolic rate
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainMass,
    ImproveHealth,
}

impl Goal {
    /// Classify a free-text goal by substring markers
    ///
    /// Weight loss is checked first, then mass gain, then maintenance.
    /// Anything else counts as a general health goal.
    pub fn from_label(label: &str) -> Self {
        let lowered = label.to_lowercase();
        let has_any = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));

        if has_any(LOSE_WEIGHT_MARKERS) {
            Goal::LoseWeight
        } else if has_any(GAIN_MASS_MARKERS) {
            Goal::GainMass
        } else if has_any(MAINTAIN_MARKERS) {
            Goal::Maintain
        } else {
            Goal::ImproveHealth
        }
    }

    /// Adjustment applied to the activity-adjusted energy target
    pub fn calorie_adjustment(self) -> i64 {
        match self {
            Goal::LoseWeight => -WEIGHT_LOSS_DEFICIT,
            Goal::GainMass => MASS_GAIN_SURPLUS,
            Goal::Maintain | Goal::ImproveHealth => 0,
        }
    }
}

/// A completed onboarding questionnaire
///
/// Immutable once built; restarting onboarding produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,
    pub age_years: u32,
    pub height_cm: u32,
    pub weight_kg: u32,
    /// Free text, stored verbatim
    pub waist_cm: String,
    /// Free text, stored verbatim
    pub hips_cm: String,
    pub activity_level: ActivityLevel,
    /// Comma-separated habit tags, or "none"
    pub habits: String,
    /// Goal exactly as the user chose or typed it
    pub goal_label: String,
    pub dietary_restriction: String,
}

impl UserProfile {
    pub fn goal(&self) -> Goal {
        Goal::from_label(&self.goal_label)
    }

    pub fn wants_weight_loss(&self) -> bool {
        self.goal() == Goal::LoseWeight
    }
}

/// Daily energy and macro targets
///
/// `daily_carb_g` can be negative for a low energy target combined with a
/// high body weight; it is kept as computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionTarget {
    pub daily_calories: i64,
    pub daily_protein_g: i64,
    pub daily_fat_g: i64,
    pub daily_carb_g: i64,
}

/// Basal metabolic rate in kcal/day (Mifflin–St Jeor)
pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    10.0 * profile.weight_kg as f64 + 6.25 * profile.height_cm as f64
        - 5.0 * profile.age_years as f64
        + profile.gender.bmr_offset()
}

/// Compute the daily targets for a profile
///
/// Pure function: the same profile always yields the same targets.
///
/// # Examples
///
/// ```rust
/// use food_coach::profile::{compute_targets, ActivityLevel, Gender, UserProfile};
///
/// let profile = UserProfile {
///     gender: Gender::Male,
///     age_years: 30,
///     height_cm: 180,
///     weight_kg: 80,
///     waist_cm: "skip".to_string(),
///     hips_cm: "skip".to_string(),
///     activity_level: ActivityLevel::Sedentary,
///     habits: "none".to_string(),
///     goal_label: "Lose weight".to_string(),
///     dietary_restriction: "none".to_string(),
/// };
///
/// let target = compute_targets(&profile);
/// assert_eq!(target.daily_calories, 1836);
/// assert_eq!(target.daily_carb_g, 169);
/// ```
pub fn compute_targets(profile: &UserProfile) -> NutritionTarget {
    let bmr = basal_metabolic_rate(profile);
    let tdee = round_whole(bmr * profile.activity_level.factor()) + profile.goal().calorie_adjustment();

    let weight = profile.weight_kg as f64;
    let protein = round_whole(weight * PROTEIN_G_PER_KG);
    let fat = round_whole(weight * FAT_G_PER_KG);
    let carb = round_whole((tdee - (protein * 4 + fat * 9)) as f64 / 4.0);

    debug!(
        "Computed targets: bmr={bmr:.1}, tdee={tdee}, protein={protein}, fat={fat}, carb={carb}"
    );

    NutritionTarget {
        daily_calories: tdee,
        daily_protein_g: protein,
        daily_fat_g: fat,
        daily_carb_g: carb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            age_years: 30,
            height_cm: 180,
            weight_kg: 80,
            waist_cm: "85".to_string(),
            hips_cm: "skip".to_string(),
            activity_level: ActivityLevel::Sedentary,
            habits: "none".to_string(),
            goal_label: "Lose weight".to_string(),
            dietary_restriction: "none".to_string(),
        }
    }

    #[test]
    fn test_bmr_male() {
        assert_eq!(basal_metabolic_rate(&sample_profile()), 1780.0);
    }

    #[test]
    fn test_bmr_female() {
        let profile = UserProfile {
            gender: Gender::Female,
            ..sample_profile()
        };
        assert_eq!(basal_metabolic_rate(&profile), 1614.0);
    }

    #[test]
    fn test_targets_sedentary_lose_weight() {
        let target = compute_targets(&sample_profile());
        assert_eq!(target.daily_calories, 1836);
        assert_eq!(target.daily_protein_g, 128);
        assert_eq!(target.daily_fat_g, 72);
        assert_eq!(target.daily_carb_g, 169);
    }

    #[test]
    fn test_gain_mass_adds_surplus() {
        let profile = UserProfile {
            goal_label: "Набрать массу".to_string(),
            ..sample_profile()
        };
        assert_eq!(compute_targets(&profile).daily_calories, 2436);
    }

    #[test]
    fn test_unmatched_goal_has_no_adjustment() {
        let profile = UserProfile {
            goal_label: "Improve health".to_string(),
            ..sample_profile()
        };
        assert_eq!(compute_targets(&profile).daily_calories, 2136);
    }

    #[test]
    fn test_activity_labels() {
        assert_eq!(ActivityLevel::from_label("Sedentary"), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::from_label("light activity"), ActivityLevel::Light);
        assert_eq!(ActivityLevel::from_label("Средняя активность"), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_label("HIGH activity"), ActivityLevel::High);
        assert_eq!(ActivityLevel::from_label("couch potato"), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::from_label(""), ActivityLevel::Sedentary);
    }

    #[test]
    fn test_goal_markers() {
        assert_eq!(Goal::from_label("I want to LOSE weight"), Goal::LoseWeight);
        assert_eq!(Goal::from_label("Похудеть"), Goal::LoseWeight);
        assert_eq!(Goal::from_label("Gain mass"), Goal::GainMass);
        assert_eq!(Goal::from_label("Поддерживать вес"), Goal::Maintain);
        assert_eq!(Goal::from_label("Улучшить здоровье"), Goal::ImproveHealth);
    }

    #[test]
    fn test_gender_labels() {
        assert_eq!(Gender::from_label("Male"), Gender::Male);
        assert_eq!(Gender::from_label("Мужской"), Gender::Male);
        assert_eq!(Gender::from_label("Женский"), Gender::Female);
        assert_eq!(Gender::from_label("other"), Gender::Female);
    }

    #[test]
    fn test_negative_carbs_are_kept() {
        let profile = UserProfile {
            gender: Gender::Female,
            age_years: 90,
            height_cm: 100,
            weight_kg: 150,
            goal_label: "lose weight".to_string(),
            ..sample_profile()
        };
        assert!(compute_targets(&profile).daily_carb_g < 0);
    }
}
