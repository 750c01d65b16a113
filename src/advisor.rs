//! # Portion Advisor Module
//!
//! Scales the latest detected meal to the portion the user ate, relates it
//! to the user's daily targets, and applies simple dietary rules.

use log::debug;

use crate::meal_store::DetectedMeal;
use crate::nutrition::{percent_of, scale, CoachError, Nutrient};
use crate::profile::{NutritionTarget, UserProfile};

/// Fat share of the daily target above which weight-loss advice fires
pub const FAT_PERCENT_LIMIT: f64 = 40.0;
/// Protein share of the daily target below which protein advice fires
pub const PROTEIN_PERCENT_FLOOR: f64 = 15.0;
/// Carbohydrate share of the daily target above which fiber advice fires
pub const CARB_PERCENT_LIMIT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientKind {
    Calories,
    Protein,
    Fat,
    Carbs,
}

/// One line of a portion report
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientLine {
    pub kind: NutrientKind,
    pub amount: Nutrient,
    /// Share of the daily target, when a target is known
    pub percent_of_target: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    TooMuchFatForWeightLoss,
    LowProtein,
    TooManyCarbs,
}

/// Everything shown to the user for one portion
#[derive(Debug, Clone, PartialEq)]
pub struct PortionReport {
    pub dish_name: String,
    pub portion_grams: u32,
    pub lines: Vec<NutrientLine>,
    /// `None` without daily targets; `Some(vec![])` means nothing to flag
    pub advice: Option<Vec<Advice>>,
}

impl PortionReport {
    pub fn line(&self, kind: NutrientKind) -> Option<&NutrientLine> {
        self.lines.iter().find(|l| l.kind == kind)
    }
}

/// Parse a portion weight reply
///
/// Only positive whole numbers of grams are accepted; anything else is not
/// a portion reply.
pub fn parse_portion(text: &str) -> Option<u32> {
    match text.trim().parse::<u32>() {
        Ok(grams) if grams > 0 => Some(grams),
        _ => None,
    }
}

/// Build the portion report for a meal
///
/// # Arguments
///
/// * `meal` - Latest detected meal, values per 100 g
/// * `portion_grams` - Weight the user ate
/// * `profile` - Profile and targets, if onboarding has been completed
pub fn advise(
    meal: &DetectedMeal,
    portion_grams: u32,
    profile: Option<(&UserProfile, &NutritionTarget)>,
) -> Result<PortionReport, CoachError> {
    let target = profile.map(|(_, target)| target);
    let pct = |amount: Nutrient, pick: fn(&NutritionTarget) -> i64| {
        target.and_then(|t| percent_of(amount, pick(t)))
    };

    let calories = scale(meal.calories_per_100g, portion_grams)?;
    let protein = scale(meal.protein_per_100g, portion_grams)?;
    let fat = scale(meal.fat_per_100g, portion_grams)?;
    let carbs = scale(meal.carb_per_100g, portion_grams)?;

    let lines = vec![
        NutrientLine {
            kind: NutrientKind::Calories,
            amount: calories,
            percent_of_target: pct(calories, |t| t.daily_calories),
        },
        NutrientLine {
            kind: NutrientKind::Protein,
            amount: protein,
            percent_of_target: pct(protein, |t| t.daily_protein_g),
        },
        NutrientLine {
            kind: NutrientKind::Fat,
            amount: fat,
            percent_of_target: pct(fat, |t| t.daily_fat_g),
        },
        NutrientLine {
            kind: NutrientKind::Carbs,
            amount: carbs,
            percent_of_target: pct(carbs, |t| t.daily_carb_g),
        },
    ];

    let advice = profile.map(|(user, _)| evaluate_rules(user, &lines));

    debug!(
        "Portion report for '{}' ({} g): advice={:?}",
        meal.dish_name, portion_grams, advice
    );

    Ok(PortionReport {
        dish_name: meal.dish_name.clone(),
        portion_grams,
        lines,
        advice,
    })
}

fn evaluate_rules(profile: &UserProfile, lines: &[NutrientLine]) -> Vec<Advice> {
    let percent = |kind: NutrientKind| {
        lines
            .iter()
            .find(|l| l.kind == kind)
            .and_then(|l| l.percent_of_target)
    };

    let mut advice = Vec::new();

    if let Some(fat) = percent(NutrientKind::Fat) {
        if fat > FAT_PERCENT_LIMIT && profile.wants_weight_loss() {
            advice.push(Advice::TooMuchFatForWeightLoss);
        }
    }
    if let Some(protein) = percent(NutrientKind::Protein) {
        if protein < PROTEIN_PERCENT_FLOOR {
            advice.push(Advice::LowProtein);
        }
    }
    if let Some(carbs) = percent(NutrientKind::Carbs) {
        if carbs > CARB_PERCENT_LIMIT {
            advice.push(Advice::TooManyCarbs);
        }
    }

    advice
}
