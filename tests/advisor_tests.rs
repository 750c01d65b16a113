//! # Advisor Tests
//!
//! Portion scaling, percentages of daily targets and advisory rules, driven
//! through the coach the same way the bot drives it.

use food_coach::advisor::{advise, Advice, NutrientKind};
use food_coach::meal_store::DetectedMeal;
use food_coach::nutrition::Nutrient;
use food_coach::profile::{compute_targets, ActivityLevel, Gender, UserProfile};
use food_coach::session::{Coach, Outgoing};

const USER: i64 = 77;

fn profile(goal: &str) -> UserProfile {
    UserProfile {
        gender: Gender::Male,
        age_years: 30,
        height_cm: 180,
        weight_kg: 80,
        waist_cm: "skip".to_string(),
        hips_cm: "skip".to_string(),
        activity_level: ActivityLevel::Sedentary,
        habits: "none".to_string(),
        goal_label: goal.to_string(),
        dietary_restriction: "none".to_string(),
    }
}

fn fatty_meal() -> DetectedMeal {
    DetectedMeal::new(
        "Fried pork",
        Nutrient::Known(520.0),
        Nutrient::Known(20.0),
        Nutrient::Known(50.0),
        Nutrient::Known(0.0),
    )
}

fn onboard(coach: &mut Coach, goal: &str) {
    coach.start(USER);
    for answer in [
        "Male", "30", "180", "80", "skip", "skip", "Sedentary", "continue", goal, "none",
    ] {
        coach.handle_text(USER, answer);
    }
    assert!(coach.target(USER).is_some());
}

#[test]
fn test_fat_rule_fires_for_weight_loss() {
    let profile = profile("Lose weight");
    let target = compute_targets(&profile);

    let report = advise(&fatty_meal(), 200, Some((&profile, &target))).unwrap();

    let fat = report.line(NutrientKind::Fat).unwrap();
    assert_eq!(fat.amount, Nutrient::Known(100.0));
    assert_eq!(fat.percent_of_target, Some(138.9));
    assert_eq!(
        report.advice.as_deref(),
        Some(&[Advice::TooMuchFatForWeightLoss][..])
    );
}

#[test]
fn test_fat_rule_needs_weight_loss_goal() {
    let profile = profile("Gain mass");
    let target = compute_targets(&profile);

    let report = advise(&fatty_meal(), 200, Some((&profile, &target))).unwrap();
    assert_eq!(report.advice, Some(vec![]));
}

#[test]
fn test_low_protein_and_high_carbs() {
    let profile = profile("Maintain weight");
    let target = compute_targets(&profile);
    let pasta = DetectedMeal::new(
        "Pasta",
        Nutrient::Known(350.0),
        Nutrient::Known(3.0),
        Nutrient::Known(1.5),
        Nutrient::Known(70.0),
    );

    // 500 g: 15 g protein of 128, 350 g carbs of 244
    let report = advise(&pasta, 500, Some((&profile, &target))).unwrap();
    assert_eq!(
        report.advice,
        Some(vec![Advice::LowProtein, Advice::TooManyCarbs])
    );
}

#[test]
fn test_unknown_values_skip_percentages_and_rules() {
    let profile = profile("Lose weight");
    let target = compute_targets(&profile);
    let mystery = DetectedMeal::new(
        "unrecognized",
        Nutrient::Unknown,
        Nutrient::Unknown,
        Nutrient::Unknown,
        Nutrient::Unknown,
    );

    let report = advise(&mystery, 300, Some((&profile, &target))).unwrap();
    assert!(report.lines.iter().all(|l| l.amount == Nutrient::Unknown));
    assert!(report.lines.iter().all(|l| l.percent_of_target.is_none()));
    assert_eq!(report.advice, Some(vec![]));
}

/// A portion weight with no meal on file produces no messages
#[test]
fn test_portion_without_meal_is_silent() {
    let mut coach = Coach::new();
    onboard(&mut coach, "Lose weight");

    assert!(coach.handle_text(USER, "250").is_empty());
}

#[test]
fn test_non_numeric_text_is_silent() {
    let mut coach = Coach::new();
    coach.record_meal(USER, fatty_meal());

    assert!(coach.handle_text(USER, "thanks!").is_empty());
    assert!(coach.handle_text(USER, "0").is_empty());
    assert!(coach.handle_text(USER, "-100").is_empty());
}

#[test]
fn test_portion_without_profile_has_no_advice() {
    let mut coach = Coach::new();
    coach.record_meal(USER, fatty_meal());

    let out = coach.handle_text(USER, "200");
    match out.as_slice() {
        [Outgoing::Portion(report)] => {
            assert_eq!(report.portion_grams, 200);
            assert_eq!(report.advice, None);
            assert_eq!(
                report.line(NutrientKind::Calories).unwrap().amount,
                Nutrient::Known(1040.0)
            );
        }
        other => panic!("Unexpected output: {other:?}"),
    }
}

#[test]
fn test_portion_after_onboarding() {
    let mut coach = Coach::new();
    onboard(&mut coach, "Похудеть");
    coach.record_meal(USER, fatty_meal());

    let out = coach.handle_text(USER, " 200 ");
    match out.as_slice() {
        [Outgoing::Portion(report)] => {
            assert_eq!(report.dish_name, "Fried pork");
            assert_eq!(
                report.line(NutrientKind::Calories).unwrap().percent_of_target,
                Some(56.6)
            );
            assert_eq!(report.advice, Some(vec![Advice::TooMuchFatForWeightLoss]));
        }
        other => panic!("Unexpected output: {other:?}"),
    }
}

/// The latest photo replaces the previous meal
#[test]
fn test_latest_meal_is_used() {
    let mut coach = Coach::new();
    coach.record_meal(USER, fatty_meal());
    coach.record_meal(
        USER,
        DetectedMeal::new(
            "Salad",
            Nutrient::Known(40.0),
            Nutrient::Known(2.0),
            Nutrient::Known(1.0),
            Nutrient::Known(5.0),
        ),
    );

    let report = coach.advise(USER, 100).unwrap();
    assert_eq!(report.dish_name, "Salad");
}

/// Computing targets is a pure function
#[test]
fn test_targets_are_idempotent() {
    let profile = profile("Lose weight");
    assert_eq!(compute_targets(&profile), compute_targets(&profile));
}
