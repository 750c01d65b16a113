//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import core types
use crate::advisor::{Advice, NutrientKind, PortionReport};
use crate::dialogue::{OnboardingStep, Reply, NO_HABITS_MARKER};
use crate::meal_store::{DetectedMeal, UNRECOGNIZED_DISH};
use crate::nutrition::format_amount;
use crate::profile::NutritionTarget;

/// A chat message ready to be sent
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl RenderedMessage {
    fn plain(text: String) -> Self {
        Self { text, markup: None }
    }
}

fn keyboard(rows: &[&[&str]], language_code: Option<&str>, one_time: bool) -> ReplyMarkup {
    let buttons: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|key| KeyboardButton::new(t_lang(key, language_code)))
                .collect()
        })
        .collect();

    let markup = KeyboardMarkup::new(buttons).resize_keyboard();
    ReplyMarkup::Keyboard(if one_time { markup.one_time_keyboard() } else { markup })
}

fn remove_keyboard() -> ReplyMarkup {
    ReplyMarkup::KeyboardRemove(KeyboardRemove::new())
}

/// Reply keyboard shown with the question for a step
pub fn create_step_keyboard(step: OnboardingStep, language_code: Option<&str>) -> Option<ReplyMarkup> {
    match step {
        OnboardingStep::Gender => Some(keyboard(&[&["button-male", "button-female"]], language_code, true)),
        OnboardingStep::Age => Some(remove_keyboard()),
        OnboardingStep::Height | OnboardingStep::Weight => None,
        OnboardingStep::Waist | OnboardingStep::Hips => {
            Some(keyboard(&[&["button-skip"]], language_code, true))
        }
        OnboardingStep::Activity => Some(keyboard(
            &[
                &["button-activity-sedentary", "button-activity-light"],
                &["button-activity-moderate", "button-activity-high"],
            ],
            language_code,
            true,
        )),
        // Stays open while several habits are picked
        OnboardingStep::Habits => Some(keyboard(
            &[
                &["button-habit-smoking", "button-habit-alcohol"],
                &["button-habit-none", "button-continue"],
            ],
            language_code,
            false,
        )),
        OnboardingStep::Goal => Some(keyboard(
            &[
                &["button-goal-lose", "button-goal-maintain"],
                &["button-goal-gain", "button-goal-health"],
            ],
            language_code,
            true,
        )),
        OnboardingStep::Diet => Some(keyboard(
            &[
                &["button-diet-none"],
                &["button-diet-gluten", "button-diet-vegan"],
                &["button-diet-fasting", "button-diet-allergies"],
            ],
            language_code,
            true,
        )),
    }
}

fn question_key(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::Gender => "question-gender",
        OnboardingStep::Age => "question-age",
        OnboardingStep::Height => "question-height",
        OnboardingStep::Weight => "question-weight",
        OnboardingStep::Waist => "question-waist",
        OnboardingStep::Hips => "question-hips",
        OnboardingStep::Activity => "question-activity",
        OnboardingStep::Habits => "question-habits",
        OnboardingStep::Goal => "question-goal",
        OnboardingStep::Diet => "question-diet",
    }
}

/// Render one onboarding reply
pub fn format_onboarding_reply(reply: &Reply, language_code: Option<&str>) -> RenderedMessage {
    match reply {
        Reply::Question(step) => RenderedMessage {
            text: t_lang(question_key(*step), language_code),
            markup: create_step_keyboard(*step, language_code),
        },
        Reply::InvalidNumber(step) => RenderedMessage::plain(format!(
            "{}\n{}",
            t_lang("invalid-number", language_code),
            t_lang(question_key(*step), language_code)
        )),
        Reply::HabitsNoted(habits) => RenderedMessage::plain(format_habits_noted(habits, language_code)),
        Reply::ProfileSaved(target) => RenderedMessage {
            text: format_profile_saved(target, language_code),
            markup: Some(remove_keyboard()),
        },
    }
}

fn format_habits_noted(habits: &[String], language_code: Option<&str>) -> String {
    let habits = habits
        .iter()
        .map(|h| {
            if h == NO_HABITS_MARKER {
                t_lang("habits-none-marker", language_code)
            } else {
                h.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    t_args_lang(
        "habits-noted",
        &[
            ("habits", &habits),
            ("continue", &t_lang("button-continue", language_code)),
        ],
        language_code,
    )
}

/// Format the daily targets shown when onboarding completes
pub fn format_profile_saved(target: &NutritionTarget, language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}",
        t_args_lang(
            "profile-saved",
            &[
                ("calories", &target.daily_calories.to_string()),
                ("protein", &target.daily_protein_g.to_string()),
                ("fat", &target.daily_fat_g.to_string()),
                ("carbs", &target.daily_carb_g.to_string()),
            ],
            language_code,
        ),
        t_lang("profile-next-step", language_code)
    )
}

fn dish_display(dish_name: &str, language_code: Option<&str>) -> String {
    if dish_name == UNRECOGNIZED_DISH {
        t_lang("dish-unrecognized", language_code)
    } else {
        dish_name.to_string()
    }
}

/// Format the per-100g summary sent after a photo is analyzed
pub fn format_meal_summary(meal: &DetectedMeal, language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}",
        t_args_lang(
            "meal-summary",
            &[
                ("dish", &dish_display(&meal.dish_name, language_code)),
                ("calories", &meal.calories_per_100g.to_string()),
                ("protein", &meal.protein_per_100g.to_string()),
                ("fat", &meal.fat_per_100g.to_string()),
                ("carbs", &meal.carb_per_100g.to_string()),
            ],
            language_code,
        ),
        t_lang("portion-hint", language_code)
    )
}

/// Format a portion report with percentages and advice
pub fn format_portion_report(report: &PortionReport, language_code: Option<&str>) -> String {
    let mut lines = vec![t_args_lang(
        "report-title",
        &[
            ("dish", &dish_display(&report.dish_name, language_code)),
            ("grams", &report.portion_grams.to_string()),
        ],
        language_code,
    )];

    for line in &report.lines {
        let key = match line.kind {
            NutrientKind::Calories => "report-calories",
            NutrientKind::Protein => "report-protein",
            NutrientKind::Fat => "report-fat",
            NutrientKind::Carbs => "report-carbs",
        };
        let mut text = t_args_lang(key, &[("amount", &line.amount.to_string())], language_code);
        if let Some(percent) = line.percent_of_target {
            text.push(' ');
            text.push_str(&t_args_lang(
                "report-percent",
                &[("percent", &format_amount(percent))],
                language_code,
            ));
        }
        lines.push(text);
    }

    if let Some(advice) = &report.advice {
        lines.push(String::new());
        if advice.is_empty() {
            lines.push(t_lang("advice-none", language_code));
        }
        for item in advice {
            let key = match item {
                Advice::TooMuchFatForWeightLoss => "advice-fat-weight-loss",
                Advice::LowProtein => "advice-low-protein",
                Advice::TooManyCarbs => "advice-many-carbs",
            };
            lines.push(t_lang(key, language_code));
        }
    }

    lines.join("\n")
}
