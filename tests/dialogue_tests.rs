use anyhow::Result;

use food_coach::dialogue::{validate_number, Onboarding, OnboardingStep, Reply, Transition};
use food_coach::profile::{ActivityLevel, Gender};
use food_coach::session::{Coach, Outgoing, Session};

const USER: i64 = 1001;

fn replies(outgoing: Vec<Outgoing>) -> Vec<Reply> {
    outgoing
        .into_iter()
        .map(|o| match o {
            Outgoing::Onboarding(reply) => reply,
            Outgoing::Portion(report) => panic!("Unexpected portion report: {report:?}"),
        })
        .collect()
}

fn current_step(coach: &Coach) -> OnboardingStep {
    match coach.session(USER) {
        Some(Session::Onboarding(onboarding)) => onboarding.step(),
        other => panic!("Expected onboarding session, got {other:?}"),
    }
}

/// Answer every question up to (but not including) the habits step
fn answer_until_habits(coach: &mut Coach) {
    coach.start(USER);
    for answer in ["Male", "30", "180", "80", "skip", "skip", "Sedentary"] {
        coach.handle_text(USER, answer);
    }
    assert_eq!(current_step(coach), OnboardingStep::Habits);
}

/// Test the complete questionnaire end to end
#[test]
fn test_full_onboarding_computes_targets() {
    let mut coach = Coach::new();
    answer_until_habits(&mut coach);

    coach.handle_text(USER, "No bad habits");
    coach.handle_text(USER, "Continue");
    coach.handle_text(USER, "Lose weight");
    let out = replies(coach.handle_text(USER, "No restrictions"));

    let target = match out.as_slice() {
        [Reply::ProfileSaved(target)] => *target,
        other => panic!("Unexpected replies: {other:?}"),
    };
    assert_eq!(target.daily_calories, 1836);
    assert_eq!(target.daily_protein_g, 128);
    assert_eq!(target.daily_fat_g, 72);
    assert_eq!(target.daily_carb_g, 169);

    match coach.session(USER) {
        Some(Session::Complete { profile, target: stored }) => {
            assert_eq!(profile.gender, Gender::Male);
            assert_eq!(profile.activity_level, ActivityLevel::Sedentary);
            assert_eq!(profile.waist_cm, "skip");
            assert_eq!(profile.habits, "none");
            assert_eq!(profile.goal_label, "Lose weight");
            assert_eq!(profile.dietary_restriction, "No restrictions");
            assert_eq!(stored, &target);
        }
        other => panic!("Expected completed session, got {other:?}"),
    }
}

/// Each answer moves exactly one question forward
#[test]
fn test_questions_are_asked_in_order() {
    let mut coach = Coach::new();
    let first = replies(coach.start(USER));
    assert_eq!(first, vec![Reply::Question(OnboardingStep::Gender)]);

    let expected = [
        ("Female", OnboardingStep::Age),
        ("25", OnboardingStep::Height),
        ("165", OnboardingStep::Weight),
        ("60", OnboardingStep::Waist),
        ("70", OnboardingStep::Hips),
        ("95", OnboardingStep::Activity),
        ("Light activity", OnboardingStep::Habits),
    ];
    for (answer, next) in expected {
        assert_eq!(replies(coach.handle_text(USER, answer)), vec![Reply::Question(next)]);
    }
}

/// Onboarding rejects non-numeric age and stays on the age question
#[test]
fn test_non_numeric_age_is_reasked() {
    let mut coach = Coach::new();
    coach.start(USER);
    coach.handle_text(USER, "Male");

    let out = replies(coach.handle_text(USER, "abc"));
    assert_eq!(out, vec![Reply::InvalidNumber(OnboardingStep::Age)]);
    assert_eq!(current_step(&coach), OnboardingStep::Age);

    let out = replies(coach.handle_text(USER, "30"));
    assert_eq!(out, vec![Reply::Question(OnboardingStep::Height)]);
}

#[test]
fn test_invalid_height_and_weight_are_reasked() {
    let mut coach = Coach::new();
    coach.start(USER);
    coach.handle_text(USER, "Male");
    coach.handle_text(USER, "30");

    assert_eq!(
        replies(coach.handle_text(USER, "one eighty")),
        vec![Reply::InvalidNumber(OnboardingStep::Height)]
    );
    coach.handle_text(USER, "180");
    assert_eq!(
        replies(coach.handle_text(USER, "80.5")),
        vec![Reply::InvalidNumber(OnboardingStep::Weight)]
    );
    assert_eq!(current_step(&coach), OnboardingStep::Weight);
}

/// Habits accumulate until the continue sentinel
#[test]
fn test_habits_accumulate() {
    let mut coach = Coach::new();
    answer_until_habits(&mut coach);

    assert_eq!(
        replies(coach.handle_text(USER, "smoking")),
        vec![Reply::HabitsNoted(vec!["smoking".to_string()])]
    );
    coach.handle_text(USER, "alcohol");
    // Duplicates are ignored
    coach.handle_text(USER, "smoking");
    assert_eq!(
        replies(coach.handle_text(USER, "continue")),
        vec![Reply::Question(OnboardingStep::Goal)]
    );

    match coach.session(USER) {
        Some(Session::Onboarding(onboarding)) => {
            assert_eq!(onboarding.draft().habits.as_deref(), Some("smoking, alcohol"));
        }
        other => panic!("Expected onboarding session, got {other:?}"),
    }
}

#[test]
fn test_no_habits_sentinel() {
    let mut coach = Coach::new();
    answer_until_habits(&mut coach);

    coach.handle_text(USER, "none");
    coach.handle_text(USER, "continue");

    match coach.session(USER) {
        Some(Session::Onboarding(onboarding)) => {
            assert_eq!(onboarding.draft().habits.as_deref(), Some("none"));
        }
        other => panic!("Expected onboarding session, got {other:?}"),
    }
}

#[test]
fn test_continue_without_habits_stores_none() {
    let mut coach = Coach::new();
    answer_until_habits(&mut coach);
    coach.handle_text(USER, "Далее");

    match coach.session(USER) {
        Some(Session::Onboarding(onboarding)) => {
            assert_eq!(onboarding.step(), OnboardingStep::Goal);
            assert_eq!(onboarding.draft().habits.as_deref(), Some("none"));
        }
        other => panic!("Expected onboarding session, got {other:?}"),
    }
}

/// Restarting mid-questionnaire discards the draft
#[test]
fn test_restart_discards_draft() {
    let mut coach = Coach::new();
    coach.start(USER);
    coach.handle_text(USER, "Male");
    coach.handle_text(USER, "30");

    let out = replies(coach.handle_text(USER, "/start"));
    assert_eq!(out, vec![Reply::Question(OnboardingStep::Gender)]);

    match coach.session(USER) {
        Some(Session::Onboarding(onboarding)) => {
            assert_eq!(onboarding.step(), OnboardingStep::Gender);
            assert_eq!(onboarding.draft().age_years, None);
            assert_eq!(onboarding.draft().gender, None);
        }
        other => panic!("Expected onboarding session, got {other:?}"),
    }
}

fn complete_onboarding(coach: &mut Coach, weight: &str, goal: &str) {
    coach.start(USER);
    for answer in [
        "Male", "30", "180", weight, "skip", "skip", "Sedentary", "continue", goal, "none",
    ] {
        coach.handle_text(USER, answer);
    }
}

/// Restarting after completion replaces the profile and its targets
#[test]
fn test_restart_after_completion_replaces_profile() {
    let mut coach = Coach::new();
    complete_onboarding(&mut coach, "80", "Lose weight");
    let first = *coach.target(USER).unwrap();
    assert_eq!(
        (first.daily_calories, first.daily_protein_g, first.daily_fat_g, first.daily_carb_g),
        (1836, 128, 72, 169)
    );

    coach.handle_text(USER, "/start");
    assert!(coach.target(USER).is_none());
    coach.handle_text(USER, "Male");
    assert!(coach.target(USER).is_none());

    complete_onboarding(&mut coach, "90", "Gain mass");
    let second = *coach.target(USER).unwrap();
    assert_eq!(
        (second.daily_calories, second.daily_protein_g, second.daily_fat_g, second.daily_carb_g),
        (2556, 144, 81, 313)
    );

    match coach.session(USER) {
        Some(Session::Complete { profile, target }) => {
            assert_eq!(profile.weight_kg, 90);
            assert_eq!(profile.goal_label, "Gain mass");
            assert_eq!(target, &second);
        }
        other => panic!("Expected completed session, got {other:?}"),
    }
}

/// Driving the state machine directly, without a coach
#[tokio::test]
async fn test_state_machine_transitions() -> Result<()> {
    let (onboarding, question) = Onboarding::begin();
    assert_eq!(question, Reply::Question(OnboardingStep::Gender));

    let onboarding = match onboarding.advance("Мужской") {
        Transition::Continue(next, replies) => {
            assert_eq!(replies, vec![Reply::Question(OnboardingStep::Age)]);
            next
        }
        Transition::Complete { .. } => panic!("Completed after one answer"),
    };
    assert_eq!(onboarding.draft().gender, Some(Gender::Male));

    Ok(())
}

#[test]
fn test_number_validation() {
    assert_eq!(validate_number("42"), Ok(42));
    assert!(validate_number("").is_err());
    assert!(validate_number("forty").is_err());
}
