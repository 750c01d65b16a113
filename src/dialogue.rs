//! Onboarding dialogue: the questionnaire that builds a user profile.
//!
//! The conversation is an explicit state machine. [`Onboarding::advance`]
//! takes the current state and one text reply and returns the next state
//! together with the replies to send, so the whole flow can be driven from
//! tests without a bot.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::profile::{compute_targets, ActivityLevel, Gender, NutritionTarget, UserProfile};

/// Stored in place of habits when the user has none
pub const NO_HABITS_MARKER: &str = "none";

const NO_HABITS_SENTINELS: &[&str] = &["none", "no bad habits", "нет", "нет вредных привычек"];
const CONTINUE_SENTINELS: &[&str] = &["continue", "next", "далее"];

/// Questionnaire steps, in the order they are asked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingStep {
    Gender,
    Age,
    Height,
    Weight,
    Waist,
    Hips,
    Activity,
    Habits,
    Goal,
    Diet,
}

impl OnboardingStep {
    /// The step asked after this one, `None` after `Diet`
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Gender => Some(Self::Age),
            Self::Age => Some(Self::Height),
            Self::Height => Some(Self::Weight),
            Self::Weight => Some(Self::Waist),
            Self::Waist => Some(Self::Hips),
            Self::Hips => Some(Self::Activity),
            Self::Activity => Some(Self::Habits),
            Self::Habits => Some(Self::Goal),
            Self::Goal => Some(Self::Diet),
            Self::Diet => None,
        }
    }
}

/// What the dialogue wants to tell the user
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Ask the question for a step
    Question(OnboardingStep),
    /// The reply was not a whole number; ask the same step again
    InvalidNumber(OnboardingStep),
    /// Current habit selection while the habits step is open
    HabitsNoted(Vec<String>),
    /// Questionnaire finished and targets computed
    ProfileSaved(NutritionTarget),
}

/// Answers collected so far
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub gender: Option<Gender>,
    pub age_years: Option<u32>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<u32>,
    pub waist_cm: Option<String>,
    pub hips_cm: Option<String>,
    pub activity_level: Option<ActivityLevel>,
    /// Habit tags while the habits step is open
    pub pending_habits: Vec<String>,
    pub habits: Option<String>,
    pub goal_label: Option<String>,
}

impl ProfileDraft {
    /// Turn a fully answered draft into a profile
    pub fn into_profile(self, dietary_restriction: String) -> Option<UserProfile> {
        Some(UserProfile {
            gender: self.gender?,
            age_years: self.age_years?,
            height_cm: self.height_cm?,
            weight_kg: self.weight_kg?,
            waist_cm: self.waist_cm?,
            hips_cm: self.hips_cm?,
            activity_level: self.activity_level?,
            habits: self.habits?,
            goal_label: self.goal_label?,
            dietary_restriction,
        })
    }
}

/// An onboarding conversation in progress
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Onboarding {
    step: OnboardingStep,
    draft: ProfileDraft,
}

/// Result of feeding one reply to the dialogue
#[derive(Debug)]
pub enum Transition {
    /// Still collecting answers
    Continue(Onboarding, Vec<Reply>),
    /// Last answer received, profile and targets are ready
    Complete {
        profile: UserProfile,
        target: NutritionTarget,
        replies: Vec<Reply>,
    },
}

impl Onboarding {
    /// Start a fresh questionnaire at the gender question
    pub fn begin() -> (Self, Reply) {
        let onboarding = Self {
            step: OnboardingStep::Gender,
            draft: ProfileDraft::default(),
        };
        (onboarding, Reply::Question(OnboardingStep::Gender))
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    /// Feed one text reply to the current step
    pub fn advance(mut self, text: &str) -> Transition {
        debug!("Onboarding step {:?} received reply", self.step);

        match self.step {
            OnboardingStep::Gender => {
                self.draft.gender = Some(Gender::from_label(text));
                self.forward()
            }
            OnboardingStep::Age => match validate_number(text) {
                Ok(age) => {
                    self.draft.age_years = Some(age);
                    self.forward()
                }
                Err(_) => self.reask(),
            },
            OnboardingStep::Height => match validate_number(text) {
                Ok(height) => {
                    self.draft.height_cm = Some(height);
                    self.forward()
                }
                Err(_) => self.reask(),
            },
            OnboardingStep::Weight => match validate_number(text) {
                Ok(weight) => {
                    self.draft.weight_kg = Some(weight);
                    self.forward()
                }
                Err(_) => self.reask(),
            },
            OnboardingStep::Waist => {
                self.draft.waist_cm = Some(text.to_string());
                self.forward()
            }
            OnboardingStep::Hips => {
                self.draft.hips_cm = Some(text.to_string());
                self.forward()
            }
            OnboardingStep::Activity => {
                self.draft.activity_level = Some(ActivityLevel::from_label(text));
                self.draft.pending_habits.clear();
                self.forward()
            }
            OnboardingStep::Habits => self.habit(text),
            OnboardingStep::Goal => {
                self.draft.goal_label = Some(text.to_string());
                self.forward()
            }
            OnboardingStep::Diet => self.finish(text),
        }
    }

    fn forward(mut self) -> Transition {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Transition::Continue(self, vec![Reply::Question(next)])
            }
            None => Transition::Continue(self, Vec::new()),
        }
    }

    fn reask(self) -> Transition {
        let step = self.step;
        Transition::Continue(self, vec![Reply::InvalidNumber(step)])
    }

    fn habit(mut self, text: &str) -> Transition {
        if is_sentinel(text, CONTINUE_SENTINELS) {
            let habits = std::mem::take(&mut self.draft.pending_habits);
            self.draft.habits = Some(if habits.is_empty() {
                NO_HABITS_MARKER.to_string()
            } else {
                habits.join(", ")
            });
            return self.forward();
        }

        let tag = text.trim().to_string();
        if is_sentinel(text, NO_HABITS_SENTINELS) {
            self.draft.pending_habits = vec![NO_HABITS_MARKER.to_string()];
        } else if !tag.is_empty() && !self.draft.pending_habits.contains(&tag) {
            self.draft.pending_habits.push(tag);
        }

        let noted = self.draft.pending_habits.clone();
        Transition::Continue(self, vec![Reply::HabitsNoted(noted)])
    }

    fn finish(self, text: &str) -> Transition {
        match self.draft.into_profile(text.to_string()) {
            Some(profile) => {
                let target = compute_targets(&profile);
                Transition::Complete {
                    profile,
                    target,
                    replies: vec![Reply::ProfileSaved(target)],
                }
            }
            None => {
                // Unreachable through `advance`, every earlier step fills its field
                let (fresh, question) = Onboarding::begin();
                Transition::Continue(fresh, vec![question])
            }
        }
    }
}

/// Validates a numeric questionnaire answer (age, height, weight)
pub fn validate_number(input: &str) -> Result<u32, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    trimmed.parse::<u32>().map_err(|_| "not_a_number")
}

fn is_sentinel(text: &str, sentinels: &[&str]) -> bool {
    let lowered = text.trim().to_lowercase();
    sentinels.iter().any(|s| *s == lowered)
}
