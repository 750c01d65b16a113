//! # Session Module
//!
//! Process-wide coaching context. [`Coach`] owns every user's onboarding
//! state, completed profile, and latest meal. It is created once at startup
//! and shared by the bot handlers; nothing here performs I/O, so every call
//! returns immediately with the messages to send.

use log::{debug, info, warn};
use std::collections::HashMap;

use crate::advisor::{advise, parse_portion, PortionReport};
use crate::analysis_errors::AnalysisError;
use crate::dialogue::{Onboarding, Reply, Transition};
use crate::meal_store::{DetectedMeal, MealStore};
use crate::profile::{NutritionTarget, UserProfile};

/// Stable user identifier (the Telegram chat id)
pub type UserId = i64;

/// Text that (re)starts onboarding
pub const START_COMMAND: &str = "/start";

/// Per-user conversation state
///
/// A user without an entry in the registry has no session.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Onboarding(Onboarding),
    Complete {
        profile: UserProfile,
        target: NutritionTarget,
    },
}

/// Message produced by the core for the messaging channel
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Onboarding(Reply),
    Portion(PortionReport),
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<UserId, Session>,
}

impl SessionRegistry {
    pub fn get(&self, user_id: UserId) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    pub fn insert(&mut self, user_id: UserId, session: Session) {
        self.sessions.insert(user_id, session);
    }

    pub fn remove(&mut self, user_id: UserId) -> Option<Session> {
        self.sessions.remove(&user_id)
    }

    /// Profile and targets of a user who finished onboarding
    pub fn completed(&self, user_id: UserId) -> Option<(&UserProfile, &NutritionTarget)> {
        match self.sessions.get(&user_id) {
            Some(Session::Complete { profile, target }) => Some((profile, target)),
            _ => None,
        }
    }
}

/// The coaching engine shared by all chats
#[derive(Debug, Default)]
pub struct Coach {
    sessions: SessionRegistry,
    meals: MealStore,
}

impl Coach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, user_id: UserId) -> Option<&Session> {
        self.sessions.get(user_id)
    }

    pub fn target(&self, user_id: UserId) -> Option<&NutritionTarget> {
        self.sessions.completed(user_id).map(|(_, target)| target)
    }

    pub fn meal(&self, user_id: UserId) -> Option<&DetectedMeal> {
        self.meals.get_meal(user_id)
    }

    /// Begin onboarding from the first question, discarding any earlier draft
    pub fn start(&mut self, user_id: UserId) -> Vec<Outgoing> {
        if let Some(previous) = self.sessions.remove(user_id) {
            debug!("Discarding previous session for user {user_id}: {previous:?}");
        }

        let (onboarding, question) = Onboarding::begin();
        self.sessions.insert(user_id, Session::Onboarding(onboarding));
        info!("User {user_id} started onboarding");

        vec![Outgoing::Onboarding(question)]
    }

    /// Route one text message from a user
    ///
    /// The start command always restarts onboarding. While onboarding is in
    /// progress the text answers the current question; otherwise it is read
    /// as a portion weight and silently ignored if it is not one.
    pub fn handle_text(&mut self, user_id: UserId, text: &str) -> Vec<Outgoing> {
        if text.trim() == START_COMMAND {
            return self.start(user_id);
        }

        match self.sessions.remove(user_id) {
            Some(Session::Onboarding(onboarding)) => self.continue_onboarding(user_id, onboarding, text),
            other => {
                if let Some(session) = other {
                    self.sessions.insert(user_id, session);
                }
                parse_portion(text)
                    .and_then(|grams| self.advise(user_id, grams))
                    .map(|report| vec![Outgoing::Portion(report)])
                    .unwrap_or_default()
            }
        }
    }

    fn continue_onboarding(&mut self, user_id: UserId, onboarding: Onboarding, text: &str) -> Vec<Outgoing> {
        match onboarding.advance(text) {
            Transition::Continue(next, replies) => {
                self.sessions.insert(user_id, Session::Onboarding(next));
                replies.into_iter().map(Outgoing::Onboarding).collect()
            }
            Transition::Complete {
                profile,
                target,
                replies,
            } => {
                info!(
                    "User {user_id} completed onboarding: {} kcal/day",
                    target.daily_calories
                );
                self.sessions.insert(user_id, Session::Complete { profile, target });
                replies.into_iter().map(Outgoing::Onboarding).collect()
            }
        }
    }

    /// Portion report for the user's latest meal
    ///
    /// `None` when no meal is on file or the weight is not positive.
    pub fn advise(&self, user_id: UserId, portion_grams: u32) -> Option<PortionReport> {
        let meal = self.meals.get_meal(user_id)?;
        match advise(meal, portion_grams, self.sessions.completed(user_id)) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!("Ignoring portion for user {user_id}: {e}");
                None
            }
        }
    }

    /// Store a successfully analyzed meal
    pub fn record_meal(&mut self, user_id: UserId, meal: DetectedMeal) {
        self.meals.put_meal(user_id, meal);
    }

    /// Apply an analyzer outcome; failures leave the previous meal in place
    pub fn record_analysis(&mut self, user_id: UserId, result: Result<DetectedMeal, AnalysisError>) {
        match result {
            Ok(meal) => self.record_meal(user_id, meal),
            Err(e) => warn!("Meal analysis failed for user {user_id}, keeping previous meal: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::OnboardingStep;
    use crate::nutrition::Nutrient;

    #[test]
    fn test_start_creates_onboarding_session() {
        let mut coach = Coach::new();
        let out = coach.start(7);

        assert_eq!(out, vec![Outgoing::Onboarding(Reply::Question(OnboardingStep::Gender))]);
        assert!(matches!(coach.session(7), Some(Session::Onboarding(_))));
        assert!(coach.session(8).is_none());
    }

    #[test]
    fn test_failed_analysis_keeps_previous_meal() {
        let mut coach = Coach::new();
        let meal = DetectedMeal::new(
            "Soup",
            Nutrient::Known(50.0),
            Nutrient::Known(3.0),
            Nutrient::Known(2.0),
            Nutrient::Known(6.0),
        );
        coach.record_analysis(1, Ok(meal.clone()));
        coach.record_analysis(1, Err(AnalysisError::Timeout("30s".to_string())));

        assert_eq!(coach.meal(1), Some(&meal));
    }

    #[test]
    fn test_text_without_session_or_meal_is_ignored() {
        let mut coach = Coach::new();
        assert!(coach.handle_text(3, "250").is_empty());
        assert!(coach.handle_text(3, "hello").is_empty());
        assert!(coach.session(3).is_none());
    }
}
