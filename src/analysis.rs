//! # Meal Analysis Module
//!
//! Sends a food photo to a vision-capable chat completions API and turns
//! the model's JSON answer into a [`DetectedMeal`].
//!
//! The model is asked for a JSON object with the keys `dish`, `calories`,
//! `protein`, `fat` and `carbs`, all per 100 g. The answer is validated
//! against that shape; values the model could not estimate become
//! [`Nutrient::Unknown`].

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis_errors::AnalysisError;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::{AnalysisConfig, RecoveryConfig};
use crate::meal_store::{DetectedMeal, UNRECOGNIZED_DISH};
use crate::nutrition::{Nutrient, UNKNOWN_MARKER};

const SYSTEM_PROMPT: &str = "You are a nutritionist. Return a JSON object with the keys: \
dish, calories, protein, fat, carbs. Values are per 100 g. If you are not sure about a value, use \"—\".";
const USER_PROMPT: &str = "Analyze the dish in the photo.";

lazy_static! {
    static ref NUMBER_REGEX: Regex =
        Regex::new(r"-?\d+(?:[.,]\d+)?").expect("Number pattern should be valid");
}

/// Source of meal estimates for a photo
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    /// Estimate the dish and its per-100g nutrition from raw image bytes
    async fn analyze(&self, image: &[u8]) -> Result<DetectedMeal, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// The JSON object the model is asked to return
#[derive(Debug, Deserialize)]
struct MealPayload {
    #[serde(default)]
    dish: Option<Value>,
    #[serde(default)]
    calories: Option<Value>,
    #[serde(default)]
    protein: Option<Value>,
    #[serde(default)]
    fat: Option<Value>,
    #[serde(default, alias = "carbohydrates")]
    carbs: Option<Value>,
}

/// Meal analyzer backed by an OpenAI-compatible vision model
pub struct VisionAnalyzer {
    client: reqwest::Client,
    config: AnalysisConfig,
    circuit_breaker: CircuitBreaker,
}

impl VisionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;
        let circuit_breaker = CircuitBreaker::new(config.recovery.clone());

        Ok(Self {
            client,
            config,
            circuit_breaker,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn build_request(&self, image: &[u8], mime_type: &str) -> ChatRequest<'_> {
        let data_url = format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(image)
        );

        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                        ContentPart::Text {
                            text: USER_PROMPT.to_string(),
                        },
                    ]),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }

    async fn request_once(&self, request: &ChatRequest<'_>) -> Result<DetectedMeal, AnalysisError> {
        let url = format!("{}/chat/completions", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("vision API returned {status}: {body}");
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                AnalysisError::Request(message)
            } else {
                AnalysisError::MalformedResponse(message)
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::MalformedResponse("response has no message content".to_string()))?;

        debug!(content_length = content.len(), "Vision API answered");
        parse_meal_content(&content)
    }
}

#[async_trait]
impl MealAnalyzer for VisionAnalyzer {
    async fn analyze(&self, image: &[u8]) -> Result<DetectedMeal, AnalysisError> {
        let mime_type = validate_image(image, self.config.max_file_size)?;

        if self.circuit_breaker.is_open() {
            warn!("Circuit breaker open, skipping meal analysis");
            return Err(AnalysisError::CircuitOpen);
        }

        let request = self.build_request(image, mime_type);
        let recovery = &self.config.recovery;
        let timeout = Duration::from_secs(recovery.operation_timeout_secs);
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(timeout, self.request_once(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AnalysisError::Timeout(format!(
                    "no answer within {}s",
                    recovery.operation_timeout_secs
                ))),
            };

            match outcome {
                Ok(meal) => {
                    self.circuit_breaker.record_success();
                    info!(dish = %meal.dish_name, attempts = attempt + 1, "Meal analysis completed");
                    return Ok(meal);
                }
                Err(e) if e.is_transient() && attempt < recovery.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(recovery, attempt);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Meal analysis failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    return Err(e);
                }
            }
        }
    }
}

/// Check size and format before upload, returning the MIME type
pub fn validate_image(image: &[u8], max_file_size: u64) -> Result<&'static str, AnalysisError> {
    if image.is_empty() {
        return Err(AnalysisError::Validation("image is empty".to_string()));
    }
    if image.len() as u64 > max_file_size {
        return Err(AnalysisError::Validation(format!(
            "image is {} bytes, limit is {} bytes",
            image.len(),
            max_file_size
        )));
    }

    match image::guess_format(image) {
        Ok(image::ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(image::ImageFormat::Png) => Ok("image/png"),
        Ok(image::ImageFormat::WebP) => Ok("image/webp"),
        Ok(image::ImageFormat::Gif) => Ok("image/gif"),
        Ok(other) => Err(AnalysisError::Validation(format!("unsupported image format {other:?}"))),
        Err(e) => Err(AnalysisError::Validation(format!("unrecognized image data: {e}"))),
    }
}

/// Exponential backoff without jitter for the given retry number (1-based)
pub fn backoff_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let delay = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_retry_delay_ms);
    Duration::from_millis(delay)
}

fn retry_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..=config.base_retry_delay_ms / 2);
    backoff_delay(config, attempt) + Duration::from_millis(jitter_ms)
}

/// Validate the model's message content and build a meal from it
pub fn parse_meal_content(content: &str) -> Result<DetectedMeal, AnalysisError> {
    let value: Value = serde_json::from_str(content.trim())?;
    if !value.is_object() {
        return Err(AnalysisError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }
    let payload: MealPayload = serde_json::from_value(value)?;

    let dish_name = payload
        .dish
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != UNKNOWN_MARKER && *d != "-")
        .unwrap_or(UNRECOGNIZED_DISH)
        .to_string();

    Ok(DetectedMeal::new(
        dish_name,
        nutrient_from_json(payload.calories.as_ref()),
        nutrient_from_json(payload.protein.as_ref()),
        nutrient_from_json(payload.fat.as_ref()),
        nutrient_from_json(payload.carbs.as_ref()),
    ))
}

/// Read one nutrient value from the model's answer
///
/// Numbers are taken as is, strings like `"12,5 g"` yield their first
/// number, anything else (including `"—"`) is unknown.
pub fn nutrient_from_json(value: Option<&Value>) -> Nutrient {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => NUMBER_REGEX
            .find(s)
            .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok()),
        _ => None,
    };

    match number {
        Some(v) if v.is_finite() && v >= 0.0 => Nutrient::Known(v),
        _ => Nutrient::Unknown,
    }
}
