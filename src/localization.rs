//! # Localization Module
//!
//! Fluent message catalogues for the bot, one `main.ftl` per language under
//! the locales directory. English is the fallback for missing languages
//! and missing keys.

use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

use crate::config::DEFAULT_LOCALES_DIR;

/// Languages with a message catalogue
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ru"];
/// Language used when the user's language is unknown or unsupported
pub const DEFAULT_LANGUAGE: &str = "en";

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager from the default `./locales` directory
    pub fn new() -> Result<Self> {
        Self::from_dir(DEFAULT_LOCALES_DIR)
    }

    /// Create a manager from `<dir>/<lang>/main.ftl` files
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut bundles = HashMap::new();

        for lang in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = lang.parse()?;
            let bundle = Self::create_bundle(dir, &locale)?;
            bundles.insert(lang.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(dir: &Path, locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Telegram renders the bidi isolation marks as visible garbage
        bundle.set_use_isolating(false);

        let resource_path = dir.join(locale.to_string()).join("main.ftl");
        match fs::read_to_string(&resource_path) {
            Ok(content) => {
                let resource = FluentResource::try_new(content).map_err(|(_, errors)| {
                    anyhow::anyhow!("Invalid Fluent syntax in {}: {:?}", resource_path.display(), errors)
                })?;
                bundle.add_resource(resource).map_err(|errors| {
                    anyhow::anyhow!("Failed to load {}: {:?}", resource_path.display(), errors)
                })?;
            }
            Err(e) => {
                warn!(path = %resource_path.display(), error = %e, "Locale file not found");
            }
        }

        Ok(bundle)
    }

    /// Get a localized message in the given language
    ///
    /// Falls back to English when the language or the key is missing there.
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let lang = detect_language(Some(language));

        let bundle = match self
            .bundles
            .get(lang)
            .filter(|b| b.has_message(key))
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {}", key),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (k, v) in args {
                fluent_args.set(*k, FluentValue::from(*v));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, ?errors, "Errors while formatting message");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}

/// Map a Telegram language code to a supported language
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let primary = language_code
        .and_then(|code| code.split(['-', '_']).next())
        .map(|code| code.to_lowercase());

    match primary {
        Some(code) => SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| **lang == code)
            .copied()
            .unwrap_or(DEFAULT_LANGUAGE),
        None => DEFAULT_LANGUAGE,
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager from `./locales`
pub fn init_localization() -> Result<()> {
    init_localization_from(DEFAULT_LOCALES_DIR)
}

/// Initialize the global localization manager from a directory
///
/// Later calls keep the first manager.
pub fn init_localization_from(dir: impl AsRef<Path>) -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_some() {
        return Ok(());
    }
    let manager = LocalizationManager::from_dir(dir)?;
    let _ = LOCALIZATION_MANAGER.set(manager);
    Ok(())
}

/// Get the global localization manager, if initialized
pub fn get_localization_manager() -> Option<&'static LocalizationManager> {
    LOCALIZATION_MANAGER.get()
}

/// Convenience function to get a localized message
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    match get_localization_manager() {
        Some(manager) => manager.get_message_in_language(key, detect_language(language_code), None),
        None => key.to_string(),
    }
}

/// Convenience function to get a localized message with arguments
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    match get_localization_manager() {
        Some(manager) => manager.get_message_with_args(key, detect_language(language_code), args),
        None => key.to_string(),
    }
}
