//! Internationalization support using Fluent

use crate::event::{ConfirmPrompt, Message};
use fluent::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Locales compiled into the binary
const BUILTIN_LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("zh-CN", include_str!("../locales/zh-CN/main.ftl")),
];

fn builtin_source(locale: &str) -> Option<&'static str> {
    BUILTIN_LOCALES
        .iter()
        .find(|(name, _)| *name == locale)
        .map(|(_, source)| *source)
}

/// Arguments that carry a message id and are localized before formatting
const LOCALIZED_ARGS: &[&str] = &["operation", "task"];

/// Localization manager
pub struct I18n {
    bundles: RwLock<HashMap<String, Arc<FluentBundle<FluentResource>>>>,
    current_locale: RwLock<String>,
    fallback_locale: String,
}

impl I18n {
    /// Create a new I18n manager with default locale
    pub fn new(default_locale: &str) -> Self {
        Self {
            bundles: RwLock::new(HashMap::new()),
            current_locale: RwLock::new(default_locale.to_string()),
            fallback_locale: "en".to_string(),
        }
    }

    /// Manager with the bundled locales loaded and `requested` negotiated
    pub fn with_builtin(requested: &str) -> anyhow::Result<Self> {
        let i18n = Self::new("en");
        for (locale, source) in BUILTIN_LOCALES {
            i18n.add_locale(locale, vec![source.to_string()])?;
        }
        i18n.set_locale(requested);
        Ok(i18n)
    }

    /// Load extra translations from `<dir>/<locale>/*.ftl`
    pub fn load_from_dir(&self, dir: &std::path::Path) -> anyhow::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                let Some(locale) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };

                let mut sources: Vec<String> = builtin_source(locale).map(String::from).into_iter().collect();
                for file in std::fs::read_dir(&path)? {
                    let file = file?.path();
                    if file.extension().is_some_and(|ext| ext == "ftl") {
                        sources.push(std::fs::read_to_string(&file)?);
                    }
                }
                self.add_locale(locale, sources)?;
            }
        }

        Ok(())
    }

    /// Build a bundle from FTL sources; later sources override earlier ones
    fn add_locale(&self, locale: &str, sources: Vec<String>) -> anyhow::Result<()> {
        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid locale {}: {}", locale, e))?;

        let mut bundle = FluentBundle::new(vec![lang_id]);
        bundle.set_use_isolating(false);

        for source in sources {
            let resource = FluentResource::try_new(source).map_err(|(_, errors)| {
                anyhow::anyhow!("Fluent parse errors in {}: {:?}", locale, errors)
            })?;
            bundle.add_resource_overriding(resource);
        }

        self.bundles.write().insert(locale.to_string(), Arc::new(bundle));
        tracing::info!("Loaded locale: {}", locale);

        Ok(())
    }

    /// Pick the best available locale for `requested`
    pub fn negotiate(&self, requested: &str) -> Option<String> {
        let requested: LanguageIdentifier = requested.parse().ok()?;
        let available: Vec<LanguageIdentifier> = self
            .bundles
            .read()
            .keys()
            .filter_map(|k| k.parse().ok())
            .collect();

        negotiate_languages(&[requested], &available, None, NegotiationStrategy::Filtering)
            .first()
            .map(|id| id.to_string())
    }

    /// Set the current locale; `false` when nothing close enough is loaded
    pub fn set_locale(&self, locale: &str) -> bool {
        match self.negotiate(locale) {
            Some(found) => {
                *self.current_locale.write() = found;
                true
            }
            None => false,
        }
    }

    /// Get the current locale
    pub fn current_locale(&self) -> String {
        self.current_locale.read().clone()
    }

    /// Get a localized string
    pub fn get(&self, key: &str) -> String {
        self.get_with_args(key, None)
    }

    fn format_in(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundles = self.bundles.read();
        let bundle = bundles.get(locale)?;
        let pattern = bundle.get_message(key)?.value()?;

        let mut errors = Vec::new();
        let result = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            tracing::debug!("Fluent errors formatting {}: {:?}", key, errors);
            return None;
        }
        Some(result.to_string())
    }

    /// Get a localized string with arguments
    pub fn get_with_args(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let current = self.current_locale();

        self.format_in(&current, key, args)
            .or_else(|| {
                (current != self.fallback_locale)
                    .then(|| self.format_in(&self.fallback_locale, key, args))
                    .flatten()
            })
            .unwrap_or_else(|| key.to_string())
    }

    fn localize_args(&self, args: &FluentArgs) -> FluentArgs<'static> {
        let mut out = FluentArgs::new();
        for (name, value) in args.iter() {
            let value: FluentValue<'static> = match value {
                FluentValue::String(id) if LOCALIZED_ARGS.contains(&name) => self.get(id).into(),
                FluentValue::String(s) => s.to_string().into(),
                FluentValue::Number(n) => FluentValue::Number(n.clone()),
                _ => FluentValue::None,
            };
            out.set(name.to_string(), value);
        }
        out
    }

    /// Render a notice message
    pub fn message(&self, message: &Message) -> String {
        let args = self.localize_args(&message.args());
        self.get_with_args(message.key(), Some(&args))
    }

    /// Render a confirmation question
    pub fn prompt(&self, prompt: &ConfirmPrompt) -> String {
        let args = self.localize_args(&prompt.args());
        self.get_with_args(prompt.key(), Some(&args))
    }

    /// Get available locales
    pub fn available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.bundles.read().keys().cloned().collect();
        locales.sort();
        locales
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

/// Convenience macro for getting localized strings
#[macro_export]
macro_rules! t {
    ($i18n:expr, $key:expr) => {
        $i18n.get($key)
    };
    ($i18n:expr, $key:expr, $($arg_name:ident = $arg_value:expr),+ $(,)?) => {{
        let mut args = fluent::FluentArgs::new();
        $(
            args.set(stringify!($arg_name), $arg_value);
        )+
        $i18n.get_with_args($key, Some(&args))
    }};
}
