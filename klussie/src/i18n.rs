//! Translated UI copy.
//!
//! All page and form text lives in `locales/{nl,en}.json`, embedded at compile time. The catalog
//! is loaded once at startup and handed to renderers and the request wizard as an explicit
//! [`Messages`] value, so nothing reads a global language setting.
//!
//! The active language is picked per request by the [`Locale`] extractor: `?lang=` first, then the
//! `lang` cookie, then `default_language` from the config.

use std::{fmt, str::FromStr};

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;

const NL: &str = include_str!("../locales/nl.json");
const EN: &str = include_str!("../locales/en.json");

/// Name of the cookie remembering the visitor's language choice.
pub const LANGUAGE_COOKIE: &str = "lang";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Nl,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Nl, Language::En];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Nl => "nl",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nl" => Ok(Language::Nl),
            "en" => Ok(Language::En),
            other => Err(format!("Unsupported language '{other}'")),
        }
    }
}

/// Both language trees, parsed once.
#[derive(Debug, Clone)]
pub struct Catalog {
    nl: Value,
    en: Value,
}

impl Catalog {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            nl: serde_json::from_str(NL).map_err(|e| anyhow::anyhow!("Failed to parse locales/nl.json: {e}"))?,
            en: serde_json::from_str(EN).map_err(|e| anyhow::anyhow!("Failed to parse locales/en.json: {e}"))?,
        })
    }

    pub fn messages(&self, language: Language) -> Messages<'_> {
        Messages { catalog: self, language }
    }

    fn tree(&self, language: Language) -> &Value {
        match language {
            Language::Nl => &self.nl,
            Language::En => &self.en,
        }
    }
}

/// The catalog viewed in one language.
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    catalog: &'a Catalog,
    language: Language,
}

impl<'a> Messages<'a> {
    pub fn language(&self) -> Language {
        self.language
    }

    /// The whole tree for this language, as exposed to templates under `t`.
    pub fn tree(&self) -> &'a Value {
        self.catalog.tree(self.language)
    }

    /// Look up a dotted key such as `form.questions.jobType`.
    ///
    /// Missing English entries fall back to Dutch; a key missing from both is returned as-is so
    /// the gap is visible on the page instead of rendering nothing.
    pub fn get(&self, key: &str) -> String {
        lookup(self.tree(), key)
            .or_else(|| lookup(self.catalog.tree(Language::Nl), key))
            .map(str::to_string)
            .unwrap_or_else(|| {
                tracing::warn!(key, language = %self.language, "Missing translation");
                key.to_string()
            })
    }

    /// Look up a list of strings, e.g. `handymanSignup.form.serviceOptions`.
    pub fn list(&self, key: &str) -> Vec<String> {
        lookup_value(self.tree(), key)
            .or_else(|| lookup_value(self.catalog.tree(Language::Nl), key))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn lookup_value<'v>(tree: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(tree, |node, segment| node.get(segment))
}

fn lookup<'v>(tree: &'v Value, key: &str) -> Option<&'v str> {
    lookup_value(tree, key).and_then(Value::as_str)
}

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    lang: Option<String>,
}

/// The language for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale(pub Language);

impl Locale {
    fn from_parts(parts: &Parts, default: Language) -> Self {
        let from_query: Option<Language> = Query::<LanguageQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.lang)
            .and_then(|lang| lang.parse().ok());

        let from_cookie = || -> Option<Language> {
            parts
                .headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(|value| value.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(name, _)| *name == LANGUAGE_COOKIE)
                .and_then(|(_, value)| value.parse().ok())
        };

        Locale(from_query.or_else(from_cookie).unwrap_or(default))
    }

    /// `Set-Cookie` value persisting this choice for a year.
    pub fn cookie(&self) -> String {
        format!("{LANGUAGE_COOKIE}={}; Path=/; Max-Age=31536000; SameSite=Lax", self.0.code())
    }
}

impl FromRequestParts<AppState> for Locale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_parts(parts, state.config.default_language))
    }
}
