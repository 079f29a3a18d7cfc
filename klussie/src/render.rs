//! Server-side HTML rendering.
//!
//! Templates are minijinja sources embedded at compile time and loaded into one
//! [`Environment`] at startup. Every page is rendered with a [`PageContext`]: the active
//! language, its translation tree under `t`, the site details from the config, and the
//! page's own data flattened alongside. Autoescaping is on for all `.html` templates.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::config::SiteConfig;
use crate::errors::Result;
use crate::i18n::{Language, Messages};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("legal.html", include_str!("../templates/legal.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("handyman_signup.html", include_str!("../templates/handyman_signup.html")),
    ("gpt.html", include_str!("../templates/gpt.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| anyhow::anyhow!("Failed to load template {name}: {e}"))?;
        }
        Ok(Self { env })
    }

    #[instrument(skip(self, context), err)]
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(context)?))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").field("templates", &TEMPLATES.len()).finish()
    }
}

/// One entry of the NL/EN switcher.
#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub href: String,
    pub active: bool,
}

/// Everything a template can see.
#[derive(Debug, Serialize)]
pub struct PageContext<'a, T> {
    pub lang: &'static str,
    pub t: &'a Value,
    pub site: &'a SiteConfig,
    /// Request path, used for the language switcher and active nav links
    pub path: &'a str,
    pub languages: Vec<LanguageOption>,
    #[serde(flatten)]
    pub page: T,
}

impl<'a, T: Serialize> PageContext<'a, T> {
    pub fn new(messages: &Messages<'a>, site: &'a SiteConfig, path: &'a str, page: T) -> Self {
        let languages = Language::ALL
            .into_iter()
            .map(|language| LanguageOption {
                code: language.code(),
                href: format!("{path}?lang={}", language.code()),
                active: language == messages.language(),
            })
            .collect();

        Self {
            lang: messages.language().code(),
            t: messages.tree(),
            site,
            path,
            languages,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use serde_json::json;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "Klussie".to_string(),
            contact_email: "info@klussie.nl".to_string(),
            contact_phone: "+31 20 123 4567".to_string(),
        }
    }

    #[test]
    fn test_all_templates_load() {
        Renderer::new().unwrap();
    }

    #[test]
    fn test_language_switcher_marks_active_language() {
        let catalog = Catalog::load().unwrap();
        let messages = catalog.messages(Language::En);
        let site = site();

        let context = PageContext::new(&messages, &site, "/contact", json!({}));

        assert_eq!(context.lang, "en");
        assert_eq!(context.languages.len(), 2);
        assert_eq!(context.languages[0].href, "/contact?lang=nl");
        assert!(!context.languages[0].active);
        assert!(context.languages[1].active);
    }

    #[test]
    fn test_render_translates_and_escapes() {
        let renderer = Renderer::new().unwrap();
        let catalog = Catalog::load().unwrap();
        let messages = catalog.messages(Language::Nl);
        let site = site();

        let context = PageContext::new(&messages, &site, "/", json!({}));
        let Html(html) = renderer.render("home.html", &context).unwrap();

        assert!(html.contains("<html lang=\"nl\">"));
        assert!(html.contains(&messages.get("homepage.hero.title")));

        let context = PageContext::new(
            &messages,
            &site,
            "/contact",
            json!({ "form": { "name": "<script>alert(1)</script>" }, "submitted": false, "error": null, "subjects": [] }),
        );
        let Html(html) = renderer.render("contact.html", &context).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
