//! Template rendering
//!
//! Templates are embedded in the binary and loaded into Tera at startup.
//! Base templates are registered first so inheritance chains resolve.

use anyhow::Result;
use rust_embed::RustEmbed;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

use crate::models::AuthenticatedUser;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),
}

/// Tera engine over the embedded template set.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut templates: Vec<(String, String)> = Vec::new();
        for name in Templates::iter() {
            let file = Templates::get(&name)
                .ok_or_else(|| RenderError::Template(format!("Missing template {}", name)))?;
            let content = String::from_utf8(file.data.into_owned())
                .map_err(|e| RenderError::Template(format!("Template {} is not UTF-8: {}", name, e)))?;
            templates.push((name.to_string(), content));
        }

        // Base templates first so inheritance resolves
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html";
            let b_is_base = b.0 == "base.html";
            b_is_base.cmp(&a_is_base)
        });

        let mut tera = Tera::default();
        for (name, content) in templates {
            tera.add_raw_template(&name, &content)
                .map_err(|e| RenderError::Template(format!("Failed to add template {}: {}", name, e)))?;
        }
        tera.build_inheritance_chains()
            .map_err(|e| RenderError::Template(format!("Failed to build template inheritance: {}", e)))?;

        Ok(Self { tera })
    }

    /// Render a template with the standard page variables plus the caller's
    /// own context entries.
    pub fn render_page(
        &self,
        template: &str,
        user: Option<&AuthenticatedUser>,
        request_path: &str,
        extra: &TeraContext,
    ) -> Result<String, RenderError> {
        let mut context = extra.clone();
        context.insert("request_path", request_path);
        context.insert("year", &chrono::Utc::now().format("%Y").to_string());
        if let Some(user) = user {
            context.insert("current_user", user);
        }
        self.render(template, &context)
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, RenderError> {
        self.tera.render(template, context).map_err(|e| {
            let mut message = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                message.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            RenderError::Template(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_engine_loads_embedded_templates() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.tera.get_template_names().any(|n| n == "base.html"));
    }

    #[test]
    fn test_render_page_injects_user() {
        let engine = TemplateEngine::new().unwrap();
        let user = AuthenticatedUser {
            id: "p_000001".to_string(),
            role: Role::Patient,
            display_name: "John Doe".to_string(),
            email: Some("john@example.com".to_string()),
            avatar: None,
        };
        let html = engine
            .render_page("home.html", Some(&user), "/", &TeraContext::new())
            .unwrap();
        assert!(html.contains("John Doe"));
    }

    #[test]
    fn test_render_unknown_template_fails() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope.html", &TeraContext::new()).is_err());
    }
}
