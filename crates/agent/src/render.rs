//! Report rendering.
//!
//! Renders a [`Report`] into a [`Document`] using `MiniJinja`
//! (Jinja2-compatible) templates: a configurable subject line, an HTML body
//! and a plain-text alternative.

use minijinja::{Environment, context};
use serde::Deserialize;
use vigil_core::{Document, Report};

use crate::error::RenderError;

/// Maximum rendered output size per template (1 MB).
const MAX_RENDERED_BYTES: usize = 1_024 * 1_024;

/// Fuel limit for `MiniJinja` template evaluation.
const FUEL_LIMIT: u64 = 100_000;

const SUBJECT_TEMPLATE: &str = "subject";
const HTML_TEMPLATE: &str = "report.html";
const TEXT_TEMPLATE: &str = "report.txt";

/// Report presentation settings (the `[report]` config section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Fixed prefix available to templates as `subject`.
    pub subject: String,
    /// Template for the subject line.
    pub subject_template: String,
    /// Maximum number of process names included in a snapshot.
    pub process_limit: usize,
    /// Maximum number of connections included in a snapshot.
    pub connection_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            subject: "Vigil report".to_owned(),
            subject_template: "{{ subject }} {{ host.hostname }}".to_owned(),
            process_limit: 15,
            connection_limit: 100,
        }
    }
}

/// Turns a report into a deliverable document.
///
/// Rendering is pure: the same report always yields the same document.
pub trait Renderer: Send + Sync {
    fn render(&self, report: &Report) -> Result<Document, RenderError>;
}

/// The default [`Renderer`]: HTML with a plain-text alternative.
#[derive(Debug)]
pub struct HtmlRenderer {
    subject: String,
    env: Environment<'static>,
}

impl HtmlRenderer {
    /// Build a renderer, compiling the subject template up front.
    pub fn new(
        subject: impl Into<String>,
        subject_template: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_fuel(Some(FUEL_LIMIT));

        env.add_template_owned(SUBJECT_TEMPLATE, subject_template.into())
            .map_err(|e| syntax(SUBJECT_TEMPLATE, &e))?;
        env.add_template(HTML_TEMPLATE, include_str!("../templates/report.html"))
            .map_err(|e| syntax(HTML_TEMPLATE, &e))?;
        env.add_template(TEXT_TEMPLATE, include_str!("../templates/report.txt"))
            .map_err(|e| syntax(TEXT_TEMPLATE, &e))?;

        Ok(Self {
            subject: subject.into(),
            env,
        })
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self, RenderError> {
        Self::new(config.subject.clone(), config.subject_template.clone())
    }

    fn render_template(&self, name: &str, ctx: &minijinja::Value) -> Result<String, RenderError> {
        let rendered = self
            .env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| RenderError::Render {
                name: name.to_owned(),
                message: e.to_string(),
            })?;

        if rendered.len() > MAX_RENDERED_BYTES {
            return Err(RenderError::TooLarge {
                name: name.to_owned(),
                limit: MAX_RENDERED_BYTES,
            });
        }
        Ok(rendered)
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, report: &Report) -> Result<Document, RenderError> {
        let ctx = context! {
            subject => &self.subject,
            id => report.id.as_str(),
            created_at => report.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            host => &report.host,
            location => &report.location,
            location_method => report.location.method(),
            maps_link => report.location.maps_link(),
            snapshot => &report.system_snapshot,
            attachment => &report.attachment,
        };

        // Header values must stay on one line.
        let subject = self
            .render_template(SUBJECT_TEMPLATE, &ctx)?
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Document {
            subject,
            html: self.render_template(HTML_TEMPLATE, &ctx)?,
            text: self.render_template(TEXT_TEMPLATE, &ctx)?,
        })
    }
}

fn syntax(name: &str, error: &minijinja::Error) -> RenderError {
    RenderError::Syntax {
        name: name.to_owned(),
        message: error.to_string(),
    }
}
