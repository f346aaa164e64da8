//! Render engine wrapper.
//!
//! Owns the `minijinja` environment of one invocation: templates are compiled
//! once and the helper registry is bound to the invocation's configuration.

use minijinja::{AutoEscape, Environment, Value};
use serde::Serialize;

use crate::codegen::helpers::{Diagnostics, HelperRegistry};
use crate::codegen::templates::{TemplateKind, TemplateSet, INDEX_TEMPLATE};
use crate::config::GenerationConfig;
use crate::error::{GenerateError, Result};

pub struct Renderer {
    env: Environment<'static>,
    diagnostics: Diagnostics,
}

impl Renderer {
    /// Compile `templates` and register helpers for `config`
    pub fn new(config: &GenerationConfig, templates: &TemplateSet) -> Result<Self> {
        let diagnostics = Diagnostics::new();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        for kind in TemplateKind::ALL {
            env.add_template_owned(kind.template_name(), templates.source(kind).to_string())
                .map_err(|e| template_error(kind.template_name(), "*", e))?;
        }
        env.add_template_owned(INDEX_TEMPLATE, templates.index_source().to_string())
            .map_err(|e| template_error(INDEX_TEMPLATE, "*", e))?;

        HelperRegistry::new(config.clone(), diagnostics.clone()).install(&mut env);

        Ok(Self { env, diagnostics })
    }

    /// Render one template kind for `entity_name` with the given context
    pub fn render<S: Serialize>(&self, kind: TemplateKind, entity_name: &str, ctx: S) -> Result<String> {
        self.render_named(kind.template_name(), entity_name, Value::from_serialize(ctx))
    }

    pub fn render_index<S: Serialize>(&self, ctx: S) -> Result<String> {
        self.render_named(INDEX_TEMPLATE, "*", Value::from_serialize(ctx))
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn render_named(&self, name: &str, entity_name: &str, ctx: Value) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| template_error(name, entity_name, e))?;
        template
            .render(ctx)
            .map_err(|e| template_error(name, entity_name, e))
    }
}

fn template_error(template: &str, entity: &str, err: minijinja::Error) -> GenerateError {
    let mut message = err.to_string();
    if let Some(detail) = err.detail() {
        if !message.contains(detail) {
            message = format!("{} ({})", message, detail);
        }
    }
    GenerateError::Template {
        template: template.to_string(),
        entity: entity.to_string(),
        message,
    }
}
