//! Strict template rendering for paths and glob patterns.
//!
//! Every user-facing string in a run configuration or linkspec may carry
//! `{{parameter}}` placeholders. Rendering is strict: referencing a
//! parameter that is not bound in the [`ParamEnv`] is fatal, never an
//! empty substitution. See [`TemplateError`] for the rationale.

use tera::Tera;

use crate::error::TemplateError;
use crate::params::ParamEnv;

/// Name under which the inline template is registered for rendering.
const INLINE: &str = "inline";

/// Render a template string against a parameter environment.
///
/// Strings without placeholder syntax are returned unchanged without
/// invoking the template engine.
///
/// # Errors
///
/// Returns [`TemplateError::Syntax`] when the template fails to parse and
/// [`TemplateError::UndefinedVariable`] when it references a parameter
/// absent from `params`.
pub fn render(template: &str, params: &ParamEnv) -> Result<String, TemplateError> {
    if !template.contains("{{") && !template.contains("{%") {
        return Ok(template.to_string());
    }

    let mut tera = Tera::default();
    tera.add_raw_template(INLINE, template)
        .map_err(|e| TemplateError::Syntax {
            template: template.to_string(),
            message: flatten(&e),
        })?;

    let mut context = tera::Context::new();
    for (name, value) in params.iter() {
        context.insert(name, value);
    }

    tera.render(INLINE, &context)
        .map_err(|e| classify(template, &e))
}

/// Join an error with its source chain into a single diagnostic line.
fn flatten(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut current: &dyn std::error::Error = err;
    while let Some(source) = current.source() {
        parts.push(source.to_string());
        current = source;
    }
    parts.join(": ")
}

/// Map a render-time failure onto the template error taxonomy.
///
/// Tera reports a missing context value as ``Variable `name` not found in
/// context``; that case becomes [`TemplateError::UndefinedVariable`] with
/// the name extracted, everything else is surfaced as a syntax problem.
fn classify(template: &str, err: &tera::Error) -> TemplateError {
    let detail = flatten(err);
    undefined_variable_name(&detail).map_or_else(
        || TemplateError::Syntax {
            template: template.to_string(),
            message: detail.clone(),
        },
        |name| TemplateError::UndefinedVariable {
            name,
            template: template.to_string(),
        },
    )
}

/// Extract the backtick-quoted variable name from a missing-variable
/// diagnostic, if the diagnostic is one.
fn undefined_variable_name(detail: &str) -> Option<String> {
    let tail = detail.find("not found in context")?;
    let head = detail.get(..tail)?;
    let start = head.find('`')? + 1;
    let len = head.get(start..)?.find('`')?;
    head.get(start..start + len).map(str::to_string)
}
