//! Artifact template rendering.
//!
//! Templates are plain text with `{name}` placeholders. `{{` and `}}` stand for
//! literal braces. Substituted values are inserted as-is and never rescanned,
//! so generated C++ bodies can contain any number of braces.

use snafu::ensure;

use crate::error::{Result, TemplateSnafu};

/// Values available to an artifact template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateContext<'a> {
    /// Schema path shown in the "generated from" line.
    pub source: &'a str,
    /// Include path of the declaration artifact.
    pub header: &'a str,
    /// Include path of the binding declaration artifact.
    pub binding_header: &'a str,
    /// Include guard macro of the declaration artifact.
    pub guard: &'a str,
    pub body: &'a str,
    pub registrations: &'a str,
}

impl<'a> TemplateContext<'a> {
    pub const PLACEHOLDERS: [&'static str; 6] = ["source", "header", "binding_header", "guard", "body", "registrations"];

    fn lookup(&self, name: &str) -> Option<&'a str> {
        Some(match name {
            "source" => self.source,
            "header" => self.header,
            "binding_header" => self.binding_header,
            "guard" => self.guard,
            "body" => self.body,
            "registrations" => self.registrations,
            _ => return None,
        })
    }
}

/// Render `template` with the values of `ctx`.
pub fn render_template(template: &str, ctx: &TemplateContext<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len() + ctx.body.len() + ctx.registrations.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            offset = at + 2;
            continue;
        }

        ensure!(tail.starts_with('{'), TemplateSnafu { offset: at, reason: "unmatched `}`" });

        let Some(end) = tail.find('}') else {
            return TemplateSnafu { offset: at, reason: "unterminated placeholder" }.fail();
        };
        let name = &tail[1..end];
        let Some(value) = ctx.lookup(name) else {
            return TemplateSnafu {
                offset: at,
                reason: format!(
                    "unknown placeholder `{{{name}}}`, expected one of {}",
                    TemplateContext::PLACEHOLDERS.join(", ")
                ),
            }
            .fail();
        };
        out.push_str(value);
        rest = &tail[end + 1..];
        offset = at + end + 1;
    }

    out.push_str(rest);
    Ok(out)
}

/// Double every brace so `raw` survives [`render_template`] unchanged.
pub fn escape_braces(raw: &str) -> String {
    raw.replace('{', "{{").replace('}', "}}")
}
