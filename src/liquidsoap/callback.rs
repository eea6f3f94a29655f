// Shell commands the engine runs to call back into the internal API

use crate::config::DeploymentContext;

use super::sanitize::quote;

/// A form field on an internal API call.
#[derive(Debug, Clone)]
pub enum FormValue<'a> {
    /// Known at generation time; shell-quoted now.
    Fixed(&'a str),
    /// A script variable only known when the engine runs the command. The engine
    /// shell-quotes it at call time via `string.quote`.
    Runtime(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Runtime(String),
}

/// A shell command, part literal and part filled in by the engine at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCommand {
    segments: Vec<Segment>,
}

impl ApiCommand {
    fn new() -> Self {
        Self { segments: Vec::new() }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    fn push_runtime(&mut self, var: &str) {
        self.segments.push(Segment::Runtime(var.to_string()));
    }

    /// Script expression evaluating to the command: literals joined with
    /// `string.quote(var)` by `^`.
    pub fn to_expression(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => quote(text),
                Segment::Runtime(var) => format!("string.quote({})", var),
            })
            .collect();
        parts.join(" ^ ")
    }

    /// The command as the shell would receive it, with `value` supplying each runtime variable.
    pub fn render_with(&self, value: impl Fn(&str) -> String) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Runtime(var) => value(var),
            })
            .collect()
    }
}

/// `curl` invocation POSTing `fields` plus the station's `api_auth` key to `endpoint`.
/// Fields go through `--form-string` so curl never reads `@file`/`<file` or `;type=` from a value.
pub fn api_url_command(
    context: &DeploymentContext,
    endpoint: &str,
    api_key: &str,
    fields: &[(&str, FormValue<'_>)],
) -> ApiCommand {
    let url = format!("{}{}", context.internal_api_url.trim_end_matches('/'), endpoint);
    let mut command = ApiCommand::new();
    command.push_text(&format!("curl -s --request POST --url {}", shell_quote(&url)));

    for (key, value) in fields {
        command.push_text(&format!(" --form-string {}=", key));
        match value {
            FormValue::Fixed(value) => command.push_text(&shell_quote(value)),
            FormValue::Runtime(var) => command.push_runtime(var),
        }
    }
    command.push_text(&format!(" --form-string api_auth={}", shell_quote(api_key)));

    command
}

/// `/api/internal/{id}/{action}`
pub fn internal_endpoint(station_id: u32, action: &str) -> String {
    format!("/api/internal/{}/{}", station_id, action)
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c)
}

/// Single-quote `raw` unless every character is already safe to pass bare.
pub fn shell_quote(raw: &str) -> String {
    if !raw.is_empty() && raw.chars().all(is_shell_safe) {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', "'\\''"))
    }
}
