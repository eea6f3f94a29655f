// Line buffer for generated scripts
// Blocks append in order; later blocks may only reference names earlier blocks defined

use std::fmt;

use super::sanitize::quote;

/// A literal value in script syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Quoted and escaped on render.
    Str(String),
    /// Emitted exactly as given - identifiers, expressions.
    Raw(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&float_literal(*x)),
            Value::Str(s) => f.write_str(&quote(s)),
            Value::Raw(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Floats always carry a dot, whole numbers as `2.`
pub fn float_literal(x: f64) -> String {
    if x.fract() == 0.0 && x.is_finite() {
        format!("{}.", x as i64)
    } else {
        format!("{}", x)
    }
}

/// A function or operator application, e.g. `input.harbor("/", port=8005)`.
#[derive(Debug, Clone)]
pub struct Call {
    name: String,
    args: Vec<String>,
}

impl Call {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into().to_string());
        self
    }

    /// Positional argument taken verbatim (a variable, a nested call).
    pub fn raw(mut self, expr: impl fmt::Display) -> Self {
        self.args.push(expr.to_string());
        self
    }

    pub fn named(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.args.push(format!("{}={}", key, value.into()));
        self
    }

    pub fn named_raw(mut self, key: &str, expr: impl fmt::Display) -> Self {
        self.args.push(format!("{}={}", key, expr));
        self
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

/// `[a, b, c]`
pub fn list<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    let rendered: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

#[derive(Debug, Default)]
pub struct ScriptBuilder {
    lines: Vec<String>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.line(format!("# {}", text))
    }

    /// `set("key", value)`
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.line(format!("set({}, {})", quote(key), value.into()))
    }

    /// `name = expr`
    pub fn assign(&mut self, name: &str, expr: impl fmt::Display) -> &mut Self {
        self.line(format!("{} = {}", name, expr))
    }

    /// `def name(params) = ... end`, body indented two spaces.
    pub fn function<S: AsRef<str>>(&mut self, name: &str, params: &[&str], body: &[S]) -> &mut Self {
        self.line(format!("def {}({}) =", name, params.join(",")));
        for statement in body {
            self.line(format!("  {}", statement.as_ref()));
        }
        self.line("end")
    }

    /// An output operator: encoder first, named parameters, source last.
    pub fn output(&mut self, operator: &str, encoder: &Call, params: Call, source: &str) -> &mut Self {
        let mut call = Call::new(operator).raw(encoder);
        call.args.extend(params.args);
        let call = call.raw(source);
        self.line(call.to_string())
    }

    /// Operator-supplied text, appended untouched.
    pub fn verbatim(&mut self, text: &str) -> &mut Self {
        self.line(text)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}
