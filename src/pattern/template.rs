use std::path::PathBuf;

use crate::foundation::error::{FrameIoError, FrameIoResult};

/// A path template with exactly one integer placeholder.
///
/// Placeholder forms: `{}`, `{0}`, `{i}`, each optionally followed by a format spec
/// `:[[fill]align][0][width][d]` (for example `frame{:06d}.webp` or `shot_{i:>4}.png`).
/// `{{` and `}}` are literal braces.
///
/// Patterns are validated once at construction, so [`FramePattern::format`] cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePattern {
    source: String,
    prefix: String,
    spec: IndexSpec,
    suffix: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct IndexSpec {
    fill: char,
    align: Align,
    width: usize,
}

impl Default for IndexSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: Align::Right,
            width: 0,
        }
    }
}

impl FramePattern {
    /// Parse and validate a template.
    pub fn parse(source: &str) -> FrameIoResult<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut spec = None;

        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            let out = if spec.is_none() {
                &mut prefix
            } else {
                &mut suffix
            };
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => {
                    return Err(pattern_error(source, "unmatched '}'"));
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        field.push(c);
                    }
                    if !closed {
                        return Err(pattern_error(source, "unterminated placeholder"));
                    }
                    if spec.is_some() {
                        return Err(pattern_error(
                            source,
                            "expected exactly one placeholder, found more",
                        ));
                    }
                    spec = Some(parse_field(source, &field)?);
                }
                c => out.push(c),
            }
        }

        let spec = spec.ok_or_else(|| pattern_error(source, "no index placeholder"))?;
        Ok(Self {
            source: source.to_owned(),
            prefix,
            spec,
            suffix,
        })
    }

    /// Render the path for frame `index`.
    pub fn format(&self, index: u64) -> PathBuf {
        let digits = index.to_string();
        let pad = self.spec.width.saturating_sub(digits.len());
        let mut s = String::with_capacity(self.prefix.len() + digits.len() + pad + self.suffix.len());
        s.push_str(&self.prefix);
        let (left, right) = match self.spec.align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };
        s.extend(std::iter::repeat_n(self.spec.fill, left));
        s.push_str(&digits);
        s.extend(std::iter::repeat_n(self.spec.fill, right));
        s.push_str(&self.suffix);
        PathBuf::from(s)
    }

    /// The template as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::str::FromStr for FramePattern {
    type Err = FrameIoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for FramePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_field(source: &str, field: &str) -> FrameIoResult<IndexSpec> {
    let (name, fmt) = match field.split_once(':') {
        Some((name, fmt)) => (name, Some(fmt)),
        None => (field, None),
    };
    match name {
        "" | "0" | "i" => {}
        other => {
            return Err(pattern_error(
                source,
                &format!("placeholder '{{{other}}}' must be '{{}}', '{{0}}' or '{{i}}'"),
            ));
        }
    }
    match fmt {
        None => Ok(IndexSpec::default()),
        Some(fmt) => parse_spec(source, fmt),
    }
}

fn parse_spec(source: &str, fmt: &str) -> FrameIoResult<IndexSpec> {
    let mut spec = IndexSpec::default();
    let chars: Vec<char> = fmt.chars().collect();
    let mut pos = 0;

    let align_of = |c: char| match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    };

    // [[fill]align]
    if chars.len() >= 2
        && let Some(a) = align_of(chars[1])
    {
        spec.fill = chars[0];
        spec.align = a;
        pos = 2;
    } else if let Some(a) = chars.first().copied().and_then(align_of) {
        spec.align = a;
        pos = 1;
    }

    // [0]
    if pos == 0 && chars.get(pos) == Some(&'0') {
        spec.fill = '0';
        spec.align = Align::Right;
        pos += 1;
    }

    // [width]
    let width_start = pos;
    while chars.get(pos).is_some_and(|c| c.is_ascii_digit()) {
        pos += 1;
    }
    if pos > width_start {
        let digits: String = chars[width_start..pos].iter().collect();
        spec.width = digits
            .parse()
            .map_err(|_| pattern_error(source, "placeholder width is too large"))?;
    }

    // [d]
    if chars.get(pos) == Some(&'d') {
        pos += 1;
    }

    if pos != chars.len() {
        return Err(pattern_error(
            source,
            &format!("unsupported integer format spec ':{fmt}'"),
        ));
    }
    Ok(spec)
}

fn pattern_error(source: &str, msg: &str) -> FrameIoError {
    FrameIoError::configuration(format!("invalid frame pattern '{source}': {msg}"))
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/template.rs"]
mod tests;
