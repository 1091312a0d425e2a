//! Shell-style `$NAME` / `${NAME}` substitution.

use std::collections::HashMap;

fn is_special(byte: u8) -> bool {
    matches!(byte, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-' | b'0'..=b'9')
}

fn is_name_byte(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// Name referenced at the start of `s` (the text after a `$`) and the number
/// of bytes it spans. `(None, 0)` means no name follows; `(None, n)` with
/// `n > 0` is malformed syntax that is dropped.
fn reference(s: &str) -> (Option<&str>, usize) {
    let bytes = s.as_bytes();
    let Some(&first) = bytes.first() else {
        return (None, 0);
    };

    if first == b'{' {
        if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
            return (Some(&s[1..2]), 3);
        }
        return match bytes[1..].iter().position(|&b| b == b'}') {
            Some(0) => (None, 2),
            Some(end) => (Some(&s[1..=end]), end + 2),
            None => (None, 1),
        };
    }

    if is_special(first) {
        return (Some(&s[..1]), 1);
    }

    let len = bytes.iter().take_while(|&&b| is_name_byte(b)).count();
    if len == 0 {
        (None, 0)
    } else {
        (Some(&s[..len]), len)
    }
}

/// Replace every variable reference in `text` with `mapping(name)`.
pub(crate) fn expand_with<F>(text: &str, mut mapping: F) -> String
where
    F: FnMut(&str) -> String,
{
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() {
            out.push_str(&text[copied..i]);
            let (name, width) = reference(&text[i + 1..]);
            match name {
                Some(name) => out.push_str(&mapping(name)),
                None if width == 0 => out.push('$'),
                None => {}
            }
            i += width;
            copied = i + 1;
        }
        i += 1;
    }

    out.push_str(&text[copied..]);
    out
}

/// Expands references against the values resolved so far in this walk, then
/// the environment snapshot.
///
/// Substituted values are expanded again. A name that refers back to itself,
/// directly or through other names, expands to the empty string.
pub(crate) struct Expander<'a> {
    raw_values: &'a HashMap<String, String>,
    environment: &'a HashMap<String, String>,
    active: Vec<String>,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(
        raw_values: &'a HashMap<String, String>,
        environment: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            raw_values,
            environment,
            active: Vec::new(),
        }
    }

    pub(crate) fn expand(&mut self, text: &str) -> String {
        expand_with(text, |name| self.value_of(name))
    }

    fn value_of(&mut self, name: &str) -> String {
        if self.active.iter().any(|active| active == name) {
            return String::new();
        }

        let (raw_values, environment) = (self.raw_values, self.environment);
        let raw = raw_values
            .get(name)
            .filter(|value| !value.is_empty())
            .or_else(|| environment.get(name))
            .map(String::as_str)
            .unwrap_or_default();

        self.active.push(name.to_string());
        let expanded = self.expand(raw);
        self.active.pop();
        expanded
    }
}
