//! YAML text primitives.
//!
//! Every user-supplied scalar in the rendered document passes through
//! [`wrap`]; bypassing it is a quoting/injection bug.

/// Characters that force quoting when they appear at the start of a scalar.
const UNSAFE_LEADING: &[char] = &[
    '!', '*', '-', '?', '{', '}', '[', ']', ',', '|', '>', '@', '`', '\'', '"', '&',
];

/// Prefixes every line of `text` with `level * 2` spaces.
///
/// Lines that would become whitespace-only are collapsed back to empty, so
/// blank separators never carry trailing indentation. Idempotent on lines
/// that are already empty.
#[must_use]
pub fn indent(text: &str, level: usize) -> String {
    let prefix = " ".repeat(level * 2);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Conservative test for scalars that can be emitted without quoting.
///
/// A colon or `#` anywhere forces quoting, as does a leading YAML indicator
/// character. Deliberately overbroad (a mid-string colon not followed by
/// whitespace would actually be fine); callers rely on the exact rule, so
/// do not tighten it.
#[must_use]
pub fn is_safe_string(s: &str) -> bool {
    !(s.contains(':') || s.contains('#') || s.starts_with(UNSAFE_LEADING))
}

/// Renders a scalar for embedding in the document.
///
/// Multi-line values become a literal block scalar (`|` plus the value
/// indented one level, no further escaping). Safe single-line values are
/// emitted verbatim; everything else is single-quoted with embedded quotes
/// doubled.
#[must_use]
pub fn wrap(s: &str) -> String {
    if s.contains('\n') {
        format!("|\n{}", indent(s, 1))
    } else if is_safe_string(s) {
        s.to_owned()
    } else {
        format!("'{}'", s.replace('\'', "''"))
    }
}

/// Renders items as a block sequence, one `- item` per line at `level`.
#[must_use]
pub fn compile_list(items: &[String], level: usize) -> String {
    items
        .iter()
        .map(|item| indent(&format!("- {}", wrap(item)), level))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders items as a flow sequence: `[a, b]`.
#[must_use]
pub fn compile_flow_list(items: &[String]) -> String {
    let rendered: Vec<String> = items.iter().map(|item| wrap(item)).collect();
    format!("[{}]", rendered.join(", "))
}
