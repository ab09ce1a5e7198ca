//! Expression-language substitution.
//!
//! Source workflows embed `${name}` references that must be resolved
//! against the job parameter map before fragments are rendered.

use std::collections::HashMap;
use tracing::warn;

/// Replace every `${name}` reference with its value from the parameter map.
///
/// Unknown references are left verbatim (with a diagnostic) so the
/// generated program still shows where a value was expected. Callers must
/// not feed already-substituted text back in; substitution is not
/// idempotent for values that themselves look like references.
pub fn replace_el_with_var(text: &str, params: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match params.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        warn!(reference = key, "no parameter value for EL reference");
                        out.push_str(&rest[start..start + end + 3]);
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference; keep the tail as-is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
