use liftcore::el;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Parse a `key=value` property file into the parameter map.
///
/// Blank lines and `#` comments are skipped. Values may reference
/// already-known parameters with `${name}`; substitution happens as each
/// line is read, so later assignments see earlier ones. A missing file
/// is not an error; workflows commonly ship only one of the two
/// property files.
pub fn load_property_file(
    path: &Path,
    params: &mut HashMap<String, String>,
) -> liftcore::Result<()> {
    if !path.exists() {
        debug!(path = %path.display(), "no property file, skipping");
        return Ok(());
    }

    let text = std::fs::read_to_string(path)?;
    let mut loaded = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = el::replace_el_with_var(value.trim(), params);
            params.insert(key.trim().to_string(), value);
            loaded += 1;
        }
    }
    info!(path = %path.display(), loaded, "loaded property file");
    Ok(())
}
