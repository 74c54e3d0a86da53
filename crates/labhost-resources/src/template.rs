//! Placeholder substitution for daemon config templates
//!
//! Templates use `{{name}}` placeholders. Every placeholder must resolve;
//! a leftover one means the caller forgot a parameter, which would write
//! a broken daemon config.

use std::collections::BTreeMap;

use crate::error::ResourceError;

/// Substitute every `{{name}}` placeholder from `params`.
///
/// # Errors
/// `MissingParameter` naming the first placeholder with no value.
pub fn render(template: &str, params: &BTreeMap<String, String>) -> Result<String, ResourceError> {
    let mut out = template.to_string();

    for (name, value) in params {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }

    if let Some(start) = out.find("{{") {
        let rest = &out[start + 2..];
        let name = rest
            .find("}}")
            .map_or_else(|| rest.to_string(), |end| rest[..end].to_string());
        return Err(ResourceError::MissingParameter(name));
    }

    Ok(out)
}
