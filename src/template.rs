//! Template expansion for files copied out of the store.
//!
//! Files are rendered with [`tera`] against the run's template variables
//! (`--var KEY=VALUE`, the `[vars]` config table and the built-in `user`,
//! `home` and `store`) plus the boolean run options `yes`, `no`, `force` and
//! `no_remove`.
use std::path::Path;

use crate::flags::Flags;

// No extension, so tera never autoescapes the output.
const TEMPLATE_NAME: &str = "entry";

/// Returns `true` if `path` should be treated as a text template.
///
/// Any `text/*` type qualifies, as do files whose type cannot be guessed
/// from the name (dotfiles rarely carry an extension).
#[must_use]
pub fn is_text_file(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_none_or(|mime| mime.type_() == mime_guess::mime::TEXT)
}

/// Returns `true` if `content` contains any template delimiter.
#[must_use]
pub fn has_markup(content: &str) -> bool {
    ["{{", "{%", "{#"].iter().any(|open| content.contains(open))
}

/// Expand `content` against the variables carried by `flags`.
///
/// Content without template delimiters is returned unchanged without being
/// parsed. Content that has delimiters but does not parse (shell code such
/// as `${#PATH}` opens a comment) is not a template: `Ok(None)` is returned
/// and the caller keeps the file as it is.
///
/// # Errors
///
/// Returns an error if a parsed template references an undefined variable
/// or otherwise fails to render.
pub fn expand(content: &str, flags: &Flags) -> Result<Option<String>, tera::Error> {
    if !has_markup(content) {
        return Ok(Some(content.to_string()));
    }
    let mut tera = tera::Tera::default();
    if tera.add_raw_template(TEMPLATE_NAME, content).is_err() {
        return Ok(None);
    }
    let mut context = tera::Context::new();
    for (key, value) in &flags.vars {
        context.insert(key.as_str(), value);
    }
    for (key, value) in flags.switches() {
        context.insert(key, &value);
    }
    tera.render(TEMPLATE_NAME, &context).map(Some)
}
