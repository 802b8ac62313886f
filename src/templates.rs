//! Minijinja template engine configuration with templates embedded at build time.
//!
//! Every view is an `.xml` template, so minijinja's extension based
//! auto-escaping applies to all of them.

use minijinja::{AutoEscape, Environment, Error, Output, State, Value, escape_formatter};

const TEMPLATES: &[(&str, &str)] = &[
    ("client.xml", include_str!("../templates/client.xml")),
    ("error.xml", include_str!("../templates/error.xml")),
    ("image.xml", include_str!("../templates/image.xml")),
    ("images.xml", include_str!("../templates/images.xml")),
    ("success.xml", include_str!("../templates/success.xml")),
    ("token.xml", include_str!("../templates/token.xml")),
    ("tokens.xml", include_str!("../templates/tokens.xml")),
    ("user.xml", include_str!("../templates/user.xml")),
    ("users.xml", include_str!("../templates/users.xml")),
];

/// Escape values for XML text and attribute content.
///
/// The default HTML escaping also rewrites `/`, which would mangle every URL
/// in the views.
fn xml_formatter(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
    if value.is_safe()
        || value.is_none()
        || value.is_undefined()
        || matches!(state.auto_escape(), AutoEscape::None)
    {
        return escape_formatter(out, state, value);
    }

    let text = value.to_string();
    let mut last = 0;
    for (index, byte) in text.bytes().enumerate() {
        let entity = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&apos;",
            _ => continue,
        };
        out.write_str(&text[last..index])?;
        out.write_str(entity)?;
        last = index + 1;
    }
    out.write_str(&text[last..])?;
    Ok(())
}

/// Build the template environment with the embedded XML views
pub fn build_env(
    external_base: String,
    version: String,
) -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_formatter(xml_formatter);
    env.add_global("base", external_base);
    env.add_global("version", version);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}
