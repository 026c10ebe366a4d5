//! Tags injected into the page and their HTML rendering.

use std::fmt;

use url::Url;

use crate::config::schema::DEFAULT_LAYER_NAME;
use crate::layer::DataLayer;

/// Marker attribute value of the container script.
pub const SCRIPT_HID: &str = "gtm-script";

/// Marker attribute value of the iframe fallback.
pub const NOSCRIPT_HID: &str = "gtm-noscript";

/// How the browser should fetch and run the container script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLoading {
    /// Run as soon as fetched.
    Async,
    /// Run after the document is parsed.
    Defer,
}

impl ScriptLoading {
    pub fn from_defer(defer: bool) -> Self {
        if defer {
            Self::Defer
        } else {
            Self::Async
        }
    }

    pub fn attribute(self) -> &'static str {
        match self {
            Self::Async => "async",
            Self::Defer => "defer",
        }
    }
}

fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Value of the `id` query parameter, i.e. the container a tag loads.
fn container_of(url: &Url) -> Option<String> {
    query_value(url, "id")
}

/// `<script src=... async|defer>` loading a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: Url,
    pub loading: ScriptLoading,
    pub crossorigin: Option<String>,
}

impl ScriptTag {
    /// Container id the tag loads, read back from its `src`.
    pub fn container_id(&self) -> Option<String> {
        container_of(&self.src)
    }

    /// Layer the container reads: the `l` query parameter, or the default.
    pub fn layer_name(&self) -> String {
        query_value(&self.src, "l").unwrap_or_else(|| DEFAULT_LAYER_NAME.to_string())
    }

    pub fn is_deferred(&self) -> bool {
        self.loading == ScriptLoading::Defer
    }
}

impl fmt::Display for ScriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<script data-hid="{}" src="{}" {}"#,
            SCRIPT_HID,
            escape_attr(self.src.as_str()),
            self.loading.attribute()
        )?;
        if let Some(origin) = &self.crossorigin {
            write!(f, r#" crossorigin="{}""#, escape_attr(origin))?;
        }
        f.write_str("></script>")
    }
}

/// `<noscript><iframe src=...></noscript>` fallback for clients without JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoscriptTag {
    pub src: Url,
}

impl NoscriptTag {
    pub fn container_id(&self) -> Option<String> {
        container_of(&self.src)
    }
}

impl fmt::Display for NoscriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<noscript data-hid="{}"><iframe src="{}" height="0" width="0" style="display:none;visibility:hidden"></iframe></noscript>"#,
            NOSCRIPT_HID,
            escape_attr(self.src.as_str())
        )
    }
}

/// Inline script declaring the page-global layer and replaying its queue.
pub fn render_layer_bootstrap(layer: &DataLayer) -> serde_json::Result<String> {
    let name = layer.name();
    let mut out = format!("<script>window['{name}']=window['{name}']||[];");
    if !layer.is_empty() {
        let events = escape_script_json(&layer.to_json()?);
        out.push_str(&format!(
            "window['{name}'].push.apply(window['{name}'],{events});"
        ));
    }
    out.push_str("</script>");
    Ok(out)
}

pub(crate) fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON is valid JavaScript, but `</script>` inside a string would end the tag.
pub(crate) fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
