//! Fill lookup on SVG elements

use std::borrow::Cow;

/// Effective fill paint of an element.
///
/// A `fill` declaration inside the `style` attribute wins over the `fill`
/// presentation attribute, matching how SVG resolves the two.
pub fn fill_of<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute("style")
        .and_then(|style| style_property(style, "fill"))
        .or_else(|| node.attribute("fill").map(str::trim))
}

fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    // Last declaration wins, as in CSS
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .last()
}

/// Compare two color values, ignoring case and `#rgb` shorthand.
pub fn same_color(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(color: &str) -> Cow<'_, str> {
    let color = color.trim();
    let is_short_hex = color.len() == 4
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if is_short_hex {
        let mut expanded = String::with_capacity(7);
        expanded.push('#');
        for c in color[1..].chars() {
            let c = c.to_ascii_lowercase();
            expanded.push(c);
            expanded.push(c);
        }
        Cow::Owned(expanded)
    } else if color.chars().any(|c| c.is_ascii_uppercase()) {
        Cow::Owned(color.to_ascii_lowercase())
    } else {
        Cow::Borrowed(color)
    }
}
