//! Master drawing model and loading

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{LookupError, SvgError};

/// Namespace of Inkscape's `label` and `groupmode` attributes
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// One extractable icon: a direct group child of a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconGroup {
    /// Element id, used to select the group in the editor
    pub id: String,
    /// Human readable name from `inkscape:label`
    pub label: Option<String>,
}

impl IconGroup {
    /// Hidden icons are skipped when rendering everything.
    ///
    /// A group is hidden when it has no label or its label starts with `#`
    /// (the drafting convention of the master drawing). Hidden icons can still
    /// be rendered by naming them explicitly.
    pub fn is_hidden(&self) -> bool {
        match &self.label {
            Some(label) => label.starts_with('#'),
            None => true,
        }
    }
}

/// A labeled top-level group, one icon category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub label: String,
    pub icons: Vec<IconGroup>,
}

/// Where a labeled group sits in the drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLocation {
    pub id: Option<String>,
    /// Label of the parent group, if the parent is a labeled group
    pub layer: Option<String>,
}

/// A parsed master drawing
///
/// Built in one pass over the document. Layers and their icons keep document
/// order; the label index keeps the first group for each label.
#[derive(Debug, Clone)]
pub struct MasterDrawing {
    layers: Vec<Layer>,
    by_label: FxHashMap<String, GroupLocation>,
}

impl MasterDrawing {
    /// Load a master drawing from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SvgError> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Parse a master drawing from SVG text
    pub fn from_str(text: &str) -> Result<Self, SvgError> {
        let doc = parse_xml(text)?;

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(SvgError::NotSvg(root.tag_name().name().to_string()));
        }

        let mut layers = Vec::new();
        for node in root.children().filter(is_group) {
            let Some(layer_label) = label_of(node) else {
                debug!("ignoring unlabeled top-level group {:?}", node.attribute("id"));
                continue;
            };

            let mut icons = Vec::new();
            for child in node.children().filter(is_group) {
                let label = label_of(child).map(str::to_string);
                match child.attribute("id") {
                    Some(id) => icons.push(IconGroup {
                        id: id.to_string(),
                        label,
                    }),
                    None => warn!(
                        "group {:?} in layer '{}' has no id and cannot be selected",
                        label, layer_label
                    ),
                }
            }

            layers.push(Layer {
                label: layer_label.to_string(),
                icons,
            });
        }

        let mut by_label = FxHashMap::default();
        for node in doc.descendants().filter(is_group) {
            let Some(label) = label_of(node) else {
                continue;
            };

            let location = GroupLocation {
                id: node.attribute("id").map(str::to_string),
                layer: node
                    .parent_element()
                    .filter(is_group)
                    .and_then(label_of)
                    .map(str::to_string),
            };

            if by_label.contains_key(label) {
                debug!("duplicate icon label '{}', keeping the first", label);
            } else {
                by_label.insert(label.to_string(), location);
            }
        }

        Ok(Self { layers, by_label })
    }

    /// Layers in document order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Every non-hidden icon, layer by layer in document order
    pub fn renderable(&self) -> impl Iterator<Item = (&Layer, &IconGroup)> + '_ {
        self.layers.iter().flat_map(|layer| {
            layer
                .icons
                .iter()
                .filter(|icon| !icon.is_hidden())
                .map(move |icon| (layer, icon))
        })
    }

    /// Find the first group anywhere in the drawing with exactly this label
    pub fn find(&self, label: &str) -> Option<&GroupLocation> {
        self.by_label.get(label)
    }

    /// Resolve an explicitly requested label to `(layer label, group id)`
    pub fn resolve(&self, label: &str) -> Result<(&str, &str), LookupError> {
        let location = self
            .find(label)
            .ok_or_else(|| LookupError::UnknownIcon(label.to_string()))?;
        let layer = location
            .layer
            .as_deref()
            .ok_or_else(|| LookupError::NoLayer(label.to_string()))?;
        let id = location
            .id
            .as_deref()
            .ok_or_else(|| LookupError::MissingId(label.to_string()))?;
        Ok((layer, id))
    }
}

/// Parse SVG text, accepting the DOCTYPE declaration Inkscape and older
/// editors emit.
pub(crate) fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>, SvgError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    roxmltree::Document::parse_with_options(text, options).map_err(|e| SvgError::Parse(e.to_string()))
}

fn is_group(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_element() && node.tag_name().name() == "g"
}

fn label_of<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute((INKSCAPE_NS, "label"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWING: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     width="64" height="64">
  <defs id="defs1"/>
  <g id="layer1" inkscape:groupmode="layer" inkscape:label="status">
    <g id="g42" inkscape:label="battery-full">
      <rect id="r1" x="0" y="0" width="16" height="16" style="fill:#ffffff"/>
      <path id="p1" d="M2 2h12v12H2z" style="fill:#000000"/>
    </g>
    <g id="g43" inkscape:label="#draft-icon">
      <path id="p2" d="M0 0h4v4H0z"/>
    </g>
    <g id="g44">
      <path id="p3" d="M0 0h4v4H0z"/>
    </g>
  </g>
  <g id="layer2" inkscape:groupmode="layer" inkscape:label="actions">
    <g id="g50" inkscape:label="undo"/>
    <g inkscape:label="no-id"/>
    <g id="g51" inkscape:label="redo">
      <g id="g52" inkscape:label="redo-arrow"/>
    </g>
  </g>
  <g id="loose">
    <g id="g60" inkscape:label="orphan"/>
  </g>
</svg>"##;

    #[test]
    fn test_layers_in_document_order() {
        let drawing = MasterDrawing::from_str(DRAWING).unwrap();
        let labels: Vec<_> = drawing.layers().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["status", "actions"]);

        let status = &drawing.layers()[0];
        let ids: Vec<_> = status.icons.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["g42", "g43", "g44"]);
    }

    #[test]
    fn test_hidden_predicate() {
        let labeled = IconGroup {
            id: "a".into(),
            label: Some("battery-full".into()),
        };
        let draft = IconGroup {
            id: "b".into(),
            label: Some("#draft".into()),
        };
        let unlabeled = IconGroup {
            id: "c".into(),
            label: None,
        };
        assert!(!labeled.is_hidden());
        assert!(draft.is_hidden());
        assert!(unlabeled.is_hidden());
    }

    #[test]
    fn test_renderable_skips_hidden_and_unlabeled() {
        let drawing = MasterDrawing::from_str(DRAWING).unwrap();
        let found: Vec<_> = drawing
            .renderable()
            .map(|(layer, icon)| (layer.label.as_str(), icon.id.as_str()))
            .collect();
        assert_eq!(
            found,
            [("status", "g42"), ("actions", "g50"), ("actions", "g51")]
        );
    }

    #[test]
    fn test_resolve_hidden_by_exact_label() {
        let drawing = MasterDrawing::from_str(DRAWING).unwrap();
        assert_eq!(drawing.resolve("#draft-icon"), Ok(("status", "g43")));
        assert_eq!(
            drawing.resolve("draft-icon"),
            Err(LookupError::UnknownIcon("draft-icon".into()))
        );
    }

    #[test]
    fn test_resolve_nested_uses_parent_label() {
        let drawing = MasterDrawing::from_str(DRAWING).unwrap();
        assert_eq!(drawing.resolve("redo-arrow"), Ok(("redo", "g52")));
    }

    #[test]
    fn test_resolve_errors() {
        let drawing = MasterDrawing::from_str(DRAWING).unwrap();
        assert_eq!(
            drawing.resolve("orphan"),
            Err(LookupError::NoLayer("orphan".into()))
        );
        assert_eq!(
            drawing.resolve("status"),
            Err(LookupError::NoLayer("status".into()))
        );
        assert_eq!(
            drawing.resolve("no-id"),
            Err(LookupError::MissingId("no-id".into()))
        );
    }

    #[test]
    fn test_first_label_wins() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"
             xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
          <g id="l1" inkscape:label="one"><g id="a" inkscape:label="dup"/></g>
          <g id="l2" inkscape:label="two"><g id="b" inkscape:label="dup"/></g>
        </svg>"##;
        let drawing = MasterDrawing::from_str(svg).unwrap();
        assert_eq!(drawing.resolve("dup"), Ok(("one", "a")));
        assert_eq!(drawing.renderable().count(), 2);
    }

    #[test]
    fn test_doctype_is_accepted() {
        let svg = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g id="layer1" inkscape:label="status"><g id="g42" inkscape:label="battery-full"/></g>
</svg>"##;
        let drawing = MasterDrawing::from_str(svg).unwrap();
        assert_eq!(drawing.resolve("battery-full"), Ok(("status", "g42")));
    }

    #[test]
    fn test_malformed_drawing() {
        let err = MasterDrawing::from_str("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, SvgError::Parse(_)));

        let err = MasterDrawing::from_str("<html/>").unwrap_err();
        assert!(matches!(err, SvgError::NotSvg(name) if name == "html"));
    }
}
