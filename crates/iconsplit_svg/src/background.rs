//! Background path removal

use std::ops::Range;

use tracing::debug;

use crate::document::parse_xml;
use crate::error::SvgError;
use crate::style::{fill_of, same_color};

/// Remove every `<path>` whose fill is `background`.
///
/// Returns the rewritten document and the number of paths removed. Removal
/// cuts each matching element's byte range out of the input, so every other
/// byte of the document is kept as it was. A matching path nested inside
/// another one goes away with its parent and is not counted separately.
pub fn strip_background_paths(svg: &str, background: &str) -> Result<(String, usize), SvgError> {
    let doc = parse_xml(svg)?;

    let ranges: Vec<Range<usize>> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "path")
        .filter(|n| fill_of(*n).is_some_and(|fill| same_color(fill, background)))
        .inspect(|n| debug!("removing background path {:?}", n.attribute("id")))
        .map(|n| n.range())
        .collect();

    let mut out = String::with_capacity(svg.len());
    let mut cursor = 0;
    let mut removed = 0;
    for range in &ranges {
        // Already cut out along with an enclosing path
        if range.start < cursor {
            continue;
        }
        out.push_str(&svg[cursor..range.start]);
        cursor = range.end;
        removed += 1;
    }
    out.push_str(&svg[cursor..]);

    Ok((out, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_only_background_paths() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
  <path id="bg" d="M0 0h16v16H0z" style="fill:#ffffff;stroke:none"/>
  <path id="icon" d="M2 2h12v12H2z" style="fill:#bebebe"/>
  <g id="g1">
    <path id="bg2" fill="#FFF" d="M0 0h1v1H0z"></path>
  </g>
</svg>"##;

        let (out, removed) = strip_background_paths(svg, "#ffffff").unwrap();
        assert_eq!(removed, 2);

        let expected = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
  
  <path id="icon" d="M2 2h12v12H2z" style="fill:#bebebe"/>
  <g id="g1">
    
  </g>
</svg>"##;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_other_elements_with_background_fill_are_kept() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><rect style="fill:#ffffff" width="4" height="4"/></svg>"##;
        let (out, removed) = strip_background_paths(svg, "#ffffff").unwrap();
        assert_eq!(removed, 0);
        assert_eq!(out, svg);
    }

    #[test]
    fn test_untouched_document_round_trips_verbatim() {
        let svg = "<?xml version=\"1.0\"?>\n<!-- keep -->\n<svg xmlns=\"http://www.w3.org/2000/svg\">\n\t<path d=\"M0 0\" style=\"fill:none\"/>\n</svg>\n";
        let (out, removed) = strip_background_paths(svg, "#ffffff").unwrap();
        assert_eq!(removed, 0);
        assert_eq!(out, svg);
    }

    #[test]
    fn test_nested_background_paths() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><path style="fill:#ffffff"><path style="fill:#ffffff"/></path><path id="keep" style="fill:#000"/></svg>"##;
        let (out, removed) = strip_background_paths(svg, "#ffffff").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            out,
            r##"<svg xmlns="http://www.w3.org/2000/svg"><path id="keep" style="fill:#000"/></svg>"##
        );
    }

    #[test]
    fn test_doctype_output_is_stripped() {
        let svg = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg xmlns=\"http://www.w3.org/2000/svg\"><path style=\"fill:#ffffff\"/></svg>";
        let (out, removed) = strip_background_paths(svg, "#ffffff").unwrap();
        assert_eq!(removed, 1);
        assert!(out.starts_with("<!DOCTYPE svg"));
        assert!(out.ends_with("<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>"));
    }

    #[test]
    fn test_malformed_input() {
        let err = strip_background_paths("<svg><path></svg>", "#ffffff").unwrap_err();
        assert!(matches!(err, SvgError::Parse(_)));
    }
}
