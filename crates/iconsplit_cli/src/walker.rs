//! Icon task planning
//!
//! Turns the master drawing's catalog into an ordered list of extraction
//! jobs, either every visible icon or the icons named on the command line.

use std::path::{Path, PathBuf};

use iconsplit_svg::{LookupError, MasterDrawing};

/// One extraction job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTask {
    /// Icon label, also the output file stem
    pub name: String,
    /// Id of the group to isolate
    pub group_id: String,
    /// `<output_root>/<layer>`
    pub dir: PathBuf,
    /// `<dir>/<name>-symbolic.svg`
    pub path: PathBuf,
    /// Render even when `path` already exists
    pub force: bool,
}

impl IconTask {
    pub fn new(output_root: &Path, layer: &str, name: &str, group_id: &str, force: bool) -> Self {
        let dir = output_root.join(layer);
        let path = destination(output_root, layer, name);
        Self {
            name: name.to_string(),
            group_id: group_id.to_string(),
            dir,
            path,
            force,
        }
    }
}

/// Output path of an icon, a pure function of its layer and label
pub fn destination(output_root: &Path, layer: &str, name: &str) -> PathBuf {
    output_root.join(layer).join(format!("{}-symbolic.svg", name))
}

/// Plan every visible icon in document order
pub fn plan_all(drawing: &MasterDrawing, output_root: &Path, force: bool) -> Vec<IconTask> {
    drawing
        .renderable()
        .filter_map(|(layer, icon)| {
            let name = icon.label.as_deref()?;
            Some(IconTask::new(output_root, &layer.label, name, &icon.id, force))
        })
        .collect()
}

/// Plan the named icons in the given order.
///
/// Names match labels exactly, hidden ones included. Each name resolves on
/// its own so one unknown name does not hide the others.
pub fn plan_named(
    drawing: &MasterDrawing,
    output_root: &Path,
    names: &[String],
) -> Vec<Result<IconTask, LookupError>> {
    names
        .iter()
        .map(|name| {
            let (layer, id) = drawing.resolve(name)?;
            Ok(IconTask::new(output_root, layer, name, id, true))
        })
        .collect()
}

/// Plan a run: every visible icon when `names` is empty, otherwise the named ones
pub fn plan(
    drawing: &MasterDrawing,
    output_root: &Path,
    names: &[String],
    force: bool,
) -> Vec<Result<IconTask, LookupError>> {
    if names.is_empty() {
        plan_all(drawing, output_root, force)
            .into_iter()
            .map(Ok)
            .collect()
    } else {
        plan_named(drawing, output_root, names)
    }
}
