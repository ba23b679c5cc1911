//! External editor invocation
//!
//! The editor does the actual geometry work: it fits the canvas to one icon
//! group, deletes everything else, flattens the grouping, converts strokes to
//! paths and saves the file in place.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{EditorDialect, IconsplitConfig};

/// Inkscape 0.92 verbs, run after `--select <id>`
const VERBS: &[&str] = &[
    "FitCanvasToSelection",
    "EditInvertInAllLayers",
    "EditDelete",
    "EditSelectAll",
    "SelectionUnGroup",
    "SelectionUnGroup",
    "SelectionUnGroup",
    "StrokeToPath",
    "FileVacuum",
    "FileSave",
    "FileQuit",
];

/// Inkscape 1.x actions, run after `select-by-id:<id>`
const ACTIONS: &[&str] = &[
    "page-fit-to-selection",
    "edit-invert-in-all-layers",
    "edit-delete",
    "edit-select-all",
    "selection-ungroup",
    "selection-ungroup",
    "selection-ungroup",
    "object-stroke-to-path",
    "vacuum-defs",
    "export-overwrite",
    "export-do",
];

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors running the external editor
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("{program} did not finish within {}s and was killed", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Something that can isolate one group of an SVG file in place
pub trait IconEditor {
    /// Reduce the SVG at `file` to the group `group_id`, saving over `file`
    fn isolate(&self, file: &Path, group_id: &str) -> Result<(), EditorError>;
}

impl<T: IconEditor + ?Sized> IconEditor for &T {
    fn isolate(&self, file: &Path, group_id: &str) -> Result<(), EditorError> {
        (**self).isolate(file, group_id)
    }
}

/// Inkscape run headless as a subprocess
#[derive(Debug, Clone)]
pub struct Inkscape {
    program: PathBuf,
    dialect: EditorDialect,
    timeout: Option<Duration>,
}

impl Inkscape {
    pub fn new(program: impl Into<PathBuf>, dialect: EditorDialect) -> Self {
        Self {
            program: program.into(),
            dialect,
            timeout: None,
        }
    }

    pub fn from_config(config: &IconsplitConfig) -> Self {
        Self::new(&config.editor, config.dialect).with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for isolating `group_id` in `file`
    pub fn args(&self, file: &Path, group_id: &str) -> Vec<OsString> {
        let mut args = vec![file.as_os_str().to_owned()];
        match self.dialect {
            EditorDialect::Verbs => {
                args.push("-g".into());
                args.push("--select".into());
                args.push(group_id.into());
                args.push("--verb".into());
                args.push(VERBS.join(";").into());
            }
            EditorDialect::Actions => {
                let select = format!("select-by-id:{}", group_id);
                let actions = std::iter::once(select.as_str())
                    .chain(ACTIONS.iter().copied())
                    .collect::<Vec<_>>()
                    .join(";");
                args.push("--batch-process".into());
                args.push("--actions".into());
                args.push(actions.into());
            }
        }
        args
    }

    pub fn command(&self, file: &Path, group_id: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.args(file, group_id));
        command
    }
}

impl IconEditor for Inkscape {
    fn isolate(&self, file: &Path, group_id: &str) -> Result<(), EditorError> {
        let command = self.command(file, group_id);
        info!("{}", command_line(&command));
        run_with_timeout(command, self.timeout)
    }
}

/// Render a command the way it would be typed in a shell
pub fn command_line(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `command` to completion, killing it if it outlives `timeout`
pub fn run_with_timeout(mut command: Command, timeout: Option<Duration>) -> Result<(), EditorError> {
    let program = command.get_program().to_string_lossy().into_owned();

    let mut child = command.spawn().map_err(|source| EditorError::Spawn {
        program: program.clone(),
        source,
    })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => return Err(EditorError::Wait { program, source }),
        }

        if let Some(timeout) = timeout {
            if started.elapsed() >= timeout {
                if let Err(e) = child.kill() {
                    warn!("failed to kill {}: {}", program, e);
                }
                // Reap so the child does not linger as a zombie
                let _ = child.wait();
                return Err(EditorError::TimedOut { program, timeout });
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    debug!("{} finished in {:?}", program, started.elapsed());

    if status.success() {
        Ok(())
    } else {
        Err(EditorError::Failed { program, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_arguments() {
        let inkscape = Inkscape::new("/usr/bin/inkscape", EditorDialect::Verbs);
        let command = inkscape.command(Path::new("out/status/battery-full-symbolic.svg"), "g42");

        assert_eq!(
            command_line(&command),
            "/usr/bin/inkscape out/status/battery-full-symbolic.svg -g --select g42 --verb \
             FitCanvasToSelection;EditInvertInAllLayers;EditDelete;EditSelectAll;\
             SelectionUnGroup;SelectionUnGroup;SelectionUnGroup;StrokeToPath;\
             FileVacuum;FileSave;FileQuit"
        );
    }

    #[test]
    fn test_action_arguments() {
        let inkscape = Inkscape::new("inkscape", EditorDialect::Actions);
        let args = inkscape.args(Path::new("icon.svg"), "g42");

        assert_eq!(args.len(), 4);
        assert_eq!(args[0], "icon.svg");
        assert_eq!(args[1], "--batch-process");
        assert_eq!(args[2], "--actions");

        let actions = args[3].to_string_lossy();
        let steps: Vec<_> = actions.split(';').collect();
        assert_eq!(steps.first(), Some(&"select-by-id:g42"));
        assert_eq!(steps.last(), Some(&"export-do"));
        assert_eq!(steps.iter().filter(|s| **s == "selection-ungroup").count(), 3);
    }

    #[test]
    fn test_timeout_from_config() {
        let config = IconsplitConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(Inkscape::from_config(&config).timeout, None);
    }

    #[test]
    fn test_missing_program() {
        let command = Command::new("/nonexistent/iconsplit-editor");
        let err = run_with_timeout(command, None).unwrap_err();
        assert!(matches!(err, EditorError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_and_failure_status() {
        let mut ok = Command::new("sh");
        ok.args(["-c", "exit 0"]);
        assert!(run_with_timeout(ok, Some(Duration::from_secs(10))).is_ok());

        let mut failing = Command::new("sh");
        failing.args(["-c", "exit 3"]);
        let err = run_with_timeout(failing, Some(Duration::from_secs(10))).unwrap_err();
        match err {
            EditorError::Failed { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_editor_is_killed() {
        let mut hung = Command::new("sh");
        hung.args(["-c", "sleep 30"]);

        let started = Instant::now();
        let err = run_with_timeout(hung, Some(Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, EditorError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
