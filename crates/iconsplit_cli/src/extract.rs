//! Icon extraction
//!
//! Each task goes through the same steps: make sure the layer directory
//! exists, skip when the icon is already built (unless forced), copy the
//! master drawing to the destination, let the editor cut it down to one
//! group, then strip the background paths the editor leaves behind.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use iconsplit_svg::{strip_background_paths, LookupError, SvgError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::IconsplitConfig;
use crate::editor::{EditorError, IconEditor};
use crate::walker::IconTask;

/// Per-task failures. None of these stop the rest of the run.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("editor failed: {0}")]
    Render(#[from] EditorError),

    #[error("failed to post-process {path}: {source}")]
    PostProcess {
        path: PathBuf,
        #[source]
        source: SvgError,
    },
}

/// How a task finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Output already existed and the task was not forced
    Skipped,
    /// Output written; `stripped` background paths were removed
    Rendered { stripped: usize },
}

/// Counts for the end-of-run report
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rendered: usize,
    pub skipped: usize,
    /// Background paths removed across all rendered icons
    pub stripped: usize,
    /// Names of the failed tasks, in run order
    pub failed: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, name: &str, result: &Result<TaskOutcome, ExtractError>) {
        match result {
            Ok(TaskOutcome::Rendered { stripped }) => {
                self.rendered += 1;
                self.stripped += stripped;
            }
            Ok(TaskOutcome::Skipped) => self.skipped += 1,
            Err(_) => self.failed.push(name.to_string()),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn print(&self) {
        debug!("removed {} background paths", self.stripped);
        print!("{}", self);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rendered {} icons", self.rendered)?;
        if self.skipped > 0 {
            writeln!(f, "skipped {} existing icons", self.skipped)?;
        }
        if self.has_failures() {
            writeln!(
                f,
                "failed {} icons: {}",
                self.failed.len(),
                self.failed.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Progress line logged as each task starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress<'a> {
    Rendering(&'a str),
    Exists(&'a str),
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendering(name) => write!(f, ">> {}", name),
            Self::Exists(name) => write!(f, "-- {} already exists", name),
        }
    }
}

/// Runs extraction tasks one at a time
pub struct Extractor<E> {
    master: PathBuf,
    background_fill: String,
    editor: E,
}

impl<E: IconEditor> Extractor<E> {
    pub fn new(config: &IconsplitConfig, editor: E) -> Self {
        Self {
            master: config.master.clone(),
            background_fill: config.background_fill.clone(),
            editor,
        }
    }

    /// Run every planned task in order and summarize.
    ///
    /// Failures are logged with the task name and counted; they never stop
    /// the remaining tasks.
    pub fn run(&self, tasks: impl IntoIterator<Item = Result<IconTask, LookupError>>) -> RunSummary {
        let mut summary = RunSummary::default();

        for planned in tasks {
            let (name, result) = match planned {
                Ok(task) => {
                    let result = self.extract(&task);
                    (task.name, result)
                }
                Err(e) => (e.label().to_string(), Err(e.into())),
            };

            if let Err(e) = &result {
                error!("{}: {}", name, e);
            }
            summary.record(&name, &result);
        }

        summary
    }

    /// Extract one icon
    pub fn extract(&self, task: &IconTask) -> Result<TaskOutcome, ExtractError> {
        self.extract_with_progress(task).map(|(outcome, _)| outcome)
    }

    fn extract_with_progress<'t>(
        &self,
        task: &'t IconTask,
    ) -> Result<(TaskOutcome, Progress<'t>), ExtractError> {
        fs::create_dir_all(&task.dir).map_err(|source| ExtractError::Io {
            path: task.dir.clone(),
            source,
        })?;

        if task.path.exists() && !task.force {
            let progress = Progress::Exists(&task.name);
            info!("{}", progress);
            return Ok((TaskOutcome::Skipped, progress));
        }

        let progress = Progress::Rendering(&task.name);
        info!("{}", progress);

        match self.render(task) {
            Ok(outcome) => Ok((outcome, progress)),
            Err(e) => {
                discard(&task.path);
                Err(e)
            }
        }
    }

    fn render(&self, task: &IconTask) -> Result<TaskOutcome, ExtractError> {
        fs::copy(&self.master, &task.path).map_err(|source| ExtractError::Io {
            path: task.path.clone(),
            source,
        })?;
        debug!("working copy written to {}", task.path.display());

        self.editor.isolate(&task.path, &task.group_id)?;
        debug!("editor finished {}", task.name);

        let post_process = |source: SvgError| ExtractError::PostProcess {
            path: task.path.clone(),
            source,
        };

        let edited = fs::read_to_string(&task.path).map_err(|e| post_process(e.into()))?;
        let (stripped_svg, stripped) =
            strip_background_paths(&edited, &self.background_fill).map_err(post_process)?;
        fs::write(&task.path, stripped_svg).map_err(|e| post_process(e.into()))?;
        debug!("removed {} background paths from {}", stripped, task.name);

        Ok(TaskOutcome::Rendered { stripped })
    }
}

/// Remove a half-built output so the next run does not take it for a finished icon
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed incomplete {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove incomplete {}: {}", path.display(), e),
    }
}
