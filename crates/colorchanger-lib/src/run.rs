//! One recoloring run: load source → mutate → write target if anything changed.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::document::Document;
use crate::error::Result;
use crate::mutator::{DocumentMutator, MutationSummary};
use crate::report::Reporter;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one `Neutral` was recolored and the target file was written.
    Written {
        summary: MutationSummary,
        target: PathBuf,
    },
    /// No qualifying `Neutral` found; the target file was not touched.
    NothingToDo { target: PathBuf },
}

impl RunOutcome {
    pub fn summary(&self) -> MutationSummary {
        match self {
            RunOutcome::Written { summary, .. } => *summary,
            RunOutcome::NothingToDo { .. } => MutationSummary::default(),
        }
    }

    pub fn target(&self) -> &Path {
        match self {
            RunOutcome::Written { target, .. } | RunOutcome::NothingToDo { target } => target,
        }
    }

    pub fn written(&self) -> bool {
        matches!(self, RunOutcome::Written { .. })
    }
}

/// Recolor `settings.src` into `settings.target`.
///
/// Any error aborts the run before the target is written; reporting it is
/// left to the caller. The summary line (or the nothing-to-do line) goes to
/// `reporter` as info.
pub fn run(settings: &Settings, reporter: &dyn Reporter) -> Result<RunOutcome> {
    let mut doc = Document::load(&settings.src)?;
    let summary = DocumentMutator::new(reporter).apply(&mut doc, settings.color)?;

    if summary.neutrals_modified == 0 {
        reporter.info(&format!(
            "No Neutral elements containing an Origin found in {}; {} was not written",
            settings.src.display(),
            settings.target.display()
        ));
        return Ok(RunOutcome::NothingToDo {
            target: settings.target.clone(),
        });
    }

    doc.save(&settings.target)?;
    reporter.info(&format!(
        "Neutral elements modified: {}; existing colors replaced: {}",
        summary.neutrals_modified, summary.colors_removed
    ));
    Ok(RunOutcome::Written {
        summary,
        target: settings.target.clone(),
    })
}
