//! Command: show the link state of every package file.
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use super::CommandRunner;
use crate::cli::GlobalOpts;
use crate::linker::{Linker, PackageStatus};
use crate::logging::Logger;
use crate::resources::helpers::fs::display_home;
use crate::resources::symlink::TargetKind;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or a package cannot be read.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let runner = CommandRunner::new(global, log)?;
    print!("{}", report(&runner)?);
    Ok(())
}

/// Inspect every configured package and render the result.
///
/// # Errors
///
/// Returns an error if a package tree or target cannot be read.
pub fn report(runner: &CommandRunner) -> Result<String> {
    let ctx = runner.context();
    let statuses = Linker::new(ctx.root(), ctx.home(), &*ctx.log).inspect(&ctx.config.packages)?;
    Ok(render(&statuses, ctx.home()))
}

const fn label(kind: &TargetKind) -> &'static str {
    match kind {
        TargetKind::Linked => "linked",
        TargetKind::Absent => "missing",
        TargetKind::ForeignLink(_) => "foreign link",
        TargetKind::File => "file (will be backed up)",
        TargetKind::EmptyDir => "empty directory",
        TargetKind::Dir => "conflict: directory",
    }
}

/// Render package statuses, one line per file, with paths shown relative to `~`.
#[must_use]
pub fn render(statuses: &[PackageStatus], home: &Path) -> String {
    let mut out = String::new();
    for status in statuses {
        let Some(files) = &status.files else {
            let note = if status.optional {
                "optional, not present"
            } else {
                "package directory not found"
            };
            let _ = writeln!(out, "{}: {note}", status.name);
            continue;
        };
        let linked = files
            .iter()
            .filter(|f| f.kind == TargetKind::Linked)
            .count();
        let _ = writeln!(out, "{}: {linked}/{} linked", status.name, files.len());
        for file in files.iter().filter(|f| f.kind != TargetKind::Linked) {
            let _ = writeln!(
                out,
                "  {} {}",
                display_home(&file.target, home),
                label(&file.kind)
            );
        }
    }
    out
}
