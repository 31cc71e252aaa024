//! Task: install system packages.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::InstallError;
use crate::resources::package::{Privilege, batch_install_packages, get_installed_packages};

/// Install the configured system packages with the detected package manager.
///
/// The installed set is queried once and every missing package goes into a
/// single install command.
#[derive(Debug)]
pub struct InstallSystemPackages;

impl Task for InstallSystemPackages {
    fn name(&self) -> &'static str {
        "Install system packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.system_packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(manager) = ctx.platform.package_manager else {
            ctx.log.warn(&InstallError::NoPackageManager.to_string());
            return Ok(TaskResult::Skipped(
                InstallError::NoPackageManager.to_string(),
            ));
        };
        ctx.log.debug(&format!("using {manager}"));

        let privilege = if manager.needs_privilege() {
            Privilege::detect(&*ctx.executor, ctx.env.constrained)
        } else {
            Privilege::Root
        };
        if let Privilege::Unavailable(reason) = &privilege {
            let err = InstallError::NoPrivilege(reason.clone());
            ctx.log.warn(&err.to_string());
            return Ok(TaskResult::Skipped(err.to_string()));
        }

        ctx.log.debug(&format!(
            "batch-checking {} packages with a single query",
            ctx.config.system_packages.len()
        ));
        let installed = get_installed_packages(manager, &*ctx.executor)?;

        let mut stats = TaskStats::new();
        let mut missing = Vec::new();
        for name in &ctx.config.system_packages {
            if installed.contains(name) {
                ctx.log.debug(&format!("ok: {name} ({manager})"));
                stats.already_ok += 1;
            } else {
                missing.push(name.as_str());
            }
        }

        if !missing.is_empty() {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would install: {}", missing.join(" ")));
            } else {
                ctx.log.info(&format!("installing: {}", missing.join(" ")));
                batch_install_packages(manager, &missing, &privilege, &*ctx.executor)
                    .with_context(|| format!("installing packages with {manager}"))?;
            }
            stats.changed += u32::try_from(missing.len()).unwrap_or(u32::MAX);
        }

        Ok(stats.finish(ctx))
    }
}
