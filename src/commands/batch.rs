//! Manifest-wide commands: apply, refresh, destroy

use anyhow::Result;
use nodecfg::engine::{self, ExecuteOptions, Operation};
use std::path::Path;

use super::connect;
use crate::Context;
use crate::state::Manifest;
use crate::ui;

pub fn run(ctx: &Context, operation: Operation, path: &Path, jobs: usize) -> Result<()> {
    let mut manifest = Manifest::load(path)?;
    if manifest.resources.is_empty() {
        ui::info("Manifest declares no resources");
        return Ok(());
    }

    let client = connect(ctx)?;
    let opts = ExecuteOptions { operation, jobs };

    if !ctx.quiet {
        ui::info(&format!(
            "{:?} {} resources ({} jobs)",
            operation,
            manifest.resources.len(),
            jobs
        ));
    }

    let report = engine::execute(&client, &mut manifest.resources, &opts)?;

    if report.summary.is_success() && operation == Operation::Apply {
        manifest.touch();
    }
    // per-entry state is saved even on partial failure
    manifest.save(path)?;

    if !ctx.quiet {
        ui::print_report(&report);
    }

    if !report.summary.is_success() {
        anyhow::bail!("{} of {} resources failed", report.summary.failed, report.summary.total());
    }
    Ok(())
}
