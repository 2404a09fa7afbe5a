//! Single-resource lifecycle commands
//!
//! Each command loads one state file, runs one lifecycle operation and
//! writes the state back.

use anyhow::Result;
use colored::Colorize;
use nodecfg::resource;
use nodecfg::statemap::StateStore;
use std::path::Path;

use super::{connect, explain};
use crate::Context;
use crate::state::{load_state, save_state};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

pub fn write(ctx: &Context, action: Action, kind: &str, path: &Path) -> Result<()> {
    let handler = resource::handler(kind)?;
    let mut state = load_state(path)?;
    let client = connect(ctx)?;

    let result = match action {
        Action::Create => handler.create(&client, &mut state),
        Action::Update => handler.update(&client, &mut state),
        Action::Delete => handler.delete(&client, &mut state),
    }
    .map_err(explain)?;

    save_state(path, &state)?;

    if !ctx.quiet {
        let label = state.id().map_or_else(|| kind.to_string(), str::to_string);
        println!("  {} {} {}", ui::symbol(&result), label, ui::describe(&result).dimmed());
    }
    Ok(())
}

pub fn read(ctx: &Context, kind: &str, path: &Path) -> Result<()> {
    let handler = resource::handler(kind)?;
    let mut state = load_state(path)?;
    let before = state.clone();
    let client = connect(ctx)?;

    let observed = handler.read(&client, &mut state).map_err(explain)?;
    save_state(path, &state)?;

    if observed.is_absent() {
        ui::warn(&format!(
            "{kind} no longer exists remotely; identity cleared in {}",
            path.display()
        ));
    } else if !ctx.quiet {
        ui::header(&format!("{} {}", kind, state.id().unwrap_or_default()));
        ui::show_state_diff(&before, &state);
    }
    Ok(())
}

pub fn import(ctx: &Context, kind: &str, id: &str, path: &Path) -> Result<()> {
    let handler = resource::handler(kind)?;
    let mut state = load_state(path)?;
    let client = connect(ctx)?;

    let observed = handler.import(&client, &mut state, id).map_err(explain)?;
    if !observed.is_present() {
        anyhow::bail!("{id} does not exist remotely");
    }

    save_state(path, &state)?;
    ui::success(&format!("Imported {id} into {}", path.display()));
    Ok(())
}
