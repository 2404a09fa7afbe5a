pub mod batch;
pub mod resource;

use anyhow::{Context as AnyhowContext, Result};
use nodecfg::nodeapi::Client;

use crate::Context;
use crate::config::Config;
use crate::ui;

/// Load config and connect, verifying the organization
pub fn connect(ctx: &Context) -> Result<Client> {
    let config = Config::load(ctx.config.as_deref())?;
    let client_config = config.client_config()?;

    let client = Client::connect(&client_config)
        .map_err(|err| explain(nodecfg::Error::from(err)))
        .context("Failed to connect to the API")?;

    if !ctx.quiet {
        ui::dim(&format!(
            "{} · organization {}",
            client.base_url(),
            client.organization().id
        ));
    }
    Ok(client)
}

/// Print category advice for API errors, then hand the error back
pub fn explain(err: nodecfg::Error) -> anyhow::Error {
    if let nodecfg::Error::Api(api) = &err {
        let category = api.category();
        log::debug!("{}: {}", category.description(), api);
        ui::warn(category.advice());
    }
    anyhow::Error::new(err)
}

/// `nodecfg kinds`
pub fn kinds() -> Result<()> {
    ui::header("Resource kinds");
    for handler in nodecfg::resource::kinds() {
        ui::kv(handler.kind(), &handler.delete_policy().to_string());
    }
    Ok(())
}
