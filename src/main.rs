// Entrypoint for the console.
// - Menu file problems abort before anything connects.
// - Logs go to stderr so they never interleave with the screens on stdout.

use std::io;

use anyhow::Context;
use clap::Parser;
use menuwalk_cli::{
    api::ApiClient,
    auth::CredentialGate,
    catalog::MenuCatalog,
    config::{Cli, Settings},
    navigation::Navigator,
    ui::{self, ConsolePrompter},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::resolve(Cli::parse())?;
    init_logging(&settings.log_level);

    let catalog = MenuCatalog::load(&settings.menu_file)?;
    tracing::info!(
        menus = catalog.len(),
        path = %settings.menu_file.display(),
        "menu catalog loaded"
    );
    for node in catalog.iter().filter(|node| node.is_restricted()) {
        tracing::debug!(menu = node.title(), "requires admin credentials");
    }

    let mut prompter = ConsolePrompter;
    let (user, password) = ui::credentials(&settings, &mut prompter)?;
    let mut store = ApiClient::connect(&settings.gateway_url, &user, &password)
        .context("Could not connect to the data gateway")?;
    let mut gate = CredentialGate::new(user, password);

    // Blocks until the operator quits.
    let mut stdout = io::stdout();
    Navigator::new(&catalog, &mut prompter, &mut gate, &mut store, &mut stdout).run()
}
