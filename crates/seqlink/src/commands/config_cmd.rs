//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let rendered = output::render_value(global.output, &cfg, |c| Ok(c.to_toml()?))?;
            output::print_output(rendered.trim_end());
        }
        ConfigCommand::Path => {
            output::print_output(&config::path(global).display().to_string());
        }
    }
    Ok(())
}
