//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::effective_config(global)?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => netdash_config::render_redacted(&cfg)?,
                OutputFormat::Json => serde_json::to_string_pretty(&netdash_config::redacted(&cfg))?,
                OutputFormat::JsonCompact => serde_json::to_string(&netdash_config::redacted(&cfg))?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            output::print_output(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }
    }
}
