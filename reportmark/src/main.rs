use color_eyre::eyre::Result;
use log::LevelFilter;
use reportmark::{
  cli::{Cli, Commands},
  commands,
};
use reportmark_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => commands::init(output, format, *force),

    Commands::ExportTemplates { output_dir, force } => {
      commands::export_templates(output_dir, *force)
    },

    Commands::Classify { input } => commands::classify_to_stdout(input),

    Commands::Convert { input, output } => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)?;
      config.validate_paths()?;
      commands::convert(&config, input, output)
    },
  }
}
