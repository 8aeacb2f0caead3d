use anyhow::Result;
use chrono::Local;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::path::PathBuf;
use taskcal::cli::{CliArgs, Command, OutputFormat, print_help};
use taskcal::config::Config;
use taskcal::context::{AppContext, StandardContext};
use taskcal::model::annotate;
use taskcal::render::CellContext;
use taskcal::vault::Vault;
use taskcal::view::RenderSession;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        ConfigBuilder::new().build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let ctx = StandardContext::new(cli.root.clone());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    match &cli.command {
        Command::Help => {
            print_help("taskcal");
            Ok(())
        }
        Command::Init => init(&ctx),
        Command::Toggle { path, line } => {
            let config = load_config(&cli, &ctx)?;
            let vault = Vault::new(vault_root(&cli, &config)?);
            let toggled = vault.toggle(path, line - 1, today)?;
            println!("{}", toggled.trim());
            Ok(())
        }
        Command::Show(view) => {
            let mut config = load_config(&cli, &ctx)?;
            if let Some(view) = view {
                config.view = Some(view.to_string());
            }
            let settings = config.validate()?;
            let vault = Vault::new(vault_root(&cli, &config)?);

            let raw = vault.tasks(&settings.pages)?;
            let tasks = annotate(&raw, &settings.annotate_options());

            let mut session = RenderSession::from_settings(&settings, today);
            for _ in 0..cli.offset.unsigned_abs() {
                session = if cli.offset > 0 {
                    session.next()
                } else {
                    session.previous()
                };
            }

            let cell_ctx = CellContext {
                today,
                daily_note_folder: settings.daily_note_folder.clone(),
                daily_note_format: settings.daily_note_format.clone(),
            };
            let model = session.render(&tasks, &cell_ctx);

            match cli.format {
                OutputFormat::Text => print!("{}", model.to_text()),
                OutputFormat::Html => println!(
                    "{}",
                    model.to_html(&settings.style.to_string(), settings.css.as_deref())
                ),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&model)?),
            }
            Ok(())
        }
    }
}

fn load_config(cli: &CliArgs, ctx: &dyn AppContext) -> Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load_from(path);
    }
    match Config::load(ctx) {
        Ok(config) => Ok(config),
        Err(e) if Config::is_missing_config_error(&e) => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn vault_root(cli: &CliArgs, config: &Config) -> Result<PathBuf> {
    cli.vault
        .clone()
        .or_else(|| config.vault.as_ref().map(PathBuf::from))
        .ok_or_else(|| anyhow::anyhow!("No vault set. Pass --vault <path> or set `vault` in the config."))
}

fn init(ctx: &dyn AppContext) -> Result<()> {
    let path = ctx.get_config_file_path()?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save(ctx)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
