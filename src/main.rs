use clap::Parser;
use vosscrm::cli::{run_digest, run_feed, run_import, run_serve, run_summary, run_user_add, Cli, Commands, UserCommands};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command {
        Commands::Serve(args) => {
            run_serve(&settings, &args.bind)?;
        }
        Commands::Feed => {
            run_feed(&settings.open_crm()?)?;
        }
        Commands::Summary => {
            run_summary(&settings.open_crm()?)?;
        }
        Commands::Digest(args) => {
            run_digest(&settings.open_crm()?, settings.notifier()?, args.force)?;
        }
        Commands::Import(args) => {
            run_import(&settings.open_crm()?, &args.file, args.dry_run)?;
        }
        Commands::User(UserCommands::Add(args)) => {
            run_user_add(&settings.open_crm()?, &args.username, args.telegram_chat_id.as_deref())?;
        }
    }

    Ok(())
}
