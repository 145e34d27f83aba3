use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use streakly_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "streakly", version, about = "Streakly goal tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Task completion
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Milestone completion
    Milestone {
        #[command(subcommand)]
        action: commands::milestone::MilestoneAction,
    },
    /// Focus timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Save a daily reflection
    Reflect(commands::reflect::ReflectArgs),
    /// User progress
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("STREAKLY_LOG")
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Goal { action } => commands::goal::run(action, &Config::load_or_default()).await,
        Commands::Task { action } => commands::task::run(action, &Config::load_or_default()),
        Commands::Milestone { action } => {
            commands::milestone::run(action, &Config::load_or_default())
        }
        Commands::Timer { action } => {
            commands::timer::run(action, &Config::load_or_default()).await
        }
        Commands::Reflect(args) => commands::reflect::run(args, &Config::load_or_default()),
        Commands::User { action } => commands::user::run(action, &Config::load_or_default()),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "streakly", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
