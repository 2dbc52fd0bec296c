use camara::cli::{Cli, Commands, GlobalOpts};
use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => camara::cli::commands::init::run(args, &global),
        Commands::Map(args) => camara::cli::commands::map::run(args, &global),
        Commands::Register(args) => camara::cli::commands::register::run(args, &global),
        Commands::Show(args) => camara::cli::commands::show::run(args, &global),
        Commands::Remove(args) => camara::cli::commands::remove::run(args, &global),
        Commands::Search(args) => camara::cli::commands::search::run(args, &global),
        Commands::List(args) => camara::cli::commands::list::run(args, &global),
        Commands::Refresh(args) => camara::cli::commands::refresh::run(args, &global),
        Commands::Lookup(args) => camara::cli::commands::lookup::run(args, &global),
        Commands::Status(args) => camara::cli::commands::status::run(args, &global),
        Commands::Interactive(args) => camara::cli::commands::interactive::run(args, &global),
        Commands::Config(cmd) => camara::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => camara::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked from -v/-q
fn init_tracing(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "camara=info"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
