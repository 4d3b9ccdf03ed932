mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::ListEffects(args)) => run::list_effects(args.json),
        Some(Command::Render(args)) => run::render_still(&args),
        Some(Command::Where) => run::print_paths(),
        None => run::run(cli.run),
    }
}
