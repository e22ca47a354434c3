use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::process::ExitCode;
use subsync::app;
use subsync::cli::Cli;
use subsync::logging;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "subsync", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    logging::init(cli.verbose);

    match app::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if std::io::stderr().is_terminal() {
                eprintln!("{} {}", "Error:".red().bold(), e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
