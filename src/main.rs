use anyhow::Context;
use clap::Parser;
use sortbin::cli::{Args, Session, run_action};
use sortbin::menu::Menu;
use sortbin::output::OutputFormatter;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    println!("Welcome to sortbin - directory organization made easy!");

    let mut session = Session::start(&args).with_context(|| {
        format!(
            "cannot set up session log in {}",
            args.log_dir.display()
        )
    })?;
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let mut console = OutputFormatter::new(io::stdout().lock());
    console.info(&format!("Logging to {}", session.log.path().display()));

    let result = match args.mode {
        Some(mode) => {
            let target = args.target.clone().unwrap_or(cwd);
            run_action(&mut session, mode, &target, &mut console)
                .map(|_| ())
                .with_context(|| format!("cannot process {}", target.display()))
        }
        None => {
            let mut menu = Menu::new(io::stdin().lock(), console, cwd);
            menu.run(&mut session);
            Ok(())
        }
    };

    session.finish();
    result
}
