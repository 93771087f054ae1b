use std::{io, process::ExitCode};

use chrono::Local;
use clap::Parser;
use log::{error, info};

use taskers::{
    config::{Cli, Config},
    logging,
    store::TaskStore,
    task::demo_tasks,
    ui::{self, Console, SessionOutcome},
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let config = Config::resolve(Cli::parse())?;
    let _logger = logging::init(&config.log_level, config.log_dir.as_deref())?;

    let report = TaskStore::load(&config.file);
    let mut console = Console::new(io::stdin().lock(), io::stdout().lock(), config.use_color());
    ui::show_load_report(&mut console, &report, &config.file)?;

    let mut store = report.store;
    if config.demo && store.is_empty() {
        store = TaskStore::from_tasks(demo_tasks());
        info!("event=demo_seeded tasks={}", store.len());
    }

    let outcome = match ui::run_app(&mut console, &mut store, &config.file, || {
        Local::now().date_naive()
    }) {
        Ok(outcome) => outcome,
        Err(err) => {
            // The terminal went away; still persist what the user did.
            error!("event=console_failed err={err}");
            SessionOutcome {
                save_error: store.save(&config.file).err(),
            }
        }
    };

    Ok(exit_code(&outcome, config.strict_save))
}

fn exit_code(outcome: &SessionOutcome, strict_save: bool) -> ExitCode {
    if strict_save && outcome.save_error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
