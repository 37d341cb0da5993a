//! `medrem` - CLI for medreminder
//!
//! This binary builds a session registry, applies the requested changes and
//! prints today's schedule or adherence figures.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use medreminder::cli::{
    AddCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat, RemoveCommand,
    ScheduleCommand, SessionArgs, StatsCommand,
};
use medreminder::{
    expand_schedule, init_logging, Config, DayOverview, ReminderInstance, ReminderStatus, Session,
    SystemClock,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Schedule(cmd) => {
            let session = open_session(&config, &cmd.session)?;
            handle_schedule(&config, &session, &cmd)
        }
        Command::Stats(cmd) => {
            let session = open_session(&config, &cmd.session)?;
            handle_stats(&session, &cmd)
        }
        Command::List(cmd) => {
            let session = open_session(&config, &cmd.session)?;
            handle_list(&config, &session, &cmd)
        }
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::Remove(cmd) => {
            let mut session = open_session(&config, &cmd.session)?;
            handle_remove(&config, &mut session, &cmd)
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Build the session registry and apply `--taken` keys.
fn open_session(config: &Config, args: &SessionArgs) -> anyhow::Result<Session> {
    let mut session = Session::open(config, args.at.as_deref(), &SystemClock)
        .context("building session registry")?;
    mark_taken(&mut session, args)?;
    Ok(session)
}

fn mark_taken(session: &mut Session, args: &SessionArgs) -> anyhow::Result<()> {
    session
        .mark_taken(&args.taken)
        .context("applying --taken")?;
    Ok(())
}

fn status_label(status: ReminderStatus) -> &'static str {
    match status {
        ReminderStatus::Taken => "[x] taken",
        ReminderStatus::Overdue => "[!] overdue",
        ReminderStatus::Pending => "[ ] pending",
    }
}

fn print_schedule(
    config: &Config,
    reminders: &[ReminderInstance<'_>],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let time_format = config.display.time_format;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reminders)?);
        }
        OutputFormat::Plain => {
            for reminder in reminders {
                let med = reminder.medication();
                println!(
                    "{} {} {} ({}) {}",
                    reminder.key(),
                    time_format.render(reminder.dose_time()),
                    med.name(),
                    med.dosage(),
                    reminder.status()
                );
            }
        }
        OutputFormat::Table => {
            if reminders.is_empty() {
                println!("No medications scheduled for today");
                return Ok(());
            }
            println!(
                "{:<6} {:<9} {:<14} {:<10} {:<12}",
                "KEY", "TIME", "MEDICINE", "DOSAGE", "STATUS"
            );
            for reminder in reminders {
                let med = reminder.medication();
                println!(
                    "{:<6} {:<9} {:<14} {:<10} {:<12}",
                    reminder.key().to_string(),
                    time_format.render(reminder.dose_time()),
                    med.name(),
                    med.dosage(),
                    status_label(reminder.status())
                );
                if config.display.show_instructions && !med.instructions().is_empty() {
                    println!("{:<6} {:<9} {}", "", "", med.instructions());
                }
            }
        }
    }
    Ok(())
}

fn handle_schedule(config: &Config, session: &Session, cmd: &ScheduleCommand) -> anyhow::Result<()> {
    let reminders = expand_schedule(session.registry(), session.now());
    print_schedule(config, &reminders, cmd.format)
}

fn handle_stats(session: &Session, cmd: &StatsCommand) -> anyhow::Result<()> {
    let overview = DayOverview::compute(session.registry(), session.now());

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else {
        println!("medrem stats");
        println!("------------");
        println!("Today:       {}", overview.date.format("%b %d"));
        println!(
            "Taken:       {}/{}",
            overview.adherence.taken_count, overview.adherence.total
        );
        println!("Remaining:   {}", overview.adherence.remaining());
        println!("Adherence:   {}%", overview.adherence.adherence_percent);
        println!("Active:      {}", overview.active_medications);
    }
    Ok(())
}

fn handle_list(config: &Config, session: &Session, cmd: &ListCommand) -> anyhow::Result<()> {
    let registry = session.registry();
    if cmd.json {
        let entries: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No medications registered");
        return Ok(());
    }

    let today = session.now().date();
    for entry in registry {
        let times: Vec<_> = entry
            .dose_times()
            .iter()
            .map(|t| config.display.time_format.render(*t))
            .collect();
        let until = entry
            .active_until()
            .map_or_else(|| "ongoing".to_string(), |d| d.to_string());
        let state = if entry.is_active_on(today) { "active" } else { "inactive" };

        println!("#{} {} {} ({state})", entry.id(), entry.name(), entry.dosage());
        if !entry.frequency_label().is_empty() {
            println!("    {}", entry.frequency_label());
        }
        println!("    times:  {}", times.join(", "));
        println!("    course: {} to {until}", entry.active_from());
        println!("    color:  {}", entry.color());
        if config.display.show_instructions && !entry.instructions().is_empty() {
            println!("    {}", entry.instructions());
        }
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let mut session = Session::open(config, cmd.session.at.as_deref(), &SystemClock)
        .context("building session registry")?;

    let id = match session.registry_mut().register(cmd.to_draft()) {
        Ok(id) => id,
        Err(e) => {
            let Some(issues) = e.validation_issues() else {
                return Err(e.into());
            };
            eprintln!("Cannot add {}:", cmd.name);
            for issue in issues {
                eprintln!("  - {issue}");
            }
            bail!("medication rejected");
        }
    };
    // New keys only resolve once the medication is registered.
    mark_taken(&mut session, &cmd.session)?;

    println!("Added medication #{id} ({})", cmd.name);
    println!();

    let reminders = expand_schedule(session.registry(), session.now());
    print_schedule(config, &reminders, OutputFormat::Table)
}

fn handle_remove(config: &Config, session: &mut Session, cmd: &RemoveCommand) -> anyhow::Result<()> {
    let removed = session.registry_mut().remove(cmd.id)?;
    println!("Removed medication #{} ({})", removed.id(), removed.name());
    println!();

    let reminders = expand_schedule(session.registry(), session.now());
    print_schedule(config, &reminders, OutputFormat::Table)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Registry]");
                println!("  Seed samples:       {}", config.registry.seed_samples);
                println!(
                    "  Import path:        {}",
                    config
                        .registry
                        .import_path
                        .as_ref()
                        .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
                );
                println!();
                println!("[Display]");
                println!("  Time format:        {:?}", config.display.time_format);
                println!(
                    "  Show instructions:  {}",
                    config.display.show_instructions
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::check_file(path) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
