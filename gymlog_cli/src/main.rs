use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gymlog_core::*;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(about = "Workout log with double-progression weight suggestions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed (or refresh) the default 12-week program
    Seed,

    /// Show a training day with suggested weights (default)
    Plan {
        /// Program week (1-12)
        #[arg(long, default_value_t = 1)]
        week: u8,

        /// Day label (Upper A, Lower A, Upper B, Lower B)
        #[arg(long, value_parser = parse_day, default_value = "Upper A")]
        day: DayLabel,
    },

    /// Log a session's sets
    Log {
        /// Program week (1-12), used for --use-suggestions
        #[arg(long, default_value_t = 1)]
        week: u8,

        #[arg(long, value_parser = parse_day)]
        day: DayLabel,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// A set as EXERCISE:SET:WEIGHTxREPS, e.g. back_squat:1:100x8
        #[arg(long = "set", value_parser = parse_set)]
        sets: Vec<SetLog>,

        /// Fill every planned set not given with --set from its suggestion
        #[arg(long)]
        use_suggestions: bool,
    },

    /// Show the sets logged for one workout
    Show {
        #[arg(long, value_parser = parse_day)]
        day: DayLabel,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Change the rep range of one program row
    SetRange {
        #[arg(long)]
        week: u8,

        #[arg(long, value_parser = parse_day)]
        day: DayLabel,

        #[arg(long)]
        exercise: String,

        #[arg(long)]
        floor: u32,

        #[arg(long)]
        ceiling: u32,
    },

    /// Export every logged set to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Show the effective configuration, or write it to a file
    Config {
        /// Write the configuration instead of printing it
        #[arg(long)]
        write: bool,

        /// Target file for --write (defaults to the user config path)
        #[arg(long, requires = "write")]
        path: Option<PathBuf>,
    },

    /// Compact the set journal
    Compact {
        /// Remove the journal kept from previous compactions
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    gymlog_core::logging::init(cli.verbose);

    // Determine data directory
    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let data_dir = config.data.data_dir.clone();

    match cli.command {
        Some(Commands::Seed) => cmd_seed(data_dir),
        Some(Commands::Plan { week, day }) => cmd_plan(data_dir, week, day, &config),
        Some(Commands::Log {
            week,
            day,
            date,
            sets,
            use_suggestions,
        }) => cmd_log(data_dir, week, day, date, sets, use_suggestions, &config),
        Some(Commands::Show { day, date }) => cmd_show(data_dir, day, date),
        Some(Commands::SetRange {
            week,
            day,
            exercise,
            floor,
            ceiling,
        }) => cmd_set_range(data_dir, week, day, &exercise, floor, ceiling),
        Some(Commands::Export { out }) => cmd_export(data_dir, &out),
        Some(Commands::Config { write, path }) => cmd_config(&config, write, path),
        Some(Commands::Compact { cleanup }) => cmd_compact(data_dir, cleanup),
        None => {
            // Default to "plan" for the first day of the program
            cmd_plan(data_dir, 1, DayLabel::UpperA, &config)
        }
    }
}

fn open_tracker(data_dir: PathBuf, config: &Config) -> Result<Tracker<FileStore>> {
    let store = FileStore::open_seeded(data_dir)?;
    Ok(Tracker::new(store, config.progression.clone()))
}

fn cmd_seed(data_dir: PathBuf) -> Result<()> {
    let mut store = FileStore::open(data_dir)?;
    let program = store.seed_default_program()?;

    let errors = program.validate();
    if !errors.is_empty() {
        eprintln!("Program validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::ProgramValidation(format!(
            "{} problems in program",
            errors.len()
        )));
    }

    println!(
        "✓ Program seeded: {} exercises, {} rows",
        program.exercises.len(),
        program.entries.len()
    );
    println!("  File: {}", store.program_path().display());
    Ok(())
}

fn cmd_plan(data_dir: PathBuf, week: u8, day: DayLabel, config: &Config) -> Result<()> {
    let tracker = open_tracker(data_dir, config)?;
    let plan = tracker.plan_day(week, day)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WEEK {} · {}", week, day);
    println!("╰─────────────────────────────────────────╯");

    if plan.is_empty() {
        println!("\n  Nothing programmed for this day.");
        return Ok(());
    }

    for item in &plan {
        display_plan_item(item);
    }
    println!();
    Ok(())
}

fn display_plan_item(item: &DayPlanItem) {
    let exercise = &item.exercise;
    println!();
    println!("  {} ({})", exercise.name, exercise.exercise_id);
    println!("    {} sets × {} reps", exercise.sets, exercise.reps);
    if let Some(ref cue) = exercise.cue {
        println!("    Cue: {}", cue);
    }

    match item.suggestion {
        Some(suggestion) => println!(
            "    → {} kg  {}",
            suggestion.weight,
            describe_reason(&suggestion.reason)
        ),
        None => println!(
            "    → First time? Pick a starting weight (aim for {} reps)",
            exercise.reps
        ),
    }
}

fn describe_reason(reason: &SuggestionReason) -> String {
    match reason {
        SuggestionReason::Deload => "📉 deload: two sessions below rep floor".to_string(),
        SuggestionReason::Increase { increment } => {
            format!("📈 +{} kg: all sets at rep ceiling", increment)
        }
        SuggestionReason::Hold => "➡ no change".to_string(),
    }
}

fn cmd_log(
    data_dir: PathBuf,
    week: u8,
    day: DayLabel,
    date: Option<NaiveDate>,
    mut sets: Vec<SetLog>,
    use_suggestions: bool,
    config: &Config,
) -> Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut tracker = open_tracker(data_dir, config)?;
    let program = tracker.store().program()?;

    for set in &sets {
        if !program.exercises.contains_key(&set.exercise_id) {
            return Err(Error::NotFound(format!(
                "Unknown exercise '{}'",
                set.exercise_id
            )));
        }
    }

    if use_suggestions {
        let given: HashSet<(String, u32)> = sets
            .iter()
            .map(|s| (s.exercise_id.clone(), s.set_number))
            .collect();

        for item in tracker.plan_day(week, day)? {
            let Some(suggestion) = item.suggestion else {
                println!(
                    "  Skipping {}: no history to suggest from",
                    item.exercise.name
                );
                continue;
            };
            for set_number in 1..=item.exercise.sets {
                if !given.contains(&(item.exercise.exercise_id.clone(), set_number)) {
                    sets.push(SetLog {
                        exercise_id: item.exercise.exercise_id.clone(),
                        set_number,
                        weight: suggestion.weight,
                        reps: item.exercise.reps.floor,
                    });
                }
            }
        }
    }

    let report = tracker.save_session(date, day, &sets)?;

    println!("\n{} · {}", date, day);
    for record in &report.records {
        let name = program
            .exercises
            .get(&record.exercise_id)
            .map(|e| e.name.as_str())
            .unwrap_or(&record.exercise_id);
        println!(
            "  {} set {}: {} kg × {}{}",
            name,
            record.set_number,
            record.weight,
            record.reps,
            if record.pr { "  🔥 PR" } else { "" }
        );
    }

    println!(
        "\n✓ Saved {} sets ({} PRs)",
        report.records.len(),
        report.prs().count()
    );
    Ok(())
}

fn cmd_show(data_dir: PathBuf, day: DayLabel, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let store = FileStore::open_seeded(data_dir)?;

    let Some(workout) = store.find_workout(date, day)? else {
        println!("No workout logged for {} {}.", date, day);
        return Ok(());
    };

    let program = store.program()?;
    let sets = store.list_sets_for_workout(workout.id)?;

    println!("{} · {} ({} sets)", date, day, sets.len());
    for set in &sets {
        let name = program
            .exercises
            .get(&set.exercise_id)
            .map(|e| e.name.as_str())
            .unwrap_or(&set.exercise_id);
        println!(
            "  {} set {}: {} kg × {}{}",
            name,
            set.set_number,
            set.weight,
            set.reps,
            if set.pr { "  🔥 PR" } else { "" }
        );
    }
    Ok(())
}

fn cmd_set_range(
    data_dir: PathBuf,
    week: u8,
    day: DayLabel,
    exercise_id: &str,
    floor: u32,
    ceiling: u32,
) -> Result<()> {
    gymlog_core::session::validate_week(week)?;

    let range = RepRange::normalized(floor, ceiling);
    if range.ceiling != ceiling {
        tracing::warn!(
            "Rep ceiling {} is below floor {}, using {}",
            ceiling,
            floor,
            range
        );
    }

    let mut store = FileStore::open_seeded(data_dir)?;
    let program = store.update_program(|program| {
        if !program.exercises.contains_key(exercise_id) {
            return Err(Error::NotFound(format!("Unknown exercise '{}'", exercise_id)));
        }
        let entry = program
            .entries
            .iter_mut()
            .find(|e| e.key() == (week, day, exercise_id))
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "'{}' is not programmed for week {} {}",
                    exercise_id, week, day
                ))
            })?;
        entry.reps = range;
        Ok(())
    })?;

    let name = program
        .exercises
        .get(exercise_id)
        .map(|e| e.name.as_str())
        .unwrap_or(exercise_id);
    println!("✓ {} week {} {}: {} reps", name, week, day, range);
    Ok(())
}

fn cmd_export(data_dir: PathBuf, out: &std::path::Path) -> Result<()> {
    let store = FileStore::open_seeded(data_dir)?;
    let count = export_sets_csv(&store, out)?;

    println!("✓ Exported {} sets to CSV", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_config(config: &Config, write: bool, path: Option<PathBuf>) -> Result<()> {
    if !write {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let path = path.unwrap_or_else(Config::default_config_path);
    if path.exists() {
        return Err(Error::Config(format!(
            "{} already exists, not overwriting",
            path.display()
        )));
    }

    config.save_to(&path)?;
    println!("✓ Wrote config to {}", path.display());
    Ok(())
}

fn cmd_compact(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let store = FileStore::open(&data_dir)?;

    if !store.journal_path().exists() {
        println!("No journal found - nothing to compact.");
        return Ok(());
    }

    let count = store.compact()?;
    println!("✓ Compacted journal to {} entries", count);

    if cleanup {
        let cleaned = gymlog_core::wal::cleanup_processed(&data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}

fn parse_day(s: &str) -> std::result::Result<DayLabel, String> {
    s.parse::<DayLabel>().map_err(|e| e.to_string())
}

/// Parse `EXERCISE:SET:WEIGHTxREPS`
fn parse_set(s: &str) -> std::result::Result<SetLog, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(exercise_id), Some(set_number), Some(load)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected EXERCISE:SET:WEIGHTxREPS, got '{}'", s));
    };

    let set_number: u32 = set_number
        .trim()
        .parse()
        .map_err(|_| format!("invalid set number '{}'", set_number))?;
    let (weight, reps) = load
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WEIGHTxREPS, got '{}'", load))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight '{}'", weight))?;
    let reps: u32 = reps
        .trim()
        .parse()
        .map_err(|_| format!("invalid reps '{}'", reps))?;

    let log = SetLog {
        exercise_id: exercise_id.trim().to_string(),
        set_number,
        weight,
        reps,
    };
    log.validate().map_err(|e| e.to_string())?;
    Ok(log)
}
