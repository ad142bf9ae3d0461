use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stride_core::*;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Readiness-driven sprint training companion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the guided training session (default)
    Session {
        /// Force today to be a recovery day
        #[arg(long)]
        break_day: bool,

        /// Auto-complete with canned inputs (for testing)
        #[arg(long)]
        auto: bool,
    },

    /// Show today's prescription without logging anything
    Plan {
        /// Sleep quality rating, 1-5
        #[arg(long, default_value_t = 4)]
        sleep: u8,

        /// Body feel: good, okay, tight
        #[arg(long, default_value = "good")]
        feel: String,

        /// Comma-separated pain areas (e.g. hamstring,calf)
        #[arg(long)]
        pain: Option<String>,
    },

    /// Score a workout template file (flat or block layout JSON)
    Load {
        /// Path to the workout template
        file: PathBuf,
    },

    /// List stored personal bests
    Pbs,

    /// Show recent sessions
    History {
        /// Days of history to include
        #[arg(long, default_value_t = 14)]
        days: i64,
    },

    /// Roll up WAL sessions to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

struct DataPaths {
    wal: PathBuf,
    state: PathBuf,
    csv: PathBuf,
    wal_dir: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            wal: wal_dir.join("sessions.wal"),
            state: wal_dir.join("state.json"),
            csv: data_dir.join("sessions.csv"),
            wal_dir,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    stride_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Session { break_day, auto }) => {
            cmd_session(data_dir, break_day, auto, &config)
        }
        Some(Commands::Plan { sleep, feel, pain }) => {
            cmd_plan(data_dir, sleep, &feel, pain.as_deref(), &config)
        }
        Some(Commands::Load { file }) => cmd_load(&file),
        Some(Commands::Pbs) => cmd_pbs(data_dir),
        Some(Commands::History { days }) => cmd_history(data_dir, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, cleanup),
        None => {
            // Default to the guided session
            cmd_session(data_dir, false, false, &config)
        }
    }
}

fn cmd_session(data_dir: PathBuf, break_day: bool, auto: bool, config: &Config) -> Result<()> {
    let paths = DataPaths::new(&data_dir);
    std::fs::create_dir_all(&paths.wal_dir)?;

    let catalog = build_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let athlete = AthleteState::load(&paths.state)?;
    let mut flow = SessionFlow::new(
        athlete.sessions_completed,
        &catalog,
        athlete.personal_bests.clone(),
        config,
    );

    // Check-in
    let input = if auto {
        ReadinessInput {
            sleep_rating: 4,
            body_feel: BodyFeel::Good,
            pain_areas: vec![],
        }
    } else {
        prompt_checkin()?
    };

    let forced_break = if break_day { Some(true) } else { None };
    flow.handle(SessionEvent::CheckinSubmitted { input, forced_break })?;

    println!();
    println!(
        "  Readiness: {}/100",
        flow.readiness_score().unwrap_or(0)
    );

    // Break-day gate
    if flow.step() == Step::BreakDay {
        display_break_day();

        let override_break = if auto {
            false
        } else {
            prompt_break_override()?
        };

        if override_break {
            flow.handle(SessionEvent::BreakOverridden { confirmed: true })?;
            println!("\n  Break overridden - train light and listen to your body.");
        } else {
            let mut recorder = JsonlRecorder::new(&paths.wal, &paths.state);
            let summary = flow.submit(&mut recorder)?;
            println!("\n✓ Recovery day logged (session {}).", summary.result.session_index + 1);
            return Ok(());
        }
    }

    // Focus
    display_focus(flow.readiness_score().unwrap_or(0));
    if !auto {
        prompt_enter("Press Enter to acknowledge the focus")?;
    }
    flow.handle(SessionEvent::FocusAcknowledged)?;

    // Drills
    display_drills(&catalog);
    if auto {
        let ids: Vec<String> = catalog.drills.iter().map(|d| d.id.clone()).collect();
        for id in ids {
            flow.toggle_drill(&id)?;
        }
    } else {
        prompt_drill_loop(&mut flow)?;
    }
    flow.handle(SessionEvent::DrillsFinished)?;

    // Sprint efforts
    display_prescriptions(&flow, &catalog);
    if !auto {
        prompt_enter("Press Enter once your sprints are done")?;
    }
    flow.handle(SessionEvent::SprintsAcknowledged)?;

    // Log results
    let keys: Vec<String> = flow
        .prescriptions()
        .iter()
        .map(|p| p.distance_key.clone())
        .collect();

    if auto {
        for key in &keys {
            let meters = catalog.distance(key).map(|d| d.meters).unwrap_or(0);
            let canned = format!("{:.2}", f64::from(meters) * 0.145);
            flow.record_time(key, &canned)?;
        }
        flow.set_body_feel_after(BodyFeel::Okay)?;
        flow.set_rpe(6)?;
    } else {
        for key in &keys {
            prompt_times(&mut flow, key)?;
        }
        flow.set_body_feel_after(prompt_body_feel("How does your body feel now?")?)?;
        flow.set_rpe(prompt_rpe()?)?;
    }

    let mut recorder = JsonlRecorder::new(&paths.wal, &paths.state);
    let summary = flow.submit(&mut recorder)?;

    println!("\n✓ Session logged!");
    if summary.new_bests.is_empty() {
        println!("  No new personal bests today.");
    } else {
        for best in &summary.new_bests {
            match best.previous {
                Some(previous) => println!(
                    "  ★ New personal best: {} in {:.2}s (was {:.2}s)",
                    best.distance_key, best.seconds, previous
                ),
                None => println!(
                    "  ★ First recorded best: {} in {:.2}s",
                    best.distance_key, best.seconds
                ),
            }
        }
    }

    Ok(())
}

fn cmd_plan(
    data_dir: PathBuf,
    sleep: u8,
    feel: &str,
    pain: Option<&str>,
    config: &Config,
) -> Result<()> {
    let paths = DataPaths::new(&data_dir);
    let catalog = build_default_catalog();
    let athlete = AthleteState::load(&paths.state)?;

    let input = ReadinessInput {
        sleep_rating: sleep,
        body_feel: parse_body_feel(feel),
        pain_areas: pain.map(parse_pain_areas).unwrap_or_default(),
    };

    let score = score_readiness(&input);
    let is_break = break_day(score, &input, None, &config.readiness);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY'S PLAN (dry run)");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Readiness: {}/100", score);
    println!("  Session:   #{}", athlete.sessions_completed + 1);

    if is_break {
        println!();
        println!("  Recovery day. No sprinting today.");
        return Ok(());
    }

    let prescriptions = sprint_reps(
        athlete.sessions_completed,
        score,
        &catalog.distances,
        &config.prescription,
        &config.readiness,
    );

    println!();
    for prescription in &prescriptions {
        let label = catalog
            .distance(&prescription.distance_key)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| prescription.distance_key.clone());
        let barefoot = if prescription.barefoot_eligible {
            "  (barefoot ok)"
        } else {
            ""
        };
        println!("  → {} x {}{}", prescription.reps, label, barefoot);
    }

    println!("\n[Dry run - not logging session]");
    Ok(())
}

fn cmd_load(file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let plan: WorkoutPlan = serde_json::from_str(&contents)?;

    let total = workout_load(&plan);
    let tier = tier_of(total);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT LOAD");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if let WorkoutPlan::Blocks { blocks } = &plan {
        for block in blocks {
            let load = block_load(block);
            println!("  {:<24} {:>8.1}", block.name, load);
        }
        println!();
    }

    println!("  Total:  {:.1}  [{} / {}]", total, tier.label, tier.color);

    match fascia_bias(&plan) {
        Some(bias) => println!("  Tissue bias: {:?}", bias),
        None => println!("  Tissue bias: untagged"),
    }

    Ok(())
}

fn cmd_pbs(data_dir: PathBuf) -> Result<()> {
    let paths = DataPaths::new(&data_dir);
    let athlete = AthleteState::load(&paths.state)?;

    if athlete.personal_bests.is_empty() {
        println!("No personal bests recorded yet.");
        return Ok(());
    }

    println!("\nPersonal bests:");
    let mut bests: Vec<_> = athlete.personal_bests.iter().collect();
    bests.sort_by(|a, b| a.0.cmp(b.0));
    for (key, seconds) in bests {
        println!("  {:<6} {:.2}s", key, seconds);
    }

    Ok(())
}

fn cmd_history(data_dir: PathBuf, days: i64) -> Result<()> {
    let paths = DataPaths::new(&data_dir);
    let results = load_recent_results(&paths.wal, &paths.csv, days)?;

    if results.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    println!("\nLast {} days ({} sessions):", days, results.len());
    for result in &results {
        let kind = if result.is_break_day {
            "recovery"
        } else {
            "sprints"
        };

        let mut bests: Vec<String> = result
            .times
            .iter()
            .filter_map(|(key, times)| {
                times
                    .iter()
                    .copied()
                    .filter(|t| *t > 0.0)
                    .min_by(|a, b| a.total_cmp(b))
                    .map(|t| format!("{} {:.2}s", key, t))
            })
            .collect();
        bests.sort();

        println!(
            "  {}  readiness {:>3}  {:<8} {}",
            result.performed_at.format("%Y-%m-%d"),
            result.readiness,
            kind,
            bests.join(", ")
        );
    }

    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let paths = DataPaths::new(&data_dir);

    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = stride_core::csv_rollup::results_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = stride_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

// ============================================================================
// Display helpers
// ============================================================================

fn display_break_day() {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  RECOVERY DAY");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Your body is asking for rest. Easy movement only:");
    println!("  a walk, light stretching, plenty of water.");
    println!();
}

fn display_focus(readiness: u8) {
    let focus = if readiness >= 85 {
        "Max intent today: full recoveries, attack every rep."
    } else if readiness >= 60 {
        "Crisp mechanics: tall posture, relaxed jaw, fast ground contact."
    } else {
        "Reduced volume today: smooth accelerations, stop while fresh."
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY'S FOCUS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", focus);
    println!();
}

fn display_drills(catalog: &Catalog) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WARM-UP DRILLS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    for drill in &catalog.drills {
        println!("  [{}] {}", drill.id, drill.name);
        println!("      {}", drill.cue);
    }
    println!();
}

fn display_prescriptions(flow: &SessionFlow, catalog: &Catalog) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SPRINT EFFORTS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    for prescription in flow.prescriptions() {
        let label = catalog
            .distance(&prescription.distance_key)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| prescription.distance_key.clone());
        let barefoot = if prescription.barefoot_eligible {
            "  (barefoot ok)"
        } else {
            ""
        };
        println!("  → {} x {}{}", prescription.reps, label, barefoot);
    }
    println!();
    println!("  Walk back full recovery between reps.");
    println!();
}

// ============================================================================
// Prompt helpers
// ============================================================================

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_enter(message: &str) -> Result<()> {
    println!("─────────────────────────────────────────");
    print!("{} > ", message);
    io::stdout().flush()?;
    read_line()?;
    Ok(())
}

fn prompt_checkin() -> Result<ReadinessInput> {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  MORNING CHECK-IN");
    println!("╰─────────────────────────────────────────╯");
    println!();

    print!("  Sleep quality 1-5 > ");
    io::stdout().flush()?;
    let sleep_rating = read_line()?.parse::<u8>().unwrap_or(3).clamp(1, 5);

    let body_feel = prompt_body_feel("How does your body feel?")?;

    print!("  Any pain? (comma-separated areas, Enter for none) > ");
    io::stdout().flush()?;
    let raw = read_line()?;
    let pain_areas = if raw.is_empty() {
        vec![]
    } else {
        parse_pain_areas(&raw)
    };

    Ok(ReadinessInput {
        sleep_rating,
        body_feel,
        pain_areas,
    })
}

fn prompt_body_feel(question: &str) -> Result<BodyFeel> {
    print!("  {} (g)ood / (o)kay / (t)ight > ", question);
    io::stdout().flush()?;
    Ok(parse_body_feel(&read_line()?))
}

fn prompt_break_override() -> Result<bool> {
    println!("  Type 'train' to override and train anyway,");
    print!("  or press Enter to take the recovery day > ");
    io::stdout().flush()?;
    Ok(read_line()?.eq_ignore_ascii_case("train"))
}

fn prompt_drill_loop(flow: &mut SessionFlow) -> Result<()> {
    loop {
        print!("  Toggle a drill by id, or Enter to continue > ");
        io::stdout().flush()?;
        let input = read_line()?;
        if input.is_empty() {
            return Ok(());
        }
        match flow.toggle_drill(&input) {
            Ok(true) => println!("  ✓ {}", input),
            Ok(false) => println!("  ○ {}", input),
            Err(e) => eprintln!("  {}", e),
        }
    }
}

fn prompt_times(flow: &mut SessionFlow, distance_key: &str) -> Result<()> {
    print!(
        "  Times for {} (comma-separated seconds, 't' to use the watch, Enter to skip) > ",
        distance_key
    );
    io::stdout().flush()?;
    let raw = read_line()?;

    if raw.is_empty() {
        // An explicit skip still marks the distance as addressed
        flow.record_time(distance_key, "0")?;
        return Ok(());
    }

    if raw.eq_ignore_ascii_case("t") {
        return prompt_stopwatch(flow, distance_key);
    }

    for entry in raw.split(',') {
        let seconds = flow.record_time(distance_key, entry)?;
        if seconds == 0.0 {
            eprintln!("  Ignored invalid entry '{}'", entry.trim());
        }
    }
    Ok(())
}

fn prompt_stopwatch(flow: &mut SessionFlow, distance_key: &str) -> Result<()> {
    let mut watch = Stopwatch::new();

    prompt_enter("Press Enter on the gun")?;
    watch.start();

    print!("  Running... Enter at the line, 'x' to discard > ");
    io::stdout().flush()?;
    if read_line()?.eq_ignore_ascii_case("x") {
        watch.cancel();
        // Distance still needs an entry; a zero keeps it out of the bests
        flow.record_time(distance_key, "0")?;
        println!("  Timing discarded.");
        return Ok(());
    }

    if let Some(seconds) = watch.stop() {
        let recorded = flow.record_time(distance_key, &format!("{:.2}", seconds))?;
        flow.set_timing_method(distance_key, TimingMethod::Stopwatch)?;
        println!("  Recorded {:.2}s", recorded);
    }
    Ok(())
}

fn prompt_rpe() -> Result<u8> {
    print!("  Session RPE 1-10 > ");
    io::stdout().flush()?;
    Ok(read_line()?.parse::<u8>().unwrap_or(5))
}

// ============================================================================
// Parse helpers
// ============================================================================

fn parse_body_feel(s: &str) -> BodyFeel {
    match s.to_lowercase().as_str() {
        "g" | "good" => BodyFeel::Good,
        "t" | "tight" => BodyFeel::Tight,
        "o" | "okay" | "ok" => BodyFeel::Okay,
        other => {
            if !other.is_empty() {
                eprintln!("Unknown body feel '{}', assuming okay.", other);
            }
            BodyFeel::Okay
        }
    }
}

fn parse_pain_areas(s: &str) -> Vec<PainArea> {
    s.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|area| match area.to_lowercase().as_str() {
            "hamstring" => PainArea::Hamstring,
            "calf" => PainArea::Calf,
            "quad" => PainArea::Quad,
            "groin" => PainArea::Groin,
            "knee" => PainArea::Knee,
            "ankle" => PainArea::Ankle,
            "foot" => PainArea::Foot,
            "shin" => PainArea::Shin,
            "lower_back" | "back" => PainArea::LowerBack,
            other => PainArea::Other(other.to_string()),
        })
        .collect()
}
