use clap::Parser;
use colored::Colorize;
use dialoguer::Select;
use pongtrack::save::Bundle;
use pongtrack::save::RESUME_WINDOW_MS;
use pongtrack::tracker::Duo;
use pongtrack::tracker::Outcome;
use pongtrack::tracker::Roster;
use pongtrack::tracker::Rules;
use pongtrack::tracker::Series;
use pongtrack::tracker::Shooter;
use pongtrack::tracker::Side;
use pongtrack::tracker::Solo;
use pongtrack::tracker::Turn;
use std::path::PathBuf;

/// Interactive beer-pong throw tracker.
#[derive(Parser)]
#[command(name = "pongtrack", about = "Track a beer-pong match from the terminal.")]
struct Args {
    /// Track a 1v1 match instead of 2v2.
    #[arg(long)]
    solo: bool,
    /// Games needed to take the match: best-of-N, positive odd.
    #[arg(long, default_value_t = 1)]
    best_of: u8,
    /// Home player names, comma separated.
    #[arg(long, value_delimiter = ',')]
    home: Vec<String>,
    /// Away player names, comma separated.
    #[arg(long, value_delimiter = ',')]
    away: Vec<String>,
    /// Mirror every state change to this JSON bundle, resuming from it when
    /// it exists and is fresh.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logs();
    let args = Args::parse();
    let name = |names: &[String], i: usize, fallback: &str| {
        names.get(i).cloned().unwrap_or_else(|| fallback.to_string())
    };
    if args.solo {
        let roster = Roster::solo(
            &name(&args.home, 0, "Home"),
            &name(&args.away, 0, "Away"),
        );
        run(
            open::<Solo>(args.best_of, roster, args.save.as_deref()),
            args.save,
        )
    } else {
        let roster = Roster::duo(
            [
                name(&args.home, 0, "Home 1").as_str(),
                name(&args.home, 1, "Home 2").as_str(),
            ],
            [
                name(&args.away, 0, "Away 1").as_str(),
                name(&args.away, 1, "Away 2").as_str(),
            ],
        );
        run(
            open::<Duo>(args.best_of, roster, args.save.as_deref()),
            args.save,
        )
    }
}

/// Resume from the bundle when it exists and passes the freshness window;
/// anything refused falls back to a fresh match.
fn open<R: Rules>(best_of: u8, roster: Roster, path: Option<&std::path::Path>) -> Series<R> {
    let fresh = Series::new(best_of, roster);
    let Some(path) = path else { return fresh };
    let Ok(json) = std::fs::read_to_string(path) else {
        return fresh;
    };
    let now = chrono::Utc::now().timestamp_millis();
    Bundle::from_json(&json)
        .and_then(|bundle| bundle.restore(now, RESUME_WINDOW_MS))
        .inspect(|_| log::info!("resumed match from {}", path.display()))
        .inspect_err(|e| log::warn!("starting fresh: {}", e))
        .unwrap_or(fresh)
}

#[derive(Clone, Copy)]
enum Step {
    Toss(Outcome, Shooter),
    Pick(Side),
    Undo,
    Next,
    Quit,
}

fn run<R: Rules>(mut series: Series<R>, path: Option<PathBuf>) -> anyhow::Result<()> {
    loop {
        banner(&series);
        let (labels, steps) = choices(&series);
        let pick = Select::new()
            .with_prompt("next")
            .items(labels.as_slice())
            .default(0)
            .report(false)
            .interact()?;
        match steps[pick] {
            Step::Toss(outcome, shooter) => series.toss(outcome, shooter),
            Step::Pick(side) => series.select_starting_side(side),
            Step::Undo => series.undo(),
            Step::Next => series.advance(),
            Step::Quit => break,
        }
        if let Some(ref path) = path {
            std::fs::write(path, Bundle::capture(&series).to_json()?)?;
        }
    }
    farewell(&series);
    Ok(())
}

fn choices<R: Rules>(series: &Series<R>) -> (Vec<String>, Vec<Step>) {
    let mut labels = Vec::new();
    let mut steps = Vec::new();
    match series.turn() {
        Turn::Pending => {
            for side in [series.proposed(), series.proposed().flip()] {
                labels.push(format!("{} throws first", side));
                steps.push(Step::Pick(side));
            }
        }
        Turn::Choice(side) => {
            for slot in 0..R::roster() {
                let shooter = Shooter::new(side, slot);
                if !series.game().state().may_throw(shooter) {
                    continue;
                }
                labels.push(format!("{} sinks one", series.roster().label(shooter)));
                steps.push(Step::Toss(Outcome::Hit, shooter));
                labels.push(format!("{} misses", series.roster().label(shooter)));
                steps.push(Step::Toss(Outcome::Miss, shooter));
            }
        }
        Turn::Terminal => {
            if !series.over() {
                labels.push("next game".to_string());
                steps.push(Step::Next);
            }
        }
    }
    if !series.game().log().is_empty() || !series.records().is_empty() {
        labels.push("undo".to_string());
        steps.push(Step::Undo);
    }
    labels.push("quit".to_string());
    steps.push(Step::Quit);
    (labels, steps)
}

fn banner<R: Rules>(series: &Series<R>) {
    let (home, away) = series.game().score();
    let (home_wins, away_wins) = series.wins();
    let score = format!("{:>2} - {:<2}", home, away).bold();
    let games = match series.best_of() {
        1 => String::new(),
        _ => format!("  games {}-{} (best of {})", home_wins, away_wins, series.best_of()),
    };
    println!();
    println!(
        "{} {}{}",
        format!("game {}", series.number()).dimmed(),
        score,
        games.dimmed()
    );
    match series.turn() {
        Turn::Pending => println!("{}", "pick who throws first".yellow()),
        Turn::Choice(side) => println!("{}", format!("{} to throw", side).green()),
        Turn::Terminal => match series.game().winner() {
            Some(side) => println!("{}", format!("game to {}", side).red().bold()),
            None => {}
        },
    }
}

fn farewell<R: Rules>(series: &Series<R>) {
    for (shooter, line) in series.totals() {
        println!(
            "{:>12}  {}",
            series.roster().label(shooter),
            line.to_string().dimmed()
        );
    }
    if let Some(side) = series.winner() {
        println!("{}", format!("match to {}", side).red().bold());
    }
}

/// Dual logging: terminal at info, timestamped file at debug.
fn logs() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
