//! Command line front end for the Life engine

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use life_engine::{
    config::{CliOverrides, OutputFormat, Settings},
    engine::{Action, Controls, LifeEngine},
    game_of_life::{create_example_grids, create_random, load_pattern, save_grid, GameOfLifeRules},
    utils::{GridFormatter, Palette},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "life_engine")]
#[command(about = "Conway's Game of Life on a fixed board")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Board options shared by the simulation commands
#[derive(Args, Debug, Default)]
struct BoardArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Initial pattern file (overrides config)
    #[arg(short, long)]
    pattern: Option<PathBuf>,

    /// Start from a random board
    #[arg(long)]
    random: bool,

    /// Seed for random boards
    #[arg(long)]
    seed: Option<u64>,

    /// Board rows (overrides config)
    #[arg(long)]
    rows: Option<usize>,

    /// Board columns (overrides config)
    #[arg(long)]
    cols: Option<usize>,

    /// Tick interval in milliseconds (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Probability of a cell starting alive on random boards (overrides config)
    #[arg(long)]
    density: Option<f64>,
}

impl BoardArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            rows: self.rows,
            cols: self.cols,
            tick_interval_ms: self.interval,
            alive_probability: self.density,
            seed: self.seed,
            random_start: self.random,
            pattern_file: self.pattern.clone(),
        }
    }

    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_or_default(&self.config)
            .with_context(|| format!("Failed to load config from {}", self.config.display()))?;
        settings.merge_with_cli(&self.overrides());
        settings.validate()
            .context("Configuration validation failed")?;
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and print every generation
    Run {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of generations to run
        #[arg(short, long, default_value_t = 100)]
        generations: u64,

        /// Save the final board (format from extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print frames one after another instead of redrawing in place
        #[arg(long)]
        no_clear: bool,
    },

    /// Interactive session driving the board's controls from stdin
    Play {
        #[command(flatten)]
        board: BoardArgs,
    },

    /// Step a pattern synchronously and print the result
    Step {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Pattern file
        #[arg(short = 'p', long)]
        pattern: PathBuf,

        /// Number of generations
        #[arg(short = 'n', long, default_value_t = 1)]
        generations: usize,

        /// Save the result
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (defaults to the extension, then the config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Show every intermediate generation
        #[arg(long)]
        show_evolution: bool,
    },

    /// Write a random board to a file
    Random {
        #[command(flatten)]
        board: BoardArgs,

        /// Output file (format from extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create example configuration and pattern files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Render a pattern file as SVG
    Export {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Pattern file
        #[arg(short, long)]
        pattern: PathBuf,

        /// SVG output path
        #[arg(short, long)]
        output: PathBuf,

        /// Cell edge length in pixels (overrides config)
        #[arg(long)]
        cell_size: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { board, generations, output, no_clear } => {
            run_command(board, generations, output, no_clear)
        }
        Commands::Play { board } => play_command(board),
        Commands::Step { config, pattern, generations, output, format, show_evolution } => {
            let settings = Settings::load_or_default(&config)
                .with_context(|| format!("Failed to load config from {}", config.display()))?;
            step_command(&settings, pattern, generations, output, format, show_evolution)
        }
        Commands::Random { board, output } => random_command(board, output),
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Export { config, pattern, output, cell_size } => {
            export_command(config, pattern, output, cell_size)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn output_format(path: &Path, settings: &Settings) -> OutputFormat {
    OutputFormat::from_path(path).unwrap_or(settings.output.format)
}

fn run_command(
    board: BoardArgs,
    generations: u64,
    output: Option<PathBuf>,
    no_clear: bool,
) -> Result<()> {
    let settings = board.settings()?;
    let mut engine = LifeEngine::from_settings(&settings)
        .context("Failed to create engine")?;
    engine.set_max_generations(Some(generations));
    let palette = Palette::detect();

    println!("{}", palette.info(&format!(
        "▶ Running {} generations on a {}x{} board",
        generations, settings.grid.rows, settings.grid.cols
    )));
    print_frame(&palette.frame(&engine.frame()), no_clear);

    let start_time = Instant::now();
    let receiver = engine.subscribe();
    if generations > 0 {
        engine.start()?;
        while let Some(frame) = engine.next_frame(&receiver) {
            print_frame(&palette.frame(&frame), no_clear);
            if frame.generation >= generations {
                break;
            }
        }
    }
    engine.stop()?;

    let final_grid = engine.snapshot();
    println!("{}", palette.success(&format!(
        "✅ Finished at generation {} in {:.3}s ({} alive)",
        engine.generation(),
        start_time.elapsed().as_secs_f64(),
        final_grid.living_count()
    )));

    if let Some(path) = output {
        save_grid(&final_grid, &path, output_format(&path, &settings), settings.grid.cell_size)?;
        println!("Saved final board to {}", path.display());
    }

    Ok(())
}

fn print_frame(rendered: &str, no_clear: bool) {
    if !no_clear {
        // home the cursor and clear the screen
        print!("\x1b[H\x1b[2J");
    }
    println!("{}", rendered);
}

/// A line of input in an interactive session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayCommand {
    Control(Action),
    Show,
    Help,
    Quit,
}

fn parse_play_command(line: &str) -> Result<PlayCommand> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["start"] | ["stop"] | ["run"] => PlayCommand::Control(Action::ToggleRun),
        ["random"] | ["r"] => PlayCommand::Control(Action::Random),
        ["clear"] | ["c"] => PlayCommand::Control(Action::Clear),
        ["toggle" | "t", row, col] => {
            let row = row.parse().with_context(|| format!("Invalid row '{}'", row))?;
            let col = col.parse().with_context(|| format!("Invalid column '{}'", col))?;
            PlayCommand::Control(Action::ClickCell { row, col })
        }
        ["show"] | ["s"] | [] => PlayCommand::Show,
        ["help"] | ["h"] | ["?"] => PlayCommand::Help,
        ["quit"] | ["q"] | ["exit"] => PlayCommand::Quit,
        _ => anyhow::bail!("Unknown command '{}'", line.trim()),
    };
    Ok(command)
}

fn controls_line(controls: &Controls, palette: Palette) -> String {
    let button = |label: &str, enabled: bool| {
        if enabled { format!("[{}]", label) } else { format!("({} disabled)", label) }
    };
    format!(
        "{} {} {} {}",
        palette.run_state(controls.engine().is_running()),
        button(controls.run_label(), true),
        button("Random", controls.random_enabled()),
        button("Clear", controls.clear_enabled())
    )
}

const PLAY_HELP: &str = "\
Commands:
  start | stop      toggle the simulation
  random            randomize the board (stopped only)
  clear             clear the board (stopped only)
  toggle ROW COL    flip one cell (stopped only)
  show              print the current board
  quit              leave";

fn play_command(board: BoardArgs) -> Result<()> {
    let settings = board.settings()?;
    let mut controls = Controls::new(LifeEngine::from_settings(&settings)?);
    let palette = Palette::detect();

    println!("{}", palette.info("🎮 Interactive session, type 'help' for commands"));
    println!("{}", palette.frame(&controls.engine().frame()));
    println!("{}", controls_line(&controls, palette));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        match parse_play_command(&line) {
            Ok(PlayCommand::Quit) => break,
            Ok(PlayCommand::Help) => println!("{}", PLAY_HELP),
            Ok(PlayCommand::Show) => {
                println!("{}", palette.frame(&controls.engine().frame()));
            }
            Ok(PlayCommand::Control(action)) => match controls.dispatch(action) {
                Ok(outcome) => println!("{}", palette.outcome(&outcome)),
                Err(e) => println!("{}", palette.error(&format!("{:#}", e))),
            },
            Err(e) => println!("{}", palette.error(&format!("{:#}", e))),
        }
        println!("{}", controls_line(&controls, palette));
        io::stdout().flush().ok();
    }

    controls.into_engine().stop()?;
    Ok(())
}

fn step_command(
    settings: &Settings,
    pattern: PathBuf,
    generations: usize,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    show_evolution: bool,
) -> Result<()> {
    let mut grid = load_pattern(&pattern)
        .with_context(|| format!("Failed to load pattern from {}", pattern.display()))?;

    if show_evolution {
        println!("Generation 0:");
        println!("{}", GridFormatter::format_grid_compact(&grid));
    }
    for generation in 1..=generations {
        grid = GameOfLifeRules::step(&grid);
        if show_evolution {
            println!("Generation {}:", generation);
            println!("{}", GridFormatter::format_grid_compact(&grid));
        }
    }

    if !show_evolution {
        println!("After {} generation(s):", generations);
        println!("{}", GridFormatter::format_grid_with_coords(&grid));
    }
    println!("Living cells: {}", grid.living_count());

    if let Some(path) = output {
        let format = format.unwrap_or_else(|| output_format(&path, settings));
        save_grid(&grid, &path, format, settings.grid.cell_size)?;
        println!("{}", Palette::detect().success(&format!("Saved to {}", path.display())));
    }

    Ok(())
}

fn random_command(board: BoardArgs, output: PathBuf) -> Result<()> {
    let settings = board.settings()?;
    let mut rng = match settings.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let grid = create_random(
        settings.grid.rows,
        settings.grid.cols,
        settings.simulation.alive_probability,
        &mut rng,
    )?;
    save_grid(&grid, &output, output_format(&output, &settings), settings.grid.cell_size)?;

    println!("{}", Palette::detect().success(&format!(
        "Wrote {}x{} random board ({} alive) to {}",
        grid.rows(), grid.cols(), grid.living_count(), output.display()
    )));
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let palette = Palette::detect();
    println!("{}", palette.info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let patterns_dir = directory.join("patterns");

    for dir in [&config_dir, &patterns_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default().to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_grids(&patterns_dir)
        .context("Failed to create example patterns")?;
    println!("Created example patterns in: {}", patterns_dir.display());

    let examples_dir = config_dir.join("examples");

    let mut glider = Settings::default();
    glider.grid.rows = 20;
    glider.grid.cols = 20;
    glider.input.initial_pattern_file = Some(PathBuf::from("patterns/glider.txt"));
    glider.input.pattern_offset = (1, 1);
    glider.to_file(&examples_dir.join("glider.yaml"))?;

    let mut random = Settings::default();
    random.simulation.random_start = true;
    random.simulation.seed = Some(42);
    random.to_file(&examples_dir.join("random.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", palette.success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your patterns to {}", patterns_dir.display());
    println!("3. Run: cargo run -- run --config config/examples/glider.yaml");

    Ok(())
}

fn export_command(
    config_path: PathBuf,
    pattern: PathBuf,
    output: PathBuf,
    cell_size: Option<usize>,
) -> Result<()> {
    let settings = Settings::load_or_default(&config_path)?;
    let cell_size = cell_size.unwrap_or(settings.grid.cell_size);
    if cell_size == 0 {
        anyhow::bail!("Cell size must be positive");
    }

    let grid = load_pattern(&pattern)
        .with_context(|| format!("Failed to load pattern from {}", pattern.display()))?;
    save_grid(&grid, &output, OutputFormat::Svg, cell_size)?;

    println!("{}", Palette::detect().success(&format!(
        "Rendered {}x{} board at {}px per cell to {}",
        grid.rows(), grid.cols(), cell_size, output.display()
    )));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_engine::game_of_life::load_grid_from_file;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "life_engine",
            "run",
            "--config", "test.yaml",
            "--generations", "5",
            "--random",
            "--seed", "3",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["life_engine", "step", "-p", "glider.txt", "-n", "4"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from([
            "life_engine", "step", "-p", "glider.txt", "-o", "out", "--format", "svg",
        ]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Step { format: Some(OutputFormat::Svg), .. })
        ));
        assert!(Cli::try_parse_from(["life_engine", "step", "-p", "g.txt", "--format", "png"]).is_err());

        assert!(Cli::try_parse_from(["life_engine", "random"]).is_err());
    }

    #[test]
    fn test_parse_play_command() {
        assert_eq!(parse_play_command("start").unwrap(), PlayCommand::Control(Action::ToggleRun));
        assert_eq!(parse_play_command(" random ").unwrap(), PlayCommand::Control(Action::Random));
        assert_eq!(
            parse_play_command("toggle 3 14").unwrap(),
            PlayCommand::Control(Action::ClickCell { row: 3, col: 14 })
        );
        assert_eq!(parse_play_command("").unwrap(), PlayCommand::Show);
        assert_eq!(parse_play_command("q").unwrap(), PlayCommand::Quit);
        assert!(parse_play_command("toggle -1 2").is_err());
        assert!(parse_play_command("dance").is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("config/examples/glider.yaml").exists());
        assert!(temp_dir.path().join("patterns/glider.txt").exists());
    }

    #[test]
    fn test_random_and_step_commands() {
        let temp_dir = tempdir().unwrap();
        let board_path = temp_dir.path().join("board.txt");
        let stepped_path = temp_dir.path().join("stepped.txt");

        let board = BoardArgs {
            config: temp_dir.path().join("missing.yaml"),
            seed: Some(9),
            rows: Some(10),
            cols: Some(12),
            ..Default::default()
        };
        random_command(board, board_path.clone()).unwrap();

        let grid = load_grid_from_file(&board_path).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (10, 12));

        step_command(&Settings::default(), board_path, 2, Some(stepped_path.clone()), None, false)
            .unwrap();
        let stepped = load_grid_from_file(&stepped_path).unwrap();
        assert_eq!(stepped, GameOfLifeRules::evolve_generations(grid, 2));
    }

    #[test]
    fn test_step_command_uses_format_and_cell_size() {
        let temp_dir = tempdir().unwrap();
        let pattern = temp_dir.path().join("blinker.txt");
        let output = temp_dir.path().join("blinker.out");
        std::fs::write(&pattern, "00000\n00000\n01110\n00000\n00000\n").unwrap();

        let mut settings = Settings::default();
        settings.grid.cell_size = 3;
        step_command(&settings, pattern.clone(), 1, Some(output.clone()), Some(OutputFormat::Svg), false)
            .unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#"width="15" height="15""#));

        // without --format, an unknown extension falls back to the config
        settings.output.format = OutputFormat::Json;
        step_command(&settings, pattern, 1, Some(output.clone()), None, false).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(serde_json::from_str::<life_engine::Grid>(&content).is_ok());
    }

    #[test]
    fn test_export_command() {
        let temp_dir = tempdir().unwrap();
        let pattern = temp_dir.path().join("blinker.txt");
        let svg = temp_dir.path().join("blinker.svg");
        std::fs::write(&pattern, "000\n111\n000\n").unwrap();

        export_command(temp_dir.path().join("missing.yaml"), pattern, svg.clone(), Some(4)).unwrap();
        let content = std::fs::read_to_string(svg).unwrap();
        assert!(content.contains(r#"width="12" height="12""#));
    }
}
