use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use floorpath;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct BuildingLoadError(String, #[source] floorpath::map::Error);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GridFormat {
    Auto,
    Npy,
    NpyGz,
    NpyBz2,
}

impl From<GridFormat> for floorpath::map::GridFormat {
    fn from(value: GridFormat) -> Self {
        match value {
            GridFormat::Auto => floorpath::map::GridFormat::Unknown,
            GridFormat::Npy => floorpath::map::GridFormat::Npy,
            GridFormat::NpyGz => floorpath::map::GridFormat::NpyGz,
            GridFormat::NpyBz2 => floorpath::map::GridFormat::NpyBz2,
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// Directory with the preprocessed floor plans
    #[arg(long, default_value = "floorPlans")]
    base_dir: PathBuf,

    /// Format of the floor grid files
    #[arg(long, value_enum, default_value_t = GridFormat::Auto)]
    grid_format: GridFormat,

    /// Maximum number of positions expanded by the search
    #[arg(long, default_value_t = floorpath::DEFAULT_STEP_LIMIT)]
    step_limit: usize,

    /// Print the cell-by-cell path instead of the simplified waypoints
    #[arg(long)]
    raw: bool,

    /// Also load all buildings reachable through entrance connections
    #[arg(long)]
    with_connected: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Code of the start building, e.g. "se06"
    start_building: String,

    /// Room number or entrance label of the start location
    start_location: String,

    /// Code of the goal building
    goal_building: String,

    /// Room number or entrance label of the goal location
    goal_location: String,
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let start_building = cli.start_building.trim().to_lowercase();
    let goal_building = cli.goal_building.trim().to_lowercase();

    let repo = load_repository(cli, &[start_building.as_str(), goal_building.as_str()])?;
    for dangling in repo.dangling_connections() {
        log::warn!("{}", dangling);
    }

    let route = floorpath::find_route(
        &repo,
        (start_building.as_str(), cli.start_location.as_str()),
        (goal_building.as_str(), cli.goal_location.as_str()),
        cli.step_limit,
    )?;

    let path = if cli.raw { &route.raw } else { &route.waypoints };
    println!("{}", serde_json::to_string(path)?);
    Ok(())
}

fn load_repository(cli: &Cli, codes: &[&str]) -> Result<floorpath::Repository, BuildingLoadError> {
    let mut repo = floorpath::Repository::default();
    let options = floorpath::map::Options {
        grid_format: cli.grid_format.into(),
    };

    if cli.with_connected {
        floorpath::map::load_with_connections(&mut repo, &options, &cli.base_dir, codes)
            .map_err(|e| BuildingLoadError(codes.join(", "), e))?;
    } else {
        for &code in codes {
            if !repo.contains(code) {
                repo.load_building(&cli.base_dir, code, &options)
                    .map_err(|e| BuildingLoadError(code.to_string(), e))?;
            }
        }
    }

    Ok(repo)
}
