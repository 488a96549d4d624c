use anyhow::Result;
use clap::{Parser, Subcommand};
use gc_core::bootstrap::{build_standard_world, ScheduleTuning, WorldSetupFlags};

#[derive(Subcommand, Debug, Clone)]
enum Scenario {
    /// Low-population start: two harvesters and a spawner worker, no buildings.
    LowPop,
    /// A running sawmill turning logs into lumber.
    Sawmill,
    /// A house accumulating logs to spawn a new villager.
    House,
    /// Two construction sites under way.
    Constructions,
    /// Every optional building at once.
    Full,
}

#[derive(Parser, Debug)]
#[command(name = "settler-camp", version, about = "Settler Camp headless simulation runner")]
struct Args {
    /// Ticks to run before printing the final frame.
    #[arg(long, default_value_t = 100)]
    ticks: i64,
    /// RNG seed for the run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[command(subcommand)]
    scenario: Scenario,
}

fn flags_for(scenario: &Scenario, seed: u64) -> WorldSetupFlags {
    let base = WorldSetupFlags {
        random_seed: Some(seed),
        ..WorldSetupFlags::default()
    };
    match scenario {
        Scenario::LowPop => WorldSetupFlags { with_low_pop: true, ..base },
        Scenario::Sawmill => WorldSetupFlags { with_sawmill: true, ..base },
        Scenario::House => WorldSetupFlags { with_house: true, ..base },
        Scenario::Constructions => WorldSetupFlags { with_constructions: true, ..base },
        Scenario::Full => WorldSetupFlags {
            with_sawmill: true,
            with_house: true,
            with_constructions: true,
            ..base
        },
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let flags = flags_for(&args.scenario, args.seed);
    let mut world = build_standard_world(flags, ScheduleTuning::default());

    gc_tui::run_and_print(&mut world, args.ticks)?;
    println!("ran {} ticks (seed={})", args.ticks, args.seed);
    Ok(())
}
