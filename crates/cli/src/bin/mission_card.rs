use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use flight_perf::export::{card, metrics, writer_for_path};
use flight_perf::mission::MissionCard;
use flight_perf::{Catalog, config, metric_rows, run_request};

#[derive(Parser)]
#[command(author, version, about = "Compute a mission card from a request file")]
struct Cli {
    /// Mission request (TOML or YAML)
    request: PathBuf,

    /// Configuration directory holding tables/, aircraft/ and settings.toml
    #[arg(long, default_value = "configs")]
    config: PathBuf,

    /// Write the card as JSON (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the flat metrics CSV (`-` for stdout)
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Write card JSON, metrics CSV and fuel curve CSV next to this path
    #[arg(long)]
    bundle: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }
    pretty_env_logger::init();

    let cli = Cli::parse();
    let catalog = Catalog::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let request = config::load_request(&cli.request)
        .with_context(|| format!("reading request {}", cli.request.display()))?;
    let card = run_request(&catalog, &request)?;

    let to_stdout = [&cli.json, &cli.metrics]
        .iter()
        .any(|p| p.as_deref() == Some(Path::new("-")));
    if !to_stdout {
        print_summary(&card);
    }

    if let Some(path) = &cli.json {
        let mut writer = writer_for_path(path)?;
        card::write_json(&mut *writer, &card)?;
    }
    if let Some(path) = &cli.metrics {
        let mut writer = writer_for_path(path)?;
        metrics::write_metrics(&mut *writer, &metric_rows(&card))?;
    }
    if let Some(path) = &cli.bundle {
        let paths = metrics::write_bundle(path, &card, &metric_rows(&card), &card.fuel.curve)?;
        log::info!(
            "wrote {}, {}, {}",
            paths.card.display(),
            paths.metrics.display(),
            paths.fuel_curve.display()
        );
    }
    Ok(())
}

fn print_summary(card: &MissionCard) {
    let takeoff = &card.takeoff;
    let climb = &card.climb;
    let cruise = &card.cruise;
    let fuel = &card.fuel;

    println!("=== Mission Card ===");
    println!("Aircraft        : {}", card.aircraft);
    println!("Generated       : {}", card.generated_at);
    println!(
        "Takeoff         : flaps {} {} | V1/VR/V2 {:.0}/{:.0}/{:.0} KCAS",
        takeoff.flaps, takeoff.thrust, takeoff.v1_kcas, takeoff.vr_kcas, takeoff.v2_kcas
    );
    println!(
        "Field length    : {:.0} ft required / {:.0} ft available",
        takeoff.required_field_length_ft, takeoff.runway_available_ft
    );
    println!(
        "Initial climb   : {:.0} ft/nm, {:.0} ft/min, trim {:.1} deg",
        takeoff.climb_gradient_ft_per_nm, takeoff.vertical_speed_fpm, takeoff.stab_trim_deg
    );
    println!(
        "Climb           : {:?} {:.0}-{:.0} ft in {:.1} min, {:.0} lb, {:.1} nm",
        climb.strategy, climb.from_ft, climb.to_ft, climb.time_min, climb.fuel_lb, climb.distance_nm
    );
    println!(
        "Cruise          : {:?} FL{:03.0} M{:.2} {:.0} KTAS, {:.0} lb/hr, {:.4} nm/lb",
        cruise.objective,
        cruise.altitude_ft / 100.0,
        cruise.mach,
        cruise.ktas,
        cruise.fuel_flow_pph,
        cruise.specific_range_nm_per_lb
    );
    for case in &card.landing {
        let landing = &case.record;
        println!(
            "Landing         : {} {:.0} lb flaps {} Vac {:.0} KCAS, distance {:.0} ft, go-around {} {:.0} ft/nm",
            case.scenario,
            landing.weight_lb,
            landing.flaps,
            landing.vac_kcas,
            landing.landing_distance_ft,
            landing.go_around.thrust,
            landing.go_around.gradient_ft_per_nm
        );
    }
    println!(
        "Fuel            : {:.0} lb on board, {:.0} lb remaining after {:.0} min",
        fuel.fuel_on_board_lb, fuel.end_state.fuel_remaining_lb, fuel.end_state.elapsed_min
    );
    println!(
        "Bingo / Joker   : {:.0} lb / {:.0} lb",
        card.bingo_joker.bingo_lb, card.bingo_joker.joker_lb
    );
    for (section, advisory) in card.advisories() {
        println!("Advisory        : [{section}] {:?} {}", advisory.level, advisory.message);
    }
}
