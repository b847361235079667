use std::{env, process::ExitCode, sync::Arc};

use tracing::error;
use transit_router::{
    services::{
        build::build_router,
        persistence::{load_router, save_router},
    },
    structures::{Config, plan::PlanItem},
    web::app::server,
};

const USAGE: &str = "Usage: transit-router <build|serve|route> <config.yml> [from to]";

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (command, config_path) = match args.as_slice() {
        [command, config_path, ..] => (command.as_str(), config_path.as_str()),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        "build" => build(&config),
        "serve" => serve(&config),
        "route" => match &args[2..] {
            [from, to] => route(&config, from, to),
            _ => Err(USAGE.to_string()),
        },
        _ => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn build(config: &Config) -> Result<(), String> {
    let router = build_router(config)?;
    save_router(&router, &config.build.output)
}

fn serve(config: &Config) -> Result<(), String> {
    let router = Arc::new(load_router(&config.build.output)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;

    runtime
        .block_on(server(router, &config.server.address))
        .map_err(|e| format!("Server stopped: {e}"))
}

fn route(config: &Config, from: &str, to: &str) -> Result<(), String> {
    let router = load_router(&config.build.output)?;

    match router.find_route(from, to).map_err(|e| e.to_string())? {
        Some(plan) => {
            for item in &plan.items {
                match item {
                    PlanItem::Wait(wait) => {
                        println!("Wait at '{}' for {:.2} min", wait.stop_name, wait.time)
                    }
                    PlanItem::Bus(bus) => println!(
                        "Ride bus '{}' from '{}' to '{}' for {} stops, {:.2} min",
                        bus.bus, bus.from_stop, bus.to_stop, bus.span_count, bus.time
                    ),
                }
            }
            println!("Total: {:.2} min", plan.total_time);
        }
        None => println!("No route between '{from}' and '{to}'"),
    }

    Ok(())
}
