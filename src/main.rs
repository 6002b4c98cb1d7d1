//! Waypoint Graph command line shell
//!
//! Each invocation loads the graph file (an empty graph if it does not exist
//! yet), applies one command and writes the file back if the command changed
//! the graph.

use std::fs::File;
use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};
use tracing::{debug, info};
use waypoint_graph::core::{CodecError, GraphFormat};
use waypoint_graph::graph::{nearest_node, SelectionOutcome};
use waypoint_graph::render::to_json;
use waypoint_graph::{storage, Config, Point, Result, Session};

fn finite(value: &str) -> std::result::Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("{} is not a finite coordinate", value)),
        Err(e) => Err(e.to_string()),
    }
}

fn coordinate(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(finite)
        .allow_negative_numbers(true)
}

fn node_name(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn cli() -> Command {
    Command::new("waypoint-graph")
        .version(waypoint_graph::VERSION)
        .about("Build waypoint graphs and find shortest routes between waypoints.")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("graph")
                .short('g')
                .long("graph")
                .value_name("FILE")
                .global(true)
                .help("Graph file to load and update"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .subcommand(
            Command::new("add-node")
                .about("Place a waypoint")
                .arg(coordinate("x"))
                .arg(coordinate("y"))
                .arg(
                    Arg::new("label")
                        .long("label")
                        .value_name("NAME")
                        .help("Display label for the new waypoint"),
                ),
        )
        .subcommand(
            Command::new("connect")
                .about("Connect the waypoints nearest to two clicks")
                .arg(coordinate("x1"))
                .arg(coordinate("y1"))
                .arg(coordinate("x2"))
                .arg(coordinate("y2")),
        )
        .subcommand(
            Command::new("link")
                .about("Connect two waypoints by id or label")
                .arg(node_name("a", "First waypoint"))
                .arg(node_name("b", "Second waypoint")),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete a waypoint and its connections")
                .arg(node_name("node", "Waypoint id or label")),
        )
        .subcommand(
            Command::new("nearest")
                .about("Find the waypoint nearest to a point")
                .arg(coordinate("x"))
                .arg(coordinate("y")),
        )
        .subcommand(
            Command::new("route")
                .about("Shortest route between two waypoints")
                .arg(node_name("start", "Start waypoint"))
                .arg(node_name("goal", "Goal waypoint")),
        )
        .subcommand(
            Command::new("route-from")
                .about("Shortest route from the waypoint nearest to a point")
                .arg(coordinate("x"))
                .arg(coordinate("y"))
                .arg(node_name("goal", "Goal waypoint")),
        )
        .subcommand(
            Command::new("import-geojson")
                .about("Replace the graph with one built from a GeoJSON FeatureCollection")
                .arg(Arg::new("file").required(true).value_name("FILE")),
        )
        .subcommand(
            Command::new("render")
                .about("Print the drawing instructions as JSON")
                .arg(
                    Arg::new("route")
                        .long("route")
                        .num_args(2)
                        .value_names(["START", "GOAL"])
                        .help("Highlight the shortest route between two waypoints"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write the graph to another file")
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .value_parser(|s: &str| s.parse::<GraphFormat>())
                        .help("Output format (binary, json); defaults to the configured format"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => Config::load()?,
    };
    apply_cli_overrides(&mut config, &matches);
    config.validate()?;

    waypoint_graph::init(&config)?;

    let graph_path = config.storage.graph_path.clone();
    let mut session = Session::with_config(config);
    if graph_path.exists() {
        session.load_file(&graph_path)?;
    } else {
        info!(path = %graph_path.display(), "graph file not found, starting empty");
    }

    let mutated = match matches.subcommand() {
        Some((name, sub)) => run(&mut session, name, sub)?,
        None => false,
    };

    if mutated {
        session.save_file(&graph_path)?;
    } else {
        debug!("graph unchanged, not saving");
    }
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(path) = matches.get_one::<String>("graph") {
        config.storage.graph_path = PathBuf::from(path);
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }
}

fn point(matches: &ArgMatches, x: &str, y: &str) -> Point {
    let x = matches.get_one::<f64>(x).copied().unwrap_or_default();
    let y = matches.get_one::<f64>(y).copied().unwrap_or_default();
    Point::new(x, y)
}

fn name<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches.get_one::<String>(id).map(String::as_str).unwrap_or_default()
}

/// Run one subcommand, reporting whether the graph changed
fn run(session: &mut Session, command: &str, matches: &ArgMatches) -> Result<bool> {
    match command {
        "add-node" => {
            let id = session.add_node_at(point(matches, "x", "y"))?;
            if let Some(label) = matches.get_one::<String>("label") {
                session.label_node(&id.to_string(), label)?;
            }
            println!("{}", id);
            Ok(true)
        }
        "connect" => {
            session.connect_click(point(matches, "x1", "y1"))?;
            match session.connect_click(point(matches, "x2", "y2"))? {
                SelectionOutcome::Committed { a, b, weight } => {
                    println!("{} - {} ({:.3})", a, b, weight);
                    Ok(true)
                }
                SelectionOutcome::Pending(id) => {
                    println!("{} selected", id);
                    Ok(false)
                }
            }
        }
        "link" => {
            let weight = session.link(name(matches, "a"), name(matches, "b"))?;
            println!("{:.3}", weight);
            Ok(true)
        }
        "remove" => {
            let node = session.remove_node(name(matches, "node"))?;
            println!("removed {}", node.display_name());
            Ok(true)
        }
        "nearest" => {
            let (node, distance) = nearest_node(session.graph(), point(matches, "x", "y"))?;
            println!("{} ({:.3})", node.display_name(), distance);
            Ok(false)
        }
        "route" => {
            let route = session.route_between(name(matches, "start"), name(matches, "goal"))?;
            println!("{} ({:.3})", route.describe(session.graph()), route.total_weight);
            Ok(false)
        }
        "route-from" => {
            let route = session.route_from_point(point(matches, "x", "y"), name(matches, "goal"))?;
            println!("{} ({:.3})", route.describe(session.graph()), route.total_weight);
            Ok(false)
        }
        "import-geojson" => {
            let file = File::open(name(matches, "file"))?;
            session.import_geojson(std::io::BufReader::new(file))?;
            println!(
                "{} waypoints, {} connections",
                session.graph().len(),
                session.graph().edge_count()
            );
            Ok(true)
        }
        "render" => {
            if let Some(mut ends) = matches.get_many::<String>("route") {
                if let (Some(start), Some(goal)) = (ends.next(), ends.next()) {
                    session.route_between(start, goal)?;
                }
            }
            let json = to_json(&session.frame()).map_err(CodecError::from)?;
            println!("{}", json);
            Ok(false)
        }
        "export" => {
            let format = matches
                .get_one::<GraphFormat>("format")
                .copied()
                .unwrap_or(session.config().storage.format);
            let path = name(matches, "file");
            storage::save_file(session.graph(), path, format)?;
            println!("exported to {}", path);
            Ok(false)
        }
        other => Err(waypoint_graph::Error::config(format!("Unknown command: {}", other))),
    }
}
