use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use geo_graph::{
    Coordinate, Dijkstra, GeoGraph, PathResult,
    snapshot::{read_snapshot, write_snapshot},
};
use log::info;

#[derive(Parser)]
#[command(version, about = "Query and edit geographic graph snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
enum Commands {
    /// Shortest path between two nodes
    Route {
        /// Graph snapshot in '.json' or '.gmp' format
        snapshot: PathBuf,
        start: String,
        end: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Distance from START to every reachable node
    Distances { snapshot: PathBuf, start: String },
    AddNode {
        snapshot: PathBuf,
        id: String,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,

        /// Set output file to <FILE>. Defaults to overwriting <SNAPSHOT>.
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,
    },
    RemoveNode {
        snapshot: PathBuf,
        id: String,

        /// Set output file to <FILE>. Defaults to overwriting <SNAPSHOT>.
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,
    },
    /// Connect two nodes in both directions
    Connect {
        snapshot: PathBuf,
        a: String,
        b: String,

        /// Edge weight. Defaults to the haversine distance in meters.
        #[arg(short, long, value_name = "FLOAT")]
        weight: Option<f64>,

        /// Set output file to <FILE>. Defaults to overwriting <SNAPSHOT>.
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,
    },
    /// Add missing reverse edges
    Normalize {
        snapshot: PathBuf,

        /// Set output file to <FILE>. Defaults to overwriting <SNAPSHOT>.
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,
    },
    /// Node closest to a coordinate
    Nearest {
        snapshot: PathBuf,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,

        /// Only accept nodes within <METERS>
        #[arg(short, long, value_name = "METERS")]
        within: Option<f64>,
    },
    /// Haversine distance in meters
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lng1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lng2: f64,
    },
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}

fn save(graph: &GeoGraph, snapshot: PathBuf, out_file: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    write_snapshot(out_file.unwrap_or(snapshot), graph)
}

fn format_route(result: &PathResult) -> String {
    if result.is_empty() {
        return "no route".to_string();
    }

    format!("{} ({} m)", result.path.join(" -> "), result.total_weight)
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Route {
            snapshot,
            start,
            end,
            json,
        } => {
            let graph = read_snapshot(snapshot)?;
            let result = graph.shortest_path(&start, &end)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_route(&result));
            }
        }
        Commands::Distances { snapshot, start } => {
            let graph = read_snapshot(snapshot)?;
            let distances = graph.distances_from(&start)?;

            let mut rows: Vec<_> = distances.iter().map(|(id, n)| (n.cost(), id)).collect();
            rows.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(b.1)));
            for (cost, id) in rows {
                println!("{id}\t{cost}");
            }
        }
        Commands::AddNode {
            snapshot,
            id,
            lat,
            lng,
            out_file,
        } => {
            let mut graph = read_snapshot(&snapshot)?;
            graph.add_node(id.as_str(), Coordinate::try_new(lat, lng)?)?;
            info!("Added node '{}'", id);
            save(&graph, snapshot, out_file)?;
        }
        Commands::RemoveNode {
            snapshot,
            id,
            out_file,
        } => {
            let mut graph = read_snapshot(&snapshot)?;
            graph.remove_node(&id)?;
            info!("Removed node '{}'", id);
            save(&graph, snapshot, out_file)?;
        }
        Commands::Connect {
            snapshot,
            a,
            b,
            weight,
            out_file,
        } => {
            let mut graph = read_snapshot(&snapshot)?;
            let inserted = graph.add_undirected_edge(&a, &b, weight)?;
            info!("Connected '{}' and '{}': {} edges added", a, b, inserted);
            save(&graph, snapshot, out_file)?;
        }
        Commands::Normalize { snapshot, out_file } => {
            let mut graph = read_snapshot(&snapshot)?;
            let inserted = graph.normalize_undirected();
            info!("Added {} reverse edges", inserted);
            save(&graph, snapshot, out_file)?;
        }
        Commands::Nearest {
            snapshot,
            lat,
            lng,
            within,
        } => {
            let graph = read_snapshot(snapshot)?;
            let coordinate = Coordinate::try_new(lat, lng)?;
            let nearest = match within {
                Some(meters) => graph.nearest_node_within(&coordinate, meters),
                None => graph.nearest_node(&coordinate),
            };
            println!("{}", nearest.unwrap_or("no node found"));
        }
        Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        } => {
            let a = Coordinate::try_new(lat1, lng1)?;
            let b = Coordinate::try_new(lat2, lng2)?;
            println!("{}", geo_graph::distance(&a, &b));
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging()?;

    run(cli.command)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn scratch_copy(name: &str) -> PathBuf {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../geo-graph/resources/graph-data.json");
        let target = scratch_file(name);
        fs::copy(source, &target).unwrap();

        target
    }

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("geo-graph-cli-{}-{}", std::process::id(), name))
    }

    #[test]
    fn connect_overwrites_snapshot() {
        let snapshot = scratch_copy("connect_in_place.json");

        run(Commands::Connect {
            snapshot: snapshot.clone(),
            a: "Sisli".to_string(),
            b: "Besiktas".to_string(),
            weight: Some(1800.0),
            out_file: None,
        })
        .unwrap();

        let graph = read_snapshot(&snapshot).unwrap();
        fs::remove_file(&snapshot).unwrap();
        assert_eq!(graph.weight("Sisli", "Besiktas"), Some(1800.0));
        assert_eq!(graph.weight("Besiktas", "Sisli"), Some(1800.0));
    }

    #[test]
    fn connect_writes_out_file() {
        let snapshot = scratch_copy("connect_source.json");
        let out_file = scratch_file("connect_target.gmp");

        run(Commands::Connect {
            snapshot: snapshot.clone(),
            a: "Sisli".to_string(),
            b: "Besiktas".to_string(),
            weight: None,
            out_file: Some(out_file.clone()),
        })
        .unwrap();

        let source = read_snapshot(&snapshot).unwrap();
        let target = read_snapshot(&out_file).unwrap();
        fs::remove_file(&snapshot).unwrap();
        fs::remove_file(&out_file).unwrap();

        assert_eq!(source.weight("Sisli", "Besiktas"), None);
        let expected = geo_graph::distance(
            target.coordinate("Sisli").unwrap(),
            target.coordinate("Besiktas").unwrap(),
        );
        assert_eq!(target.weight("Sisli", "Besiktas"), Some(expected));
    }

    #[test]
    fn remove_node_overwrites_snapshot() {
        let snapshot = scratch_copy("remove_in_place.json");

        run(Commands::RemoveNode {
            snapshot: snapshot.clone(),
            id: "Uskudar".to_string(),
            out_file: None,
        })
        .unwrap();

        let graph = read_snapshot(&snapshot).unwrap();
        fs::remove_file(&snapshot).unwrap();
        assert!(!graph.contains("Uskudar"));
        assert_eq!(graph.node_count(), 6);
        assert!(
            graph
                .nodes()
                .all(|n| graph.neighbors(n).iter().all(|e| e.target() != "Uskudar"))
        );
    }

    #[test]
    fn remove_node_writes_out_file() {
        let snapshot = scratch_copy("remove_source.json");
        let out_file = scratch_file("remove_target.json");

        run(Commands::RemoveNode {
            snapshot: snapshot.clone(),
            id: "Adalar".to_string(),
            out_file: Some(out_file.clone()),
        })
        .unwrap();

        let source = read_snapshot(&snapshot).unwrap();
        let target = read_snapshot(&out_file).unwrap();
        fs::remove_file(&snapshot).unwrap();
        fs::remove_file(&out_file).unwrap();

        assert!(source.contains("Adalar"));
        assert!(!target.contains("Adalar"));
        assert_eq!(target.node_count(), 6);
    }

    #[test]
    fn failed_commands_leave_snapshot_untouched() {
        let snapshot = scratch_copy("unknown_ids.json");
        let before = fs::read(&snapshot).unwrap();

        assert!(
            run(Commands::Route {
                snapshot: snapshot.clone(),
                start: "Taksim".to_string(),
                end: "Nowhere".to_string(),
                json: false,
            })
            .is_err()
        );
        assert!(
            run(Commands::RemoveNode {
                snapshot: snapshot.clone(),
                id: "Nowhere".to_string(),
                out_file: None,
            })
            .is_err()
        );

        let after = fs::read(&snapshot).unwrap();
        fs::remove_file(&snapshot).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn parse_route() {
        let cli = Cli::try_parse_from(["geo-graph", "route", "graph-data.json", "A", "C"]).unwrap();

        assert_eq!(
            cli.command,
            Commands::Route {
                snapshot: PathBuf::from("graph-data.json"),
                start: "A".to_string(),
                end: "C".to_string(),
                json: false,
            }
        );
    }

    #[test]
    fn parse_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "geo-graph",
            "add-node",
            "graph.gmp",
            "D",
            "-33.86",
            "-70.65",
            "-o",
            "out.gmp",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::AddNode {
                snapshot: PathBuf::from("graph.gmp"),
                id: "D".to_string(),
                lat: -33.86,
                lng: -70.65,
                out_file: Some(PathBuf::from("out.gmp")),
            }
        );
    }

    #[test]
    fn parse_connect_weight() {
        let cli =
            Cli::try_parse_from(["geo-graph", "connect", "g.json", "A", "B", "--weight", "12.5"])
                .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Connect {
                weight: Some(12.5),
                out_file: None,
                ..
            }
        ));
    }

    #[test]
    fn route_output() {
        assert_eq!(format_route(&PathResult::no_route()), "no route");
        assert_eq!(
            format_route(&PathResult::new(
                vec!["A".to_string(), "B".to_string(), "C".to_string()],
                10.0
            )),
            "A -> B -> C (10 m)"
        );
    }
}
