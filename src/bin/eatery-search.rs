use std::process::ExitCode;
use std::str::FromStr;

use anstream::eprintln;
use anstream::print;
use anstream::println;
use clap::Parser;
use clap::Subcommand;
use hrsw::Stopwatch;
use human_duration::human_duration;
use indoc::indoc;
use owo_colors::OwoColorize;
use thiserror::Error;

use eatery_search::algorithms::Algorithm;
use eatery_search::algorithms::SearchResult;
use eatery_search::problems::campus::CampusError;
use eatery_search::problems::campus::CampusMap;
use eatery_search::problems::campus::RouteView;
use eatery_search::problems::campus_graph::CampusGraph;
use eatery_search::problems::campus_graph::GraphError;
use eatery_search::problems::campus_graph::Meters;
use eatery_search::problems::grid::GridCell;
use eatery_search::problems::grid::GridCost;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const LEGEND: &str = indoc! {"
    S start, G goal, * path
    X blocked, E eatery, . walkable
"};

/// Finds the shortest walk between eateries around DLSU
#[derive(Parser, Debug)]
#[clap(long_version = eatery_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Command,

    /// Clears a blocked cell before searching
    #[arg(long = "open", value_name = "R,C", global = true)]
    open: Vec<GridCell>,
    /// Blocks a walkable cell before searching
    #[arg(long = "block", value_name = "R,C", global = true)]
    block: Vec<GridCell>,
    /// Places a new eatery, optionally with its cuisine
    #[arg(long = "add-landmark", value_name = "NAME@R,C[:CUISINE]", global = true)]
    add_landmark: Vec<LandmarkArg>,
    /// Removes an eatery by key or name
    #[arg(long = "remove-landmark", value_name = "QUERY", global = true)]
    remove_landmark: Vec<String>,

    /// Adds a place to the road network
    #[arg(long = "add-place", value_name = "NAME", global = true)]
    add_place: Vec<String>,
    /// Adds a road to the road network
    #[arg(long = "add-road", value_name = "A:B:METERS", global = true)]
    add_road: Vec<RoadArg>,
    /// Removes a place and its roads from the road network
    #[arg(long = "remove-place", value_name = "NAME", global = true)]
    remove_place: Vec<String>,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Routes between two eateries or cells on the campus grid
    Route {
        /// Eatery key, eatery name or `row,col`
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(
            long,
            value_enum,
            env = "EATERY_ALGORITHM",
            default_value_t = Algorithm::AStar
        )]
        algorithm: Algorithm,
        /// Draws the route over the map
        #[arg(long)]
        show_grid: bool,
    },
    /// Routes with both algorithms and compares their work
    Compare {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Routes between places of the road network
    Graph {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Lists the eateries
    Landmarks,
    /// Lists the places of the road network
    Places,
    /// Prints the campus grid
    Map,
}

/// `NAME@R,C[:CUISINE]`
#[derive(Clone, Debug, PartialEq, Eq)]
struct LandmarkArg {
    name: String,
    cell: GridCell,
    cuisine: String,
}

impl FromStr for LandmarkArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s
            .split_once('@')
            .ok_or_else(|| format!("Expected 'NAME@R,C[:CUISINE]' but got '{s}'"))?;
        if name.trim().is_empty() {
            return Err(format!("Missing name in '{s}'"));
        }
        let (cell, cuisine) = rest.split_once(':').unwrap_or((rest, ""));
        let cell = cell.parse::<GridCell>().map_err(|e| e.to_string())?;
        Ok(Self {
            name: name.trim().to_string(),
            cell,
            cuisine: cuisine.trim().to_string(),
        })
    }
}

/// `A:B:METERS`
#[derive(Clone, Debug, PartialEq, Eq)]
struct RoadArg {
    from: String,
    to: String,
    meters: Meters,
}

impl FromStr for RoadArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(from), Some(to), Some(meters), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("Expected 'A:B:METERS' but got '{s}'"));
        };
        let meters = meters
            .trim()
            .parse::<Meters>()
            .map_err(|e| format!("Invalid distance '{meters}': {e}"))?;
        Ok(Self {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
            meters,
        })
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Campus(#[from] CampusError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn build_campus(args: &Args) -> Result<CampusMap, CampusError> {
    let mut map = CampusMap::dlsu();
    for cell in &args.open {
        map.open_cell(*cell)?;
    }
    for cell in &args.block {
        map.block_cell(*cell)?;
    }
    for query in &args.remove_landmark {
        map.remove_landmark(query)?;
    }
    for landmark in &args.add_landmark {
        map.add_landmark(&landmark.name, landmark.cell, &landmark.cuisine)?;
    }
    Ok(map)
}

fn build_graph(args: &Args) -> Result<CampusGraph, GraphError> {
    let mut graph = CampusGraph::dlsu();
    for name in &args.add_place {
        graph.add_place(name)?;
    }
    for road in &args.add_road {
        graph.add_road(&road.from, &road.to, road.meters)?;
    }
    for name in &args.remove_place {
        graph.remove_place(name)?;
    }
    Ok(graph)
}

/// Runs one search, timing it.
fn timed_route(
    map: &CampusMap,
    algorithm: Algorithm,
    start: GridCell,
    goal: GridCell,
) -> Result<(SearchResult<GridCell, GridCost>, std::time::Duration), CampusError> {
    let mut stopwatch = Stopwatch::new_started();
    let result = map.route(algorithm, start, goal)?;
    stopwatch.stop();
    Ok((result, stopwatch.elapsed()))
}

fn print_route(
    map: &CampusMap,
    algorithm: Algorithm,
    result: &SearchResult<GridCell, GridCost>,
    elapsed: &std::time::Duration,
) {
    println!("{}", format!("* {algorithm}").bold());
    match &result.path {
        Some(path) => {
            println!("Path: {}", map.describe(path).join(" -> "));
            println!("Cost: {}", path.cost.green());
        }
        None => println!("{}", "No path found".red()),
    }
    println!("Stats: {}", result.stats);
    println!("Time taken: {}", human_duration(elapsed).yellow());
}

fn run(args: &Args) -> Result<(), AppError> {
    match &args.command {
        Command::Route {
            from,
            to,
            algorithm,
            show_grid,
        } => {
            let map = build_campus(args)?;
            let (start, goal) = (map.resolve(from)?, map.resolve(to)?);
            let (result, elapsed) = timed_route(&map, *algorithm, start, goal)?;
            print_route(&map, *algorithm, &result, &elapsed);
            if *show_grid {
                println!();
                print!(
                    "{}",
                    RouteView {
                        map: &map,
                        path: result.path.as_ref(),
                    }
                );
                print!("{LEGEND}");
            }
        }
        Command::Compare { from, to } => {
            let map = build_campus(args)?;
            let (start, goal) = (map.resolve(from)?, map.resolve(to)?);
            let mut expanded = vec![];
            for algorithm in [Algorithm::UniformCost, Algorithm::AStar] {
                let (result, elapsed) = timed_route(&map, algorithm, start, goal)?;
                print_route(&map, algorithm, &result, &elapsed);
                println!();
                expanded.push((algorithm, result.stats.nodes_expanded));
            }
            if let [(ucs, ucs_expanded), (astar, astar_expanded)] = expanded[..] {
                println!(
                    "{astar} expanded {} nodes against {} for {ucs}",
                    astar_expanded.cyan(),
                    ucs_expanded.cyan()
                );
            }
        }
        Command::Graph { from, to } => {
            let graph = build_graph(args)?;
            let mut stopwatch = Stopwatch::new_started();
            let result = match graph.route(from, to) {
                Ok(result) => result,
                Err(e) => {
                    println!("Available places: {}", graph.place_names().join(", "));
                    return Err(e.into());
                }
            };
            stopwatch.stop();

            match &result.path {
                Some(path) => {
                    println!("Path: {}", graph.names(path).join(" -> "));
                    println!("Total distance: {}m", path.cost.green());
                }
                None => println!("{}", format!("No path from '{from}' to '{to}'").red()),
            }
            println!("Nodes expanded: {}", result.stats.nodes_expanded);
            println!("Time taken: {}", human_duration(&stopwatch.elapsed()).yellow());
        }
        Command::Landmarks => {
            let map = build_campus(args)?;
            for landmark in map.landmarks() {
                println!(
                    "{:>2}  {:40} {:8} {}",
                    landmark.key.bold(),
                    landmark.name,
                    landmark.cell.to_string(),
                    landmark.cuisine.dimmed()
                );
            }
        }
        Command::Places => {
            let graph = build_graph(args)?;
            for name in graph.place_names() {
                let roads = graph.roads(name).unwrap_or_default();
                let roads: Vec<String> = roads
                    .iter()
                    .map(|(to, meters)| format!("{to} ({meters}m)"))
                    .collect();
                println!("{:>3}  {}", name.bold(), roads.join(", ").dimmed());
            }
        }
        Command::Map => {
            let map = build_campus(args)?;
            print!(
                "{}",
                RouteView {
                    map: &map,
                    path: None
                }
            );
            print!("{LEGEND}");
        }
    }
    Ok(())
}

fn main() -> std::io::Result<ExitCode> {
    env_logger::init();

    let args = Args::parse();
    args.color.write_global();
    log::debug!("{args:?}");

    match run(&args) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_args() {
        assert_eq!(
            "Kiosk@6,6".parse::<LandmarkArg>(),
            Ok(LandmarkArg {
                name: "Kiosk".to_string(),
                cell: GridCell::new(6, 6),
                cuisine: String::new(),
            })
        );
        assert_eq!(
            "Tea, Co @ 2,3 : Drinks, Snacks".parse::<LandmarkArg>(),
            Ok(LandmarkArg {
                name: "Tea, Co".to_string(),
                cell: GridCell::new(2, 3),
                cuisine: "Drinks, Snacks".to_string(),
            })
        );
        assert!("Kiosk 6,6".parse::<LandmarkArg>().is_err());
        assert!(" @6,6".parse::<LandmarkArg>().is_err());
        assert!("Kiosk@six,6".parse::<LandmarkArg>().is_err());
    }

    #[test]
    fn road_args() {
        assert_eq!(
            "H: J1 :49".parse::<RoadArg>(),
            Ok(RoadArg {
                from: "H".to_string(),
                to: "J1".to_string(),
                meters: 49,
            })
        );
        assert!("A:B".parse::<RoadArg>().is_err());
        assert!("A:B:3:4".parse::<RoadArg>().is_err());
        assert!("A:B:far".parse::<RoadArg>().is_err());
        assert!("A:B:-3".parse::<RoadArg>().is_err());
    }

    #[test]
    fn flags_reach_the_session() {
        let args = Args::parse_from([
            "eatery-search",
            "landmarks",
            "--add-landmark",
            "Kiosk@6,6:Snacks",
            "--add-place",
            "V",
            "--add-road",
            "V:A:10",
        ]);
        let map = build_campus(&args).unwrap();
        let kiosk = map.find_landmark("kiosk").unwrap();
        assert_eq!(kiosk.cuisine, "Snacks");
        assert_eq!(kiosk.cell, GridCell::new(6, 6));

        let graph = build_graph(&args).unwrap();
        assert!(graph.place_names().contains(&"V"));
        assert_eq!(graph.roads("V"), Some(vec![("A", 10)]));
    }
}
