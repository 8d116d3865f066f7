use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NODES: &str = "\
id,lat,lon,name
1,42.965,1.605,Foix
2,42.965,1.615,
3,42.975,1.605,
4,42.975,1.615,Vernajoul
5,43.5,2.0,
";

// 1-2-4 is 2.25 km, 1-3-4 is 2.5 km, 5 is unreachable
const WAYS: &str = "\
node_from,node_to,distance_km
1,2,1.0
2,4,1.25
1,3,1.5
3,4,1.0
";

struct Fixture {
    dir: TempDir,
    nodes: PathBuf,
    ways: PathBuf,
}

impl Fixture {
    fn new(ways: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let nodes = dir.path().join("nodes.csv");
        let ways_path = dir.path().join("ways.csv");
        fs::write(&nodes, NODES).unwrap();
        fs::write(&ways_path, ways).unwrap();
        Self {
            dir,
            nodes,
            ways: ways_path,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::cargo_bin("crowfly").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg(subcommand)
            .arg("--nodes")
            .arg(&self.nodes)
            .arg("--ways")
            .arg(&self.ways);
        cmd
    }
}

fn route_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).unwrap()
}

fn node_ids(json: &serde_json::Value) -> Vec<i64> {
    json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["node_id"].as_i64().unwrap())
        .collect()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("crowfly")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_route_text() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1", "--to", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Distance: 2.250 km"))
        .stdout(predicate::str::contains("Nodes in path: 3"))
        .stdout(predicate::str::contains("1 (Foix)"))
        .stdout(predicate::str::contains("4 (Vernajoul)"));
}

#[test]
fn test_route_json() {
    let fx = Fixture::new(WAYS);
    let output = fx
        .cmd("route")
        .args(["--from", "4", "--to", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = route_json(&output.stdout);
    assert_eq!(node_ids(&json), vec![4, 2, 1]);
    assert!((json["distance_km"].as_f64().unwrap() - 2.25).abs() < 1e-9);
    assert!(json["crow_fly_km"].as_f64().unwrap() < 2.25);
}

#[test]
fn test_route_between_coordinates() {
    let fx = Fixture::new(WAYS);
    let output = fx
        .cmd("route")
        .args(["--from-coord", "42.9651,1.6049", "--to-coord", "42.9749,1.6151", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(node_ids(&route_json(&output.stdout)), vec![1, 2, 4]);
}

#[test]
fn test_same_origin_and_destination() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "3", "--to", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Distance: 0.000 km"))
        .stdout(predicate::str::contains("Nodes in path: 1"));
}

#[test]
fn test_unreachable_exits_2() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1", "--to", "5"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no path from 1 to 5"));
}

#[test]
fn test_unknown_node_exits_1() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1", "--to", "77"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("node 77 is not in the graph"));
}

#[test]
fn test_dangling_way_exits_1() {
    let fx = Fixture::new(&format!("{WAYS}1,999,0.5\n"));
    fx.cmd("route")
        .args(["--from", "1", "--to", "4"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid road graph"))
        .stderr(predicate::str::contains("999"));
}

#[test]
fn test_settle_limit_exits_2() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1", "--to", "4", "--max-settled", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cancelled"));
}

#[test]
fn test_unusable_tolerance_exits_1() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1", "--to", "4", "--tolerance-km", "NaN"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("tolerance must be a finite number"));
}

#[test]
fn test_usage_error_exits_1() {
    let fx = Fixture::new(WAYS);
    fx.cmd("route")
        .args(["--from", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--to"));
}

#[test]
fn test_trace_file() {
    let fx = Fixture::new(WAYS);
    let trace = fx.path("trace.csv");
    fx.cmd("route")
        .args(["--from", "1", "--to", "4", "--trace"])
        .arg(&trace)
        .assert()
        .success();

    let text = fs::read_to_string(&trace).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "node_id,best_cost_km,a_star_score_km,heuristic_km,parent"
    );
    assert!(lines[1].starts_with("1,0.0,"));
    assert!(lines.last().unwrap().starts_with("4,2.25,2.25,0.0,"));
    assert!(lines.last().unwrap().ends_with(",2"));
}

#[test]
fn test_batch_keeps_input_order() {
    let fx = Fixture::new(WAYS);
    let pairs = fx.path("pairs.csv");
    fs::write(&pairs, "origin,destination\n1,4\n4,1\n1,5\n2,2\n8,1\n").unwrap();

    let output = fx
        .cmd("batch")
        .arg("--pairs")
        .arg(&pairs)
        .args(["--threads", "2", "--cache-capacity", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let statuses: Vec<&str> = rows.iter().map(|r| r["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["ok", "ok", "no_path", "ok", "invalid_node"]);
    assert_eq!(rows[1]["origin"], 4);
    assert_eq!(rows[1]["hops"], 2);
}

#[test]
fn test_batch_text() {
    let fx = Fixture::new(WAYS);
    let pairs = fx.path("pairs.csv");
    fs::write(&pairs, "origin,destination\n1,4\n3,5\n").unwrap();

    fx.cmd("batch")
        .arg("--pairs")
        .arg(&pairs)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 -> 4: 2.250 km, 2 hops"))
        .stdout(predicate::str::contains("3 -> 5: no path from 3 to 5"));
}

#[test]
fn test_stats() {
    let fx = Fixture::new(WAYS);
    fx.cmd("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 5"))
        .stdout(predicate::str::contains("Edges: 4"))
        .stdout(predicate::str::contains("Named nodes: 2"));
}

#[test]
fn test_graph_paths_from_env_and_gzip() {
    let fx = Fixture::new(WAYS);
    let gz = fx.path("ways.csv.gz");
    write_gzip(&gz, WAYS);

    Command::cargo_bin("crowfly")
        .unwrap()
        .env("CROWFLY_NODES", &fx.nodes)
        .env("CROWFLY_WAYS", &gz)
        .args(["route", "--from", "1", "--to", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Distance: 2.250 km"));
}

#[test]
fn test_missing_nodes_file() {
    let fx = Fixture::new(WAYS);
    Command::cargo_bin("crowfly")
        .unwrap()
        .args(["stats", "--nodes"])
        .arg(fx.path("absent.csv"))
        .arg("--ways")
        .arg(&fx.ways)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.csv"));
}

fn write_gzip(path: &Path, contents: &str) {
    let file = fs::File::create(path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
}
