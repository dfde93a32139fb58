//! mockarena CLI: runs conformance fixtures and checks mock configurations.
//!
//! Subcommands:
//! - `run <path...> [--verbose]` - run fixture files, or every fixture in a directory
//! - `check <config>` - validate a mock configuration loads without errors
//! - `types` - print the type-tag table

use std::path::{Path, PathBuf};
use std::process;

use mockarena::config::MocksConfig;
use mockarena::{Indirection, Kind, MockContext, TypeTag};
use mockarena_test::fixture::Fixture;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "types" => cmd_types(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_run(args: &[String]) -> Result<(), String> {
    let options = parse_run_args(args)?;
    let files = collect_fixture_files(&options.paths)?;

    let mut failed = 0_usize;
    let mut total = 0_usize;
    for file in &files {
        for fixture in load_fixtures(file)? {
            total += 1;
            let results = fixture
                .run()
                .map_err(|e| format!("{}: fixture '{}': {e}", file.display(), fixture.name))?;
            let failures: Vec<_> = results.iter().filter(|r| !r.passed).collect();
            if failures.is_empty() {
                println!("PASS {}", fixture.name);
            } else {
                failed += 1;
                println!("FAIL {}", fixture.name);
            }
            for result in &results {
                if !result.passed {
                    println!(
                        "  {}: expected {}, got {}",
                        result.case_name, result.expected, result.actual
                    );
                } else if options.verbose {
                    println!("  {}: ok", result.case_name);
                }
            }
        }
    }

    println!("\n{} fixture(s), {} failed", total, failed);
    if failed > 0 {
        return Err(format!("{failed} fixture(s) failed"));
    }
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a config file path".into());
    }

    let config = load_mocks(&args[0])?;
    let mocks =
        MockContext::from_config(&config).map_err(|e| format!("config invalid: {e}"))?;

    println!("Config valid: {} mapping(s)", config.mappings.len());
    for usage in mocks.usage() {
        println!("  {usage}");
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_types() -> Result<(), String> {
    for line in type_table() {
        println!("{line}");
    }
    Ok(())
}

fn type_table() -> Vec<String> {
    let mut lines = vec![format!("{:>4}  {}", "code", "type")];
    for indirection in [Indirection::Direct, Indirection::Mut, Indirection::Const] {
        for kind in Kind::ALL {
            let tag = TypeTag::new(kind, indirection);
            lines.push(format!("{:>4}  {tag}", tag.raw()));
        }
    }
    lines
}

// ═══════════════════════════════════════════════════════════════════════════════
// File loading
// ═══════════════════════════════════════════════════════════════════════════════

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn is_fixture_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("yaml")
            || ext.eq_ignore_ascii_case("yml")
            || ext.eq_ignore_ascii_case("json")
    })
}

fn load_mocks(path: &str) -> Result<MocksConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    if is_json(Path::new(path)) {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn load_fixtures(path: &Path) -> Result<Vec<Fixture>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read \"{}\": {e}", path.display()))?;

    if is_json(path) {
        Fixture::from_json(&content)
            .map(|f| vec![f])
            .map_err(|e| format!("{}: JSON parse error: {e}", path.display()))
    } else {
        Fixture::from_yaml_multi(&content)
            .map_err(|e| format!("{}: YAML parse error: {e}", path.display()))
    }
}

/// Expand directories to the fixture files directly inside them, sorted.
fn collect_fixture_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .map_err(|e| format!("failed to read \"{}\": {e}", path.display()))?;
            let mut found = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| format!("{}: {e}", path.display()))?;
                if is_fixture_file(&entry.path()) {
                    found.push(entry.path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct RunOptions {
    paths: Vec<PathBuf>,
    verbose: bool,
}

fn parse_run_args(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    for arg in args {
        match arg.as_str() {
            "--verbose" | "-v" => options.verbose = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unexpected argument \"{flag}\""));
            }
            path => options.paths.push(PathBuf::from(path)),
        }
    }
    if options.paths.is_empty() {
        return Err("run requires at least one fixture file or directory".into());
    }
    Ok(options)
}

fn print_usage() {
    eprintln!(
        "Usage: mockarena <command> [options]

Commands:
  run <path...> [--verbose]   Run fixture files or directories of fixtures
  check <config>              Validate a mock configuration
  types                       Print the type-tag table
  help                        Show this help

Logging: set RUST_LOG (default \"warn\")"
    );
}
