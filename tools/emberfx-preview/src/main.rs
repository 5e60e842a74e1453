//! emberfx-preview: headless scene runner and configuration checker.
//!
//! Usage:
//!   emberfx-preview run --preset fireworks --seconds 5
//!   emberfx-preview run --scene scene.json --rate 30 --json
//!   emberfx-preview check --scene scene.json
//!   emberfx-preview export --preset comet --output comet.json

use std::path::PathBuf;
use std::process;

use emberfx_core::constants::PREVIEW_TICK_RATE;
use emberfx_sim::{ParticleEngine, Preset, SceneConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "export" => cmd_export(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    let presets: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
    eprintln!(
        "emberfx-preview: headless particle scene runner\n\
         \n\
         Commands:\n\
         \n\
         run      Tick a scene at a fixed rate and print per-second statistics\n\
         \n\
           --scene <path>     JSON scene file\n\
           --preset <name>    Built-in scene ({})\n\
           --seconds <N>      Simulated seconds (default: 5)\n\
           --rate <HZ>        Tick rate (default: {PREVIEW_TICK_RATE})\n\
           --json             Print the final snapshot as JSON on stdout\n\
         \n\
         check    Run the sub-emitter configuration check on every system\n\
         \n\
           --scene <path> | --preset <name>\n\
         \n\
         export   Write a built-in scene as JSON\n\
         \n\
           --preset <name>    Scene to export\n\
           --output <path>    Output file (default: stdout)\n\
         \n\
         Set RUST_LOG=debug for session-level logging.\n",
        presets.join(", ")
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match parse_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got '{raw}'");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_preset(name: &str) -> Preset {
    match Preset::from_name(name) {
        Some(p) => p,
        None => {
            eprintln!("Error: unknown preset '{name}'");
            process::exit(1);
        }
    }
}

/// Load the scene named by `--scene` or `--preset`.
fn load_scene(args: &[String]) -> SceneConfig {
    if let Some(path) = parse_value(args, "--scene") {
        return match SceneConfig::load(path) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("Error loading scene {path}: {e}");
                process::exit(1);
            }
        };
    }
    if let Some(name) = parse_value(args, "--preset") {
        return SceneConfig::preset(parse_preset(name));
    }

    eprintln!("Error: --scene <path> or --preset <name> is required");
    process::exit(1);
}

fn build_engine(scene: &SceneConfig) -> ParticleEngine {
    match scene.build() {
        Ok((engine, _)) => engine,
        Err(e) => {
            eprintln!("Error building scene: {e}");
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let scene = load_scene(args);
    let seconds: f32 = parse_number(args, "--seconds", 5.0);
    let rate: u32 = parse_number(args, "--rate", PREVIEW_TICK_RATE).max(1);
    let as_json = has_flag(args, "--json");

    let mut engine = build_engine(&scene);
    let dt = 1.0 / rate as f32;
    let ticks = (seconds.max(0.0) * rate as f32).round() as u64;

    eprintln!(
        "Running {} system(s) for {seconds}s at {rate} Hz ({ticks} ticks)",
        scene.systems.len()
    );

    let mut last = None;
    for tick in 1..=ticks {
        let snapshot = engine.tick(dt);
        if tick % rate as u64 == 0 || tick == ticks {
            let stats: Vec<String> = snapshot
                .systems
                .iter()
                .map(|s| {
                    format!(
                        "{}={}/{} (sessions {}, depth {})",
                        s.name, s.active_count, s.capacity, s.session_count, s.depth
                    )
                })
                .collect();
            eprintln!(
                "t={:>6.2}s  total={:>5}  {}",
                snapshot.time.elapsed_secs,
                snapshot.total_active(),
                stats.join("  ")
            );
        }
        last = Some(snapshot);
    }

    if as_json {
        let snapshot = last.unwrap_or_else(|| engine.snapshot());
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing snapshot: {e}");
                process::exit(1);
            }
        }
    }
}

// --- Check command ---

fn cmd_check(args: &[String]) {
    let scene = load_scene(args);
    let engine = build_engine(&scene);

    let mut problems = 0;
    for (system, &id) in scene.systems.iter().zip(engine.system_ids()) {
        match engine.diagnose(id) {
            Ok(issues) if issues.is_empty() => eprintln!("{}: ok", system.name),
            Ok(issues) => {
                for issue in issues {
                    eprintln!("{}: {issue}", system.name);
                    problems += 1;
                }
            }
            Err(e) => {
                eprintln!("{}: {e}", system.name);
                problems += 1;
            }
        }
    }

    if problems > 0 {
        eprintln!("{problems} problem(s) found");
        process::exit(1);
    }
}

// --- Export command ---

fn cmd_export(args: &[String]) {
    let preset = match parse_value(args, "--preset") {
        Some(name) => parse_preset(name),
        None => {
            eprintln!("Error: --preset <name> is required");
            process::exit(1);
        }
    };

    let json = match SceneConfig::preset(preset).to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing scene: {e}");
            process::exit(1);
        }
    };

    match parse_value(args, "--output").map(PathBuf::from) {
        Some(output) => match std::fs::write(&output, json) {
            Ok(()) => eprintln!("Wrote {} to {}", preset.name(), output.display()),
            Err(e) => {
                eprintln!("Error writing {}: {e}", output.display());
                process::exit(1);
            }
        },
        None => println!("{json}"),
    }
}
