//! BVH continuity CLI - Run a correction pipeline from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use bvh_continuity::{compute::Pipeline, schema::PipelineConfig};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Dewrap, decompose, rewrap and export a BVH file from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to pipeline configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: PipelineConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("BVH Continuity Pipeline");
    println!("=======================");
    println!("Input: {}", config.input.display());
    println!("Output: {}", config.output_dir.display());
    println!(
        "Columns: {}..{} (dewrap: {}, rewrap: {})",
        config.columns.start, config.columns.end, config.dewrap, config.rewrap
    );
    println!();

    let pipeline = Pipeline::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let report = pipeline.run().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    println!("Source: {} frames x {} channels", report.frames, report.channels);
    println!("Frame time: {}s", report.frame_time);
    println!("Dewrap: {}", report.dewrap);
    println!("Rewrap: {}", report.rewrap);
    println!();
    println!("Written:");
    for path in &report.written {
        println!("  {}", path.display());
    }
    println!();
    println!("Time: {:.3}s", elapsed.as_secs_f32());
}

fn print_example_config() {
    let config = PipelineConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
