//! gifplay CLI - Inspect, extract, compile and play GIF animations.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gifplay::{
    AnimationError,
    animation::{OwnerId, PlaybackManager, decode_bytes, decode_file, extract, format},
    display::MemoryDisplay,
    schema::PlayerConfig,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--example") => print_example_config(),
        Some("info") if args.len() == 3 => info(Path::new(&args[2])),
        Some("extract") if args.len() == 3 => extract_command(Path::new(&args[2])),
        Some("compile") if args.len() == 4 => compile(Path::new(&args[2]), Path::new(&args[3])),
        Some("play") if args.len() == 3 => play(Path::new(&args[2])),
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [args]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>             Print dimensions, frame count and delays");
    eprintln!("  extract <file>          Write every frame next to <file> as PNG");
    eprintln!("  compile <src> <dst>     Wrap <src> in a length-prefixed resource");
    eprintln!("  play <config.json>      Run headless playback from a configuration");
    eprintln!("  --example               Print an example playback configuration");
}

fn info(path: &Path) {
    let animation = decode_file(path).unwrap_or_else(|e| {
        eprintln!("Error decoding {}: {}", path.display(), e);
        std::process::exit(1);
    });

    println!("{}", path.display());
    println!("  Size: {}x{}", animation.width(), animation.height());
    println!("  Frames: {}", animation.frame_count());
    println!("  Packed bytes: {}", animation.packed_frames().len());

    let total: u64 = animation.frames().map(|f| f.delay_centis as u64).sum();
    println!("  Loop length: {:.2}s", total as f32 / 100.0);
    for frame in animation.frames() {
        println!("  Frame {:>3}: {} cs", frame.index, frame.delay_centis);
    }
}

fn extract_command(path: &Path) {
    let written = extract(path).unwrap_or_else(|e| {
        eprintln!("Error decoding {}: {}", path.display(), e);
        std::process::exit(1);
    });

    if written.is_empty() {
        eprintln!("No frames could be written");
        std::process::exit(1);
    }
    for out in written {
        println!("{}", out.display());
    }
}

fn compile(src: &Path, dst: &Path) {
    let source = fs::read(src).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", src.display(), e);
        std::process::exit(1);
    });

    // Refuse to compile something the runtime cannot decode
    if let Err(e) = decode_bytes(&source) {
        eprintln!("Error decoding {}: {}", src.display(), e);
        std::process::exit(1);
    }

    let result = File::create(dst).and_then(|file| {
        let mut writer = BufWriter::new(file);
        format::write_resource(&source, &mut writer)?;
        writer.flush()
    });
    if let Err(e) = result {
        eprintln!("Error writing {}: {}", dst.display(), e);
        std::process::exit(1);
    }

    println!(
        "Compiled {} ({} bytes) -> {}",
        src.display(),
        source.len(),
        dst.display()
    );
}

fn play(config_path: &Path) {
    let config_str = fs::read_to_string(config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: PlayerConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let mut display = MemoryDisplay::new();
    let mut playback = PlaybackManager::new();

    for placement in &config.placements {
        let path = resolve(base_dir, &placement.resource);
        let owner = OwnerId(placement.owner);

        let attached = match fs::read(&path) {
            Ok(bytes) if placement.compiled => {
                playback.attach_resource(owner, &bytes, &placement.material_slot, &mut display)
            }
            Ok(bytes) => decode_bytes(&bytes)
                .map_err(Into::into)
                .and_then(|animation| {
                    playback.attach(owner, animation, &placement.material_slot, &mut display)
                }),
            Err(e) => Err(AnimationError::Io(e).into()),
        };

        if let Err(e) = attached {
            log::warn!(
                "Skipping owner {} ({}): {}",
                placement.owner,
                path.display(),
                e
            );
        }
    }

    if playback.active_count() == 0 {
        eprintln!("No placements could be attached");
        std::process::exit(1);
    }

    let ticks = config.tick_count();
    let dt = config.dt();

    println!("Headless Playback");
    println!("=================");
    println!("Placements: {}", playback.active_count());
    println!("Tick rate: {} Hz", config.tick_rate);
    println!("Ticks: {}", ticks);
    println!();

    let start = Instant::now();
    let mut published = 0u64;
    for _ in 0..ticks {
        published += playback.tick(dt, &mut display) as u64;
    }
    let elapsed = start.elapsed();

    for (slot, state) in playback.iter() {
        let updates = state
            .display_handle()
            .and_then(|handle| display.get(handle))
            .map_or(0, |buffer| buffer.updates);
        let frame_count = state.animation().map_or(0, |a| a.frame_count());
        println!(
            "  Owner {} (slot {}): frame {}/{}, {} updates",
            state.owner().0,
            slot.index(),
            state.current_frame_index(),
            frame_count,
            updates
        );
    }

    println!();
    println!(
        "Published {} frames in {:.2}ms ({:.1} ticks/ms)",
        published,
        elapsed.as_secs_f64() * 1000.0,
        ticks as f64 / (elapsed.as_secs_f64() * 1000.0).max(f64::EPSILON)
    );

    playback.shutdown(&mut display);
}

fn resolve(base_dir: &Path, resource: &Path) -> PathBuf {
    if resource.is_absolute() {
        resource.to_path_buf()
    } else {
        base_dir.join(resource)
    }
}

fn print_example_config() {
    let config = PlayerConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
