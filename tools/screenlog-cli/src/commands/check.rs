//! Check displays and encoder availability.

use screenlog_capture_engine::engine::planned_surfaces;
use screenlog_capture_engine::get_backend;
use screenlog_common::config::config_file_path;
use screenlog_render_engine::{EncoderFactory, FfmpegEncoderFactory};

pub fn run() -> anyhow::Result<()> {
    println!("Screenlog System Check");
    println!("{}", "=".repeat(50));

    let backend = get_backend()?;
    println!("[OK] Display backend: {}", backend.name());

    match backend.surfaces() {
        Ok(monitors) if monitors.is_empty() => {
            println!("[WARN] No monitors found. Maybe in sleeping mode?");
        }
        Ok(monitors) => {
            println!("[OK] Monitors detected: {}", monitors.len());
            for m in &monitors {
                println!(
                    "     {}: {} {}x{} at ({}, {}) {}",
                    m.id,
                    m.name,
                    m.width,
                    m.height,
                    m.x,
                    m.y,
                    if m.primary { "(primary)" } else { "" }
                );
            }
            println!(
                "     Frames per capture: {} (1 with --merge)",
                planned_surfaces(&monitors, false).len()
            );
        }
        Err(e) => println!("[FAIL] Monitor detection: {e}"),
    }

    let encoders = FfmpegEncoderFactory;
    if encoders.is_available() {
        println!("[OK] Video encoder: {}", encoders.name());
    } else {
        println!("[WARN] Video encoder: ffmpeg not found on PATH (--img still works)");
    }

    println!("[OK] Config file: {}", config_file_path().display());
    Ok(())
}
