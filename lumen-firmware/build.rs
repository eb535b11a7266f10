//! Build script for lumen-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates panel.toml and turns it into a `PanelConfig` constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Controller frame memory (columns, rows) in native orientation
const CONTROLLER: (i64, i64) = (240, 320);

/// MADCTL row/column exchange bit
const MADCTL_MV: i64 = 0x20;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    generate_panel_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Panel values after validation
struct Panel {
    width: i64,
    height: i64,
    x_offset: i64,
    y_offset: i64,
    orientation: i64,
    byte_order: &'static str,
    resource_order: &'static str,
    inverted: bool,
    bus_hz: i64,
    chunk_bytes: i64,
    max_alloc_bytes: i64,
}

/// Validate panel.toml and write `panel_config.rs` into OUT_DIR
fn generate_panel_config(out_dir: &Path) {
    // Re-run if panel.toml changes
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires the panel calibration of this unit.       ║\n\
            ║  Please create panel.toml in the lumen-firmware directory.       ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in panel.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let panel = validate_panel(&config);

    let generated = format!(
        "// Generated by build.rs from panel.toml. Do not edit.\n\
         const PANEL: PanelConfig = PanelConfig {{\n    \
             canvas: Canvas {{\n        \
                 width: {},\n        \
                 height: {},\n        \
                 x_offset: {},\n        \
                 y_offset: {},\n        \
                 orientation: Orientation(0x{:02X}),\n    \
             }},\n    \
             byte_order: ByteOrder::{},\n    \
             resource_order: ByteOrder::{},\n    \
             inverted: {},\n    \
             bus_hz: {},\n    \
             budget: MemoryBudget::new({}, {}),\n\
         }};\n",
        panel.width,
        panel.height,
        panel.x_offset,
        panel.y_offset,
        panel.orientation,
        panel.byte_order,
        panel.resource_order,
        panel.inverted,
        panel.bus_hz,
        panel.chunk_bytes,
        panel.max_alloc_bytes,
    );
    fs::write(out_dir.join("panel_config.rs"), generated).unwrap();

    println!(
        "cargo:warning=panel.toml validated: {}x{} at ({}, {}), MADCTL 0x{:02X}",
        panel.width, panel.height, panel.x_offset, panel.y_offset, panel.orientation
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check every field and the controller fit, collecting all errors
fn validate_panel(config: &toml::Value) -> Panel {
    let mut errors = Vec::new();

    let int = |table: Option<&toml::Value>, key: &str, errors: &mut Vec<String>| -> i64 {
        match table.and_then(|t| t.get(key)) {
            Some(toml::Value::Integer(v)) => *v,
            Some(_) => {
                errors.push(format!("'{}' must be an integer", key));
                0
            }
            None => {
                errors.push(format!("missing '{}'", key));
                0
            }
        }
    };

    let order = |key: &str, errors: &mut Vec<String>| -> &'static str {
        match config.get(key) {
            None => "BigEndian",
            Some(toml::Value::String(s)) if s == "big-endian" => "BigEndian",
            Some(toml::Value::String(s)) if s == "little-endian" => "LittleEndian",
            Some(_) => {
                errors.push(format!("'{}' must be \"big-endian\" or \"little-endian\"", key));
                "BigEndian"
            }
        }
    };

    let canvas = config.get("canvas");
    if canvas.is_none() {
        errors.push("Missing [canvas] section".to_string());
    }
    let width = int(canvas, "width", &mut errors);
    let height = int(canvas, "height", &mut errors);
    let x_offset = int(canvas, "x_offset", &mut errors);
    let y_offset = int(canvas, "y_offset", &mut errors);
    let orientation = match canvas.and_then(|c| c.get("orientation")) {
        None => 0,
        Some(_) => int(canvas, "orientation", &mut errors),
    };
    let bus_hz = int(Some(config), "bus_hz", &mut errors);

    let inverted = match config.get("inverted") {
        None => false,
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push("'inverted' must be true or false".to_string());
            false
        }
    };
    let byte_order = order("byte_order", &mut errors);
    let resource_order = order("resource_order", &mut errors);

    let (chunk_bytes, max_alloc_bytes) = match config.get("budget") {
        None => (1024, 16 * 1024),
        budget => (
            int(budget, "chunk_bytes", &mut errors),
            int(budget, "max_alloc_bytes", &mut errors),
        ),
    };

    if width <= 0 || height <= 0 {
        errors.push("canvas width and height must be positive".to_string());
    }
    if x_offset < 0 || y_offset < 0 {
        errors.push("canvas offsets cannot be negative".to_string());
    }
    if !(0..=0xFF).contains(&orientation) {
        errors.push("orientation must be a MADCTL byte (0x00-0xFF)".to_string());
    }
    let (cols, rows) = if orientation & MADCTL_MV != 0 {
        (CONTROLLER.1, CONTROLLER.0)
    } else {
        CONTROLLER
    };
    if x_offset + width > cols || y_offset + height > rows {
        errors.push(format!(
            "canvas at ({}, {}) exceeds the {}x{} controller memory",
            x_offset, y_offset, cols, rows
        ));
    }
    if bus_hz <= 0 || bus_hz > u32::MAX as i64 {
        errors.push("bus_hz must be a positive 32-bit frequency".to_string());
    }
    if chunk_bytes < 2 || max_alloc_bytes < chunk_bytes {
        errors.push("budget needs chunk_bytes >= 2 and max_alloc_bytes >= chunk_bytes".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid panel configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    Panel {
        width,
        height,
        x_offset,
        y_offset,
        orientation,
        byte_order,
        resource_order,
        inverted,
        bus_hz,
        chunk_bytes,
        max_alloc_bytes,
    }
}
