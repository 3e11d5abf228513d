#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

use anyhow::{bail, Context, Result};
use chrono_ast::ast::ModuleDecl;
use chrono_parse::parse_str;
use chrono_verilog::emit;
use log::info;
use std::path::{Path, PathBuf};

/// Maximum source file size in bytes (1MB)
pub const MAX_SOURCE_SIZE: usize = 1_000_000;

/// Where the Verilog for `input` goes: the same path with a `.v` extension.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("v")
}

pub fn read_source(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    Ok(src)
}

pub fn load_modules(path: &Path) -> Result<Vec<ModuleDecl>> {
    let src = read_source(path)?;
    let file = path.display().to_string();
    parse_str(&file, &src).with_context(|| format!("failed to parse '{}'", file))
}

/// Compile Chrono source text to Verilog text.
pub fn compile(file: &str, src: &str) -> Result<String> {
    let modules = parse_str(file, src)?;
    let verilog = emit(&modules)?;
    Ok(verilog)
}

/// Compile `input` and write the Verilog to `output`.
///
/// The output file is only created once the whole module list has been
/// emitted, so a failed compile leaves no partial file behind.
pub fn compile_file(input: &Path, output: &Path) -> Result<()> {
    let modules = load_modules(input)?;
    let verilog = emit(&modules)
        .with_context(|| format!("failed to generate Verilog for '{}'", input.display()))?;
    std::fs::write(output, verilog)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    info!(
        "wrote {} module(s) to {}",
        modules.len(),
        output.display()
    );
    Ok(())
}
