use anyhow::Result;
use chrono_cli::{compile_file, load_modules, output_path, read_source};
use chrono_parse::lex;
use chrono_verilog::emit_to;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "chrono")]
#[command(about = "Chrono: compile hardware descriptions to Verilog")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Path to Chrono source file
    file: Option<PathBuf>,

    /// Output path (`-` for stdout); defaults to FILE with a .v extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Verilog)]
    emit: Emit,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print help
    #[arg(short, long, action = ArgAction::SetTrue)]
    help: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Emit {
    Verilog,
    Ast,
    Tokens,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.help {
        eprintln!("{}", Cli::command().render_help());
        std::process::exit(1);
    }

    let Some(file) = cli.file.as_deref() else {
        eprintln!("usage: chrono-cli <FILE> [-o OUTPUT]   (see --help)");
        std::process::exit(1);
    };

    if let Err(e) = run(&cli, file) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .init();
}

fn run(cli: &Cli, file: &Path) -> Result<()> {
    match cli.emit {
        Emit::Tokens => cmd_tokens(file),
        Emit::Ast => cmd_ast(file),
        Emit::Verilog => {
            let output = cli.output.clone().unwrap_or_else(|| output_path(file));
            if output.as_os_str() == "-" {
                let modules = load_modules(file)?;
                emit_to(&modules, std::io::stdout().lock())?;
                Ok(())
            } else {
                compile_file(file, &output)
            }
        }
    }
}

fn cmd_tokens(file: &Path) -> Result<()> {
    let src = read_source(file)?;
    let mut stream = lex(&src);
    while stream.has_more() {
        let tok = stream.next()?;
        println!("{}\t{:?}\t{}", tok.pos, tok.kind, tok.text);
    }
    Ok(())
}

fn cmd_ast(file: &Path) -> Result<()> {
    let modules = load_modules(file)?;
    println!("{}", serde_json::to_string_pretty(&modules)?);
    Ok(())
}
