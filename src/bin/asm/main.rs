// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Assembler CLI: compiles ordered assembly sources into one machine
//! code image

use adr8::{asm::BOOTSTRAP_PATH, Assembler, Error, Result};
use gumdrop::Options;
use owo_colors::OwoColorize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

/// Parses arguments into a struct
#[derive(Clone, Debug, PartialEq, Eq, Options)]
struct Arguments {
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Write the assembled image to OUTFILE.", meta = "OUTFILE")]
    output: Option<PathBuf>,
    #[options(help = "Prepend the bootstrap source as an implicit first input.")]
    bootstrap: bool,
    #[options(free, help = "Input source files, assembled in order.")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match Arguments::parse_args_default(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            usage();
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        usage();
        println!("\n{}", Arguments::usage());
        return ExitCode::SUCCESS;
    }
    let Some(output) = args.output.clone() else {
        usage();
        return ExitCode::FAILURE;
    };
    match assemble(&args, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    println!("Usage: adr8-asm -o OUTFILE [-b] [INFILE ...]");
}

fn assemble(args: &Arguments, output: &Path) -> Result<()> {
    let mut inputs = args.files.clone();
    if args.bootstrap {
        let bootstrap = PathBuf::from(BOOTSTRAP_PATH);
        if !bootstrap.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "couldn't find the bootstrap source '{BOOTSTRAP_PATH}', \
                     run from the repository root or provide it there"
                ),
            )));
        }
        inputs.insert(0, bootstrap);
    }

    let mut asm = Assembler::new();
    for path in &inputs {
        let source = fs::read_to_string(path).map_err(|err| file_error(path, err))?;
        asm.pass(&source, &path.display().to_string())?;
    }
    let image = asm.finish()?;
    fs::write(output, image).map_err(|err| file_error(output, err))?;
    Ok(())
}

/// Io errors leaving the CLI must name the file they are about
fn file_error(path: &Path, err: io::Error) -> Error {
    Error::Io(io::Error::new(
        err.kind(),
        format!("couldn't open file '{}': {err}", path.display()),
    ))
}
