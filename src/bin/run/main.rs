// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Host driver: a 4 KiB RAM machine with a serial port that boots a
//! length-prefixed program image and runs it to halt

use adr8::{asm::BOOT_LOADER, machine, Error, Ram, Result, Serial};
use gumdrop::Options;
use owo_colors::OwoColorize;
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
    process::ExitCode,
};

/// The loader machine's memory map, as fixed as the original hardware's
const RAM_SIZE: u16 = 0x1000;
const SERIAL_MOUNT: u16 = 0x1000;

/// Parses arguments into a struct
#[derive(Clone, Debug, PartialEq, Eq, Options)]
struct Arguments {
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(free, help = "Length-prefixed program image, streamed in over the serial port.")]
    image: Option<PathBuf>,
    #[options(short = "n", help = "Stop after N clock edges.", meta = "N")]
    edges: Option<usize>,
    #[options(help = "Trace core state to stderr every clock edge.")]
    trace: bool,
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
    let Some(image) = args.image.clone() else {
        usage();
        return ExitCode::FAILURE;
    };
    match run(&args, &image) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "emulator error:".red());
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    println!("Usage: adr8-run [-n N] [-t] IMAGE");
}

fn run(args: &Arguments, image: &Path) -> Result<()> {
    let stream = File::open(image).map_err(|err| {
        Error::Io(io::Error::new(
            err.kind(),
            format!("couldn't open file '{}': {err}", image.display()),
        ))
    })?;

    // the loader stub reads the image off the serial port and copies it
    // over low memory before falling into it
    let mut ram = Ram::new(0x0000, RAM_SIZE);
    ram.load(0, BOOT_LOADER);

    let mut machine = machine! {
        ram,
        Serial::new(SERIAL_MOUNT, BufReader::new(stream), io::stdout()),
    };

    if args.trace {
        let mut edges = 0;
        while !machine.core.halted() && args.edges.map_or(true, |n| edges < n) {
            machine.tick()?;
            edges += 1;
            eprintln!("{}", machine.core);
        }
    } else {
        machine.run(args.edges)?;
    }
    Ok(())
}
