use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use emu::cpu::arm::disassembler::FormatOptions;
use emu::gba::Gba;
use emu::memory::Region;

/// Default number of pipeline cycles: enough to list the first 0x1BC bytes.
const DEFAULT_CYCLES: usize = 0x1BC / 4;

#[derive(Parser, Debug)]
#[command(
    name = "armfront",
    version,
    about = "Runs the ARM7TDMI fetch/decode pipeline over a GBA BIOS or ROM and prints the listing."
)]
struct Args {
    /// BIOS image to load at 0x00000000 (at most 16 KB).
    #[arg(long, value_name = "PATH")]
    bios: Option<PathBuf>,

    /// Cartridge image to load at 0x08000000 (at most 32 MB).
    #[arg(long, value_name = "PATH")]
    rom: Option<PathBuf>,

    /// Number of pipeline cycles to run.
    #[arg(long, default_value_t = DEFAULT_CYCLES)]
    cycles: usize,

    /// Initial program counter, in hex (e.g. 0x08000000). Defaults to the
    /// cartridge entry point when only --rom is given, to 0 otherwise.
    #[arg(long, value_name = "ADDRESS", value_parser = parse_hex)]
    start: Option<u32>,

    /// Prefix every line with the instruction address.
    #[arg(long, default_value_t = false)]
    show_address: bool,

    /// Prefix every line with the raw opcode.
    #[arg(long, default_value_t = false)]
    show_opcode: bool,

    /// Dump a memory region once the run is over (bios, ewram, iwram, io,
    /// palette, vram, oam, rom, sram).
    #[arg(long, value_name = "REGION")]
    dump: Option<Region>,

    /// Where to write the dump, defaults to `<region>.bin`.
    #[arg(long, value_name = "PATH", requires = "dump")]
    dump_path: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_hex(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid address `{value}`: {e}"))
}

/// Installs the global subscriber. The returned guard flushes the file
/// writer when dropped and must outlive the run.
fn init_tracing(log_file: Option<&Path>) -> std::io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut gba = Gba::new(FormatOptions {
        show_address: args.show_address,
        show_opcode: args.show_opcode,
    });

    if let Some(path) = &args.bios {
        info!("loading BIOS {}", path.display());
        gba.load_bios_file(path)?;
    }
    if let Some(path) = &args.rom {
        info!("loading ROM {}", path.display());
        gba.load_rom_file(path)?;
    }

    match args.start {
        Some(address) => gba.cpu.registers.set_program_counter(address),
        None if args.bios.is_none() && args.rom.is_some() => gba.skip_bios(),
        None => {}
    }

    for _ in 0..args.cycles {
        if let Some(entry) = gba.step()? {
            println!("{}", entry.text);
        }
    }

    if let Some(region) = args.dump {
        let path = args
            .dump_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{region}.bin")));
        gba.cpu.memory.dump_region(region, &path)?;
        info!("{region} dumped to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match init_tracing(args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("cannot open log file: {e}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
