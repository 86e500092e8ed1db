use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ggscope::config::{Config, ImageFormat};
use ggscope::trace::NoMapper;
use ggscope::unpack::{columns, phantasy_star, Cursor};
use ggscope::vdp::{self, Vram, REFERENCE_PALETTE};
use ggscope::{Palette, PixelBuffer, TraceEvent, Tracer};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "ggscope")]
#[command(about = "Game Gear trace listings and VDP graphics dumps")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long, global = true)]
    save_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render both color RAM banks as swatches
    Palette {
        cram: PathBuf,
        #[arg(short, long, default_value = "palette.ppm")]
        output: PathBuf,
        /// Darken every channel by this amount
        #[arg(long, default_value_t = 0)]
        darken: u8,
    },
    /// Render the tile atlas with the reference palette
    Patterns {
        vram: PathBuf,
        #[arg(short, long, default_value = "patterns.ppm")]
        output: PathBuf,
    },
    /// Render the background layer
    Nametable {
        vram: PathBuf,
        cram: PathBuf,
        /// Nametable base address (hex)
        #[arg(long, value_parser = parse_hex)]
        nt_addr: Option<u16>,
        #[arg(short, long, default_value = "image.ppm")]
        output: PathBuf,
    },
    /// Replay a JSON-lines event log and print the hit-count listing
    Trace {
        events: PathBuf,
        /// Print instructions as they are replayed
        #[arg(long)]
        print_insts: bool,
        /// Print RAM accesses as they are replayed
        #[arg(long)]
        print_ram_access: bool,
    },
    /// Decode Phantasy Star compressed tiles from a ROM bank
    PsTiles {
        bank: PathBuf,
        #[arg(long, value_parser = parse_hex)]
        addr: u16,
        #[arg(long)]
        count: usize,
        #[arg(short, long, default_value = "ps_tiles.ppm")]
        output: PathBuf,
    },
    /// Decode a Columns 1-bpp font strip from a ROM bank
    Bitmap {
        bank: PathBuf,
        #[arg(long, value_parser = parse_hex)]
        addr: u16,
        #[arg(short, long, default_value = "bitmap.ppm")]
        output: PathBuf,
    },
}

fn parse_hex(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let args = Args::parse();

    // Set log level based on debug flag
    let log_level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log_level);
    builder.init();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    if let Err(e) = run(args.command, &mut config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.save_config {
        let saved = match &args.config {
            Some(path) => config.save_to(path),
            None => config.save(),
        };
        if let Err(e) = saved {
            eprintln!("Error: failed to save configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Command, config: &mut Config) -> Result<()> {
    match command {
        Command::Palette { cram, output, darken } => {
            let pal = Palette::from_cram(&read_at_least(&cram, ggscope::palette::CRAM_SIZE)?);
            write_image(&pal.darken(darken).to_image(), &output, config)
        }
        Command::Patterns { vram, output } => {
            let ram = read_at_least(&vram, vdp::VRAM_SIZE)?;
            write_image(&vdp::decode_patterns(&ram, &REFERENCE_PALETTE), &output, config)
        }
        Command::Nametable { vram, cram, nt_addr, output } => {
            let ram = read_at_least(&vram, vdp::VRAM_SIZE)?;
            let pal = Palette::from_cram(&read_at_least(&cram, ggscope::palette::CRAM_SIZE)?);
            let view = Vram::new(&ram, config.video.nametable_addr);
            write_image(&vdp::decode_nametable(&view, &pal, nt_addr), &output, config)
        }
        Command::Trace { events, print_insts, print_ram_access } => {
            config.trace.print_insts |= print_insts;
            config.trace.print_ram_access |= print_ram_access;
            let mut tracer = Tracer::from_config(config);
            let reader = BufReader::new(File::open(&events)?);
            for (n, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<TraceEvent>(&line) {
                    Ok(event) => tracer.handle(&event, &NoMapper),
                    Err(e) => log::warn!("{}:{}: skipping event: {}", events.display(), n + 1, e),
                }
            }
            log::info!("{} addresses traced", tracer.len());
            let stdout = io::stdout();
            tracer.dump(&mut stdout.lock())?;
            Ok(())
        }
        Command::PsTiles { bank, addr, count, output } => {
            let data = fs::read(&bank)?;
            let mut cur = Cursor::at(&data, addr as usize);
            let img = phantasy_star::generate_tiles(&mut cur, count, &REFERENCE_PALETTE)?;
            log::info!("tiles end at {:#06x}", cur.pos());
            write_image(&img, &output, config)
        }
        Command::Bitmap { bank, addr, output } => {
            let data = fs::read(&bank)?;
            let mut cur = Cursor::at(&data, addr as usize);
            write_image(&columns::decode_bitmap(&mut cur), &output, config)
        }
    }
}

fn read_at_least(path: &Path, len: usize) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    if data.len() < len {
        return Err(format!(
            "{}: expected at least {} bytes, got {}",
            path.display(),
            len,
            data.len()
        )
        .into());
    }
    Ok(data)
}

/// Write PNG when the extension asks for it or the config prefers it,
/// plain PPM otherwise.
fn write_image(img: &PixelBuffer, path: &Path, config: &Config) -> Result<()> {
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ImageFormat::Png,
        Some("ppm") | Some("pnm") => ImageFormat::Ppm,
        _ => config.video.image_format,
    };
    match format {
        ImageFormat::Png => img
            .to_rgb_image()
            .save_with_format(path, image::ImageFormat::Png)?,
        ImageFormat::Ppm => {
            let mut out = BufWriter::new(File::create(path)?);
            img.write_ppm(&mut out)?;
            out.flush()?;
        }
    }
    log::info!("Wrote {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}
