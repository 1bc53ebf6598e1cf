use std::{
    error::Error,
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
};

use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use wust_frame::{DEFAULT_BUFFER_CAPACITY, FrameFactory, FrameParser, Opcode};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a payload as a single frame and write it to stdout
    Encode {
        /// Frame type
        #[arg(short, long, value_enum, default_value_t = Kind::Text)]
        opcode: Kind,

        /// Mask the payload with a random key
        #[arg(short, long)]
        mask: bool,

        /// Clear the FIN bit. Ignored, with a warning, for close, ping and pong
        #[arg(long)]
        no_fin: bool,

        /// Seed the masking key generator for reproducible output
        #[arg(long, num_args = 2, value_names = ["S0", "S1"])]
        seed: Option<Vec<u64>>,

        /// Print hex instead of raw bytes
        #[arg(long)]
        hex: bool,

        payload: String,
    },
    /// Parse raw frames from a file (or stdin) and print them
    Decode {
        /// Bytes read per call
        #[arg(short, long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
        chunk_size: usize,

        /// Print payloads with the mask removed
        #[arg(short, long)]
        unmask: bool,

        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Cont,
    Text,
    Bin,
    Close,
    Ping,
    Pong,
}

impl From<Kind> for Opcode {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Cont => Opcode::Cont,
            Kind::Text => Opcode::Text,
            Kind::Bin => Opcode::Bin,
            Kind::Close => Opcode::Close,
            Kind::Ping => Opcode::Ping,
            Kind::Pong => Opcode::Pong,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wust_frame=info".parse()?))
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    match Args::parse().command {
        Command::Encode {
            opcode,
            mask,
            no_fin,
            seed,
            hex,
            payload,
        } => encode(
            opcode,
            mask,
            fin_for(opcode, no_fin),
            seed.as_deref(),
            hex,
            payload.as_bytes(),
        ),
        Command::Decode {
            chunk_size,
            unmask,
            file,
        } => decode(chunk_size.max(1), unmask, file),
    }
}

// control frames are never fragmented
fn fin_for(kind: Kind, no_fin: bool) -> bool {
    let opcode = Opcode::from(kind);
    if no_fin && opcode.is_control() {
        tracing::warn!(%opcode, "--no-fin ignored, control frames are always final");
        return true;
    }
    !no_fin
}

fn encode(
    kind: Kind,
    mask: bool,
    fin: bool,
    seed: Option<&[u64]>,
    hex: bool,
    payload: &[u8],
) -> Result<(), Box<dyn Error>> {
    let mut factory = match seed {
        Some(&[s0, s1]) => FrameFactory::with_seed(DEFAULT_BUFFER_CAPACITY, s0, s1),
        _ => FrameFactory::new(),
    };

    let frame = match kind {
        Kind::Ping => factory.ping(mask, payload)?,
        Kind::Pong => factory.pong(mask, payload)?,
        Kind::Close => factory.close(mask, payload)?,
        data => factory.construct(fin, data.into(), mask, payload)?,
    };

    let mut stdout = io::stdout().lock();
    if hex {
        let line: String = frame.iter().map(|b| format!("{b:02x}")).collect();
        writeln!(stdout, "{line}")?;
    } else {
        stdout.write_all(frame)?;
    }
    stdout.flush()?;
    Ok(())
}

fn decode(chunk_size: usize, unmask: bool, file: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut input: Box<dyn Read> = match file {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };

    let mut parser = FrameParser::new();
    let mut count = 0usize;
    loop {
        // read straight into the parser's buffer
        let mut buf = parser.frame_buffer();
        buf.grow_by(chunk_size);
        let n = input.read(&mut buf.spare_mut()[..chunk_size])?;
        if n == 0 {
            break;
        }
        buf.commit(n);
        tracing::trace!(bytes = n, "read input");

        while let Some(f) = parser.poll() {
            count += 1;
            let payload = if unmask { f.unmask() } else { Bytes::copy_from_slice(f.payload) };
            println!(
                "[fin={}][{}][mask={}][len={}] {}",
                u8::from(f.fin),
                f.opcode,
                u8::from(f.is_masked()),
                f.payload.len(),
                String::from_utf8_lossy(&payload)
            );
        }
    }

    if parser.buffered() > 0 {
        tracing::warn!(bytes = parser.buffered(), "input ended inside a frame");
    }
    tracing::info!(frames = count, "done");
    Ok(())
}
