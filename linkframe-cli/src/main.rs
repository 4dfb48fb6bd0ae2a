use anyhow::Result;
use clap::{Parser, Subcommand};
use linkframe_cli::{commands, load_config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "linkframe")]
#[command(about = "Linkframe - Hamming-protected text frames over paired serial channels", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON link configuration
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the group id (sets the flag and a data field of group + 1 bits)
    #[arg(short, long, global = true)]
    group: Option<u8>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame text lines into wire lines
    Frame {
        /// Channel id; its last digit becomes the source address
        #[arg(long, default_value = "COM1")]
        channel: String,

        /// Input text file, or - for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output file for wire lines
        #[arg(short, long)]
        output: Option<String>,

        /// Corrupt each FCS with the channel simulator seeded with this value
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Parse and decode wire lines
    Decode {
        /// Input file with wire lines, or - for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output JSON file for the decode report
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the bit-stuffed form of a bit string
    Stuff {
        /// Bits to stuff
        bits: String,

        /// Remove stuffing instead
        #[arg(long)]
        destuff: bool,
    },

    /// Run both channel pairs over an in-memory loopback
    Demo {
        /// Lines sent on pair A, separated by ';'
        #[arg(long, default_value = "Hi;0110;ok")]
        lines_a: String,

        /// Lines sent on pair B, separated by ';'
        #[arg(long, default_value = "Yo;111111")]
        lines_b: String,

        /// Corrupt each FCS with the channel simulator seeded with this value
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Frame {
            channel,
            input,
            output,
            seed,
        } => {
            let config = load_config(config_path, cli.group, seed)?;
            commands::frame::execute(&input, output.as_deref(), &channel, &config)
        }

        Commands::Decode { input, output } => {
            let config = load_config(config_path, cli.group, None)?;
            commands::decode::execute(&input, output.as_deref(), &config)
        }

        Commands::Stuff { bits, destuff } => commands::stuff::execute(&bits, destuff),

        Commands::Demo {
            lines_a,
            lines_b,
            seed,
        } => {
            let config = load_config(config_path, cli.group, seed)?;
            commands::demo::execute(
                config,
                &lines_a.replace(';', "\n"),
                &lines_b.replace(';', "\n"),
            )
        }
    }
}
