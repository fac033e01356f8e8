//! SentinelDB CLI Client
//!
//! Command-line interface for interacting with SentinelDB.

use std::io::BufReader;
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentineldb::protocol::{read_reply, write_command, Command};

/// SentinelDB CLI
#[derive(Parser, Debug)]
#[command(name = "sentineldb-cli")]
#[command(about = "CLI for SentinelDB key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set (empty if omitted)
        value: Option<String>,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Export a snapshot on the server
    Save,

    /// Compact the server's log
    Compact,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get { key } => Command::Get { key: key.into_bytes() },
            Commands::Set { key, value } => Command::Set {
                key: key.into_bytes(),
                value: value.map(String::into_bytes).unwrap_or_default(),
            },
            Commands::Del { key } => Command::Del { key: key.into_bytes() },
            Commands::Save => Command::Save,
            Commands::Compact => Command::Compact,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args.server, args.command.into()) {
        Ok(reply) => {
            println!("{}", String::from_utf8_lossy(&reply));
            if reply.starts_with(b"-") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(server: &str, command: Command) -> sentineldb::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(server)?;
    let mut reader = BufReader::new(stream.try_clone()?);

    write_command(&mut stream, &command)?;
    let reply = read_reply(&mut reader)?;

    write_command(&mut stream, &Command::Exit)?;
    let _ = read_reply(&mut reader);

    Ok(reply)
}
