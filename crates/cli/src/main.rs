use api_shared::{HoldingRes, ServerInfoRes};
use clap::{Parser, Subcommand};
use holdings_core::{
    HoldingId, LibraryConfig, ServerInfo, DEFAULT_API_KEY, DEFAULT_API_USER,
    DEFAULT_LIBRARY_PATH, DEFAULT_PORT,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "holdings")]
#[command(about = "Operator CLI for a holdings library, working directly on disk")]
struct Cli {
    /// Root directory of the library
    #[arg(long = "library-path", env = "LIBRARY_PATH", default_value = DEFAULT_LIBRARY_PATH)]
    library_path: PathBuf,

    /// JSON config file; its LibraryPath and Shards take precedence
    #[arg(long, env = "HOLDINGS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all holdings
    List,
    /// Show the tracks and flags of a holding
    Show {
        /// Holding UUID
        uuid: String,
    },
    /// Lock a holding against further track uploads
    Lock {
        /// Holding UUID
        uuid: String,
    },
    /// Store a track
    PutTrack {
        /// Holding UUID
        uuid: String,
        /// Track path relative to music/
        relpath: String,
        /// Local file to upload
        file: PathBuf,
    },
    /// Store the album artwork
    PutArtwork {
        /// Holding UUID
        uuid: String,
        /// Local file to upload
        file: PathBuf,
    },
    /// Print version, free space and shards as JSON
    Info,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'holdings --help' for commands");
        return Ok(());
    };

    let cfg = LibraryConfig::load(
        cli.config.as_deref(),
        DEFAULT_PORT,
        DEFAULT_API_USER.into(),
        DEFAULT_API_KEY.into(),
        cli.library_path,
    )?;
    let library = cfg.open_library()?;

    match command {
        Commands::List => {
            let ids = library.enumerator().list_all()?;
            if ids.is_empty() {
                println!("No holdings found.");
            }
            for id in ids {
                println!("{}", id);
            }
        }
        Commands::Show { uuid } => {
            let id = parse_id(&uuid)?;
            let summary = library.enumerator().describe(&id)?;
            let res = HoldingRes::from(summary);
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Commands::Lock { uuid } => {
            let id = parse_id(&uuid)?;
            library.locks().lock(&id)?;
            println!("Created lock for {}", id);
        }
        Commands::PutTrack {
            uuid,
            relpath,
            file,
        } => {
            let id = parse_id(&uuid)?;
            let content = std::fs::read(&file)?;
            let written = library.store().put_track(&id, &relpath, &content)?;
            println!("uploaded: {} bytes", written);
        }
        Commands::PutArtwork { uuid, file } => {
            let id = parse_id(&uuid)?;
            let content = std::fs::read(&file)?;
            let written = library.store().put_artwork(&id, &content)?;
            println!("uploaded: {} bytes", written);
        }
        Commands::Info => {
            let info = ServerInfo::collect(&cfg, library.root())?;
            println!("{}", serde_json::to_string_pretty(&ServerInfoRes::from(info))?);
        }
    }

    Ok(())
}

fn parse_id(uuid: &str) -> Result<HoldingId, Box<dyn std::error::Error>> {
    Ok(HoldingId::parse(uuid)?)
}
