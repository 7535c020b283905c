//! CLI entry point for markpress

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "markpress")]
#[command(version)]
#[command(about = "A small static blog engine for markdown posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new draft post
    New {
        /// Title of the new post
        title: String,

        /// Slug to use instead of one derived from the title
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List posts in order
    List {
        /// Include drafts
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Render a single post
    Show {
        /// Post slug
        slug: String,

        /// Include drafts
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Publish drafts too
        #[arg(long)]
        drafts: bool,
    },

    /// Start a development server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Disable live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "markpress=debug,tower_http=debug,info"
    } else {
        "markpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("reading current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            markpress::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New { title, slug } => {
            let blog = markpress::Blog::new(&base_dir)?;
            let path = markpress::commands::new::create_post(&blog, &title, slug.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::List { drafts, json } => {
            let blog = markpress::Blog::new(&base_dir)?;
            markpress::commands::list::run(&blog, drafts, json).await?;
        }

        Commands::Show { slug, drafts, json } => {
            let blog = markpress::Blog::new(&base_dir)?;
            markpress::commands::show::run(&blog, &slug, drafts, json).await?;
        }

        Commands::Generate { drafts } => {
            let blog = markpress::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let report = markpress::commands::generate::run(&blog, drafts).await?;
            println!(
                "Generated {} posts into {:?}",
                report.pages, blog.public_dir
            );
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = markpress::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            markpress::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let blog = markpress::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            markpress::commands::clean::run(&blog)?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("markpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
