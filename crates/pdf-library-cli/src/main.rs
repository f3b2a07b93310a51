use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdf_library::grid::should_show_progress;
use pdf_library::{
    FsStore, Library, LibraryConfig, UploadFile, decode_data_url, format_file_size,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfl", about = "PDF library CLI", version)]
struct Cli {
    /// Config file (JSON); defaults to the per-user config location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Library directory, overriding the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log progress and diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add PDF files to the library
    Upload {
        /// Files to add
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// List stored PDFs in display order
    List,

    /// Show details for one PDF
    Info { id: String },

    /// Remove one PDF
    Delete { id: String },

    /// Remove every PDF
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },

    /// Move the entry at position FROM to position TO (0-based, as shown by `list`)
    Move { from: usize, to: usize },

    /// Show or set the last viewed page
    Page {
        id: String,
        /// New page number (1-based)
        page: Option<u32>,
    },

    /// Write the cover thumbnail to a file
    Cover {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the stored PDF to a file
    Export {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Default `RUST_LOG` filter; `--verbose` adds progress and diagnostics
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

async fn load_config(cli: &Cli) -> Result<LibraryConfig> {
    let mut config = match cli.config.clone().or_else(LibraryConfig::default_path) {
        Some(path) => LibraryConfig::load_or_default(&path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?,
        None => LibraryConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

async fn require_document(
    library: &Library<FsStore>,
    id: &str,
) -> Result<pdf_library::PdfDocument> {
    match library.get(id).await? {
        Some(document) => Ok(document),
        None => bail!("PDF not found: {}", id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.verbose)),
    )
    .format_timestamp(None)
    .try_init()
    .context("installing logger")?;

    let config = load_config(&cli).await?;
    let library = Library::open(config).await?;

    match cli.command {
        Commands::Upload { files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(
                    UploadFile::from_path(path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?,
                );
            }

            let report = library
                .upload_batch(uploads, |progress| {
                    if should_show_progress(Some(&progress)) {
                        eprintln!(
                            "Uploading {}/{} ({:.0}%)",
                            progress.uploaded,
                            progress.total,
                            progress.percent()
                        );
                    }
                })
                .await;

            if !report.rejected.is_empty() {
                eprintln!(
                    "The following files are not valid PDFs: {}",
                    report.rejected.join(", ")
                );
            }
            for (name, id) in &report.succeeded {
                println!("Uploaded {} → {}", name, id);
            }
            for (name, error) in &report.failed {
                eprintln!("Failed to upload {}: {}", name, error);
            }
            if !report.failed.is_empty() {
                bail!("{} of {} uploads failed", report.failed.len(), report.attempted());
            }
        }

        Commands::List => {
            let items = library.list().await?;
            if items.is_empty() {
                println!("No PDFs uploaded");
            }
            for (index, item) in items.iter().enumerate() {
                println!(
                    "{:>3}  {}  {}  {}  {}",
                    index,
                    item.id,
                    item.name,
                    format_file_size(item.size),
                    item.upload_date.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Info { id } => {
            let document = require_document(&library, &id).await?;
            let record = &document.record;
            println!("Name:        {}", record.name);
            println!("ID:          {}", record.id);
            println!("Size:        {}", format_file_size(record.size));
            println!("Uploaded:    {}", record.upload_date.to_rfc3339());
            match library.page_count(&document).await {
                Ok(count) => println!("Pages:       {}", count),
                Err(e) => println!("Pages:       unknown ({})", e),
            }
            match record.current_page.filter(|page| *page > 0) {
                Some(page) => println!("Last page:   {}", page),
                None => println!("Last page:   -"),
            }
        }

        Commands::Delete { id } => {
            if library.get(&id).await?.is_none() {
                bail!("PDF not found: {}", id);
            }
            library.delete(&id).await?;
            println!("Deleted {}", id);
        }

        Commands::Clear { yes } => {
            let count = library.list().await?.len();
            if !yes {
                bail!(
                    "Refusing to delete all {} PDFs without --yes; this cannot be undone",
                    count
                );
            }
            let removed = library.clear_all().await?;
            println!("Deleted {} PDFs", removed);
        }

        Commands::Move { from, to } => {
            let mut items = library.list().await?;
            library.move_item(&mut items, from, to).await?;
            for (index, item) in items.iter().enumerate() {
                println!("{:>3}  {}  {}", index, item.id, item.name);
            }
        }

        Commands::Page { id, page } => match page {
            Some(page) => {
                if page == 0 {
                    bail!("Pages are numbered from 1");
                }
                library.save_current_page(&id, page).await?;
                println!("Saved page {} for {}", page, id);
            }
            None => match library.current_page(&id).await? {
                Some(page) => println!("{}", page),
                None => println!("No saved page"),
            },
        },

        Commands::Cover { id, output } => {
            let document = require_document(&library, &id).await?;
            let Some(url) = document.record.cover_image.as_deref() else {
                bail!("{} has no cover image", id);
            };
            let cover = decode_data_url(url)?;
            tokio::fs::write(&output, &cover.data).await?;
            println!("Cover ({}) → {}", cover.mime_type, output.display());
        }

        Commands::Export { id, output } => {
            let document = require_document(&library, &id).await?;
            tokio::fs::write(&output, &document.file).await?;
            println!("Exported {} → {}", document.name(), output.display());
        }
    }

    Ok(())
}
