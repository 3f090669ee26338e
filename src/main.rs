use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use storefront::core::Collection;
use storefront::core::log::init_logging;
use storefront::{AppCommand, LogoArgs};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display categories, brands and products
    Catalog,
    /// Manage categories
    #[command(subcommand)]
    Categories(CollectionCommands),
    /// Manage brands
    #[command(subcommand)]
    Brands(BrandCommands),
    /// Manage products
    #[command(subcommand)]
    Products(CollectionCommands),
    /// Manage hosted images
    #[command(subcommand)]
    Image(ImageCommands),
    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// List the collection
    List,
    /// Replace the collection with the JSON array in FILE
    Save { file: PathBuf },
}

#[derive(Args)]
struct LogoFlags {
    /// Use an existing image URL as the logo
    #[arg(long)]
    logo_url: Option<String>,
    /// Upload a local image as the logo
    #[arg(long)]
    logo_file: Option<PathBuf>,
    /// Content type of the uploaded logo, guessed from the extension if omitted
    #[arg(long, requires = "logo_file")]
    content_type: Option<String>,
}

impl LogoFlags {
    fn into_args(self, remove: bool) -> LogoArgs {
        LogoArgs {
            url: self.logo_url,
            file: self.logo_file,
            content_type: self.content_type,
            remove,
        }
    }
}

#[derive(Subcommand)]
enum BrandCommands {
    /// List brands
    List,
    /// Add a brand
    Add {
        name: String,
        #[command(flatten)]
        logo: LogoFlags,
    },
    /// Rename a brand or change its logo
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        logo: LogoFlags,
        /// Drop the current logo
        #[arg(long)]
        remove_logo: bool,
    },
    /// Remove a brand and its hosted logo
    Remove { id: String },
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Upload an image and print its URL
    Upload {
        path: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete a hosted image
    Delete { url: String },
    /// Print the URL a storefront should use to display an image
    Url { url: String },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Clear cached collections, all of them if none is given
    Clear { collection: Option<Collection> },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Catalog => AppCommand::Catalog,
            Commands::Categories(CollectionCommands::List) => AppCommand::ListCategories,
            Commands::Categories(CollectionCommands::Save { file }) => {
                AppCommand::SaveCategories(file)
            }
            Commands::Products(CollectionCommands::List) => AppCommand::ListProducts,
            Commands::Products(CollectionCommands::Save { file }) => AppCommand::SaveProducts(file),
            Commands::Brands(BrandCommands::List) => AppCommand::ListBrands,
            Commands::Brands(BrandCommands::Add { name, logo }) => AppCommand::AddBrand {
                name,
                logo: logo.into_args(false),
            },
            Commands::Brands(BrandCommands::Edit {
                id,
                name,
                logo,
                remove_logo,
            }) => AppCommand::EditBrand {
                id,
                name,
                logo: logo.into_args(remove_logo),
            },
            Commands::Brands(BrandCommands::Remove { id }) => AppCommand::RemoveBrand(id),
            Commands::Image(ImageCommands::Upload { path, content_type }) => {
                AppCommand::UploadImage { path, content_type }
            }
            Commands::Image(ImageCommands::Delete { url }) => AppCommand::DeleteImage(url),
            Commands::Image(ImageCommands::Url { url }) => AppCommand::ImageUrl(url),
            Commands::Cache(CacheCommands::Clear { collection }) => {
                AppCommand::ClearCache(collection)
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => storefront::cli::setup::setup_at_path(path),
            None => storefront::cli::setup::setup(),
        },
        Some(cmd) => storefront::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
