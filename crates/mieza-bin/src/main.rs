//! Mieza - order relay daemon and storefront command line.

mod app;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mieza_config::{init_logging, Config, Paths};

/// Mieza command-line interface.
#[derive(Parser)]
#[command(name = "mieza")]
#[command(about = "Durable order relay for the Mieza storefront")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (queue, logs, config). Defaults to ~/.mieza
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Catalog file. Defaults to <base-dir>/products.json
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay, draining the queue until interrupted
    Run,
    /// Queue a raw order object for delivery
    Submit {
        /// Order as a JSON object
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        json: Option<String>,
        /// File containing the order JSON
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run one drain pass now
    Drain,
    /// Show pending and dropped envelopes
    Status,
    /// List envelopes dropped after exhausting their retries
    Dropped,
    /// Browse or maintain the product catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Place a supermarket order from catalog items
    Checkout {
        /// Store key, e.g. shoprite
        #[arg(long)]
        store: String,
        /// Product to order as <id> or <id>:<qty>; repeatable
        #[arg(long = "item", value_parser = app::parse_item_spec, required = true)]
        items: Vec<(String, u32)>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Book a parcel pickup
    Pickup {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Send a retailer bulk list, one `item,qty,notes` line per entry
    Bulk {
        /// CSV file with the list
        #[arg(long, conflicts_with = "items", required_unless_present = "items")]
        file: Option<PathBuf>,
        /// The list as text; separate lines with newlines
        #[arg(long)]
        items: Option<String>,
        #[command(flatten)]
        form: BulkArgs,
        /// Print a WhatsApp quick-send link instead of submitting
        #[arg(long)]
        whatsapp: bool,
    },
    /// Write or show the relay configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a default config.json under the base directory
    Init {
        /// Overwrite an existing config.json
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List store keys
    Stores,
    /// List a store's products
    Products {
        #[arg(long)]
        store: String,
        /// Category name, or All
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive name filter
        #[arg(long)]
        query: Option<String>,
    },
    /// Replace the catalog with the contents of a JSON file
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the catalog as JSON
    Export,
    /// Add, rename or remove a store
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },
    /// Add, rename or remove a category
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Add, update or remove a product
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },
}

#[derive(Subcommand)]
enum StoreCommand {
    Add {
        key: String,
    },
    Rename {
        from: String,
        to: String,
    },
    Remove {
        key: String,
    },
}

#[derive(Subcommand)]
enum CategoryCommand {
    Add {
        #[arg(long)]
        store: String,
        name: String,
    },
    Rename {
        #[arg(long)]
        store: String,
        from: String,
        to: String,
    },
    Remove {
        #[arg(long)]
        store: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// Add a placeholder product and print its id
    Add {
        #[arg(long)]
        store: String,
        #[arg(long)]
        category: String,
    },
    /// Replace a product's name, price and image
    Update {
        #[arg(long)]
        store: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Price in GHS
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "")]
        image: String,
    },
    Remove {
        #[arg(long)]
        store: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        id: String,
    },
}

impl From<StoreCommand> for app::CatalogEdit {
    fn from(command: StoreCommand) -> Self {
        match command {
            StoreCommand::Add { key } => Self::AddStore { key },
            StoreCommand::Rename { from, to } => Self::RenameStore { from, to },
            StoreCommand::Remove { key } => Self::RemoveStore { key },
        }
    }
}

impl From<CategoryCommand> for app::CatalogEdit {
    fn from(command: CategoryCommand) -> Self {
        match command {
            CategoryCommand::Add { store, name } => Self::AddCategory { store, name },
            CategoryCommand::Rename { store, from, to } => Self::RenameCategory { store, from, to },
            CategoryCommand::Remove { store, name } => Self::RemoveCategory { store, name },
        }
    }
}

impl From<ProductCommand> for app::CatalogEdit {
    fn from(command: ProductCommand) -> Self {
        match command {
            ProductCommand::Add { store, category } => Self::AddProduct { store, category },
            ProductCommand::Update {
                store,
                category,
                id,
                name,
                price,
                image,
            } => Self::UpdateProduct {
                store,
                category,
                id,
                name,
                price,
                image,
            },
            ProductCommand::Remove {
                store,
                category,
                id,
            } => Self::RemoveProduct {
                store,
                category,
                id,
            },
        }
    }
}

/// Customer details shared by checkout and pickup.
#[derive(Args)]
struct FormArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    order_numbers: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<FormArgs> for storefront::CheckoutForm {
    fn from(args: FormArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            address: args.address,
            email: args.email,
            order_numbers: args.order_numbers,
            notes: args.notes,
        }
    }
}

/// Retailer details for a bulk list.
#[derive(Args)]
struct BulkArgs {
    /// Business name
    #[arg(long)]
    business: String,
    /// Contact person
    #[arg(long)]
    contact: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Delivery location
    #[arg(long)]
    location: String,
}

impl From<BulkArgs> for storefront::BulkForm {
    fn from(args: BulkArgs) -> Self {
        Self {
            business: args.business,
            contact: args.contact,
            phone: args.phone,
            email: args.email,
            location: args.location,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };

    // Runs before Config::load so --force can replace a file that no longer loads.
    if let Some(Commands::Config {
        command: ConfigCommand::Init { force },
    }) = cli.command
    {
        return app::init_config(&paths, force);
    }

    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging("mieza", level, &paths, true);

    let catalog_path = cli.catalog.unwrap_or_else(|| paths.catalog_file());

    match cli.command {
        Some(Commands::Run) | None => app::run_relay(config, paths).await?,
        Some(Commands::Submit { json, file }) => {
            let order = app::read_order(json, file)?;
            app::submit_order(&config, &paths, order).await?;
        }
        Some(Commands::Drain) => app::drain_once(&config, &paths).await?,
        Some(Commands::Status) => app::show_status(&config, &paths).await?,
        Some(Commands::Dropped) => app::show_dropped(&config, &paths).await?,
        Some(Commands::Catalog { command }) => match command {
            CatalogCommand::Stores => app::list_stores(&catalog_path)?,
            CatalogCommand::Products {
                store,
                category,
                query,
            } => app::list_products(&catalog_path, &store, category.as_deref(), query.as_deref())?,
            CatalogCommand::Import { file } => app::import_catalog(&catalog_path, &file)?,
            CatalogCommand::Export => app::export_catalog(&catalog_path)?,
            CatalogCommand::Store { command } => app::edit_catalog(&catalog_path, command.into())?,
            CatalogCommand::Category { command } => {
                app::edit_catalog(&catalog_path, command.into())?
            }
            CatalogCommand::Product { command } => {
                app::edit_catalog(&catalog_path, command.into())?
            }
        },
        Some(Commands::Checkout { store, items, form }) => {
            app::checkout(&config, &paths, &catalog_path, &store, &items, form.into()).await?
        }
        Some(Commands::Pickup { form }) => app::pickup(&config, &paths, form.into()).await?,
        Some(Commands::Bulk {
            file,
            items,
            form,
            whatsapp,
        }) => {
            let items = app::read_bulk_items(items, file)?;
            app::bulk_order(&config, &paths, form.into(), items, whatsapp).await?
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommand::Init { force } => app::init_config(&paths, force)?,
            ConfigCommand::Show => app::show_config(&config)?,
        },
    }

    Ok(())
}
