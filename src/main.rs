use bagco_site::{config, manifest, naming, output, quote, scan, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bagco")]
#[command(about = "Catalog, gallery and lead-capture service for Bagco")]
#[command(long_about = "\
Catalog, gallery and lead-capture service for Bagco

The public directory is the catalog. Each subdirectory of catalog/ is a
collection; custom/, pharmacy/ and veterinary/ are fixed-group sections.
When the same image exists in several formats only the best one is listed
(webp > png > jpg > jpeg > gif).

Public structure:

  public/
  ├── gallery/                     # Site-wide gallery (any depth)
  │   └── events/booth.webp
  └── catalog/
      ├── bakery/                  # Collection → /api/catalog/bakery
      │   ├── croissant.jpg
      │   └── croissant.webp       # Wins over croissant.jpg
      ├── custom/{1,2,3}-color/
      ├── pharmacy/{ty,gs,plastic-gs}/
      └── veterinary/{vb1,vb2,vb6}/

Run 'bagco gen-config' to generate a documented bagco.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Listen address (overrides config and BAGCO_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// List one catalog section: a collection, custom, pharmacy, veterinary or gallery
    Scan {
        section: String,
        /// Print the JSON the API would serve
        #[arg(long)]
        json: bool,
    },
    /// Price an order
    Quote {
        #[arg(long, default_value = "GS")]
        design: String,
        #[arg(long)]
        size: String,
        #[arg(long, default_value_t = 4.0)]
        cases: f64,
        /// Repeat order (no setup fee)
        #[arg(long)]
        reorder: bool,
    },
    /// List catalog collections
    Collections,
    /// Validate the config and the public directory
    Check,
    /// Print a stock bagco.toml with all options documented
    GenConfig,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut site_config = config::load_config(&cli.config)?;
    init_tracing(cli.log_json || site_config.server.log_json);

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                site_config.server.bind = bind;
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(site_config))?;
        }
        Command::Scan { section, json } => scan_section(&site_config, &section, json)?,
        Command::Quote {
            design,
            size,
            cases,
            reorder,
        } => {
            let estimate = quote::quote(&quote::QuoteRequest {
                design,
                size,
                cases,
                reorder,
            })?;
            output::print_quote(&estimate);
        }
        Command::Collections => {
            output::print_collections(&manifest::collections(&site_config.public_dir));
        }
        Command::Check => {
            let catalog = site_config.public_dir.join("catalog");
            if !catalog.is_dir() {
                return Err(format!("missing catalog directory: {}", catalog.display()).into());
            }
            let count = scan::list_collections(&catalog).len();
            output::print_check(&site_config, count);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

fn scan_section(
    site_config: &config::SiteConfig,
    section: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let public = &site_config.public_dir;

    let grouped = match section {
        "custom" => Some(&manifest::CUSTOM),
        "pharmacy" => Some(&manifest::PHARMACY),
        "veterinary" => Some(&manifest::VETERINARY),
        _ => None,
    };
    if let Some(layout) = grouped {
        let groups = manifest::grouped_section(public, layout);
        if json {
            println!("{}", serde_json::to_string_pretty(&groups)?);
        } else {
            output::print_grouped_section(layout.name, &groups);
        }
        return Ok(());
    }

    if section == "gallery" {
        let entries = manifest::gallery(public, &site_config.gallery.roots, &mut rand::thread_rng());
        let folders = manifest::folders(&entries);
        if json {
            let images: Vec<_> = entries
                .iter()
                .map(manifest::ImageRecord::with_folder)
                .collect();
            let body = serde_json::json!({ "images": images, "folders": folders });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            output::print_gallery(&entries, &folders);
        }
        return Ok(());
    }

    if !scan::is_collection_name(section) {
        return Err(format!("not a catalog section: {section}").into());
    }
    let records = manifest::catalog_folder(public, section);
    if json {
        let body = serde_json::json!({ "images": records });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        let (title, _) = naming::collection_copy(section);
        output::print_catalog_folder(&title, &records);
    }
    Ok(())
}
