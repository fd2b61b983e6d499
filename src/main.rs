use clap::{Parser, Subcommand};
use menutree::config::{self, MenuOptions, OptionsFile};
use menutree::context::RecordContext;
use menutree::enrich::Pipeline;
use menutree::imaging::{self, Columns, FileDimensions, ImageSizeRequest};
use menutree::levels::build_configuration;
use menutree::menu::MenuProcessor;
use menutree::output;
use menutree::render::{self, PageTreeRenderer};
use menutree::types::{MenuNode, PageRecord, find_page};
use serde_json::Map;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Options file looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "menutree.toml";

#[derive(Parser)]
#[command(name = "menutree")]
#[command(about = "Builds nested JSON menu trees from hierarchical page records")]
#[command(long_about = "\
Builds nested JSON menu trees from hierarchical page records

Menus are configured by an options file (TOML) and rendered over a page tree
given as JSON. Every page record has a uid, optional doktype / nav_hide /
languages, free-form fields and children:

  [
    {\"uid\": 1, \"fields\": {\"title\": \"Home\", \"slug\": \"/\"}, \"children\": [
      {\"uid\": 2, \"fields\": {\"title\": \"Products\", \"nav_title\": \"Shop\"}},
      {\"uid\": 3, \"doktype\": 199, \"fields\": {\"title\": \"----\"}}
    ]}
  ]

The finished menu is a list of items with title, link, target, active,
current, spacer, data (the page record) and children, published under the
configured slot (default \"menu\").

Run 'menutree gen-config' to generate a documented menutree.toml.")]
#[command(version)]
struct Cli {
    /// Options file (defaults to ./menutree.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every pipeline stage to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the level configuration handed to the renderer
    Levels {
        /// Print as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Render, decode and enrich a menu over a page tree
    Render(RenderArgs),
    /// Compute responsive image sizes on the configured grid
    ImageSize(ImageSizeArgs),
    /// Print a stock menutree.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Page tree as JSON
    #[arg(long)]
    pages: PathBuf,

    /// Uid of the page the menu is rendered for
    #[arg(long)]
    current: Option<u64>,

    /// Active pages, site root first (comma separated); defaults to the
    /// path to the current page
    #[arg(long)]
    active: Option<String>,

    /// Language the menu is rendered in
    #[arg(long, default_value_t = 0)]
    language: u32,

    /// Print the processed data as JSON instead of a tree
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ImageSizeArgs {
    /// Columns spanned at xs
    #[arg(long, default_value_t = 12.0)]
    xs: f64,
    /// Columns spanned at sm (0 = same as xs)
    #[arg(long, default_value_t = 0.0)]
    sm: f64,
    /// Columns spanned at md (0 = same as sm)
    #[arg(long, default_value_t = 0.0)]
    md: f64,
    /// Columns spanned at lg (0 = same as md)
    #[arg(long, default_value_t = 0.0)]
    lg: f64,
    /// Height/width in percent; crops when set
    #[arg(long, default_value_t = 0.0)]
    ratio: f64,
    /// Crop offset in percent (-100 top/left, 0 center, 100 bottom/right)
    #[arg(long)]
    crop: Option<String>,
    /// Border width on each side
    #[arg(long, default_value_t = 0.0)]
    border: f64,
    /// Explicit image width, overriding the grid
    #[arg(long, default_value_t = 0.0)]
    width: f64,
    /// Explicit image height, overriding the grid
    #[arg(long, default_value_t = 0.0)]
    height: f64,
    /// Source file size as WIDTHxHEIGHT
    #[arg(long)]
    file: Option<String>,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Levels { json } => {
            let ctx = RecordContext::default();
            let menu_options = MenuOptions::from_options(&options.menu, &ctx)?;
            let renderer_options = config::filter_renderer_options(&options.menu, &ctx);
            let configuration = build_configuration(&menu_options, renderer_options);
            if json {
                println!("{}", serde_json::to_string_pretty(&configuration)?);
            } else {
                output::print_levels(&configuration);
            }
        }
        Command::Render(args) => render_menu(&options, &args)?,
        Command::ImageSize(args) => {
            let request = image_request(&args)?;
            let size = imaging::compute_image_size(&options.grid, &request, None);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&size)?);
            } else {
                output::print_image_size(&size);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Load the options file: an explicit `--config` must exist, the default one
/// may be absent.
fn load_config(path: Option<&Path>) -> Result<OptionsFile, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("options file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_options(path)?),
        None => Ok(config::load_options(Path::new(DEFAULT_CONFIG))?),
    }
}

fn render_menu(options: &OptionsFile, args: &RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.pages)?;
    let pages: Vec<PageRecord> = serde_json::from_str(&content)?;

    let record = args
        .current
        .and_then(|uid| find_page(&pages, uid))
        .map(PageRecord::record)
        .unwrap_or_default();
    let ctx = RecordContext::page(record);

    let mut renderer = PageTreeRenderer::new(pages).with_language(args.language);
    if let Some(active) = &args.active {
        renderer = renderer.with_rootline(render::uid_list(active));
    }
    if let Some(uid) = args.current {
        renderer = renderer.with_current(uid);
    }

    let pipeline = Pipeline::from_spec(options.menu.get("dataProcessing"))?;
    let processor = MenuProcessor::new(renderer);
    let menu_options = MenuOptions::from_options(&options.menu, &ctx)?;
    let processed = processor.process(&ctx, &options.menu, &pipeline, Map::new())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&processed)?);
        return Ok(());
    }
    let nodes: Vec<MenuNode> = match processed.get(&menu_options.slot) {
        Some(value) => serde_json::from_value(value.clone())?,
        None => Vec::new(),
    };
    output::print_menu(&menu_options.slot, &nodes);
    Ok(())
}

fn image_request(args: &ImageSizeArgs) -> Result<ImageSizeRequest, Box<dyn std::error::Error>> {
    let file = args.file.as_deref().map(parse_file_size).transpose()?;
    Ok(ImageSizeRequest {
        ratio: args.ratio,
        crop: args.crop.clone(),
        columns: Columns {
            xs: args.xs,
            sm: args.sm,
            md: args.md,
            lg: args.lg,
        },
        border: args.border,
        image_width: args.width,
        image_height: args.height,
        file,
        ..ImageSizeRequest::default()
    })
}

/// Parse `WIDTHxHEIGHT`, e.g. `1600x900`.
fn parse_file_size(text: &str) -> Result<FileDimensions, String> {
    let invalid = || format!("invalid file size '{text}', expected WIDTHxHEIGHT");
    let (w, h) = text.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: f64 = w.trim().parse().map_err(|_| invalid())?;
    let height: f64 = h.trim().parse().map_err(|_| invalid())?;
    Ok(FileDimensions {
        width,
        height,
        crop: None,
    })
}
