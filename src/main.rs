//! Purchase Map CLI
//!
//! Usage:
//!   purchase-map [OPTIONS]
//!
//! Options:
//!   -i, --input <FILE>         Render a local GeoJSON file instead of fetching
//!   -o, --output <FILE>        Write to a file instead of stdout
//!   -f, --format <FORMAT>      html, svg or geojson
//!   -t, --theme <FILE>         Theme file for map colors (TOML format)
//!   -d, --debug                Verbose logging
//!   -h, --help                 Print help

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn, Level};

use purchase_map::{
    load_dataset, render_with_config, Config, Credentials, HttpTransport, MapError, OutputFormat,
    PeopleFeatureCollection, RenderConfig, SvgConfig, Theme,
};

#[derive(Parser)]
#[command(name = "purchase-map")]
#[command(about = "Map of people colored by the year of their purchase")]
struct Cli {
    /// Local GeoJSON file to render instead of the hosted dataset
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Theme file for map colors (TOML format)
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// First year shown in the legend
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year shown in the legend (defaults to this year)
    #[arg(long)]
    current_year: Option<i32>,

    /// Marker diameter in rem
    #[arg(long)]
    icon_size: Option<f64>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 512.0)]
    height: f64,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Svg,
    Geojson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormat::Html,
            Format::Svg => OutputFormat::Svg,
            Format::Geojson => OutputFormat::GeoJson,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Where the people come from
enum Source {
    File(PathBuf),
    Dataset(Credentials),
}

async fn run(cli: Cli) -> Result<(), MapError> {
    // Credentials are only required when fetching
    let source = match &cli.input {
        Some(path) => Source::File(path.clone()),
        None => Source::Dataset(Credentials::from_env()?),
    };

    let mut config = Config::offline();
    if let Some(year) = cli.start_year {
        config = config.with_start_year(year);
    }
    if let Some(year) = cli.current_year {
        config = config.with_current_year(year);
    }
    if let Some(rem) = cli.icon_size {
        config = config.with_icon_size(rem);
    }
    let config = config.validate()?;

    // A broken theme should not stop the map from rendering
    let theme = match &cli.theme {
        Some(path) => match Theme::from_file(path) {
            Ok(theme) => theme,
            Err(e) => {
                warn!("using default theme, could not load '{}': {}", path.display(), e);
                Theme::default()
            }
        },
        None => Theme::default(),
    };

    let people = match &source {
        Source::File(path) => PeopleFeatureCollection::from_file(path)?,
        Source::Dataset(credentials) => {
            info!(dataset = %credentials.dataset, "loading people");
            load_dataset(&HttpTransport::new(), credentials).await?
        }
    };
    info!(people = people.len(), "rendering map");

    let render = RenderConfig::new()
        .with_svg(SvgConfig::default().with_size(cli.width, cli.height))
        .with_theme(theme)
        .with_format(cli.format.into());
    let output = render_with_config(&people, &config, &render)?;

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, output) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
            info!(path = %path.display(), "wrote map");
        }
        None => println!("{}", output),
    }

    Ok(())
}
