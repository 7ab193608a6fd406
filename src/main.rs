use clap::{Parser, Subcommand};
use napkin_atelier::combine::{
    Attribute, Combiner, Offline, Replay, Selection, Selections, TextGenerator,
};
use napkin_atelier::{config, enhance, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Per-attribute selections for `combine`. Omitted flags mean "Default".
#[derive(clap::Args, Clone)]
struct SelectionArgs {
    /// Locked color palette
    #[arg(long)]
    color_palette: Option<String>,
    /// Locked pattern
    #[arg(long)]
    pattern: Option<String>,
    /// Locked motif
    #[arg(long)]
    motif: Option<String>,
    /// Locked style
    #[arg(long)]
    style: Option<String>,
    /// Locked finish
    #[arg(long)]
    finish: Option<String>,
}

impl SelectionArgs {
    fn into_selections(self) -> Selections {
        let mut selections = Selections::default();
        let values = [
            (Attribute::ColorPalette, self.color_palette),
            (Attribute::Pattern, self.pattern),
            (Attribute::Motif, self.motif),
            (Attribute::Style, self.style),
            (Attribute::Finish, self.finish),
        ];
        for (attr, value) in values {
            if let Some(value) = value {
                selections.set(attr, Selection::from(value));
            }
        }
        selections
    }
}

#[derive(Parser)]
#[command(name = "napkin-atelier")]
#[command(about = "Enhance napkin artwork and resolve design combinations")]
#[command(long_about = "\
Enhance napkin artwork and resolve design combinations

enhance   Writes three graduated variants of a source image:
          <stem>-low.png, <stem>-medium.png, <stem>-high.png

combine   Resolves partial selections into three distinct combinations
          of color palette, pattern, motif, style and finish. Omitted
          attributes (or the value \"Default\") are chosen from the catalog.
          --response replays a saved generator answer; without it the
          deterministic local rotation is used.

The catalog and product type come from config.toml in --config-dir.
Run 'napkin-atelier gen-config' to generate a documented config.toml.

Set RUST_LOG (e.g. RUST_LOG=napkin_atelier=debug) for diagnostics.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write low, medium and high enhanced variants of an image
    Enhance {
        /// Source image (PNG, JPEG, TIFF or WebP)
        input: PathBuf,
        /// Directory for the variants (defaults to the input's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Resolve selections into three design combinations
    Combine {
        #[command(flatten)]
        selections: SelectionArgs,
        /// Saved generator response to replay instead of the local fallback
        #[arg(long)]
        response: Option<PathBuf>,
    },
    /// List the configured catalog
    Catalog,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "napkin_atelier=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Enhance { input, output_dir } => {
            let app_config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&app_config.processing);
            run_enhance(&input, output_dir.as_deref())?;
        }
        Command::Combine {
            selections,
            response,
        } => {
            let app_config = config::load_config(&cli.config_dir)?;
            let selections = selections.into_selections();
            match response {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)?;
                    run_combine(Replay::new(raw), &app_config, &selections)?;
                }
                None => run_combine(Offline, &app_config, &selections)?,
            }
        }
        Command::Catalog => {
            let app_config = config::load_config(&cli.config_dir)?;
            output::print_catalog(&app_config.catalog);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_enhance(input: &Path, output_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let image = enhance::load(input)?;
    let set = enhance::apply_post_processing(&image)?;

    let out_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.parent().map(Path::to_path_buf).unwrap_or_default());
    std::fs::create_dir_all(&out_dir)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let mut written = Vec::new();
    for (strength, variant) in set.iter() {
        let path = out_dir.join(format!("{stem}-{strength}.png"));
        variant.save(&path)?;
        written.push((strength, path));
    }
    output::print_enhance_output(input, (image.width(), image.height()), &written);
    Ok(())
}

fn run_combine<G: TextGenerator>(
    generator: G,
    app_config: &config::AppConfig,
    selections: &Selections,
) -> Result<(), Box<dyn std::error::Error>> {
    let combiner = Combiner::new(generator, app_config.product_type.clone());
    let combinations = combiner.resolve(selections, &app_config.catalog)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "combinations": combinations }))?
    );
    println!();
    output::print_combinations(&combinations, selections);
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
