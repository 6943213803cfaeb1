use std::path::PathBuf;

use clap::Parser;
use selector::{codec, gpx_export::encode_routes_as_gpx, store::RouteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Rewrite a legacy or multi-route YAML file in the canonical route schema"
)]
struct Args {
    /// Route file to read (`routes` or `global_route` schema)
    #[arg(long)]
    input: PathBuf,

    /// Output path for the converted document
    #[arg(long)]
    output: PathBuf,

    /// Write GPX instead of YAML
    #[arg(long)]
    gpx: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("converting {:?} into {:?}", args.input, args.output);

    let parsed = codec::read_document_file(&args.input)?;
    let mut store = RouteStore::new();
    let ids = codec::apply_document(&mut store, &parsed);
    // Only the imported routes, not the empty default route.
    let routes: Vec<_> = ids.iter().filter_map(|id| store.route(*id)).collect();

    let output = if args.gpx {
        encode_routes_as_gpx(routes.iter().copied())?
    } else {
        codec::render_document(&codec::document_from_routes(routes.iter().copied()))?
    };
    std::fs::write(&args.output, output)?;
    tracing::info!(
        "wrote {} route(s), skipped {} point(s)",
        routes.len(),
        parsed.skipped_points
    );

    Ok(())
}
