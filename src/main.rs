#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};

use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod banner;
mod error;
mod geo;
mod gpx;
mod route;

use banner::fetch;
use gpx::DeliveredFile;

#[derive(StructOpt)]
#[structopt(about = "Export a Bannergress banner as a GPX route")]
struct Args {
    /// Banner page URL (https://bannergress.com/banner/<id>) or bare banner id
    #[structopt(name = "banner")]
    banner: String,
    #[structopt(
        short = "o",
        long = "output-dir",
        parse(from_os_str),
        default_value = "."
    )]
    output_dir: PathBuf,
    /// Replaces https://api.bannergress.com/bnrs/ as the API base
    #[structopt(long = "api-prefix")]
    api_prefix: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bannergress_gpx=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Fetch, build, export. Strictly in that order, once.
fn run(page: &str, api_prefix: &str, output_dir: &Path) -> error::Result<DeliveredFile> {
    let url = fetch::api_url(page, api_prefix)?;
    let banner = fetch::fetch(&url)?;

    if banner.missions.is_empty() {
        warn!(title = %banner.title, "Banner has no missions");
    }
    info!(title = %banner.title, missions = banner.missions.len(), "Building route");
    let route = route::build(&banner);

    info!(waypoints = route.waypoints.len(), "Exporting GPX");
    gpx::export(&route, output_dir)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let args = Args::from_args();
    let api_prefix = args.api_prefix.as_deref().unwrap_or(fetch::API_PREFIX);
    let delivered = run(&args.banner, api_prefix, &args.output_dir)?;
    info!(
        mime_type = delivered.mime_type,
        bytes = delivered.bytes,
        "Download ready"
    );
    println!("{}", delivered.path.display());
    Ok(())
}
