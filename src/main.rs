use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use unimatch_api::RestApi;
use unimatch_core::{PreferenceQuery, RecommenderConfig};
use unimatch_storage::ArtifactLoader;

/// College recommendations from TF-IDF similarity
#[derive(Parser, Debug)]
#[command(name = "unimatch")]
#[command(about = "A TF-IDF college recommender", long_about = None)]
struct Args {
    /// Directory holding the catalog, vectorizer and matrices
    #[arg(short, long, env = "UNIMATCH_ARTIFACT_DIR", default_value = "./artifacts")]
    artifact_dir: PathBuf,

    /// HTTP bind address
    #[arg(long, env = "UNIMATCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "UNIMATCH_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Log level
    #[arg(long, env = "UNIMATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Results returned for a preference query
    #[arg(long, env = "UNIMATCH_PREFERENCE_LIMIT", default_value_t = 20)]
    preference_limit: usize,

    /// Results returned for a similar-college query
    #[arg(long, env = "UNIMATCH_NEIGHBOR_LIMIT", default_value_t = 10)]
    neighbor_limit: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API (default)
    Serve,
    /// Rank colleges against preferences and print them as JSON
    Recommend {
        #[arg(long = "course")]
        courses: Vec<String>,
        #[arg(long = "facility")]
        facilities: Vec<String>,
        #[arg(long, default_value = "")]
        fees: String,
        #[arg(long, default_value = "")]
        college_type: String,
        #[arg(long, default_value = "")]
        establishment: String,
        #[arg(long, default_value = "")]
        gender: String,
        #[arg(long, default_value = "")]
        state: String,
    },
    /// Print the colleges closest to NAME as JSON
    Similar { name: String },
    /// Checksum the artifact directory and write its manifest
    Manifest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RecommenderConfig {
        preference_limit: args.preference_limit,
        neighbor_limit: args.neighbor_limit,
        ..Default::default()
    };
    let loader = ArtifactLoader::new(&args.artifact_dir).with_config(config);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&loader, args.host, args.http_port).await,
        Command::Recommend {
            courses,
            facilities,
            fees,
            college_type,
            establishment,
            gender,
            state,
        } => {
            let query = PreferenceQuery {
                courses,
                facilities,
                fees,
                college_type,
                establishment,
                gender,
                state,
            };
            let recommendations = loader.load()?.recommend_by_preferences(&query)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
            Ok(())
        }
        Command::Similar { name } => {
            let recommendations = loader.load()?.recommend_by_college(&name)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
            Ok(())
        }
        Command::Manifest => {
            let manifest = loader.write_manifest()?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            Ok(())
        }
    }
}

async fn serve(loader: &ArtifactLoader, host: String, http_port: u16) -> anyhow::Result<()> {
    info!("Starting unimatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Artifact directory: {:?}", loader.dir());
    info!("HTTP API port: {}", http_port);

    // No request is accepted until every artifact is loaded and checked
    let recommender = Arc::new(loader.load()?);
    info!("Recommender initialized");

    let http_host = host.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", http_host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(recommender, &http_host, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("unimatch started successfully");
    info!("HTTP API: http://{}:{}/", host, http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
