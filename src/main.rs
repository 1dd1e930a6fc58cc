use anyhow::{bail, Result};
use localization_resolver::{app::App, config::Config};
use tracing::{debug, info};

const USAGE: &str = "Usage: localization-resolver [--language <lang>] [--clear-language] [--fetch] <key>...";

struct Args {
    language: Option<String>,
    clear_language: bool,
    fetch: bool,
    keys: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        language: None,
        clear_language: false,
        fetch: false,
        keys: Vec::new(),
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--language" => match iter.next() {
                Some(language) => args.language = Some(language),
                None => bail!("--language needs a value\n{}", USAGE),
            },
            "--clear-language" => args.clear_language = true,
            "--fetch" => args.fetch = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => args.keys.push(arg),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localization_resolver=info".parse()?),
        )
        .init();

    let args = parse_args()?;
    let config = Config::from_env()?;
    let app = App::from_config(&config)?;
    let localization = &app.localization;

    if args.clear_language {
        localization.clear_language();
    }
    if let Some(language) = &args.language {
        localization.set_language(language);
    }

    if args.fetch {
        info!("Refreshing remote strings");
        if app.refresh_remote().await {
            info!("Remote strings adopted: [{}]", app.remote_languages().join(", "));
        } else {
            info!("Remote strings unchanged");
        }
    }

    println!("Available: {}", localization.available_languages().join(", "));
    println!(
        "Current:   {}",
        localization.language().as_deref().unwrap_or("(none)")
    );

    for key in &args.keys {
        match localization.string_for(key) {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} (not found)", key),
        }
    }

    let report = localization.metrics().report();
    info!(
        "Lookups: {} ({:.0}% hit rate), notifications: {}",
        report.lookups, report.hit_rate, report.notifications
    );
    debug!("Metrics report: {}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
