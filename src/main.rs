use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prefetch::{Config, Fetcher, Preloader, ResourceCache};
use tokio::sync::oneshot;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
struct CLIArguments {
    #[arg(short, long, default_value = "./prefetch.toml")]
    config: String,

    /// Extra base directory for relative paths, searched before the configured ones
    #[arg(short, long = "base-dir")]
    base_dirs: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one resource and print its body
    Get { url: String },

    /// Warm the cache with a list of images
    Preload { urls: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let CLIArguments {
        config,
        base_dirs,
        command,
    } = CLIArguments::parse();

    let config = Config::read(&PathBuf::from(&config)).await?.merge(Config {
        base_dirs: base_dirs.into_iter().map(PathBuf::from).collect(),
        ..Default::default()
    });

    info!("Base directories: {:?}", config.base_dirs);

    match command {
        Command::Get { url } => {
            let fetcher = Fetcher::from_config(&config)?;
            let (send, recv) = oneshot::channel();

            fetcher.get(url, move |fetched| {
                let _ = send.send(fetched.response_text);
            });

            // the continuation always fires, so the sender is never dropped unsent
            let body = recv.await?;
            print!("{}", body);
        }

        Command::Preload { urls } => {
            let preloader = Preloader::new(ResourceCache::from_config(&config)?);

            let dispatched = preloader.preload(&urls, || info!("All preloads dispatched."));

            // the process would exit before anything loads otherwise
            dispatched.settle().await;

            info!(
                "{} of {} resources cached.",
                preloader.cache().len().await,
                urls.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get() {
        let args =
            CLIArguments::try_parse_from(["prefetch", "get", "https://example.com/data.txt"])
                .unwrap();

        assert_eq!(args.config, "./prefetch.toml");
        assert!(args.base_dirs.is_empty());
        assert!(
            matches!(args.command, Command::Get { url } if url == "https://example.com/data.txt")
        );
    }

    #[test]
    fn parses_preload_with_base_dirs() {
        let args = CLIArguments::try_parse_from([
            "prefetch", "-c", "site.toml", "-b", "static", "--base-dir", "assets", "preload",
            "a.png", "b.png",
        ])
        .unwrap();

        assert_eq!(args.config, "site.toml");
        assert_eq!(args.base_dirs, vec!["static", "assets"]);
        match args.command {
            Command::Preload { urls } => assert_eq!(urls, vec!["a.png", "b.png"]),
            other => panic!("expected preload, got {:?}", other),
        }
    }

    #[test]
    fn get_needs_a_url() {
        assert!(CLIArguments::try_parse_from(["prefetch", "get"]).is_err());
    }
}
