use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use gitcms_config::{
    FileStore, LOCALHOST, LocalBackend, Loader, apply_defaults, detect_proxy_server,
    handle_local_backend, to_yaml,
};
use gitcms_editor_core::{AssetResolver, MarkdownRenderer, RenderError};
use miette::{IntoDiagnostic, Result, WrapErr};

#[derive(Parser)]
#[command(version, about = "gitcms - tools for git-backed CMS projects", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a config file with all defaults applied
    Resolve {
        /// Path to config.yml, config.yaml or config.json
        config: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,

        /// Host name the admin is served from
        #[arg(long, env = "GITCMS_HOSTNAME", default_value = LOCALHOST)]
        hostname: String,

        /// Skip local proxy detection even when `local_backend` is set
        #[arg(long)]
        no_proxy: bool,
    },
    /// Probe for a local proxy server and print its URL
    DetectProxy {
        /// Host name the admin is served from
        #[arg(long, env = "GITCMS_HOSTNAME", default_value = LOCALHOST)]
        hostname: String,

        /// Proxy endpoint to probe instead of the default
        #[arg(long)]
        url: Option<String>,

        /// Probe even when the host name is not localhost
        #[arg(long)]
        force: bool,
    },
    /// Render a markdown file to HTML
    Render {
        /// Markdown file to render
        file: PathBuf,

        /// Config whose public folder prefixes relative image paths
        #[arg(long)]
        config: Option<PathBuf>,

        /// Public folder prefixing relative image paths (overrides --config)
        #[arg(long)]
        public_folder: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            config,
            format,
            hostname,
            no_proxy,
        } => resolve(&config, format, &hostname, no_proxy).await,
        Commands::DetectProxy {
            hostname,
            url,
            force,
        } => detect_proxy(&hostname, url, force).await,
        Commands::Render {
            file,
            config,
            public_folder,
        } => render(&file, config.as_deref(), public_folder).await,
    }
}

async fn resolve(path: &Path, format: Format, hostname: &str, no_proxy: bool) -> Result<()> {
    let config = FileStore::new(path).load().await?;
    let mut resolved = apply_defaults(&config);

    if !no_proxy {
        resolved = handle_local_backend(resolved, hostname, &http_client()?).await;
    }

    let output = match format {
        Format::Json => serde_json::to_string_pretty(&resolved).into_diagnostic()?,
        Format::Yaml => to_yaml(&resolved)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}

async fn detect_proxy(hostname: &str, url: Option<String>, force: bool) -> Result<()> {
    let options = match (url, force) {
        (Some(url), _) => Some(LocalBackend::with_url(url)),
        (None, true) => Some(LocalBackend::Enabled(true)),
        (None, false) => None,
    };

    match detect_proxy_server(hostname, options.as_ref(), &http_client()?).await {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => Err(miette::miette!(
            help = "start the proxy server, or pass --force when not on localhost",
            "no local proxy server found"
        )),
    }
}

async fn render(path: &Path, config: Option<&Path>, public_folder: Option<String>) -> Result<()> {
    let markdown = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", path.display()))?;

    let public_folder = match (public_folder, config) {
        (Some(folder), _) => Some(folder),
        (None, Some(config)) => {
            let config = FileStore::new(config).load().await?;
            apply_defaults(&config).public_folder
        }
        (None, None) => None,
    };

    let renderer = MarkdownRenderer::new().with_assets(public_folder.map(PublicFolder::new));
    let html = renderer.render(&markdown)?;
    print!("{html}");
    Ok(())
}

/// Prefixes relative image paths with the site's public folder.
struct PublicFolder {
    prefix: String,
}

impl PublicFolder {
    fn new(folder: String) -> Self {
        Self {
            prefix: folder.trim_end_matches('/').to_owned(),
        }
    }
}

impl AssetResolver for PublicFolder {
    fn resolve_asset(&self, path: &str) -> Result<Option<String>, RenderError> {
        if path.starts_with('/') || path.starts_with("data:") || path.contains("://") {
            return Ok(None);
        }
        Ok(Some(format!("{}/{}", self.prefix, path)))
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .into_diagnostic()
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(3)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_detect_proxy_args() {
        let cli = Cli::try_parse_from([
            "gitcms",
            "detect-proxy",
            "--hostname",
            "cms.example.com",
            "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::DetectProxy {
                hostname,
                url,
                force,
            } => {
                assert_eq!(hostname, "cms.example.com");
                assert_eq!(url, None);
                assert!(force);
            }
            _ => panic!("expected detect-proxy"),
        }
    }

    #[test]
    fn test_public_folder_prefixes_relative_paths() {
        let assets = PublicFolder::new("/static/media/".to_owned());
        assert_eq!(
            assets.resolve_asset("cat.png").unwrap().as_deref(),
            Some("/static/media/cat.png")
        );
        assert_eq!(assets.resolve_asset("/already/absolute.png").unwrap(), None);
        assert_eq!(assets.resolve_asset("https://cdn.example.com/a.png").unwrap(), None);
    }

    #[test]
    fn test_render_uses_public_folder() {
        let renderer = MarkdownRenderer::new()
            .with_assets(Some(PublicFolder::new("/media".to_owned())));
        assert_eq!(
            renderer.render("![a](a.png)").unwrap(),
            "<p><img src=\"/media/a.png\" alt=\"a\" /></p>\n"
        );
    }
}
