use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use webhook_proxy::config::PaginationConfig;
use webhook_proxy::pagination::{reshape_body, PaginationDirective, Reshape};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Companion CLI for the paginating webhook proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate a JSON document offline, the way the proxy would
    Reshape {
        /// JSON file to read (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, default_value_t = 1)]
        page: u64,

        #[arg(short = 's', long, default_value_t = 100)]
        page_size: u64,
    },
    /// Issue a GET through a running proxy
    Fetch {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        #[arg(short, long)]
        page: Option<u64>,

        #[arg(short = 's', long)]
        page_size: Option<u64>,

        /// Extra query parameters forwarded upstream (key=value)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Reshape { file, page, page_size } => {
            let input = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };

            // Same sanitizing rules as query parameters.
            let query = format!("page={page}&page_size={page_size}");
            let directive = PaginationDirective::from_query(Some(&query), &PaginationConfig::default());

            match reshape_body(&input, &directive) {
                Reshape::Paginated(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                other => {
                    eprintln!("Nothing to paginate ({}), printing input unchanged", other.label());
                    println!("{}", String::from_utf8_lossy(&input));
                }
            }
        }
        Commands::Fetch { url, page, page_size, params } => {
            let mut query: Vec<(String, String)> = params;
            if let Some(page) = page {
                query.push(("page".into(), page.to_string()));
            }
            if let Some(size) = page_size {
                query.push(("page_size".into(), size.to_string()));
            }

            let client = reqwest::Client::new();
            let res = client.get(&url).query(&query).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
