//! Command-line front end: price a quote request and print it as JSON.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use laser_quote::pricing::requests::QuoteRequest;
use laser_quote::pricing::responses::QuoteErrorResponse;
use laser_quote::pricing::QuoteService;
use laser_quote::{logging, AppError, Config, Result};

#[derive(Debug, Parser)]
#[command(name = "laser-quote", version, about = "Price laser hair-removal package quotes")]
struct Cli {
    /// Quote request JSON file; reads stdin when omitted
    request: Option<PathBuf>,

    /// Print the active catalog instead of pricing a request
    #[arg(long, conflicts_with = "request")]
    catalog: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = Config::from_env().and_then(|config| {
        tracing::debug!(?config, "loaded configuration");
        run(&cli, &config, std::io::stdin().lock(), std::io::stdout().lock())
    });

    if let Err(err) = result {
        report(&err);
        std::process::exit(err.exit_code());
    }
}

fn run<R: Read, W: Write>(cli: &Cli, config: &Config, mut input: R, mut out: W) -> Result<()> {
    let catalog = config.load_catalog()?;

    if cli.catalog {
        writeln!(out, "{}", serde_json::to_string_pretty(&catalog)?)?;
        return Ok(());
    }

    let json = match &cli.request {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            buf
        }
    };
    let request: QuoteRequest = serde_json::from_str(&json)?;

    let service = QuoteService::with_currency(&catalog, &config.currency);
    let response = service.quote(&request)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
    Ok(())
}

/// Quote rejections go to stdout as an error response; everything else to stderr.
fn report(err: &AppError) {
    match err {
        AppError::Quote(quote_err) => {
            tracing::error!(kind = quote_err.kind(), "quote rejected: {}", quote_err);
            match serde_json::to_string_pretty(&QuoteErrorResponse::from(quote_err)) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("laser-quote: {}", e),
            }
        }
        other => {
            tracing::error!(exit_code = other.exit_code(), "{}", other);
            eprintln!("laser-quote: {}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laser_quote::pricing::{CatalogError, QuoteError};

    fn cli() -> Cli {
        Cli {
            request: None,
            catalog: false,
            verbose: false,
        }
    }

    fn run_with_input(cli: &Cli, config: &Config, input: &str) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(cli, config, input.as_bytes(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_prices_request_from_stdin() {
        let (result, out) = run_with_input(
            &cli(),
            &Config::default(),
            r#"{"items": [{"area": "Full Face", "package": "Standard 6"}], "location": "Queens"}"#,
        );
        assert!(result.is_ok());
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["subtotal"]["amount"], "1200.00");
        assert_eq!(json["tax"]["amount"], "54.00");
    }

    #[test]
    fn test_malformed_request_is_request_error() {
        let (result, out) = run_with_input(&cli(), &Config::default(), "{not json");
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Request(_)));
        assert_eq!(err.exit_code(), 65);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_catalog_file_is_catalog_error() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/nonexistent/laser-catalog.json")),
            ..Default::default()
        };
        let cli = Cli {
            catalog: true,
            ..cli()
        };
        let err = run_with_input(&cli, &config, "").0.unwrap_err();
        assert!(matches!(err, AppError::Catalog(CatalogError::Io(_))));
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_missing_request_file_is_io_error() {
        let cli = Cli {
            request: Some(PathBuf::from("/nonexistent/request.json")),
            ..cli()
        };
        let err = run_with_input(&cli, &Config::default(), "").0.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_rejected_selection_is_quote_error() {
        let (result, _) = run_with_input(
            &cli(),
            &Config::default(),
            r#"{"items": [{"area": "Elbow"}]}"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Quote(QuoteError::UnknownArea(_))));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_prints_catalog() {
        let cli = Cli {
            catalog: true,
            ..cli()
        };
        let (result, out) = run_with_input(&cli, &Config::default(), "");
        assert!(result.is_ok());
        assert!(out.contains("\"BOGO 20\""));
    }
}
