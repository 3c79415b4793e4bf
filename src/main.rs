use clap::Parser;
use stagewatch::config::Config;
use stagewatch::services::{parse_tickers, render_summary_table};
use stagewatch::types::{AnalysisOptions, RuleSet};
use stagewatch::{app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Moving-average trend stage classifier.
///
/// With tickers, classifies them once and prints the summary table.
/// Without, starts the HTTP server.
#[derive(Parser, Debug)]
#[command(name = "stagewatch")]
#[command(version)]
#[command(after_help = "Example: stagewatch AAPL,MSFT v2 --news")]
struct Cli {
    /// Tickers, comma or space separated. A trailing rule set (v1, v2) is also accepted here
    #[arg(value_name = "TICKERS")]
    tickers: Vec<String>,

    /// Rule set: v1 (4-label) or v2 (8-label)
    #[arg(long, value_parser = parse_rule_set)]
    rules: Option<RuleSet>,

    /// Score recent headlines for each ticker
    #[arg(long)]
    news: bool,
}

fn parse_rule_set(value: &str) -> Result<RuleSet, String> {
    RuleSet::from_str(value).ok_or_else(|| format!("unknown rule set '{}' (use v1 or v2)", value))
}

/// Resolved one-shot request.
#[derive(Debug)]
struct OneShot {
    tickers: Vec<String>,
    rule_set: Option<RuleSet>,
    include_news: bool,
}

impl Cli {
    /// Split positionals into tickers and a rule set. `None` means serve.
    fn into_request(self) -> anyhow::Result<Option<OneShot>> {
        let mut tickers = Vec::new();
        let mut rule_set = self.rules;

        for arg in &self.tickers {
            match RuleSet::from_str(arg) {
                Some(positional) => match rule_set {
                    Some(existing) if existing != positional => {
                        anyhow::bail!(
                            "conflicting rule sets: {} and {}",
                            existing.name(),
                            positional.name()
                        );
                    }
                    _ => rule_set = Some(positional),
                },
                None => tickers.extend(parse_tickers(arg)),
            }
        }

        if tickers.is_empty() {
            if rule_set.is_some() || self.news {
                anyhow::bail!("at least one ticker is required");
            }
            return Ok(None);
        }

        Ok(Some(OneShot {
            tickers,
            rule_set,
            include_news: self.news,
        }))
    }
}

async fn run_once(state: AppState, request: OneShot) {
    let options = AnalysisOptions {
        rule_set: request
            .rule_set
            .unwrap_or(state.config.analysis.default_rule_set),
        include_news: request.include_news,
    };

    let report = state.aggregator.run(&request.tickers, options).await;
    println!("{}", render_summary_table(&report.summary));

    for sentiment in report.news.iter().flatten() {
        println!("{}: {}", sentiment.ticker, sentiment.label());
        for headline in &sentiment.headlines {
            println!("  - {} ({})", headline.title, headline.url);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagewatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let request = Cli::parse().into_request()?;

    let config = Config::from_env();
    let state = AppState::from_config(config.clone())?;

    if let Some(request) = request {
        run_once(state, request).await;
        return Ok(());
    }

    // Expire cached series in the background
    {
        let aggregator = state.aggregator.clone();
        let ttl = config.analysis.price_cache_ttl();
        if !ttl.is_zero() {
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(ttl).await;
                    aggregator.cache().cleanup();
                }
            });
        }
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Stagewatch server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> anyhow::Result<Option<OneShot>> {
        let cli = Cli::try_parse_from(std::iter::once("stagewatch").chain(args.iter().copied()))?;
        cli.into_request()
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_starts_server() {
        assert!(parse(&[]).unwrap().is_none());
    }

    #[test]
    fn test_tickers_and_flags() {
        let request = parse(&["aapl,msft", "tsla", "--rules", "v2", "--news"])
            .unwrap()
            .unwrap();
        assert_eq!(request.tickers, vec!["AAPL", "MSFT", "TSLA"]);
        assert_eq!(request.rule_set, Some(RuleSet::Transition));
        assert!(request.include_news);
    }

    #[test]
    fn test_rules_equals_form() {
        let request = parse(&["--rules=v1", "spy"]).unwrap().unwrap();
        assert_eq!(request.rule_set, Some(RuleSet::FourStage));
        assert!(!request.include_news);
    }

    #[test]
    fn test_positional_rule_set() {
        let request = parse(&["AAPL,MSFT", "v2"]).unwrap().unwrap();
        assert_eq!(request.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(request.rule_set, Some(RuleSet::Transition));

        let request = parse(&["v1", "spy", "--news"]).unwrap().unwrap();
        assert_eq!(request.tickers, vec!["SPY"]);
        assert_eq!(request.rule_set, Some(RuleSet::FourStage));
        assert!(request.include_news);
    }

    #[test]
    fn test_conflicting_rule_sets() {
        assert!(parse(&["AAPL", "v1", "--rules", "v2"]).is_err());
        // Same rule set twice is fine
        assert!(parse(&["AAPL", "v2", "--rules", "v2"]).is_ok());
    }

    #[test]
    fn test_rule_set_without_tickers() {
        assert!(parse(&["v2"]).is_err());
        assert!(parse(&["--news"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_ticker() {
        let err = Cli::try_parse_from(["stagewatch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_bad_rule_set() {
        let err = Cli::try_parse_from(["stagewatch", "AAPL", "--rules", "v7"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["stagewatch", "AAPL", "--rules"]).is_err());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = Cli::try_parse_from(["stagewatch", "AAPL", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
