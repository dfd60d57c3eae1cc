use std::sync::atomic::AtomicBool;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gleaner_collector::{HarvestParams, Harvester, SimFeed, TokioDelay};
use gleaner_common::{Config, GleanerError};

/// Run one harvest against a deterministic simulated feed and print the
/// collected posts. Diagnostic surface for the collector loop — no
/// network, no browser.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
struct Args {
    /// Target number of distinct posts (overrides GLEANER_MAX_POSTS)
    #[arg(long)]
    max_posts: Option<usize>,

    /// Upper bound on advance/sample cycles (overrides GLEANER_MAX_CYCLES)
    #[arg(long)]
    max_cycles: Option<u32>,

    /// Total posts in the simulated timeline
    #[arg(long, default_value_t = 120)]
    feed_size: usize,

    /// Posts visible in the view at once
    #[arg(long, default_value_t = 15)]
    window: usize,

    /// Posts the view moves per advance
    #[arg(long, default_value_t = 10)]
    stride: usize,

    /// Seed for the simulated feed content
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print the full report as JSON instead of one line per post
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gleaner_collector=info".parse()?)
                .add_directive("gleaner_common=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    config.log();

    let mut params = HarvestParams::from(&config);
    if let Some(max_posts) = args.max_posts {
        params.max_posts = max_posts;
    }
    if let Some(max_cycles) = args.max_cycles {
        params.max_cycles = max_cycles;
    }
    if params.max_posts == 0 {
        return Err(GleanerError::Validation("max-posts must be greater than zero".into()).into());
    }

    info!(
        feed_size = args.feed_size,
        window = args.window,
        stride = args.stride,
        seed = args.seed,
        "Starting simulated harvest"
    );

    let feed = SimFeed::generate(args.feed_size, args.window, args.stride, args.seed);
    let harvester = Harvester::new(feed.clone(), feed, TokioDelay);
    let cancel = AtomicBool::new(false);

    let report = harvester.run(&params, &cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for post in &report.posts {
            println!("{}  {}", post.handle, post.text.replace('\n', " "));
        }
    }

    Ok(())
}
