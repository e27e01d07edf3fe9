//! insights-runner: headless front end for the segmentation insights engine.
//!
//! Usage:
//!   insights-runner --db insights.db --seed-demo 42 show
//!   insights-runner --db insights.db show --run 3 --query rossi --sort revenue
//!   insights-runner --db insights.db --wait runs
//!   insights-runner --db insights.db send 17

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use insights_core::{
    config::InsightsConfig,
    dataset::{seed_store, DatasetSpec},
    engine::InsightsEngine,
    filter::SortKey,
    format::{customer_display_name, format_currency, format_percent, format_product_name},
    kpi::engagement_scores,
    model::{RecommendationStatus, Run},
    poller::{PollStatus, RunListPoller, StoreRunSource},
    store::InsightsStore,
    types::{RecommendationId, RunId},
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Customer segmentation insights over batch runs", long_about = None)]
struct Args {
    /// SQLite database path; `:memory:` keeps everything in process
    #[arg(long, default_value = ":memory:")]
    db: String,

    /// Directory holding insights/insights.json
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Generate a synthetic run with this seed before anything else
    #[arg(long)]
    seed_demo: Option<u64>,

    /// Number of customers in the synthetic run
    #[arg(long, default_value = "200")]
    customers: usize,

    /// Override the opportunity acceptance threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Override how many opportunities are listed
    #[arg(long)]
    top_n: Option<usize>,

    /// Poll until at least one run exists before continuing
    #[arg(long)]
    wait: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List batch runs, newest first
    Runs,
    /// Show cluster stats, opportunities and recommendations for a run
    Show {
        /// Run to show; defaults to the newest run
        #[arg(long)]
        run: Option<RunId>,
        /// Search by customer name, id or product code
        #[arg(short, long, default_value = "")]
        query: String,
        /// `revenue` or `probability`; anything else keeps store order
        #[arg(short, long)]
        sort: Option<String>,
        /// Monthly recommendation goal for the KPI header
        #[arg(long, default_value = "500")]
        goal: u64,
        /// Emit the full view as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Mark a pending recommendation as sent
    Send { id: RecommendationId },
    /// Dismiss a pending recommendation
    Dismiss { id: RecommendationId },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match InsightsConfig::load(&args.data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            InsightsConfig::default()
        }
    };
    if let Some(threshold) = args.threshold {
        config.scoring.acceptance_threshold = threshold;
    }
    if let Some(top_n) = args.top_n {
        config.scoring.top_n = top_n;
    }
    config.validate()?;

    // For :memory: use a shared-cache URI so the poller's connection sees
    // the same database as the main one.
    let db_effective = if args.db == ":memory:" {
        format!("file:insights_{}?mode=memory&cache=shared", Utc::now().timestamp())
    } else {
        args.db.clone()
    };
    let store = InsightsStore::open(&db_effective)?;
    store.migrate()?;

    if let Some(seed) = args.seed_demo {
        let spec = DatasetSpec {
            customers: args.customers,
            ..DatasetSpec::default()
        };
        let run_id = seed_store(&store, seed, &spec, Utc::now())?;
        println!("seeded demo run {run_id} ({} customers, seed {seed})", args.customers);
    }

    let runs = if args.wait {
        wait_for_runs(&db_effective, &config).await?
    } else {
        store.list_runs(config.store.run_list_limit)?
    };

    match args.command.unwrap_or(Command::Show {
        run: None,
        query: String::new(),
        sort: None,
        goal: 500,
        json: false,
    }) {
        Command::Runs => print_runs(&runs),
        Command::Show { run, query, sort, goal, json } => {
            let run_id = match run.or_else(|| runs.first().map(|r| r.run_id)) {
                Some(id) => id,
                None => bail!("No batch runs available. Seed one with --seed-demo <seed>."),
            };
            let sort_key = sort.as_deref().and_then(SortKey::parse);
            let snapshot = store.load_snapshot(run_id, config.store.recommendation_limit)?;
            let mut engine = InsightsEngine::new(config);
            engine.select(snapshot);
            if json {
                let view = engine.view(&query, sort_key);
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_dashboard(&mut engine, &query, sort_key, goal);
            }
        }
        Command::Send { id } => transition(&store, id, RecommendationStatus::Sent)?,
        Command::Dismiss { id } => transition(&store, id, RecommendationStatus::Dismissed)?,
    }

    Ok(())
}

async fn wait_for_runs(db: &str, config: &InsightsConfig) -> Result<Vec<Run>> {
    let poll_store = InsightsStore::open(db)?;
    let source = Arc::new(StoreRunSource::new(poll_store, config.store.run_list_limit));
    let mut handle = RunListPoller::spawn(source, config.poll_interval());
    println!("waiting for batch runs (every {}s)...", config.polling.interval_secs);

    let finished = tokio::select! {
        status = handle.wait() => Some(status),
        _ = tokio::signal::ctrl_c() => None,
    };
    let status = match finished {
        Some(status) => status,
        None => handle.stop().await,
    };
    match status {
        PollStatus::Ready(runs) => Ok(runs),
        PollStatus::Failed(message) => bail!(message),
        PollStatus::Stopped | PollStatus::Polling { .. } => bail!("Stopped before any run appeared"),
    }
}

fn transition(store: &InsightsStore, id: RecommendationId, status: RecommendationStatus) -> Result<()> {
    if store.set_recommendation_status(id, status, Utc::now())? {
        println!("recommendation {id} marked {}", status.as_str());
        Ok(())
    } else {
        bail!("recommendation {id} is not pending or does not exist")
    }
}

fn print_runs(runs: &[Run]) {
    println!("=== BATCH RUNS ===");
    if runs.is_empty() {
        println!("  (no runs yet)");
    }
    for run in runs {
        let started = run
            .started_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "  #{:<4} {:<8} started {}  customers {}  clusters {}",
            run.run_id,
            run.status.as_str(),
            started,
            run.customers_processed.map_or("-".into(), |n| n.to_string()),
            run.clusters_count.map_or("-".into(), |n| n.to_string()),
        );
    }
}

fn print_dashboard(engine: &mut InsightsEngine, query: &str, sort_key: Option<SortKey>, goal: u64) {
    let kpis = engine.kpis(goal);
    println!("=== RUN OVERVIEW ===");
    println!("  customers:      {}", kpis.total_customers);
    println!("  clusters:       {}", kpis.active_clusters);
    println!("  suggested deals: {}", kpis.suggested_deals);
    println!("  monthly goal:   {:.0}%", kpis.goal_progress);

    if let Some(snapshot) = engine.snapshot() {
        for warning in &snapshot.summary.warnings {
            println!("  ! {warning}");
        }
        if let Some(comparison) = &snapshot.comparison {
            if let Some(message) = &comparison.message {
                println!("  {message}");
            } else {
                println!(
                    "  cluster stability vs run {}: {:.1}%",
                    comparison.previous_run_id.unwrap_or_default(),
                    comparison.changes.cluster_stability_percent
                );
            }
        }
    }

    let engagement = engine
        .snapshot()
        .map(|s| engagement_scores(&s.summary))
        .unwrap_or_default();

    println!();
    println!("=== CLUSTERS ===");
    for stat in engine.cluster_stats() {
        let score = engagement
            .iter()
            .find(|(id, _)| *id == stat.cluster_id)
            .map_or(0, |(_, s)| *s);
        println!(
            "  [{}] {:<20} customers {:>5}  recs {:>4}  revenue {:>10}  accept {:>6}  engagement {score}",
            stat.cluster_id,
            stat.persona.name(),
            stat.customer_count,
            stat.recommendation_count,
            format_currency(stat.total_revenue),
            format_percent(stat.mean_acceptance_probability),
        );
    }

    println!();
    println!("=== TOP OPPORTUNITIES ===");
    let opportunities = engine.opportunities();
    if opportunities.is_empty() {
        println!("  (none above threshold)");
    }
    for (rank, o) in opportunities.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:<20} reach {:>5}  accept {:>6}  owned {:>5.1}%  potential {}",
            rank + 1,
            format_product_name(&o.product_code),
            o.persona_name,
            o.opportunity_count,
            format_percent(o.acceptance_rate),
            o.current_ownership_percent,
            format_currency(o.potential_revenue),
        );
    }

    println!();
    println!("=== RECOMMENDATIONS ===");
    let recs = engine.recommendations(query, sort_key);
    if recs.is_empty() {
        println!("  (no matches)");
    }
    for rec in recs {
        println!(
            "  #{:<5} {:<24} {:<28} {:>6} {:>9}  {:?}  {}",
            rec.id,
            customer_display_name(rec),
            format_product_name(&rec.product_code),
            format_percent(rec.acceptance_probability),
            format_currency(rec.expected_revenue),
            rec.model_confidence(),
            rec.status.as_str(),
        );
    }
}
