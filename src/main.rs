//! Skill matcher: skill-to-job matching, gap analysis, and industry alignment

use clap::Parser;
use log::{error, info};
use skill_matcher::alignment::AlignmentCalculator;
use skill_matcher::batch::BatchScheduler;
use skill_matcher::cli::{Cli, Commands, ConfigAction};
use skill_matcher::config::Config;
use skill_matcher::error::{Result, SkillMatcherError};
use skill_matcher::matching::engine::MatchEngine;
use skill_matcher::matching::Algorithm;
use skill_matcher::output;
use skill_matcher::store::{InMemoryStore, MatchStore};
use skill_matcher::vocabulary::SkillVocabulary;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, cli.corpus, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Everything the commands dispatch against, wired from one corpus file
struct App {
    store: Arc<InMemoryStore>,
    engine: Arc<MatchEngine>,
    scheduler: BatchScheduler,
    calculator: AlignmentCalculator,
}

fn build_app(corpus: Option<PathBuf>, config: &Config) -> Result<App> {
    let corpus = corpus.ok_or_else(|| {
        SkillMatcherError::InvalidInput("a corpus file is required (--corpus <path>)".to_string())
    })?;
    let store = Arc::new(InMemoryStore::load_corpus_file(&corpus)?);

    let vocabulary = Arc::new(match &config.vocabulary.path {
        Some(path) => SkillVocabulary::load(path)?,
        None => SkillVocabulary::new()?,
    });

    let engine = Arc::new(MatchEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        vocabulary.clone(),
        config.matching.clone(),
    ));
    let scheduler = BatchScheduler::new(
        engine.clone(),
        store.clone(),
        store.clone(),
        config.batch.clone(),
    );
    let calculator = AlignmentCalculator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        vocabulary,
        config.alignment.clone(),
    );

    Ok(App {
        store,
        engine,
        scheduler,
        calculator,
    })
}

fn parse_algorithm(requested: Option<String>, config: &Config) -> Result<Algorithm> {
    requested
        .unwrap_or_else(|| config.matching.algorithm.clone())
        .parse()
}

async fn run_command(command: Commands, corpus: Option<PathBuf>, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            user,
            limit,
            algorithm,
            detailed,
            save,
        } => {
            let app = build_app(corpus, &config)?;
            let algorithm = parse_algorithm(algorithm, &config)?;
            let limit = limit.unwrap_or(config.matching.default_limit);
            info!("computing matches for user {} ({})", user, algorithm.version());

            let matches = app.engine.compute_matches(&user, limit, algorithm).await?;
            print!("{}", output::format_matches(&matches, detailed));
            if save {
                let saved = app.engine.save_matches(&user, matches).await?;
                println!("Saved {} matches.", saved);
            }
        }

        Commands::Gaps { user, job } => {
            let app = build_app(corpus, &config)?;
            let report = app.engine.compute_skill_gaps(&user, &job).await?;
            print!("{}", output::format_gap_report(&report));
        }

        Commands::Recompute {
            user,
            algorithm,
            limit,
        } => {
            let app = build_app(corpus, &config)?;
            let algorithm = parse_algorithm(algorithm, &config)?;
            match user {
                Some(user) => {
                    let stats = app.scheduler.recompute_user(&user, algorithm).await?;
                    println!(
                        "Recomputed user {}: {} matches in {:.2?}",
                        stats.user_id, stats.matches_saved, stats.duration
                    );
                }
                None => {
                    let stats = app.scheduler.recompute_all(algorithm, limit).await?;
                    print!("{}", output::format_run_stats(&stats));
                }
            }
        }

        Commands::Align { user } => {
            let app = build_app(corpus, &config)?;
            let scores = app
                .calculator
                .calculate_current_alignment(&user, "manual")
                .await?;
            if scores.is_empty() {
                println!("No industry profiles in the corpus.");
            }
            for (industry, score) in &scores {
                println!("{}: {:.1}%", industry, score * 100.0);
            }
        }

        Commands::Timeline { user, days, top } => {
            let app = build_app(corpus, &config)?;
            let timeline = app.calculator.alignment_timeline(&user, days, top).await?;
            print!("{}", output::format_timeline(&timeline));
        }

        Commands::Cleanup { days } => {
            let app = build_app(corpus, &config)?;
            let days = days.unwrap_or(config.batch.cleanup_days);
            let deleted = app.scheduler.cleanup_old_matches(days).await?;
            println!("Deleted {} matches older than {} days.", deleted, days);
        }

        Commands::Stats { user } => {
            let app = build_app(corpus, &config)?;
            let user_stats = app.engine.match_statistics(&user).await?;
            let store_stats = app.store.statistics().await?;
            print!("{}", output::format_statistics(&user_stats, &store_stats));
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Algorithm: {}", config.matching.algorithm);
                println!("Default limit: {}", config.matching.default_limit);
                println!("Min matching skills: {}", config.matching.min_matching_skills);
                println!(
                    "TF-IDF: {} features, max_df {:.2}, floor {:.2}",
                    config.matching.tfidf.max_features,
                    config.matching.tfidf.max_df,
                    config.matching.tfidf.min_similarity
                );
                println!("Batch concurrency: {}", config.batch.concurrency);
                println!("Cleanup after: {} days", config.batch.cleanup_days);
                println!(
                    "Alignment window: {} minutes",
                    config.alignment.idempotency_window_minutes
                );
            }
            Some(ConfigAction::Reset) => {
                Config::default().save()?;
                println!("Configuration reset to defaults.");
            }
        },
    }

    Ok(())
}
