use anyhow::Context;
use catalog_clean::utils::{logger, validation::Validate};
use catalog_clean::{
    CleanError, CleanerConfig, CliConfig, CsvPipeline, EtlEngine, FileJob, LocalStorage,
    TransformStats,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting catalog-clean");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        let exit_code = match e.downcast_ref::<CleanError>() {
            Some(clean_error) => {
                tracing::error!(
                    "❌ Cleaning failed: {:#} (Category: {:?}, Severity: {:?})",
                    e,
                    clean_error.category(),
                    clean_error.severity()
                );
                eprintln!("❌ {}", clean_error.user_friendly_message());
                eprintln!("💡 {}", clean_error.recovery_suggestion());
                clean_error.exit_code()
            }
            None => {
                tracing::error!("❌ Cleaning failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    cli.validate()?;

    let mut config = CleanerConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    let transformer = config.build_transformer()?;

    for input in cli.input_paths() {
        tracing::info!("📁 Processing {}", input);
        let job = FileJob::from_config(&input, &config)?;
        let pipeline = CsvPipeline::new(LocalStorage::default(), job, transformer.clone());
        let engine = EtlEngine::new(pipeline);

        if cli.dry_run {
            let result = engine
                .preview()
                .await
                .with_context(|| format!("while checking {}", input))?;
            println!("🔍 {} (dry run, nothing written)", input);
            print_stats(&result.stats);
        } else {
            let summary = engine
                .run()
                .await
                .with_context(|| format!("while cleaning {}", input))?;
            println!("✅ {}", input);
            println!("📁 Output saved to: {}", summary.output_path);
            print_stats(&summary.stats);
        }
    }

    Ok(())
}

fn print_stats(stats: &TransformStats) {
    println!("  Rows: {}", stats.rows);
    println!("  Variant groups: {}", stats.variant_groups);
    println!("  Categories rewritten: {}", stats.categories_rewritten);
    println!("  Brands cleared: {}", stats.brands_cleared);
    println!("  ETA approvals flagged: {}", stats.eta_flagged);
}
