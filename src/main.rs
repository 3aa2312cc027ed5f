use clap::Parser;
use oslc_client::utils::error::{ErrorSeverity, OslcError};
use oslc_client::utils::validation::{validate_required_field, Validate};
use oslc_client::utils::{logger, output};
use oslc_client::{credentials_from_config, CliConfig, DomainTable, OslcClient, Resource, TomlConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting oslc-client");

    let outcome = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => run(&cli, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ oslc-client failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        if e.is_retryable() {
            tracing::warn!("🔁 This failure is transient; running the same command again may succeed");
        }

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig, config: &TomlConfig) -> Result<(), OslcError> {
    let table = DomainTable::standard();
    table.validate()?;

    let mut client = OslcClient::from_config(config, &table)?;
    client.connect(credentials_from_config(config)).await?;

    let Some(container) = config.query.container.as_deref() else {
        if let Some(catalog) = client.catalog() {
            for (title, uri) in catalog.titles() {
                println!("{}\t{}", title, uri);
            }
        }
        return Ok(());
    };
    client.use_service_provider(container).await?;

    let resource_type = validate_required_field("query.resource_type", &config.query.resource_type)?;

    let resources: Vec<Resource> = match config.query.read.as_deref() {
        Some(identifier) => client
            .read(resource_type, identifier)
            .await?
            .into_iter()
            .collect(),
        None => client.query(resource_type, &config.query.options).await?,
    };

    output::write_resources(&resources, cli.format, std::io::stdout().lock())?;
    client.disconnect();

    tracing::info!("✅ Wrote {} resources", resources.len());
    Ok(())
}
