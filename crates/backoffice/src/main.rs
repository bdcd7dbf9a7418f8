use anyhow::Context;
use backoffice::domain::a001_tariff::builder::build_tariff;
use backoffice::domain::a001_tariff::editor::TariffEditor;
use backoffice::domain::a001_tariff::form::TariffForm;
use backoffice::domain::a002_batch::session::BatchComposer;
use backoffice::shared::api_client::ApiClient;
use backoffice::shared::config::{self, Config};
use backoffice::shared::logger;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use contracts::domain::a001_tariff::aggregate::TariffRecord;
use contracts::enums::{ServiceType, ShippingScope};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "backoffice", about = "Courier back-office: tariffs and shipment batches")]
struct Cli {
    /// Path to config.toml (defaults to the one next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(subcommand)]
    Tariff(TariffCommand),
    #[command(subcommand)]
    Batch(BatchCommand),
}

#[derive(Subcommand)]
enum TariffCommand {
    /// Build the payload from a form file without sending it
    Build {
        #[arg(long)]
        form: PathBuf,
        /// Saved tariff (JSON file or URL-encoded JSON) for edit mode
        #[arg(long)]
        tariff: Option<String>,
    },
    /// POST /pricing/tariff
    Create {
        #[arg(long)]
        form: PathBuf,
    },
    /// PATCH /pricing/tariff/{id}
    Update {
        #[arg(long)]
        form: PathBuf,
        #[arg(long)]
        tariff: String,
    },
    /// Print the editable form for a saved tariff
    EditForm {
        #[arg(long)]
        tariff: String,
    },
}

#[derive(Subcommand)]
enum BatchCommand {
    /// Order counts per scope and service type
    Counts,
    /// POST /batch
    Create(CreateBatchArgs),
}

#[derive(Args)]
struct CreateBatchArgs {
    #[arg(long, value_parser = parse_scope)]
    scope: ShippingScope,
    #[arg(long, value_parser = parse_service_type)]
    service_type: ServiceType,
    /// Order id; repeat for several orders
    #[arg(long = "order")]
    orders: Vec<String>,
    /// Select every order of the scope and service type
    #[arg(long, conflicts_with = "orders")]
    all: bool,
    #[arg(long)]
    destination: String,
    /// Shipment date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long = "category")]
    categories: Vec<String>,
}

fn parse_scope(raw: &str) -> Result<ShippingScope, String> {
    ShippingScope::from_wire(raw).ok_or_else(|| format!("unknown scope: {}", raw))
}

fn parse_service_type(raw: &str) -> Result<ServiceType, String> {
    ServiceType::from_code(&raw.to_ascii_uppercase())
        .ok_or_else(|| format!("unknown service type: {}", raw))
}

fn read_form(path: &Path) -> anyhow::Result<TariffForm> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid form in {}", path.display()))
}

/// Тариф из файла или из значения параметра навигации
fn read_tariff(raw: &str) -> anyhow::Result<TariffRecord> {
    let path = Path::new(raw);
    let contents = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        raw.to_string()
    };
    TariffRecord::from_query_param(&contents).map_err(|e| anyhow::anyhow!(e))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_tariff(config: &Config, command: TariffCommand) -> anyhow::Result<()> {
    let step = config.tariff.weight_range_step;
    let limit = config.batch.vehicle_types_limit;

    match command {
        TariffCommand::Build { form, tariff } => {
            let form = read_form(&form)?;
            let record = tariff.as_deref().map(read_tariff).transpose()?;
            let payload = build_tariff(&form, record.as_ref()).map_err(|e| anyhow::anyhow!(e))?;
            print_json(&payload)
        }
        TariffCommand::Create { form } => {
            let api = ApiClient::new(&config.api)?;
            let mut editor = TariffEditor::create(step);
            *editor.form_mut() = read_form(&form)?;
            editor.load_catalog(&api, limit).await?;
            let message = editor
                .submit(&api)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", message);
            Ok(())
        }
        TariffCommand::Update { form, tariff } => {
            let api = ApiClient::new(&config.api)?;
            let mut editor = TariffEditor::edit(read_tariff(&tariff)?, step);
            *editor.form_mut() = read_form(&form)?;
            editor.load_catalog(&api, limit).await?;
            let message = editor
                .submit(&api)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", message);
            Ok(())
        }
        TariffCommand::EditForm { tariff } => {
            let api = ApiClient::new(&config.api)?;
            let mut editor = TariffEditor::edit(read_tariff(&tariff)?, step);
            editor.load_catalog(&api, limit).await?;
            print_json(editor.form())
        }
    }
}

async fn run_batch(config: &Config, command: BatchCommand) -> anyhow::Result<()> {
    let api = ApiClient::new(&config.api)?;
    let mut composer = BatchComposer::new(config.batch.composition_policy());
    composer
        .load(
            &api,
            config.batch.orders_page_size,
            config.batch.branches_page_size,
        )
        .await?;

    match command {
        BatchCommand::Counts => {
            for (scope, total) in composer.scope_totals() {
                println!("{:<14} {:>5}", scope.display_name(), total);
                if let Some(grouped) = composer.grouped() {
                    for (service_type, count) in grouped.service_type_counts(scope) {
                        println!("  {:<12} {:>5}", service_type.display_name(), count);
                    }
                }
            }
            Ok(())
        }
        BatchCommand::Create(args) => {
            if !composer.select_scope(args.scope) {
                anyhow::bail!("no orders available for scope {}", args.scope);
            }
            if !composer.select_service_type(args.service_type) {
                anyhow::bail!("no {} orders in scope {}", args.service_type, args.scope);
            }
            if args.all {
                composer.select_all_visible();
            }
            for id in &args.orders {
                if !composer.select_order(id) {
                    anyhow::bail!("order {} is not in the {} / {} list", id, args.scope, args.service_type);
                }
            }
            if !composer.set_destination(&args.destination) {
                anyhow::bail!("unknown branch {}", args.destination);
            }
            composer.set_shipment_date(args.date);
            if let Some(notes) = &args.notes {
                composer.set_notes(notes);
            }
            for tag in &args.categories {
                composer.add_category(tag);
            }

            let batch_code = composer
                .submit(&api)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Batch created: {}", batch_code);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logging()?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    match cli.command {
        Command::Tariff(command) => run_tariff(&config, command).await,
        Command::Batch(command) => run_batch(&config, command).await,
    }
}
