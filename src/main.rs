//! VitalWatch CLI
//!
//! Command-line front end to a patient monitoring backend:
//! - Browse patients and alerts with search, filters, sort and paging
//! - Export views as CSV
//! - Show dashboard aggregates
//! - Manage patients and simulate telemetry
//! - Adjust persisted display preferences

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use vitalwatch::api::{HttpMonitorApi, PatientInput};
use vitalwatch::config::{generate_default_config, Config};
use vitalwatch::derive::{DerivedView, ViewIntent};
use vitalwatch::model::{Alert, Patient};
use vitalwatch::notify::ToastKind;
use vitalwatch::prefs::{FilePreferenceStore, PreferenceStore};
use vitalwatch::session::MonitorSession;
use vitalwatch::telemetry::{Preset, TelemetryDraft};
use vitalwatch::views::{alerts, patients, ViewKind};
use vitalwatch::SortSpec;

#[derive(Parser)]
#[command(name = "vitalwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Patient vital-sign monitoring dashboard")]
#[command(long_about = "VitalWatch browses patients and alerts from a monitoring backend.\nSearch, filter, sort, page and export views; simulate telemetry; tune display preferences.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./vitalwatch.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(clap::Args)]
pub struct PageArgs {
    /// Page to show (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: usize,
    /// Rows per page (10, 25 or 50); remembered for next time
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List patients
    Patients {
        /// Search name or patient ID
        #[arg(short, long)]
        search: Option<String>,
        /// Connection status (Online, Offline, all)
        #[arg(long)]
        status: Option<String>,
        /// Gender (Male, Female, Other, all)
        #[arg(long)]
        gender: Option<String>,
        /// Sort column (patient_id, name, age, heart_rate, ...)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[command(flatten)]
        paging: PageArgs,
    },

    /// List alerts grouped by day
    Alerts {
        /// Search patient, issue or message
        #[arg(short, long)]
        search: Option<String>,
        /// Severity (high, medium, low, all)
        #[arg(long)]
        severity: Option<String>,
        /// Resolution (resolved, unresolved, all)
        #[arg(long)]
        status: Option<String>,
        /// newest or oldest
        #[arg(long, default_value = "newest")]
        sort: String,
        #[command(flatten)]
        paging: PageArgs,
    },

    /// Export a view as CSV
    Export {
        /// patients or alerts
        view: ViewKind,
        /// Search text applied before export
        #[arg(short, long)]
        search: Option<String>,
        /// Filters in dimension=value form (e.g. status=Online)
        #[arg(short = 'F', long = "filter")]
        filters: Vec<String>,
        /// Output file (default: <view>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Show dashboard aggregates
    Dashboard,

    /// Send a simulated device reading
    Telemetry {
        /// Patient ID
        patient: String,
        /// Heart rate (bpm)
        #[arg(long)]
        heart_rate: Option<String>,
        /// Oxygen level (%)
        #[arg(long)]
        oxygen: Option<String>,
        /// Fill vitals from a preset (normal, warning, critical)
        #[arg(long)]
        preset: Option<Preset>,
        /// Only show the preview; do not send
        #[arg(long)]
        dry_run: bool,
    },

    /// Add a patient
    AddPatient {
        name: String,
        /// Requested patient ID (backend assigns one otherwise)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        conditions: Option<String>,
    },

    /// Update a patient
    UpdatePatient {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        conditions: Option<String>,
    },

    /// Delete a patient
    DeletePatient { id: String },

    /// Show or toggle patient table columns
    Columns {
        /// Columns to toggle
        toggle: Vec<String>,
    },

    /// Toggle patient table density
    Density,

    /// Toggle light/dark theme
    Theme,

    /// Show stored preferences
    Prefs,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    vitalwatch::logging::init(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let prefs_path = config.preferences.resolved_path();
    let store = Arc::new(FilePreferenceStore::open(&prefs_path));

    if let Commands::Prefs = &cli.command {
        println!("Preferences ({:?}):", store.path());
        let entries = store.entries();
        if entries.is_empty() {
            println!("  (none)");
        }
        for (key, value) in entries {
            println!("  {:<20} {}", key, value);
        }
        return Ok(());
    }

    let prefs: Arc<dyn PreferenceStore> = store;
    let api = HttpMonitorApi::new(config.api.client_config())?;
    let mut session = MonitorSession::new(api, prefs, config.display.zone());

    run(&mut session, cli.command, cli.format).await
}

async fn run(
    session: &mut MonitorSession<HttpMonitorApi>,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::Patients {
            search,
            status,
            gender,
            sort,
            desc,
            paging,
        } => {
            session.refresh().await?;
            let controller = session.patient_controller();
            if let Some(size) = paging.page_size {
                controller.set_page_size(size);
            }
            if let Some(text) = search {
                controller.set_search(text);
            }
            if let Some(value) = status {
                controller.set_filter("status", &value);
            }
            if let Some(value) = gender {
                controller.set_filter("gender", &value);
            }
            if let Some(key) = sort {
                let sort = if desc {
                    SortSpec::descending(key)
                } else {
                    SortSpec::ascending(key)
                };
                controller.apply(ViewIntent::SetSort { sort });
            }
            controller.set_page(paging.page);

            let visible = session.columns().visible();
            let layout = patients::csv_layout(session.zone());
            let view = session.patient_view();

            if format == OutputFormat::Json {
                let rows: Vec<&Patient> = view.page_items().to_vec();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            let columns: Vec<&str> = visible
                .into_iter()
                .filter(|key| layout.get(key).is_some())
                .collect();
            let mut rows = vec![columns
                .iter()
                .map(|key| patients::column_header(key).to_string())
                .collect::<Vec<_>>()];
            for patient in view.page_items() {
                rows.push(
                    columns
                        .iter()
                        .filter_map(|key| layout.get(key))
                        .map(|column| column.render(patient))
                        .collect(),
                );
            }
            print_table(&rows);
            print_footer(&view, "patients");
        }

        Commands::Alerts {
            search,
            severity,
            status,
            sort,
            paging,
        } => {
            let sort = alerts::parse_sort(&sort)
                .with_context(|| format!("Unknown alert sort: {} (use newest or oldest)", sort))?;

            session.refresh().await?;
            let controller = session.alert_controller();
            if let Some(size) = paging.page_size {
                controller.set_page_size(size);
            }
            if let Some(text) = search {
                controller.set_search(text);
            }
            if let Some(value) = severity {
                controller.set_filter("severity", &value);
            }
            if let Some(value) = status {
                controller.set_filter("status", &value);
            }
            controller.apply(ViewIntent::SetSort { sort });
            controller.set_page(paging.page);

            let zone = session.zone();
            let view = session.alert_view();

            if format == OutputFormat::Json {
                let rows: Vec<&Alert> = view.page_items().to_vec();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            if view.is_empty() {
                println!("No alerts");
            }
            for group in view.groups().unwrap_or(&[]) {
                let label = if group.label.is_empty() {
                    "Unknown date"
                } else {
                    group.label.as_str()
                };
                println!("{}", label);
                println!("{}", "-".repeat(label.len()));
                for alert in &group.items {
                    println!(
                        "  {:<24} {:<7} {:<8} {:<20} {}{}",
                        alert
                            .datetime
                            .map(|t| zone.format_datetime(t))
                            .unwrap_or_default(),
                        alert.severity_str(),
                        alert.patient_id,
                        alert.patient_name,
                        alert.issue_detected,
                        if alert.resolved { " (resolved)" } else { "" }
                    );
                }
                println!();
            }
            print_footer(&view, "alerts");
        }

        Commands::Export {
            view,
            search,
            filters,
            output,
            stdout,
        } => {
            session.refresh().await?;
            let mut intents = Vec::new();
            if let Some(text) = search {
                intents.push(ViewIntent::set_search(text));
            }
            for filter in filters {
                let (dimension, value) = filter
                    .split_once('=')
                    .with_context(|| format!("Filter must be dimension=value: {}", filter))?;
                intents.push(ViewIntent::set_filter(dimension.trim(), value.trim()));
            }
            for intent in intents {
                match view {
                    ViewKind::Patients => session.patient_controller().apply(intent),
                    ViewKind::Alerts => session.alert_controller().apply(intent),
                };
            }

            let csv = session.export(view)?;
            if stdout {
                println!("{}", csv);
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(view.export_file_name()));
                std::fs::write(&path, format!("{}\n", csv))
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Exported to {:?}", path);
            }
        }

        Commands::Dashboard => {
            if let Err(e) = session.refresh().await {
                anyhow::bail!("Cannot reach backend: {}", e);
            }
            let stats = session.dashboard();

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("VitalWatch v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Patients:         {}", stats.total_patients);
            println!("  Active:         {}", stats.active_patients);
            println!("  Offline:        {}", stats.offline_patients);
            println!("  Critical:       {}", stats.critical_patients);
            println!("Alerts:");
            println!("  Unresolved:     {}", stats.unresolved_alerts);
            println!("  Resolved:       {}", stats.resolved_alerts);
            println!("Average vitals:");
            println!("  Heart rate:     {} bpm", stats.avg_heart_rate);
            println!("  Oxygen:         {}%", stats.avg_oxygen_level);
            println!();
            println!("{:<12} {:>9} {:>9} {:>9} {:>9}", "Vital", "Critical", "Warning", "Normal", "No data");
            println!("{}", "-".repeat(52));
            for (name, buckets) in [
                ("Heart rate", stats.vitals.heart_rate),
                ("Oxygen", stats.vitals.oxygen),
            ] {
                println!(
                    "{:<12} {:>9} {:>9} {:>9} {:>9}",
                    name, buckets.critical, buckets.warning, buckets.normal, buckets.no_data
                );
            }

            if !stats.recent_critical.is_empty() {
                println!();
                println!("Recent critical alerts:");
                let zone = session.zone();
                for alert in &stats.recent_critical {
                    println!(
                        "  {:<24} {:<8} {}",
                        alert
                            .datetime
                            .map(|t| zone.format_datetime(t))
                            .unwrap_or_default(),
                        alert.patient_id,
                        alert.issue_detected
                    );
                }
            }
        }

        Commands::Telemetry {
            patient,
            heart_rate,
            oxygen,
            preset,
            dry_run,
        } => {
            let mut draft = TelemetryDraft::new().patient(patient);
            if let Some(preset) = preset {
                draft.apply_preset(preset);
            }
            if let Some(hr) = heart_rate {
                draft.heart_rate = hr;
            }
            if let Some(o2) = oxygen {
                draft.oxygen_level = o2;
            }

            let (hr, o2) = draft.preview();
            println!("Heart rate: {:<6} {}", draft.heart_rate, hr.label);
            println!("Oxygen:     {:<6} {}", draft.oxygen_level, o2.label);
            match draft.expected_alert() {
                Some(severity) => println!("Expected alert: {}", severity),
                None => println!("Expected alert: none"),
            }

            if !dry_run {
                let message = session.send_telemetry(&mut draft).await;
                if message.kind == ToastKind::Error {
                    anyhow::bail!("{}", message.text);
                }
                println!("{}", message.text);
            }
        }

        Commands::AddPatient {
            name,
            id,
            age,
            gender,
            conditions,
        } => {
            let input = PatientInput {
                patient_id: id,
                name,
                age,
                gender: gender.unwrap_or_default(),
                medical_conditions: conditions.unwrap_or_default(),
            };
            session.save_patient(None, &input).await?;
            print_toasts(session);
        }

        Commands::UpdatePatient {
            id,
            name,
            age,
            gender,
            conditions,
        } => {
            session.refresh().await?;
            let existing = session
                .patients()
                .and_then(|list| list.iter().find(|p| p.patient_id == id))
                .with_context(|| format!("No patient with ID {}", id))?;

            let mut input = PatientInput::from_patient(existing);
            if let Some(name) = name {
                input.name = name;
            }
            if age.is_some() {
                input.age = age;
            }
            if let Some(gender) = gender {
                input.gender = gender;
            }
            if let Some(conditions) = conditions {
                input.medical_conditions = conditions;
            }
            session.save_patient(Some(id.as_str()), &input).await?;
            print_toasts(session);
        }

        Commands::DeletePatient { id } => {
            let result = session.delete_patient(&id).await;
            print_toasts(session);
            result?;
        }

        Commands::Columns { toggle } => {
            for column in &toggle {
                if !session.toggle_column(column) {
                    eprintln!("Column {} cannot be toggled", column);
                }
            }
            for (key, visible) in session.columns().columns() {
                let lock = if session.columns().is_locked(key) {
                    " (locked)"
                } else {
                    ""
                };
                println!(
                    "  [{}] {}{}",
                    if *visible { "x" } else { " " },
                    key,
                    lock
                );
            }
        }

        Commands::Density => {
            println!("Density: {}", session.toggle_density().as_str());
        }

        Commands::Theme => {
            println!("Theme: {}", session.toggle_theme().as_str());
        }

        Commands::Prefs | Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_toasts(session: &mut MonitorSession<HttpMonitorApi>) {
    for toast in session.toasts_mut().drain() {
        match toast.kind {
            ToastKind::Success => println!("{}", toast.text),
            ToastKind::Error => eprintln!("{}", toast.text),
        }
    }
}

fn print_table(rows: &[Vec<String>]) {
    let columns = rows.first().map(|r| r.len()).unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for (n, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", line.join("  ").trim_end());
        if n == 0 {
            println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1)));
        }
    }
}

fn print_footer<T>(view: &DerivedView<'_, T>, noun: &str) {
    println!();
    if view.is_empty() {
        println!("No {} match", noun);
    } else {
        println!(
            "Showing {}-{} of {} {} (page {}/{})",
            view.from_index(),
            view.to_index(),
            view.total_count(),
            noun,
            view.page(),
            view.total_pages()
        );
    }
    let filters: Vec<String> = view.active_filters().iter().map(|f| f.label.clone()).collect();
    if !filters.is_empty() {
        println!("Filters: {}", filters.join(", "));
    }
}
