// Entry point and high-level CLI flow.
//
// Interactive mode works like a dashboard sidebar: pick a dataset, narrow
// the year range and crime group, choose a drill-down region, then render.
// Rendering prints the KPIs and table previews and writes the map layer and
// report files into the output directory.
mod cache;
mod config;
mod error;
mod loader;
mod normalize;
mod output;
mod regions;
mod reports;
mod schema;
mod session;
mod types;
mod util;

use clap::{Parser, Subcommand};
use config::DashboardConfig;
use error::{DashboardError, ErrorKind, Result};
use session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use types::{Filters, NormalizedTable, SummaryFile, YearTrend};

#[derive(Parser)]
#[command(name = "crime_dashboard", about = "India crime pattern and safety dashboard")]
struct Cli {
    /// TOML file overriding the built-in configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the dataset CSVs and the boundary file
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Boundary GeoJSON file name, relative to the data directory
    #[arg(long)]
    boundary: Option<String>,
    /// Where rendered reports are written
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Menu-driven session (default)
    Interactive,
    /// List configured datasets and whether their files exist
    Datasets,
    /// Render one selection and exit
    Report {
        #[arg(long)]
        dataset: String,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
        #[arg(long, default_value = reports::ALL_CATEGORIES)]
        group: String,
        #[arg(long, default_value = reports::ALL_REGIONS)]
        region: String,
    },
}

/// What the user has picked so far. Filters are resolved against the data
/// on every render.
#[derive(Debug, Clone)]
struct Selection {
    dataset: Option<String>,
    year_range: Option<(i32, i32)>,
    group: String,
    region: String,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            dataset: None,
            year_range: None,
            group: reports::ALL_CATEGORIES.to_string(),
            region: reports::ALL_REGIONS.to_string(),
        }
    }
}

fn build_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(file) = &cli.boundary {
        config.boundary_file = file.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Print a numbered list and return the picked entry, if any.
fn pick<'a>(title: &str, options: &'a [String], marks: &[&str]) -> Option<&'a String> {
    println!("{}", title);
    for (i, opt) in options.iter().enumerate() {
        let mark = marks.get(i).copied().unwrap_or("");
        println!("[{}] {}{}", i + 1, opt, mark);
    }
    let choice = read_choice();
    let picked = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i));
    if picked.is_none() {
        println!("Invalid choice.\n");
    }
    picked
}

fn report_error(err: &DashboardError) {
    log::error!("{}", err);
    match err.kind() {
        ErrorKind::MissingFile => println!(
            "Error: {}\nKeep all CSV files in the data directory, or pick another dataset.\n",
            err
        ),
        ErrorKind::Schema => println!(
            "Error: {}\nThis dataset cannot be analysed; other datasets remain available.\n",
            err
        ),
        ErrorKind::Config | ErrorKind::Io => println!("Error: {}\n", err),
    }
}

/// Turn the raw selection into filters the data can satisfy: the year range
/// is clamped to observed years, and unknown groups or regions fall back to
/// their "all" sentinels.
fn resolve_filters(table: &NormalizedTable, catalog: &regions::RegionCatalog, sel: &Selection) -> Filters {
    let year_range = reports::year_bounds(table)
        .map(|bounds| reports::clamp_year_range(sel.year_range.unwrap_or(bounds), bounds));

    let groups = reports::group_options(table, year_range);
    let category = if groups.contains(&sel.group) {
        sel.group.clone()
    } else {
        log::warn!("crime group {:?} not present, showing all", sel.group);
        reports::ALL_CATEGORIES.to_string()
    };

    let region = if sel.region == reports::ALL_REGIONS || catalog.contains(&sel.region) {
        sel.region.clone()
    } else {
        log::warn!("region {:?} not in catalog, showing all", sel.region);
        reports::ALL_REGIONS.to_string()
    };

    Filters {
        year_range,
        category: Some(category),
        drilldown_region: Some(region),
    }
}

fn render(session: &mut Session, label: &str, sel: &Selection) -> Result<()> {
    let table = session.dataset(label)?;
    let boundary = session.boundary()?;
    let filters = resolve_filters(&table, &boundary.catalog, sel);
    let agg = reports::aggregate(&table, &filters, &boundary.catalog);
    let config = session.config();

    println!("\n{} ({})", label, table.source);
    if let Some((lo, hi)) = filters.year_range {
        println!("Years {}-{}", lo, hi);
    }
    println!(
        "Total Crimes: {} | Total Recovered: {} | Recovery Rate: {}%\n",
        util::format_number(agg.kpis.total_crimes, 0),
        util::format_number(agg.kpis.total_recovered, 0),
        util::format_number(agg.kpis.recovery_rate_pct, 2)
    );

    let out = &config.output_dir;
    std::fs::create_dir_all(out)?;

    let layer = output::choropleth_layer(&boundary.features, &agg.state_summary, &config.region_key);
    output::write_geojson(&out.join("state_choropleth.geojson"), layer)?;
    output::write_csv(&out.join("state_summary.csv"), &agg.state_summary)?;
    output::preview_table(
        "State Summary",
        Some("shaded by Total_Crimes in state_choropleth.geojson"),
        &agg.state_summary,
        5,
    );

    let region = filters.drilldown_region.as_deref().unwrap_or(reports::ALL_REGIONS);
    output::write_csv(&out.join("subgroup_summary.csv"), &agg.subgroup_summary)?;
    output::preview_table(
        "Sub-group Breakdown (Top 15)",
        Some(region),
        &agg.subgroup_summary,
        reports::SUBGROUP_LIMIT,
    );

    match &agg.year_trend {
        YearTrend::Available(rows) => {
            output::write_csv(&out.join("year_trend.csv"), rows)?;
            output::preview_table("Year-wise Trend", Some(region), rows, rows.len());
        }
        YearTrend::Unavailable => {
            println!("\nYear-wise Trend");
            println!("No Year column available in this dataset for trend analysis.\n");
        }
    }

    let top = reports::top_states(&agg.state_summary, reports::TOP_STATES_LIMIT);
    output::write_csv(&out.join("top_states.csv"), &top)?;
    output::preview_table("Top 10 High Risk States", None, &top, top.len());

    let recovery = reports::top_recovery(&agg.state_summary, reports::TOP_RECOVERY_LIMIT);
    output::write_csv(&out.join("top_recovery.csv"), &recovery)?;
    output::preview_table("Top 15 States by Recovery Rate", None, &recovery, 5);

    let summary = SummaryFile {
        dataset: label,
        kind: table.kind,
        base_column: &table.base_column,
        filters: &filters,
        kpis: agg.kpis,
        regions: agg.state_summary.len(),
        generated_at: chrono::Utc::now(),
    };
    output::write_json(&out.join("summary.json"), &summary)?;
    println!("(Reports written to {})\n", out.display());
    Ok(())
}

fn handle_select_dataset(session: &mut Session, sel: &mut Selection) {
    let labels: Vec<String> = session.config().labels().map(str::to_string).collect();
    let marks: Vec<&str> = labels
        .iter()
        .map(|l| if session.dataset_available(l) { "" } else { " (missing)" })
        .collect();
    let Some(label) = pick("Select Crime Dataset:", &labels, &marks) else {
        return;
    };
    match session.dataset(label) {
        Ok(table) => {
            println!(
                "Loaded {} ({} rows, counting `{}`)\n",
                label,
                util::format_int(table.records.len() as u64),
                table.base_column
            );
            *sel = Selection {
                dataset: Some(label.clone()),
                ..Selection::default()
            };
        }
        Err(e) => report_error(&e),
    }
}

fn handle_year_range(session: &mut Session, sel: &mut Selection) {
    let Some(label) = sel.dataset.clone() else {
        println!("Error: No dataset selected. Please select one first (option 1).\n");
        return;
    };
    let table = match session.dataset(&label) {
        Ok(t) => t,
        Err(e) => return report_error(&e),
    };
    let Some(bounds) = reports::year_bounds(&table) else {
        println!("This dataset has no year data; the year filter does not apply.\n");
        return;
    };
    println!("Years available: {}-{}", bounds.0, bounds.1);
    let from = util::parse_year_safe(Some(read_line("From year: ").as_str())).unwrap_or(bounds.0);
    let to = util::parse_year_safe(Some(read_line("To year: ").as_str())).unwrap_or(bounds.1);
    let range = reports::clamp_year_range((from, to), bounds);
    println!("Year range set to {}-{}\n", range.0, range.1);
    sel.year_range = Some(range);
}

fn handle_group(session: &mut Session, sel: &mut Selection) {
    let Some(label) = sel.dataset.clone() else {
        println!("Error: No dataset selected. Please select one first (option 1).\n");
        return;
    };
    let table = match session.dataset(&label) {
        Ok(t) => t,
        Err(e) => return report_error(&e),
    };
    let year_range = reports::year_bounds(&table)
        .map(|b| reports::clamp_year_range(sel.year_range.unwrap_or(b), b));
    let groups = reports::group_options(&table, year_range);
    if let Some(group) = pick("Crime Group:", &groups, &[]) {
        sel.group = group.clone();
        println!("Crime group set to {}\n", sel.group);
    }
}

fn handle_region(session: &mut Session, sel: &mut Selection) {
    let boundary = match session.boundary() {
        Ok(b) => b,
        Err(e) => return report_error(&e),
    };
    let regions = reports::region_options(&boundary.catalog);
    if let Some(region) = pick("Drilldown: Select State", &regions, &[]) {
        sel.region = region.clone();
        println!("Drill-down region set to {}\n", sel.region);
    }
}

fn run_interactive(session: &mut Session) {
    let mut sel = Selection::default();
    loop {
        let current = sel.dataset.as_deref().unwrap_or("none");
        let years = sel
            .year_range
            .map(|(lo, hi)| format!("{}-{}", lo, hi))
            .unwrap_or_else(|| "all".to_string());
        println!("India Crime Pattern & Safety Analysis Dashboard");
        println!("[1] Select dataset (current: {})", current);
        println!("[2] Set year range (current: {})", years);
        println!("[3] Select crime group (current: {})", sel.group);
        println!("[4] Select drill-down region (current: {})", sel.region);
        println!("[5] Render dashboard");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_select_dataset(session, &mut sel),
            "2" => handle_year_range(session, &mut sel),
            "3" => handle_group(session, &mut sel),
            "4" => handle_region(session, &mut sel),
            "5" => match sel.dataset.clone() {
                Some(label) => {
                    if let Err(e) = render(session, &label, &sel) {
                        report_error(&e);
                    }
                }
                None => println!("Error: No dataset selected. Please select one first (option 1).\n"),
            },
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

fn list_datasets(session: &Session) {
    for entry in &session.config().datasets {
        let status = if session.dataset_available(&entry.label) {
            "ok"
        } else {
            "missing"
        };
        println!("{:<28} {:<32} {}", entry.label, entry.file, status);
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new(config);

    // Nothing can be drawn without the boundary file.
    if let Err(e) = session.boundary() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => run_interactive(&mut session),
        Commands::Datasets => list_datasets(&session),
        Commands::Report {
            dataset,
            from,
            to,
            group,
            region,
        } => {
            let year_range = match (from, to) {
                (None, None) => None,
                (from, to) => Some((from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))),
            };
            let sel = Selection {
                dataset: Some(dataset.clone()),
                year_range,
                group,
                region,
            };
            if let Err(e) = render(&mut session, &dataset, &sel) {
                report_error(&e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionCatalog;
    use crate::types::{DatasetKind, NormalizedRecord};

    fn table() -> NormalizedTable {
        let rec = |year, group: &str| NormalizedRecord {
            area_name: "Goa".to_string(),
            year,
            group_name: group.to_string(),
            sub_group_name: "Overall".to_string(),
            total_crimes: 1.0,
            total_recovered: 0.0,
            loss_value: 0.0,
            recovery_rate: 0.0,
        };
        NormalizedTable {
            source: "t.csv".to_string(),
            kind: DatasetKind::Generic,
            base_column: "Cases".to_string(),
            records: vec![rec(Some(2010), "Theft"), rec(Some(2014), "Riots")],
        }
    }

    #[test]
    fn resolves_default_selection_to_full_bounds() {
        let catalog = RegionCatalog::from_names(["Goa"]);
        let filters = resolve_filters(&table(), &catalog, &Selection::default());
        assert_eq!(filters.year_range, Some((2010, 2014)));
        assert_eq!(filters.category.as_deref(), Some("All"));
        assert_eq!(filters.drilldown_region.as_deref(), Some("All India"));
    }

    #[test]
    fn stale_selections_fall_back_to_sentinels() {
        let catalog = RegionCatalog::from_names(["Goa"]);
        let sel = Selection {
            dataset: Some("Murders".to_string()),
            year_range: Some((2013, 2030)),
            group: "Theft".to_string(),
            region: "Atlantis".to_string(),
        };
        let filters = resolve_filters(&table(), &catalog, &sel);
        assert_eq!(filters.year_range, Some((2013, 2014)));
        // Theft only occurs in 2010, outside the range.
        assert_eq!(filters.category.as_deref(), Some("All"));
        assert_eq!(filters.drilldown_region.as_deref(), Some("All India"));
    }

    #[test]
    fn cli_parses_report_subcommand() {
        let cli = Cli::parse_from([
            "crime_dashboard",
            "--data-dir",
            "data",
            "report",
            "--dataset",
            "Murders",
            "--from",
            "2005",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        match cli.command {
            Some(Commands::Report { dataset, from, to, group, .. }) => {
                assert_eq!(dataset, "Murders");
                assert_eq!(from, Some(2005));
                assert_eq!(to, None);
                assert_eq!(group, "All");
            }
            _ => panic!("expected report subcommand"),
        }
    }
}
