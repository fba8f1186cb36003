// Entry point and high-level CLI flow.
//
// - Option [1] loads the material study CSV and prints load diagnostics.
// - Option [2] runs the readiness analysis, exports the reports and prints
//   previews.
// - Option [3] looks up one material across all projects.
// - Option [4] builds and exports the push-to-production action lists for
//   projects picked by SEC order, SEC number or product.
// - Option [5] or end of input exits.
// With `--batch` the program loads, exports and exits without a menu.
use clap::Parser;
use material_readiness::actions::{action_plan, ProjectFilter};
use material_readiness::analysis::Analysis;
use material_readiness::config::Settings;
use material_readiness::error::{AnalysisError, Result};
use material_readiness::loader::{self, LoadedDataset};
use material_readiness::warnings::count_by_kind;
use material_readiness::{cache, inquiry, logging, output, reports, util};
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::error;

#[derive(Parser)]
#[command(name = "material_readiness")]
#[command(version)]
#[command(about = "Production readiness from a material study extract")]
struct Cli {
    /// Material study CSV (overrides the config file)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory for exported reports (overrides the config file)
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Length of the top-N lists (overrides the config file)
    #[arg(long)]
    top_n: Option<usize>,

    /// Load, export and exit without the interactive menu
    #[arg(long)]
    batch: bool,
}

// The loaded snapshot lives here so reports can be regenerated without
// re-reading the file; the analysis itself is memoised in `cache`.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Arc<LoadedDataset>>,
}

fn loaded_data() -> Option<Arc<LoadedDataset>> {
    let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data.clone()
}

/// `None` once the input is closed or unreadable.
fn next_line(input: &mut impl BufRead) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    next_line(&mut io::stdin().lock())
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N` or closed stdin.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = read_line("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn read_project_filter() -> Option<ProjectFilter> {
    println!("Select projects by:");
    println!("[1] SEC order");
    println!("[2] SEC number");
    println!("[3] Product\n");
    let kind = read_choice()?;
    let label = match kind.as_str() {
        "1" => "SEC order(s)",
        "2" => "SEC number(s)",
        "3" => "Product(s)",
        _ => {
            println!("Invalid choice. Please enter 1, 2 or 3.\n");
            return None;
        }
    };
    let values = read_line(&format!("{label}, comma separated: "))?;
    ProjectFilter::from_choice(&kind, &values)
}

/// Option [1]: read the CSV, replacing any previous snapshot.
fn handle_load(settings: &Settings) -> Result<()> {
    let data = loader::load_path(&settings.input_path)?;
    let report = &data.report;
    println!(
        "Processing dataset... ({} rows loaded, {} blank rows ignored)",
        util::format_int(report.total_rows),
        util::format_int(report.blank_rows)
    );
    if !report.missing_columns.is_empty() {
        println!("Note: missing columns: {}", report.missing_columns.join(", "));
    }
    if cache::global().fingerprint().as_deref() != Some(data.fingerprint.as_str()) {
        cache::global().invalidate();
    }
    println!();
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data = Some(Arc::new(data));
    Ok(())
}

fn current_analysis(settings: &Settings) -> Result<Arc<Analysis>> {
    let data = loaded_data().ok_or(AnalysisError::NoDataLoaded)?;
    cache::global().get_or_analyze(&data, &settings.analysis_options())
}

/// Option [2]: export every report and print previews.
fn handle_generate_reports(settings: &Settings) -> Result<()> {
    let analysis = current_analysis(settings)?;
    std::fs::create_dir_all(&settings.output_dir)?;
    let dir = &settings.output_dir;
    let n = settings.preview_rows;

    println!("Generating reports...\n");

    let projects = reports::project_readiness_rows(&analysis);
    output::write_csv(&dir.join("project_readiness.csv"), &projects)?;
    output::preview_table(
        "Report 1: Project Readiness",
        Some("blocked projects first"),
        &projects,
        n,
    );

    let blocking = reports::blocking_item_rows(&analysis);
    output::write_csv(&dir.join("blocking_items.csv"), &blocking)?;
    output::preview_table(
        "Report 2: Blocking Items",
        Some("largest open balance first"),
        &blocking,
        n,
    );

    let suppliers = reports::supplier_ranking_rows(&analysis);
    output::write_csv(&dir.join("supplier_ranking.csv"), &suppliers)?;
    output::preview_table(
        "Report 3: Supplier Delay Ranking",
        Some("most delayed lines first"),
        &suppliers,
        n,
    );

    output::preview_table(
        "Line Status Distribution",
        None,
        &reports::status_count_rows(&analysis),
        usize::MAX,
    );

    output::write_csv(&dir.join("data_quality_warnings.csv"), &analysis.warnings)?;
    if !analysis.warnings.is_empty() {
        println!("Data quality warnings (full list in data_quality_warnings.csv):");
        for (kind, count) in count_by_kind(&analysis.warnings) {
            println!("  {}: {}", kind, util::format_int(count));
        }
        println!();
    }

    output::write_json(&dir.join("summary.json"), &analysis.metrics)?;
    let m = &analysis.metrics;
    println!(
        "Summary (summary.json): {} projects, {} ready, {} blocked, fulfillment {}%\n",
        util::format_int(m.total_projects),
        util::format_int(m.ready_projects),
        util::format_int(m.blocked_projects),
        util::format_number(m.overall_fulfillment_pct, 1)
    );
    Ok(())
}

/// Option [3]: everything known about one item code.
fn handle_inquiry(settings: &Settings) -> Result<()> {
    let analysis = current_analysis(settings)?;
    let Some(code) = read_line("Item code: ") else {
        return Ok(());
    };
    let Some(q) = inquiry::inquire(&analysis, &code) else {
        println!("No lines found for item '{}'.\n", code);
        return Ok(());
    };
    println!("\n{} - {}", q.item, q.description);
    println!(
        "Required {} / allocated {} / open {}",
        util::format_number(q.total_req, 0),
        util::format_number(q.total_allocated, 0),
        util::format_number(q.total_balance, 0)
    );
    for p in &q.by_project {
        println!(
            "  {}: req {} alloc {} open {}",
            p.sec_order,
            util::format_number(p.req_qty, 0),
            util::format_number(p.allocated_qty, 0),
            util::format_number(p.balance, 0)
        );
    }
    for issue in &q.issues {
        println!("  ! {}", issue);
    }
    println!();
    Ok(())
}

/// Option [4]: action lists for projects picked by SEC order, SEC number or
/// product. Exports the rows and a summary next to the other reports.
fn handle_action_plan(settings: &Settings) -> Result<()> {
    let analysis = current_analysis(settings)?;
    let Some(filter) = read_project_filter() else {
        return Ok(());
    };
    let Some(plan) = action_plan(&analysis, &filter, &settings.action_settings()) else {
        println!("No lines match the selection.\n");
        return Ok(());
    };
    println!(
        "\n{} lines, fulfillment {}%",
        util::format_int(plan.total_items),
        util::format_number(plan.fulfillment_pct, 1)
    );
    let rows = plan.rows(&analysis);
    std::fs::create_dir_all(&settings.output_dir)?;
    output::write_csv(&settings.output_dir.join("action_plan.csv"), &rows)?;
    output::write_json(&settings.output_dir.join("action_summary.json"), &plan.summary())?;
    output::preview_table(
        "Production Actions",
        Some("full list in action_plan.csv"),
        &rows,
        usize::MAX,
    );
    println!("{}\n", plan.verdict);
    Ok(())
}

fn print_outcome(result: Result<()>) {
    if let Err(e) = result {
        error!(error = %e, "operation failed");
        match e {
            AnalysisError::NoDataLoaded => {
                println!("Error: No data loaded. Please load the CSV file first (option 1).\n")
            }
            other => eprintln!("Error: {}\n", other),
        }
    }
}

fn settings_from(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(p) = &cli.input {
        settings.input_path = p.clone();
    }
    if let Some(p) = &cli.output_dir {
        settings.output_dir = p.clone();
    }
    if let Some(n) = cli.top_n {
        settings.top_n = n.max(1);
    }
    Ok(settings)
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let settings = match settings_from(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if cli.batch {
        let result = handle_load(&settings).and_then(|_| handle_generate_reports(&settings));
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    loop {
        println!("Material Readiness:");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Material Inquiry");
        println!("[4] Push to Production");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => print_outcome(handle_load(&settings)),
            "2" => {
                println!();
                print_outcome(handle_generate_reports(&settings));
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => print_outcome(handle_inquiry(&settings)),
            "4" => print_outcome(handle_action_plan(&settings)),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3, 4 or 5.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn closed_input_ends_reading() {
        let mut input = Cursor::new("  2 \n\n");
        assert_eq!(next_line(&mut input).as_deref(), Some("2"));
        assert_eq!(next_line(&mut input).as_deref(), Some(""));
        assert_eq!(next_line(&mut input), None);
        assert_eq!(next_line(&mut input), None);
    }
}
