// Entry point and high-level CLI flow.
//
// The binary wraps the library pipeline in a two-option menu:
// - Option [1] loads and cleans a transaction CSV, printing diagnostics.
// - Option [2] runs the analysis with default settings, exports the derived
//   tables, and prints Markdown previews.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
use housing_report::error::ReportError;
use housing_report::types::{AnalysisSettings, TransactionRecord};
use housing_report::{loader, output, pipeline, stats, util};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

// Simple in-memory app state so we only load/clean the CSV once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<TransactionRecord>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and clean the transaction CSV.
///
/// On success, we store the validated records in `APP_STATE` and print a
/// short textual summary of what happened.
fn handle_load() {
    print!("CSV path [transactions.csv]: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    let path = match buf.trim() {
        "" => "transactions.csv",
        p => p,
    };

    match loader::load_and_clean(path) {
        Ok((data, load_report)) => {
            println!(
                "Processing dataset... ({} rows read, {} valid transactions)",
                util::format_int(load_report.total_rows as i64),
                util::format_int(load_report.valid_rows as i64)
            );
            if load_report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to shape/validation errors.",
                    util::format_int(load_report.skipped_rows as i64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: run the pipeline and export every derived table.
///
/// This function is intentionally side-effectful:
/// - writes three CSV files and a trend-line JSON,
/// - writes a JSON summary,
/// - and prints Markdown previews of each table to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    let settings = AnalysisSettings::default();
    let results = match pipeline::recompute(&data, &settings) {
        Ok(r) => r,
        Err(e @ ReportError::NoValidRecords) | Err(e @ ReportError::EmptyFilteredSet) => {
            println!("Nothing to analyze: {}\n", e);
            return;
        }
        Err(e) => {
            eprintln!("Analysis failed: {}\n", e);
            return;
        }
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let stats_file = "community_stats.csv";
    let stat_rows = output::stat_rows(&results.community_stats);
    if let Err(e) = output::write_csv(stats_file, &stat_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Community Price Statistics");
    println!("(Count / Avg / Min / Max, MAPE and MPE vs. valuation)\n");
    output::preview_table_rows(&stat_rows, 5);
    println!("(Full table exported to {})\n", stats_file);

    let history_file = "price_history.csv";
    if let Err(e) = output::write_history_csv(
        history_file,
        &results.price_history,
        &results.selected_communities,
    ) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Price History by Period");
    println!(
        "(Top {} communities, sparse columns plus fitted trend values)\n",
        results.selected_communities.len()
    );
    println!("(Full table exported to {})\n", history_file);

    let locations_file = "community_locations.csv";
    let location_rows = output::location_rows(&results.locations);
    if let Err(e) = output::write_csv(locations_file, &location_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Community Map Locations");
    println!("(Averaged coordinates per community)\n");
    output::preview_table_rows(&location_rows, 5);
    println!("(Full table exported to {})\n", locations_file);

    if let Err(e) = output::write_json("trend_lines.json", &results.trend_lines) {
        eprintln!("Write error: {}", e);
    }
    println!("Trend lines exported to trend_lines.json");

    let summary = stats::compute_summary(&data, &results.community_stats);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"overall_avg_price\": {}, \"overall_mape\": {:.4}}}\n",
        util::format_number(summary.overall_avg_price, 2),
        summary.overall_mape
    );
}

fn main() {
    loop {
        println!("Housing Transaction Report");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
