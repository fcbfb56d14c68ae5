use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use networth::data::balance::parse_date;
use networth::prelude::*;
use prettytable::{Cell, Row, Table};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "networth")]
#[command(about = "A Rust-based personal net worth dashboard", long_about = None)]
struct Cli {
    //json configuration file; command-line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //print summary statistics and per-account savings rates
    Summary {
        //workbook directory (one csv per account)
        #[arg(long)]
        data: Option<PathBuf>,

        //reference date for year-to-date figures (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    //forecast net worth month by month
    Forecast {
        #[arg(long)]
        data: Option<PathBuf>,

        //number of months to forecast
        #[arg(long)]
        months: Option<usize>,

        //forecasting engine (trend)
        #[arg(long)]
        engine: Option<String>,

        #[arg(long)]
        changepoints: Option<usize>,

        #[arg(long)]
        prior_scale: Option<f64>,

        //prediction interval width between 0 and 1
        #[arg(long)]
        interval_width: Option<f64>,

        #[arg(long)]
        yearly: bool,

        //naive projection shown alongside the model (last, linear)
        #[arg(long)]
        project: Option<String>,
    },

    //monthly savings needed to reach a target
    Goal {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        target_date: Option<String>,
    },

    //actual net worth against a fixed linear path
    Progress {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        target_date: Option<String>,
    },

    //write the merged ledger as csv
    Export {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        output: PathBuf,
    },

    //render every section; a missing forecast engine only disables the forecast
    Dashboard {
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("networth=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfiguration::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        None => DashboardConfiguration::default(),
    };
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Summary { data, as_of } => {
            override_data(&mut config, data);
            let as_of = match as_of {
                Some(raw) => parse_cli_date(&raw)?,
                None => today,
            };
            let ledger = load_ledger(&config.data_dir)?;
            print_summary(&ledger, as_of)?;
        }
        Commands::Forecast {
            data,
            months,
            engine,
            changepoints,
            prior_scale,
            interval_width,
            yearly,
            project,
        } => {
            override_data(&mut config, data);
            let settings = &mut config.forecast;
            if let Some(months) = months {
                settings.months_ahead = months;
            }
            if let Some(engine) = engine {
                settings.engine = engine;
            }
            if let Some(n) = changepoints {
                settings.model.n_changepoints = n;
            }
            if let Some(scale) = prior_scale {
                settings.model.changepoint_prior_scale = scale;
            }
            if let Some(width) = interval_width {
                settings.model.interval_width = width;
            }
            if yearly {
                settings.model.yearly_seasonality = true;
            }
            if let Some(method) = project {
                settings.regressor_project_method = ProjectMethod::parse(&method)
                    .ok_or_else(|| anyhow::anyhow!("Unknown projection method: {}", method))?;
            }

            let ledger = load_ledger(&config.data_dir)?;
            print_forecast(&ledger, &config.forecast)?;
        }
        Commands::Goal {
            data,
            target,
            target_date,
        } => {
            override_data(&mut config, data);
            if let Some(target) = target {
                config.goal.target_amount = target;
            }
            if let Some(raw) = target_date {
                config.goal.target_date = Some(parse_cli_date(&raw)?);
            }
            let ledger = load_ledger(&config.data_dir)?;
            print_goal(&ledger, &config.goal.to_goal(today))?;
        }
        Commands::Progress {
            data,
            target,
            target_date,
        } => {
            override_data(&mut config, data);
            if let Some(target) = target {
                config.expected.target_amount = target;
            }
            if let Some(raw) = target_date {
                config.expected.target_date = parse_cli_date(&raw)?;
            }
            let ledger = load_ledger(&config.data_dir)?;
            print_progress(&ledger, &config.expected, today)?;
        }
        Commands::Export { data, output } => {
            override_data(&mut config, data);
            let ledger = load_ledger(&config.data_dir)?;
            let file =
                std::fs::File::create(&output).context(format!("Failed to create {:?}", output))?;
            write_ledger_csv(&ledger, file)?;
            println!("Ledger saved to {:?}", output);
        }
        Commands::Dashboard { data } => {
            override_data(&mut config, data);
            run_dashboard(&config, today)?;
        }
    }

    Ok(())
}

fn override_data(config: &mut DashboardConfiguration, data: Option<PathBuf>) {
    if let Some(dir) = data {
        config.data_dir = dir;
    }
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| anyhow::anyhow!("Invalid date: {}", raw))
}

fn load_ledger(dir: &Path) -> Result<MergedLedger> {
    let accounts = load_workbook(dir).context(format!("Failed to load workbook from {:?}", dir))?;
    Ok(MergedLedger::merge(&accounts)?)
}

fn print_overview(ledger: &MergedLedger) {
    println!("Dashboard Overview");
    println!("==================\n");

    if let (Some(first), Some(last)) = (ledger.dates.first(), ledger.dates.last()) {
        println!(
            "{} account(s), {} to {}\n",
            ledger.accounts.len(),
            first,
            last
        );
    }
}

fn print_summary(ledger: &MergedLedger, as_of: NaiveDate) -> Result<()> {
    print_overview(ledger);

    let stats = compute_statistics(ledger, as_of)?;
    render_summary(
        &stats,
        &account_saving_rates(ledger),
        &cumulative_savings(ledger, as_of),
        &net_worth_trend(ledger),
    );
    Ok(())
}

fn render_summary(
    stats: &DashboardStats,
    rates: &IndexMap<String, Option<f64>>,
    cumulative: &[SeriesPoint],
    trend: &[SeriesPoint],
) {
    stats.pretty_print_table();

    println!("\nSavings Rate per Account");
    saving_rates_table(rates).printstd();

    if let Some(total) = cumulative.last() {
        println!(
            "\nCumulative savings through {}: €{:.2}",
            total.date, total.value
        );
    }

    if let Some(end) = trend.last() {
        println!(
            "Trend line at {}: €{:.2}",
            end.date.format("%Y-%m"),
            end.value
        );
    }
}

fn print_forecast(ledger: &MergedLedger, settings: &ForecastSettings) -> Result<()> {
    let engine = forecaster_for(&settings.engine)?;
    let result = build_monthly_forecast(
        ledger,
        settings.months_ahead,
        &settings.model,
        engine.as_ref(),
    )?;

    render_forecast(&result, settings);
    Ok(())
}

fn render_forecast(result: &MonthlyForecast, settings: &ForecastSettings) {
    println!("Forecast (next {} months)", settings.months_ahead);
    println!("==========================\n");

    let history: Vec<Option<f64>> = result.history.iter().map(|p| Some(p.y)).collect();
    let projection = project_regressor_series(
        &history,
        settings.months_ahead,
        settings.regressor_project_method,
    );

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Month"),
        Cell::new("Forecast"),
        Cell::new("Lower"),
        Cell::new("Upper"),
        Cell::new("Projection"),
    ]));

    for (point, projected) in result.future_only().iter().zip(&projection) {
        table.add_row(Row::new(vec![
            Cell::new(&point.ds.format("%Y-%m").to_string()),
            Cell::new(&format!("€{:.2}", point.yhat)),
            Cell::new(&format!("€{:.2}", point.yhat_lower)),
            Cell::new(&format!("€{:.2}", point.yhat_upper)),
            Cell::new(&format!("€{:.2}", projected)),
        ]));
    }
    table.printstd();

    if let Some(bias) = result.anchor_bias {
        println!("\nLast month actual vs fitted: €{:.2}", bias);
    }
}

fn print_goal(ledger: &MergedLedger, goal: &SavingsGoal) -> Result<()> {
    render_goal(goal, &goal.plan(ledger)?);
    Ok(())
}

fn render_goal(goal: &SavingsGoal, plan: &GoalPlan) {
    println!("Savings Goal Calculator");
    println!("=======================\n");

    println!("Target: €{:.2} by {}", goal.target_amount, goal.target_date);
    println!("Current Net Worth: €{:.2}\n", plan.current_net_worth);
    plan.to_table().printstd();
}

fn print_progress(ledger: &MergedLedger, expected: &ExpectedPath, today: NaiveDate) -> Result<()> {
    render_progress(expected, &expected.evaluate(ledger, today)?);
    Ok(())
}

fn render_progress(expected: &ExpectedPath, report: &ProgressReport) {
    println!(
        "Actual vs Expected (€{:.0} by {})",
        expected.target_amount, expected.target_date
    );
    println!("==================\n");

    report.to_table().printstd();
}

fn run_dashboard(config: &DashboardConfiguration, today: NaiveDate) -> Result<()> {
    let mut cache = LedgerCache::new();
    let ledger = cache
        .get_or_load(&config.data_dir)
        .context(format!("Failed to load workbook from {:?}", config.data_dir))?;

    let report = build_dashboard(&ledger, config, today)?;

    print_overview(&ledger);
    render_summary(
        &report.stats,
        &report.saving_rates,
        &report.cumulative_savings,
        &report.trend,
    );
    println!();
    render_progress(&config.expected, &report.progress);
    println!();
    render_goal(&report.goal, &report.plan);
    println!();

    match &report.forecast {
        ForecastSection::Ready(forecast) => render_forecast(forecast, &config.forecast),
        ForecastSection::Disabled(reason) => println!("Forecast disabled: {}", reason),
    }

    Ok(())
}
