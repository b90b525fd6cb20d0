use clap::{Parser, Subcommand};
use nutrilog_core::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

/// Stands for the most recently registered user in a replay session
const LAST_USER_ALIAS: &str = "@last";

#[derive(Parser)]
#[command(name = "nutrilog")]
#[command(about = "Daily nutrient intake tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay JSON-lines requests against an in-memory tracker
    ///
    /// Each line is an object with an "op" field: register, log_meal, meals,
    /// status, webhook or health. Use "@last" as a user id to refer to the
    /// most recently registered user.
    Replay {
        /// Read requests from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Compute Basal Metabolic Rate (Harris-Benedict)
    Bmr {
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Height in centimeters
        #[arg(long)]
        height: f64,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// male or female
        #[arg(long)]
        gender: String,
    },

    /// Parse a webhook message like "log lunch: rice, dal"
    Parse { message: String },

    /// List the food catalogue
    Foods,
}

/// One replayed request
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Register(RegisterRequest),
    LogMeal(MealLogRequest),
    Meals {
        user: String,
        #[serde(default)]
        date: Option<String>,
    },
    Status {
        user: String,
        #[serde(default)]
        date: Option<String>,
    },
    Webhook(WebhookMessage),
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    nutrilog_core::logging::init_with_level(&config.logging.level);

    match cli.command {
        Commands::Replay { file } => cmd_replay(&config, file),
        Commands::Bmr {
            weight,
            height,
            age,
            gender,
        } => cmd_bmr(weight, height, age, &gender),
        Commands::Parse { message } => cmd_parse(&message),
        Commands::Foods => cmd_foods(&config),
    }
}

fn cmd_replay(config: &Config, file: Option<PathBuf>) -> Result<()> {
    let tracker = NutritionTracker::new(config)?;

    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut last_user: Option<String> = None;
    let mut handled = 0usize;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let body = match serde_json::from_str::<Request>(line) {
            Ok(request) => match dispatch(&tracker, request, &mut last_user) {
                Ok(body) => body,
                Err(e) => error_body(e.status_code(), &e.to_string()),
            },
            Err(e) => {
                tracing::warn!("Line {}: malformed request: {}", line_num + 1, e);
                error_body(400, &format!("Malformed request: {}", e))
            }
        };

        writeln!(out, "{}", body)?;
        handled += 1;
    }

    out.flush()?;
    tracing::info!("Replayed {} requests", handled);
    Ok(())
}

fn dispatch(
    tracker: &NutritionTracker,
    request: Request,
    last_user: &mut Option<String>,
) -> Result<Value> {
    let body = match request {
        Request::Register(request) => {
            let registered = tracker.register(request)?;
            *last_user = Some(registered.user_id.clone());
            serde_json::to_value(registered)?
        }
        Request::LogMeal(mut request) => {
            request.user = resolve_user(request.user, last_user);
            serde_json::to_value(tracker.log_meal(request)?)?
        }
        Request::Meals { user, date } => {
            let user = resolve_user(user, last_user);
            serde_json::to_value(tracker.meals(&user, date.as_deref())?)?
        }
        Request::Status { user, date } => {
            let user = resolve_user(user, last_user);
            serde_json::to_value(tracker.status(&user, date.as_deref())?)?
        }
        Request::Webhook(message) => serde_json::to_value(tracker.webhook(message)?)?,
        Request::Health => serde_json::to_value(tracker.health())?,
    };
    Ok(body)
}

fn resolve_user(user: String, last_user: &Option<String>) -> String {
    match last_user {
        Some(last) if user == LAST_USER_ALIAS => last.clone(),
        _ => user,
    }
}

fn error_body(code: u16, detail: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "detail": detail,
    })
}

fn cmd_bmr(weight: f64, height: f64, age: u32, gender: &str) -> Result<()> {
    let bmr = compute_bmr(weight, height, age, gender)?;
    println!("BMR: {:.2} kcal/day", bmr);
    Ok(())
}

fn cmd_parse(message: &str) -> Result<()> {
    match parse(message) {
        Ok(command) => {
            println!("{}", serde_json::to_string_pretty(&command)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", error::INVALID_MESSAGE_FORMAT);
            eprintln!("  ({})", e);
            std::process::exit(2);
        }
    }
}

fn cmd_foods(config: &Config) -> Result<()> {
    let tracker = NutritionTracker::new(config)?;

    println!(
        "{:<12} {:<11} {:>8} {:>8} {:>8} {:>8}",
        "FOOD", "CATEGORY", "KCAL", "PROTEIN", "CARBS", "FIBER"
    );
    for food in tracker.foods() {
        let category = serde_json::to_value(food.category)?;
        println!(
            "{:<12} {:<11} {:>8} {:>8} {:>8} {:>8}",
            food.name,
            category.as_str().unwrap_or_default(),
            food.nutrients.calories.to_string(),
            food.nutrients.protein.to_string(),
            food.nutrients.carbs.to_string(),
            food.nutrients.fiber.to_string(),
        );
    }

    Ok(())
}
