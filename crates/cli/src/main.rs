use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use gebeta_core::{format_clock, next_recipe_id, Category, Countdown, Difficulty, Language, Recipe, RecipeDraft};
use gebeta_persist::{KvStore, SqliteStore};
use gebeta_search::Filter;
use gebeta_store::Session;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "gebetactl", version, about = "Gebeta recipe catalog CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// SQLite database path (default: GEBETA_DB_PATH or ~/.gebeta/gebeta.db)
    #[arg(long = "db", global = true, env = "GEBETA_DB_PATH")]
    db: Option<String>,

    /// Replace the bundled built-in recipes with a JSON seed file
    #[arg(long = "seed", global = true, env = "GEBETA_SEED_PATH")]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the whole catalog (built-in first, then your recipes)
    Ls,
    /// Show one recipe with ingredients and steps
    Show { id: String },
    /// Case-insensitive search over titles, description, category and region
    Search { query: String },
    /// Exact filter; omitted criteria are ignored
    Filter {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    /// List regions present in the catalog
    Regions,
    /// Add a recipe from a draft JSON file
    Add {
        #[arg(long = "file")]
        file: PathBuf,
    },
    /// Replace one of your recipes with a draft JSON file
    Update {
        id: String,
        #[arg(long = "file")]
        file: PathBuf,
    },
    /// Delete one of your recipes
    Rm { id: String },
    /// Toggle a favorite
    Fav { id: String },
    /// List favorite recipes
    Favs,
    /// Show theme, language and onboarding state
    Prefs,
    /// Show or toggle the theme
    Theme {
        #[arg(long = "toggle", action = ArgAction::SetTrue)]
        toggle: bool,
    },
    /// Show or toggle the language
    Lang {
        #[arg(long = "toggle", action = ArgAction::SetTrue)]
        toggle: bool,
    },
    /// Show or complete onboarding
    Onboarding {
        #[arg(long = "complete", action = ArgAction::SetTrue)]
        complete: bool,
    },
    /// Erase favorites, your recipes and preferences
    Reset {
        #[arg(long = "yes", action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Run a step countdown in the terminal
    Timer { secs: u32 },
}

fn init_tracing() {
    let env = std::env::var("GEBETA_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("GEBETA_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid GEBETA_METRICS_ADDR; expected host:port");
        }
    }
}

async fn open_session(cli: &Cli) -> Result<Session> {
    let store = match cli.db.as_deref() {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_default()?,
    };
    let builtin = match cli.seed.as_deref() {
        Some(path) => gebeta_store::load_seed(path)?,
        None => gebeta_store::builtin_recipes()?,
    };
    Ok(Session::open(Arc::new(store) as Arc<dyn KvStore>, builtin).await)
}

fn read_draft(path: &std::path::Path) -> Result<RecipeDraft> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading draft {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing draft {}", path.display()))
}

fn print_rows(recipes: &[Recipe], lang: Language, out: Output) -> Result<()> {
    match out {
        Output::Human => {
            println!("{:<14} {:<28} {:<11} {:<7} {:>5}  REGION", "ID", "TITLE", "CATEGORY", "LEVEL", "MIN");
            for r in recipes {
                println!(
                    "{:<14} {:<28} {:<11} {:<7} {:>5}  {}",
                    r.id,
                    r.localized_title(lang),
                    r.category,
                    r.difficulty,
                    r.cook_time,
                    r.region
                );
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(recipes)?),
    }
    Ok(())
}

fn print_recipe(r: &Recipe, custom: bool, favorite: bool, lang: Language) {
    let star = if favorite { " ★" } else { "" };
    println!("{}{}", r.localized_title(lang), star);
    println!("{}", r.localized_description(lang));
    println!(
        "{} {} • {} {} • {} • {} • {}",
        r.cook_time,
        lang.t("min", Some("ደቂቃ")),
        r.servings,
        lang.t("servings", Some("ሰዎች")),
        r.difficulty,
        r.category,
        r.region
    );
    if custom {
        println!("({})", lang.t("your recipe", Some("የእርስዎ የምግብ አሰራር")));
    }
    println!();
    println!("{}:", lang.t("Ingredients", Some("ንጥረ ነገሮች")));
    for i in &r.ingredients {
        println!("  - {} {} {}", i.amount, i.unit, i.localized_name(lang));
    }
    println!();
    println!("{}:", lang.t("Steps", Some("የአሰራር ደረጃዎች")));
    for s in &r.steps {
        match s.timer_secs() {
            Some(t) => println!("  {}. {} [{}]", s.step_number, s.localized_instruction(lang), format_clock(t)),
            None => println!("  {}. {}", s.step_number, s.localized_instruction(lang)),
        }
    }
    if let Some(tips) = r.localized_tips(lang) {
        println!();
        println!("{}: {}", lang.t("Tips", Some("ምክሮች")), tips);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    if let Commands::Timer { secs } = cli.command {
        return run_timer(secs).await;
    }

    let session = open_session(&cli).await?;
    let catalog = session.catalog();
    let prefs = session.prefs();
    let lang = prefs.language();

    match &cli.command {
        Commands::Ls => print_rows(&catalog.recipes(), lang, cli.output)?,
        Commands::Show { id } => match catalog.get_by_id(id) {
            Some(r) => match cli.output {
                Output::Human => print_recipe(&r, catalog.is_custom(id), catalog.is_favorite(id), lang),
                Output::Json => println!("{}", serde_json::to_string_pretty(&r)?),
            },
            None => {
                info!(id = %id, "show: not found");
                eprintln!("{}", lang.t("Recipe not found", Some("የምግብ አሰራሩ አልተገኘም")));
            }
        },
        Commands::Search { query } => {
            info!(query = %query, "search invoked");
            print_rows(&catalog.search(query), lang, cli.output)?;
        }
        Commands::Filter { category, difficulty, region } => {
            let mut f = Filter::new();
            if let Some(c) = category { f = f.category(c.parse::<Category>()?); }
            if let Some(d) = difficulty { f = f.difficulty(d.parse::<Difficulty>()?); }
            if let Some(r) = region { f = f.region(r.clone()); }
            info!(filter = ?f, "filter invoked");
            print_rows(&catalog.filter(&f), lang, cli.output)?;
        }
        Commands::Regions => {
            let snap = catalog.snapshot();
            let regions = gebeta_search::distinct_regions(snap.recipes());
            match cli.output {
                Output::Human => regions.iter().for_each(|r| println!("{}", r)),
                Output::Json => println!("{}", serde_json::to_string_pretty(&regions)?),
            }
        }
        Commands::Add { file } => {
            let draft = read_draft(file)?;
            if let Err(issue) = draft.validate() {
                eprintln!("{}", issue.message(lang));
                return Err(issue.into());
            }
            let recipe = draft.build(next_recipe_id())?;
            let id = recipe.id.clone();
            catalog.add_recipe(recipe).await.map_err(|e| report(e, lang))?;
            println!("{}", id);
        }
        Commands::Update { id, file } => {
            let draft = read_draft(file)?;
            if let Err(issue) = draft.validate() {
                eprintln!("{}", issue.message(lang));
                return Err(issue.into());
            }
            let recipe = draft.build(id.clone())?;
            catalog.update_recipe(recipe).await.map_err(|e| report(e, lang))?;
            println!("{}", id);
        }
        Commands::Rm { id } => {
            catalog.delete_recipe(id).await.map_err(|e| report(e, lang))?;
            println!("{}", lang.t("Recipe deleted", Some("የምግብ አሰራሩ ተሰርዟል")));
        }
        Commands::Fav { id } => {
            let now = catalog.toggle_favorite(id).await.map_err(|e| report(e, lang))?;
            match cli.output {
                Output::Human => println!("{} {}", id, if now { "★" } else { "☆" }),
                Output::Json => println!("{}", serde_json::json!({ "id": id, "favorite": now })),
            }
        }
        Commands::Favs => print_rows(&catalog.favorite_recipes(), lang, cli.output)?,
        Commands::Prefs => match cli.output {
            Output::Human => {
                let st = prefs.current();
                println!("theme: {}", st.theme.as_str());
                println!("language: {}", st.language.as_str());
                println!("onboarding completed: {}", st.onboarding_completed);
            }
            Output::Json => {
                #[derive(serde::Serialize)]
                struct Row { prefs: gebeta_store::PrefState, palette: gebeta_core::Palette }
                println!("{}", serde_json::to_string_pretty(&Row { prefs: prefs.current(), palette: prefs.palette() })?);
            }
        },
        Commands::Theme { toggle } => {
            let theme = if *toggle { prefs.toggle_theme().await.map_err(|e| report(e, lang))? } else { prefs.theme() };
            println!("{}", theme.as_str());
        }
        Commands::Lang { toggle } => {
            let next = if *toggle { prefs.toggle_language().await.map_err(|e| report(e, lang))? } else { lang };
            println!("{}", next.as_str());
        }
        Commands::Onboarding { complete } => {
            if *complete {
                prefs.complete_onboarding().await.map_err(|e| report(e, lang))?;
            }
            println!("{}", prefs.has_completed_onboarding());
        }
        Commands::Reset { yes } => {
            if !*yes {
                eprintln!("{}", lang.t(
                    "This deletes favorites, your recipes and settings. Re-run with --yes.",
                    Some("ይህ ተወዳጆችን፣ የእርስዎን የምግብ አሰራሮች እና ቅንብሮችን ይሰርዛል። በ --yes ደግመው ያስኪዱ።"),
                ));
                return Ok(());
            }
            session.clear_all_data().await.map_err(|e| report(e, lang))?;
            println!("{}", lang.t("All data has been cleared successfully.", Some("ሁሉም መረጃ በተሳካ ሁኔታ ተሰርዟል።")));
        }
        Commands::Timer { .. } => unreachable!("handled before opening the session"),
    }

    Ok(())
}

/// Log the failure and print an actionable message before propagating it.
fn report(e: gebeta_core::CatalogError, lang: Language) -> anyhow::Error {
    error!(error = %e, "mutation failed");
    let hint = if e.is_retryable() {
        lang.t("Something went wrong saving your change. Please try again.", Some("ለውጡን ማስቀመጥ አልተቻለም። እባክዎ እንደገና ይሞክሩ።"))
    } else if matches!(e, gebeta_core::CatalogError::NotEditable(_)) {
        lang.t("Only your own recipes can be edited or deleted.", Some("ሊስተካከሉ ወይም ሊሰረዙ የሚችሉት የእርስዎ የምግብ አሰራሮች ብቻ ናቸው።"))
    } else {
        ""
    };
    if !hint.is_empty() {
        eprintln!("{}", hint);
    }
    e.into()
}

async fn run_timer(secs: u32) -> Result<()> {
    let mut c = Countdown::new(secs);
    c.start();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;
    println!("{}", c.display());
    while c.is_running() {
        tokio::select! {
            _ = ticker.tick() => {
                let done = c.tick();
                println!("{}  {:>3.0}%", c.display(), c.progress() * 100.0);
                if done {
                    println!("done");
                }
            }
            _ = signal::ctrl_c() => {
                c.pause();
                info!(remaining = c.remaining(), "timer interrupted");
                break;
            }
        }
    }
    Ok(())
}
