//! Blitz UI CLI
//!
//! Entry point for the `blitz-ui` command-line tool.

use blitz_ui::config::{EffectiveConfig, OutputFormat, Settings};
use blitz_ui::schema::{parse_pair, Selection, VariantSchema};
use blitz_ui::theme::{default_state_file, ThemeMode, ThemeStore};
use blitz_ui::{logging, Error, StyleEngine};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "blitz-ui")]
#[command(about = "Component variant resolution and class merging", version)]
struct Cli {
    /// Project config file (default: ./blitz-ui.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Conflict table file (overrides config)
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// Directory of component files (overrides config)
    #[arg(long, global = true)]
    components: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a component selection into a class string
    Resolve {
        /// Component name (e.g. button)
        component: String,

        /// Variant selection as group=option (repeatable)
        #[arg(long = "select", short = 's', value_parser = parse_pair)]
        select: Vec<(String, String)>,

        /// Extra classes appended last
        #[arg(long = "class", short = 'c', default_value = "")]
        class: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Merge class strings, later ones winning conflicts
    Merge {
        /// Class strings in precedence order (lowest first)
        #[arg(required = true)]
        classes: Vec<String>,
    },

    /// Explain which tokens a resolution kept and dropped
    Explain {
        /// Component name
        component: String,

        /// Variant selection as group=option (repeatable)
        #[arg(long = "select", short = 's', value_parser = parse_pair)]
        select: Vec<(String, String)>,

        /// Extra classes appended last
        #[arg(long = "class", short = 'c', default_value = "")]
        class: String,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// List components with their variant groups
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate the conflict table, component files and configuration
    Verify,

    /// Show or change the persisted theme
    Theme {
        #[command(subcommand)]
        action: ThemeCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Print the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme explicitly
    Set {
        /// light or dark
        mode: ThemeMode,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = load_config(&cli).and_then(|config| run(cli.command, config));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands, config: EffectiveConfig) -> Result<(), Error> {
    let settings = config.settings()?;

    match command {
        Commands::Resolve {
            component,
            select,
            class,
            json,
        } => run_resolve(&settings, &component, select, &class, json),
        Commands::Merge { classes } => run_merge(&settings, &classes),
        Commands::Explain {
            component,
            select,
            class,
            human,
        } => run_explain(&settings, &component, select, &class, human),
        Commands::List { json } => run_list(&settings, json),
        Commands::Verify => run_verify(&config, &settings),
        Commands::Theme { action } => run_theme(&settings, action),
    }
}

/// Merge config layers; `--table` and `--components` form the CLI layer.
fn load_config(cli: &Cli) -> Result<EffectiveConfig, Error> {
    let mut overrides = serde_json::Map::new();
    if let Some(table) = &cli.table {
        overrides.insert("conflict_table".to_string(), table.display().to_string().into());
    }
    if let Some(components) = &cli.components {
        overrides.insert(
            "components_dir".to_string(),
            components.display().to_string().into(),
        );
    }
    let overrides = (!overrides.is_empty()).then(|| serde_json::Value::Object(overrides));

    Ok(EffectiveConfig::discover(cli.config.as_deref(), overrides)?)
}

fn run_resolve(
    settings: &Settings,
    component: &str,
    select: Vec<(String, String)>,
    class: &str,
    json: bool,
) -> Result<(), Error> {
    let engine = StyleEngine::from_settings(settings)?;
    let selection: Selection = select.into_iter().collect();
    let classes = engine.resolve(component, &selection, class)?;

    if json || settings.output_format == OutputFormat::Json {
        let output = serde_json::json!({
            "component": component,
            "selection": selection,
            "classes": classes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", classes);
    }
    Ok(())
}

fn run_merge(settings: &Settings, classes: &[String]) -> Result<(), Error> {
    let engine = StyleEngine::from_settings(settings)?;
    println!("{}", engine.merge_classes(classes));
    Ok(())
}

fn run_explain(
    settings: &Settings,
    component: &str,
    select: Vec<(String, String)>,
    class: &str,
    human: bool,
) -> Result<(), Error> {
    let engine = StyleEngine::from_settings(settings)?;
    let selection: Selection = select.into_iter().collect();
    let explanation = engine.explain(component, &selection, class)?;

    if human {
        println!("{}", explanation.to_human());
    } else {
        println!("{}", explanation.to_json()?);
    }
    Ok(())
}

fn run_list(settings: &Settings, json: bool) -> Result<(), Error> {
    let engine = StyleEngine::from_settings(settings)?;
    let registry = engine.registry();

    if json || settings.output_format == OutputFormat::Json {
        let schemas: Vec<&VariantSchema> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    for schema in registry.iter() {
        match schema.description() {
            Some(description) => println!("{:<20} {}", schema.name(), description),
            None => println!("{}", schema.name()),
        }
        for group in schema.groups() {
            let default = schema.default_option(&group.name);
            let options: Vec<String> = group
                .option_names()
                .into_iter()
                .map(|option| {
                    if Some(option) == default {
                        format!("{}*", option)
                    } else {
                        option.to_string()
                    }
                })
                .collect();
            println!("  {}: {}", group.name, options.join(", "));
        }
        if !schema.compounds().is_empty() {
            println!("  compounds: {}", schema.compounds().len());
        }
    }
    Ok(())
}

fn run_verify(config: &EffectiveConfig, settings: &Settings) -> Result<(), Error> {
    let engine = StyleEngine::from_settings(settings)?;
    let table = engine.table();

    println!("Configuration valid");
    for source in &config.sources {
        match &source.path {
            Some(path) => println!("  Source: {:?} {}", source.origin, path),
            None => println!("  Source: {:?}", source.origin),
        }
    }
    println!();

    println!("Conflict table: {}", table.version());
    println!("  Digest: {}", table.digest());
    println!("  Groups: {}", table.group_ids().len());
    println!(
        "  Literal tokens: {}, patterns: {}",
        table.literal_count(),
        table.rule_count()
    );
    println!();

    let registry = engine.registry();
    println!("Components: {}", registry.len());
    if let Some(dir) = &settings.components_dir {
        println!("  Directory: {}", dir.display());
    }
    println!("  {}", registry.names().join(", "));
    Ok(())
}

fn run_theme(settings: &Settings, action: ThemeCommands) -> Result<(), Error> {
    let path = settings.theme_state_file.clone().or_else(default_state_file);
    let store = match path {
        Some(path) => ThemeStore::load(path, settings.theme_default),
        None => {
            tracing::warn!("HOME is not set, theme changes will not be persisted");
            ThemeStore::in_memory(settings.theme_default)
        }
    };

    let mode = match action {
        ThemeCommands::Show => store.current(),
        ThemeCommands::Toggle => store.toggle()?,
        ThemeCommands::Set { mode } => store.set(mode)?,
    };
    println!("{}", mode.class_token());
    Ok(())
}
