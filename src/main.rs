use std::process::ExitCode;

use clap::{
    ArgAction,
    Parser,
    Subcommand,
};
use flashdeck::{
    catalog::source::DocumentSource,
    config::{
        Settings,
        SettingsOverrides,
    },
    coverage::{
        compute_coverage,
        ClassificationRules,
    },
    images::ImageProvider,
    render,
    session::{
        make_rng,
        JsonPositionStore,
        Session,
        Step,
    },
    Catalog,
    FlashdeckError,
};
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Parser)]
#[command(name = "flashdeck")]
#[command(about = "Revise flashcard decks one card at a time")]
struct Cli {
    /// Directory containing `data/decks` or `data/cards`
    #[arg(long, global = true)]
    root: Option<String>,
    /// Base URL serving the same layout
    #[arg(long, global = true)]
    url: Option<String>,
    /// Match-mode heuristic for reference documents without `matchMode`
    #[arg(long, global = true, value_parser = parse_rules)]
    rules: Option<ClassificationRules>,
    /// Seed for random navigation and image picks
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the decks in the catalog
    List,
    /// Show the current card of a deck
    Show {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Advance to the next card
    Next {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Jump to a random card
    Random {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Report reference coverage of a deck
    Coverage {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Print the normalized deck as JSON
    Export {
        #[arg(long)]
        deck: Option<String>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Print the current card as an HTML fragment
    Html {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Print the effective settings
    Config {
        /// Also write them to the settings file
        #[arg(long, default_value_t = false)]
        save: bool,
    },
}

fn parse_rules(value: &str) -> Result<ClassificationRules, String> {
    ClassificationRules::parse(value)
        .ok_or_else(|| format!("unknown rules {:?} (expected prefix-only or extended)", value))
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

/// `RUST_LOG` takes precedence over `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose, quiet)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            root: self.root.clone(),
            url: self.url.clone(),
            rules: self.rules,
            seed: self.seed,
        }
    }
}

fn run(cli: Cli) -> Result<(), FlashdeckError> {
    let mut settings = Settings::load();
    settings.apply(&cli.overrides());

    if let Command::Config { save } = cli.command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        if save {
            settings.save()?;
        }
        return Ok(());
    }

    let catalog = Catalog::open(settings.document_source()?, settings.classification)?;

    match cli.command {
        Command::List => {
            if catalog.is_legacy() {
                println!("(legacy catalog)");
            }
            for meta in catalog.entries() {
                let reference = if meta.reference.is_some() { " [ref]" } else { "" };
                println!("{}\t{}{}", meta.id, meta.display_title(), reference);
            }
        }
        Command::Show { deck } => show(&catalog, &settings, deck.as_deref(), Step::Stay)?,
        Command::Next { deck } => show(&catalog, &settings, deck.as_deref(), Step::Next)?,
        Command::Random { deck } => show(&catalog, &settings, deck.as_deref(), Step::Random)?,
        Command::Coverage { deck } => {
            let loaded = catalog.load_deck(deck.as_deref())?;
            let coverage = compute_coverage(&loaded.deck, loaded.reference.as_ref());
            println!("{} ({} cartes)", loaded.deck.title, loaded.deck.len());
            if let Some(label) = loaded.reference.as_ref().and_then(|r| r.label.as_deref()) {
                println!("Référentiel: {}", label);
            }
            println!("{}", render::coverage_text(&coverage));
        }
        Command::Export { deck, pretty } => {
            let loaded = catalog.load_deck(deck.as_deref())?;
            let json = if pretty {
                serde_json::to_string_pretty(&loaded.deck)?
            } else {
                serde_json::to_string(&loaded.deck)?
            };
            println!("{}", json);
        }
        Command::Html { deck } => {
            let loaded = catalog.load_deck(deck.as_deref())?;
            let session = Session::from_loaded(
                loaded,
                JsonPositionStore::open_default(),
                make_rng(settings.seed),
            );
            match (session.current(), session.position_text()) {
                (Some(card), Some(position)) => {
                    println!("{}", render::card_html(session.deck(), card, &position, None))
                }
                _ => println!("{}", render::empty_deck_html()),
            }
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

fn show<S: DocumentSource>(
    catalog: &Catalog<S>,
    settings: &Settings,
    deck_id: Option<&str>,
    step: Step,
) -> Result<(), FlashdeckError> {
    let loaded = catalog.load_deck(deck_id)?;
    let mut session =
        Session::from_loaded(loaded, JsonPositionStore::open_default(), make_rng(settings.seed));

    session.step(step);

    let (card, position) = match (session.current(), session.position_text()) {
        (Some(card), Some(position)) => (card, position),
        _ => {
            println!("{}", render::empty_deck_text(session.deck()));
            return Ok(());
        }
    };

    let mut images = ImageProvider::load(
        catalog.source(),
        &settings.image_manifest,
        &settings.default_image,
        make_rng(settings.seed.map(|seed| seed.wrapping_add(1))),
    )?;
    let image = images.illustration(card);

    let referenced = session.coverage().has_ref.then(|| session.current_is_referenced());
    println!("{}", render::card_text(session.deck(), card, &position, image.as_ref(), referenced));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Erreur: {}", e);
            ExitCode::FAILURE
        }
    }
}
