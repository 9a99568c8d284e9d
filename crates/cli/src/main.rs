use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use shelf_core::{BookId, BookRecord, Catalog};
use shelf_search::{codec, Index, Params, TagIndex};
use shelf_view::{build_shelves, BookDetail, Location, QueryBus, SearchView, ShelfConfig, ViewConfig, PAGE_SIZE};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "shelfctl", version, about = "Shelf catalog CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// JSON catalog to load (bundled demo catalog otherwise)
    #[arg(long = "catalog", env = "SHELF_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Results revealed per page
    #[arg(long = "page-size", env = "SHELF_PAGE_SIZE", global = true, default_value_t = PAGE_SIZE)]
    page_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a search the way the search page would
    Search {
        /// URL query string, e.g. "q=tolstoy&tags=Classics&sortBy=price-asc"
        #[arg(default_value = "")]
        params: String,
        /// Press "load more" this many times
        #[arg(long = "load-more", default_value_t = 0)]
        load_more: usize,
        /// Explain filter stages and counts
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// Show a book by catalog position
    Book {
        id: String,
    },
    /// List genre tags as the filter panel's picker shows them
    Tags {
        /// Picker search box text
        #[arg(long = "filter", default_value = "")]
        filter: String,
        /// Expand past the collapsed list
        #[arg(long = "all", action = ArgAction::SetTrue)]
        all: bool,
    },
    /// Home page carousels
    Shelves,
    /// Print the canonical form of a query string
    Canon {
        params: String,
    },
}

fn init_tracing() {
    let env = std::env::var("SHELF_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn shelf_config() -> ShelfConfig {
    let mut cfg = ShelfConfig::default();
    if let Ok(genre) = std::env::var("SHELF_GENRE_SHELF") {
        if genre.trim().is_empty() { warn!("empty SHELF_GENRE_SHELF; using default"); } else { cfg.genre = genre; }
    }
    if let Ok(author) = std::env::var("SHELF_AUTHOR_SHELF") {
        if author.trim().is_empty() { warn!("empty SHELF_AUTHOR_SHELF; using default"); } else { cfg.author = author; }
    }
    cfg
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog> {
    match path {
        Some(p) => Catalog::from_path(p).with_context(|| format!("loading catalog {}", p.display())),
        None => Catalog::bundled().context("loading bundled catalog"),
    }
}

#[derive(serde::Serialize)]
struct Row<'a> {
    id: BookId,
    name: &'a str,
    author: &'a str,
    price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sale: Option<f64>,
}

impl<'a> Row<'a> {
    fn new(id: BookId, b: &'a BookRecord) -> Self {
        Self { id, name: &b.name, author: &b.author, price: b.price, sale: b.active_discount() }
    }
}

fn print_rows(rows: &[Row<'_>]) {
    println!("{:<4} {:<36} {:<24} PRICE", "ID", "NAME", "AUTHOR");
    for r in rows {
        let price = match r.sale {
            Some(s) => format!("{s} (was {})", r.price),
            None => r.price.to_string(),
        };
        println!("{:<4} {:<36} {:<24} {}", r.id, r.name, r.author, price);
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let catalog = Arc::new(load_catalog(cli.catalog.as_ref())?);
    info!(books = catalog.len(), "catalog loaded");

    match cli.command {
        Commands::Search { params, load_more, explain } => {
            info!(params = %params, load_more, "search invoked");
            let index = Arc::new(Index::build(catalog.clone()));
            let bus = QueryBus::new();
            let location = Params::parse_query_string(&params);
            let mut view = SearchView::mount(index, &bus, location, ViewConfig { page_size: cli.page_size });
            for _ in 0..load_more {
                if !view.load_more() { break; }
            }
            let target = Location::search(codec::canonicalize(view.location())).to_href();
            let rows: Vec<_> = view.displayed().into_iter().map(|(id, b)| Row::new(id, b)).collect();
            match cli.output {
                Output::Human => {
                    match view.empty_state() {
                        Some(shelf_view::EmptyState::AwaitingInput) => println!("Type a query to start searching."),
                        Some(shelf_view::EmptyState::NoResults) => println!("Nothing found."),
                        None => print_rows(&rows),
                    }
                    let w = view.window();
                    println!("showing {} of {}{}", w.items_loaded.min(view.total()), view.total(), if w.has_more { " (more available)" } else { "" });
                    println!("location: {target}");
                }
                Output::Json => {
                    #[derive(serde::Serialize)]
                    struct Out<'a, T> {
                        location: String,
                        total: usize,
                        has_more: bool,
                        books: T,
                        #[serde(skip_serializing_if = "Option::is_none")]
                        debug: Option<&'a shelf_search::SearchDebugInfo>,
                    }
                    let out = Out {
                        location: target,
                        total: view.total(),
                        has_more: view.has_more(),
                        books: rows,
                        debug: explain.then(|| view.debug_info()),
                    };
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            if explain && matches!(cli.output, Output::Human) {
                let dbg = view.debug_info();
                eprintln!("debug: total={} after_text={} after_tags={} after_price={} after_pages={} after_discount={}", dbg.total, dbg.after_text, dbg.after_tags, dbg.after_price, dbg.after_pages, dbg.after_discount);
            }
        }
        Commands::Book { id } => {
            info!(id = %id, "book invoked");
            match (BookDetail::lookup(&catalog, &id), cli.output) {
                (BookDetail::Found { id, book }, Output::Human) => {
                    println!("#{id} {}", book.name);
                    println!("by {}", book.author);
                    match book.active_discount() {
                        Some(s) => println!("price: {s} (was {})", book.price),
                        None => println!("price: {}", book.price),
                    }
                    if let Some(p) = book.pages { println!("pages: {p}"); }
                    if !book.tags.is_empty() { println!("tags: {}", book.tags.join(", ")); }
                    if let Some(d) = &book.description { println!("\n{d}"); }
                }
                (BookDetail::Found { book, .. }, Output::Json) => println!("{}", serde_json::to_string_pretty(book)?),
                (BookDetail::NotFound, Output::Human) => println!("Book not found."),
                (BookDetail::NotFound, Output::Json) => println!("null"),
            }
        }
        Commands::Tags { filter, all } => {
            let tags = TagIndex::build(&catalog);
            let shown = tags.visible(&filter, all);
            match cli.output {
                Output::Human => {
                    for t in &shown {
                        println!("{:<24} {}", t, tags.count(t));
                    }
                    if !all && tags.has_overflow(&filter) {
                        println!("… {} more (use --all)", tags.suggest(&filter).len() - shown.len());
                    }
                }
                Output::Json => {
                    #[derive(serde::Serialize)]
                    struct Tag<'a> { tag: &'a str, count: usize }
                    let rows: Vec<_> = shown.iter().map(|t| Tag { tag: t, count: tags.count(t) }).collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }
        Commands::Shelves => {
            let shelves = build_shelves(&catalog, &shelf_config());
            match cli.output {
                Output::Human => {
                    for s in &shelves {
                        println!("== {} ({})", s.title, s.books.len());
                        for id in &s.books {
                            if let Some(b) = catalog.get(*id) {
                                println!("  {:<4} {} / {}", id, b.name, b.author);
                            }
                        }
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&shelves)?),
            }
        }
        Commands::Canon { params } => {
            let canon = codec::canonicalize(&Params::parse_query_string(&params));
            match cli.output {
                Output::Human => println!("{}", canon.to_query_string()),
                Output::Json => println!("{}", serde_json::to_string_pretty(&canon)?),
            }
        }
    }

    Ok(())
}
