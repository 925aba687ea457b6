use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use grc_lemma_lib::output::{line_to_summary, to_summary};
use grc_lemma_lib::{
    resolve_line, DictionaryStore, LemmaResolver, LemmaStore,
    MemoryDictionary, MemoryLemmaStore, ResolverConfig, RuleTable,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

type DynLemmaStore = Box<dyn LemmaStore + Send + Sync>;
type DynDictionary = Box<dyn DictionaryStore + Send + Sync>;
type Resolver = LemmaResolver<DynLemmaStore, DynDictionary>;

#[derive(Parser)]
#[command(name = "grc-lemma", about = "Greek lemmatizer and dictionary resolver")]
struct Cli {
    /// Word or line to resolve. If omitted, reads lines from stdin.
    input: Option<String>,

    /// Language of the input ("greek" or "latin").
    #[arg(long, default_value = "greek")]
    language: String,

    /// JSON array of lemma_map rows.
    #[arg(long, value_name = "FILE")]
    lemmas: Option<PathBuf>,

    /// JSON array of dictionary_entries rows.
    #[arg(long, value_name = "FILE")]
    dict: Option<PathBuf>,

    /// SQLite database with lemma_map and dictionary_entries tables.
    #[cfg(feature = "sqlite")]
    #[arg(long, value_name = "FILE", conflicts_with_all = ["lemmas", "dict"])]
    db: Option<PathBuf>,

    /// Replacement rule table (JSON).
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Resolver configuration (JSON).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print generated lemma candidates instead of resolving.
    #[arg(long)]
    candidates: bool,

    /// Print dictionary entries whose headword starts with PREFIX.
    #[arg(long, value_name = "PREFIX")]
    search: Option<String>,

    /// Book id recorded on word forms of resolved lines.
    #[arg(long, default_value = "input")]
    book: String,

    /// Print one-line summaries instead of JSON.
    #[arg(long)]
    summary: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Keep at most N entries per word.
    #[arg(short = 'n', long = "top")]
    top: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grc_lemma=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let resolver = build_resolver(&cli)?;

    if let Some(prefix) = &cli.search {
        let entries = resolver.search(prefix, &cli.language)?;
        if cli.summary {
            for e in &entries {
                println!("{}\t{}", e.headword, grc_lemma_lib::output::first_line(e));
            }
        } else {
            print_json(&entries, cli.pretty)?;
        }
        return Ok(());
    }

    match &cli.input {
        Some(text) => process_line(text, 1, &resolver, &cli)?,
        None => {
            let stdin = io::stdin();
            for (i, line) in stdin.lock().lines().enumerate() {
                let line = line.context("failed to read stdin")?;
                if !line.trim().is_empty() {
                    process_line(&line, i as u32 + 1, &resolver, &cli)?;
                }
            }
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ResolverConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ResolverConfig::default(),
    };
    if let Some(top) = cli.top {
        config.candidate_hits = config.candidate_hits.max(top);
    }
    Ok(config)
}

fn build_resolver(cli: &Cli) -> Result<Resolver> {
    let config = load_config(cli)?;
    let (lemmas, dictionary) = open_stores(cli)?;

    let mut resolver = LemmaResolver::with_config(lemmas, dictionary, config);
    if let Some(path) = &cli.rules {
        let table = RuleTable::from_json_file(path)
            .with_context(|| format!("failed to load rules {}", path.display()))?;
        info!(rules = table.len(), path = %path.display(), "loaded rule table");
        resolver = resolver.with_rules(table);
    }
    Ok(resolver)
}

fn open_stores(cli: &Cli) -> Result<(DynLemmaStore, DynDictionary)> {
    #[cfg(feature = "sqlite")]
    {
        if let Some(path) = &cli.db {
            use std::sync::Arc;

            let store = grc_lemma_lib::SqliteStore::open(path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            info!(path = %path.display(), "opened sqlite store");
            let store = Arc::new(store);
            let lemmas: DynLemmaStore = Box::new(Arc::clone(&store));
            let dictionary: DynDictionary = Box::new(store);
            return Ok((lemmas, dictionary));
        }
    }

    let lemmas = match &cli.lemmas {
        Some(path) => MemoryLemmaStore::from_json_file(path)
            .with_context(|| format!("failed to load lemma map {}", path.display()))?,
        None => MemoryLemmaStore::new(),
    };
    let dictionary = match &cli.dict {
        Some(path) => MemoryDictionary::from_json_file(path)
            .with_context(|| format!("failed to load dictionary {}", path.display()))?,
        None => MemoryDictionary::new(),
    };
    info!(
        word_forms = lemmas.len(),
        entries = dictionary.entry_count(&cli.language),
        "loaded json stores"
    );
    let lemmas: DynLemmaStore = Box::new(lemmas);
    let dictionary: DynDictionary = Box::new(dictionary);
    Ok((lemmas, dictionary))
}

fn process_line(line: &str, line_number: u32, resolver: &Resolver, cli: &Cli) -> Result<()> {
    let line = line.trim();

    if cli.candidates {
        for word in line.split_whitespace() {
            let candidates = resolver.candidates(word, &cli.language);
            if cli.summary {
                let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
                println!("{word}: {}", texts.join(" "));
            } else {
                print_json(&candidates, cli.pretty)?;
            }
        }
        return Ok(());
    }

    // A line with whitespace is a text line; anything else a single word.
    if line.contains(char::is_whitespace) {
        let mut resolved = resolve_line(resolver, &cli.book, line_number, line, &cli.language)?;
        for w in &mut resolved.words {
            truncate(&mut w.result.entries, cli.top);
        }
        if cli.summary {
            println!("{}", line_to_summary(&resolved));
        } else {
            print_json(&resolved, cli.pretty)?;
        }
    } else {
        let mut result = resolver.resolve(line, &cli.language)?;
        truncate(&mut result.entries, cli.top);
        if cli.summary {
            println!("{}", to_summary(&result));
        } else {
            print_json(&result, cli.pretty)?;
        }
    }
    Ok(())
}

fn truncate<T>(entries: &mut Vec<T>, top: Option<usize>) {
    if let Some(n) = top {
        entries.truncate(n);
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", json.context("JSON serialization failed")?);
    Ok(())
}
