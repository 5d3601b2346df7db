use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use wikidb_cli::{init_tracing, load_title_index, open_corpus, print_json, report};
use wikidb_core::config::{AppConfig, Config, SearchConfig};
use wikidb_corpus::{ArrowCorpus, TitleIndex};
use wikidb_embed::get_default_embedder;
use wikidb_retrieval::{lookup_by_title, Retriever};
use wikidb_vector::LanceEmbeddingSearch;

#[derive(Parser)]
#[command(name = "wikidb", version, about = "Title lookup and semantic search over a static article corpus")]
struct Cli {
    /// Log at info level (same as `verbose = true` in config.toml)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full article by exact title
    Article { title: String },
    /// Similarity-ordered hits with bodies cut to the summary length
    Summaries(SearchArgs),
    /// Similarity-ordered hits with full bodies
    Articles(SearchArgs),
    /// The hit with the highest lexical overlap with the prompt
    Top(SearchArgs),
    /// Hits re-ranked by lexical overlap; a negative count lists them weakest first
    TopN {
        #[command(flatten)]
        search: SearchArgs,
        /// How many articles to keep
        #[arg(short = 'n', long = "count", allow_negative_numbers = true)]
        n: isize,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Search prompt
    prompt: String,
    /// Relevance threshold in [0, 1] (default: search.default_percentile)
    #[arg(short, long)]
    percentile: Option<f32>,
    /// Number of search hits to consider (default: search.default_limit)
    #[arg(short = 'k', long = "num-results")]
    limit: Option<usize>,
}

impl SearchArgs {
    fn percentile(&self, defaults: &SearchConfig) -> f32 {
        self.percentile.unwrap_or(defaults.default_percentile)
    }

    fn limit(&self, defaults: &SearchConfig) -> usize {
        self.limit.unwrap_or(defaults.default_limit)
    }
}

type WikiRetriever = Retriever<ArrowCorpus, LanceEmbeddingSearch>;

fn open_retriever(
    config: &AppConfig,
    base: &Path,
    corpus: Arc<ArrowCorpus>,
    index: Arc<TitleIndex>,
) -> anyhow::Result<WikiRetriever> {
    let embedder = get_default_embedder(&config.embed, base)?;
    let search = LanceEmbeddingSearch::open(&config.data.vector_db_dir(base), &config.data.table_name, embedder)?;
    Ok(Retriever::new(corpus, index, Arc::new(search)).with_summary_chars(config.search.summary_chars))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?.app()?;
    init_tracing(config.verbose || cli.verbose);
    let base = std::env::current_dir()?;

    let corpus = Arc::new(open_corpus(&config, &base)?);
    let index = Arc::new(load_title_index(&config, &base, &corpus)?);
    let defaults = &config.search;

    match cli.command {
        Command::Article { title } => print_json(&lookup_by_title(&index, corpus.as_ref(), &title)?),
        Command::Summaries(args) => {
            let retriever = open_retriever(&config, &base, corpus, index)?;
            print_json(&retriever.search_summaries(&args.prompt, args.percentile(defaults), args.limit(defaults))?)
        }
        Command::Articles(args) => {
            let retriever = open_retriever(&config, &base, corpus, index)?;
            print_json(&retriever.search_articles(&args.prompt, args.percentile(defaults), args.limit(defaults))?)
        }
        Command::Top(args) => {
            let retriever = open_retriever(&config, &base, corpus, index)?;
            print_json(&retriever.top_article(&args.prompt, args.percentile(defaults), args.limit(defaults))?)
        }
        Command::TopN { search: args, n } => {
            let retriever = open_retriever(&config, &base, corpus, index)?;
            print_json(&retriever.top_n_articles(&args.prompt, args.percentile(defaults), args.limit(defaults), n)?)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}
