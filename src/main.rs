use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{info, warn};

use biznews::comparator::{
    Comparator, DocumentScope, EmbeddingComparator, EmbeddingOptions, EvaluationMethod,
    SimpleComparator, SimpleOptions,
};
use biznews::config::Config;
use biznews::embeddings::{CacheOptions, EmbeddingProvider, KeywordEmbeddings};
use biznews::extract::{ExtractOptions, KeywordExtractor, SynonymExtensor, SynonymOptions};
use biznews::generator::{InferParams, KeyGenerator, LoadMode, Word2VecKeyGenerator};
use biznews::keywords::{KeywordSet, KeywordSource};
use biznews::models::{Category, NewsArticle};
use biznews::output;
use biznews::registry::create_backends;
use biznews::report::NewsReport;
use biznews::text::Segmenter;

/// BizNews: classify Chinese business news.
///
/// Flags articles as Negative News and/or ESG News by keyword matching or
/// by embedding similarity against per-category keyword lists.
#[derive(Parser)]
#[command(name = "biznews", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    /// Literal keyword counting
    Simple,
    /// Whole-document embedding vs keyword embeddings
    DocBased,
    /// Extracted bigram embeddings vs keyword embeddings
    KeyBased,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more articles as Negative News / ESG News
    Classify {
        /// Article title (use with --body)
        #[arg(long, conflicts_with_all = ["file", "dir"])]
        title: Option<String>,

        /// Article body
        #[arg(long, default_value = "")]
        body: String,

        /// A news JSON file ({"title","body"} or {"Headline","BodyHtml"})
        #[arg(long, conflicts_with = "dir")]
        file: Option<PathBuf>,

        /// A directory of news JSON files
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "simple")]
        method: Method,

        /// Decision threshold (simple) or similarity threshold (embedding methods)
        #[arg(long)]
        threshold: Option<f64>,

        /// Matched keywords to report (embedding methods)
        #[arg(long)]
        top_n: Option<usize>,

        /// Embed title and body instead of the title only (doc-based)
        #[arg(long)]
        with_body: bool,

        /// Show which segments matched (simple)
        #[arg(long)]
        debug: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Extract salient n-grams from a text
    Extract {
        #[arg(long)]
        text: String,

        #[arg(long, default_value = "1")]
        n_gram: usize,

        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Also list the category keywords each n-gram resembles
        #[arg(long)]
        category: Option<String>,

        /// Similarity threshold for --category
        #[arg(long, default_value = "0.6")]
        threshold: f64,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Find tokens in a text that are near-synonyms of category keywords
    Synonyms {
        #[arg(long)]
        text: String,

        #[arg(long, default_value = "Negative_News")]
        category: String,

        /// Only look for synonyms of this keyword
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value = "0.78")]
        threshold: f64,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// List the effective keyword set of a category
    Keywords {
        #[arg(default_value = "Negative_News")]
        category: String,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Compute and save keyword embeddings for both categories
    BuildCache {
        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Generate related-word candidates from a word2vec model
    Generate {
        /// Which word2vec_<key> model to load
        #[arg(long)]
        model_key: String,

        /// A single word, or a .txt file with one word per line
        #[arg(long)]
        input: String,

        #[arg(long, default_value = "10")]
        topn: usize,

        #[arg(long, default_value = "0.70")]
        threshold: f64,

        /// Per-word topn/threshold overrides, as a JSON file
        #[arg(long)]
        force_info: Option<PathBuf>,

        /// Load the text model instead of the binary one
        #[arg(long)]
        normal: bool,

        /// Write results here (.json or .txt); may be repeated
        #[arg(long)]
        output: Vec<PathBuf>,
    },

    /// Download the ONNX word embedding model (~470 MB)
    DownloadModel,
}

/// Keyword selection shared by every command that builds a keyword set.
#[derive(clap::Args)]
struct KeywordArgs {
    /// Extra Negative News keyword or .txt keyword list; may be repeated
    #[arg(long = "nn-keyword-source")]
    nn_sources: Vec<String>,

    /// Extra ESG News keyword or .txt keyword list; may be repeated
    #[arg(long = "esg-keyword-source")]
    esg_sources: Vec<String>,

    /// Skip the default keyword lists
    #[arg(long)]
    no_default_keywords: bool,

    /// Read previously saved keyword embeddings
    #[arg(long)]
    load_cache: bool,

    /// Do not add keywords that exist only in the cache
    #[arg(long)]
    no_cache_merge: bool,
}

impl KeywordArgs {
    /// Extra keywords given for `category` only.
    fn sources_for(&self, category: Category) -> KeywordSource {
        match category {
            Category::NegativeNews => KeywordSource::from(self.nn_sources.clone()),
            Category::EsgNews => KeywordSource::from(self.esg_sources.clone()),
            Category::Other => KeywordSource::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("biznews=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            title,
            body,
            file,
            dir,
            method,
            threshold,
            top_n,
            with_body,
            debug,
            json,
            keywords,
        } => {
            let config = Config::load()?;
            let articles = collect_articles(title, body, file, dir)?;
            if articles.is_empty() {
                println!("Nothing to classify. Pass --title, --file or --dir.");
                return Ok(());
            }

            let (nn, esg) = match method {
                Method::Simple => {
                    let mut options = SimpleOptions {
                        debug,
                        ..SimpleOptions::default()
                    };
                    if let Some(t) = threshold {
                        options.threshold = t;
                    }
                    simple_comparators(&config, &keywords, options)?
                }
                Method::DocBased | Method::KeyBased => {
                    let mut options = EmbeddingOptions {
                        method: if matches!(method, Method::KeyBased) {
                            EvaluationMethod::KeyBased
                        } else {
                            EvaluationMethod::DocBased
                        },
                        document_scope: if with_body {
                            DocumentScope::TitleAndBody
                        } else {
                            DocumentScope::Title
                        },
                        ..EmbeddingOptions::default()
                    };
                    if let Some(t) = threshold {
                        options.threshold = t;
                    }
                    if let Some(n) = top_n {
                        options.top_n = n;
                    }
                    embedding_comparators(&config, &keywords, options)?
                }
            };

            info!(articles = articles.len(), "Classifying");
            let mut reports = BTreeMap::new();
            for (label, article) in &articles {
                let report = NewsReport::classify(nn.as_ref(), esg.as_ref(), &article.title, &article.body)
                    .with_context(|| format!("Failed to classify {label}"))?;
                if json {
                    reports.insert(label.clone(), report);
                } else {
                    output::display_report(label, &article.title, &report);
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }

        Commands::Extract {
            text,
            n_gram,
            top_n,
            category,
            threshold,
            keywords,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;
            let (segmenter, embedder) = backends(&config)?;

            let extractor = KeywordExtractor::new(Arc::clone(&segmenter), Arc::clone(&embedder));
            let options = ExtractOptions {
                n_gram,
                top_n,
                ..ExtractOptions::default()
            };
            let docs = extractor.extract_keywords(text.as_str(), &options)?;

            match category {
                None => output::display_extracted(&docs),
                Some(name) => {
                    let category: Category = name.parse()?;
                    let embeddings =
                        keyword_embeddings(&config, category, &keywords, embedder.as_ref(), false)?;
                    let comparator = EmbeddingComparator::new(
                        embeddings,
                        segmenter,
                        embedder,
                        EmbeddingOptions::default(),
                    )?;
                    let evaluations: Vec<_> = docs
                        .iter()
                        .map(|doc| comparator.evaluate_keywords(doc, threshold, top_n))
                        .collect();
                    output::display_evaluations(&evaluations);
                }
            }
        }

        Commands::Synonyms {
            text,
            category,
            keyword,
            threshold,
            keywords,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;
            let (segmenter, embedder) = backends(&config)?;
            let category: Category = category.parse()?;

            let embeddings =
                keyword_embeddings(&config, category, &keywords, embedder.as_ref(), false)?;
            let extensor = SynonymExtensor::new(embeddings, segmenter, embedder);
            let options = SynonymOptions {
                keyword,
                threshold,
                ..SynonymOptions::default()
            };
            let docs = extensor.extract(text.as_str(), &options)?;
            output::display_synonyms(&docs);
        }

        Commands::Keywords { category, keywords } => {
            let config = Config::load()?;
            let category: Category = category.parse()?;
            let set = keyword_set(&config, category, &keywords)?;
            output::display_keywords(&set);
        }

        Commands::BuildCache { keywords } => {
            let config = Config::load()?;
            config.require_embedder()?;
            let (_, embedder) = backends(&config)?;

            for category in Category::KEYWORD_CATEGORIES {
                let embeddings =
                    keyword_embeddings(&config, category, &keywords, embedder.as_ref(), true)?;
                println!(
                    "  {} {} keyword embeddings saved",
                    category.as_str().bold(),
                    embeddings.len()
                );
            }
            println!("Cache directory: {}", config.cache_dir.display());
        }

        Commands::Generate {
            model_key,
            input,
            topn,
            threshold,
            force_info,
            normal,
            output: outputs,
        } => {
            let config = Config::load()?;
            config.require_word2vec()?;

            let mode = if normal { LoadMode::Normal } else { LoadMode::Fast };
            println!("Loading word2vec model {model_key}...");
            let mut generator = Word2VecKeyGenerator::open(&config.word2vec_dir, &model_key, mode)?;

            let force_info = match force_info {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Some(
                        serde_json::from_str::<BTreeMap<String, InferParams>>(&json)
                            .with_context(|| format!("Invalid force-info file {}", path.display()))?,
                    )
                }
                None => None,
            };

            let report = generator.infer(&input, InferParams { topn, threshold }, force_info, true)?;
            output::display_generator_report(report);

            for path in &outputs {
                generator.save(path)?;
                println!("Saved {}", path.display());
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", model_dir.display());

            biznews::embeddings::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `biznews classify --method doc-based ...`.");
        }
    }

    Ok(())
}

/// Gather (label, article) pairs from whichever input the user gave.
fn collect_articles(
    title: Option<String>,
    body: String,
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
) -> Result<Vec<(String, NewsArticle)>> {
    if let Some(title) = title {
        return Ok(vec![("article".to_string(), NewsArticle { title, body })]);
    }
    if let Some(file) = file {
        let article = NewsArticle::load(&file)
            .with_context(|| format!("Failed to read news file {}", file.display()))?;
        return Ok(vec![(file.display().to_string(), article)]);
    }
    let Some(dir) = dir else {
        return Ok(Vec::new());
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut articles = Vec::with_capacity(paths.len());
    for path in paths {
        match NewsArticle::load(&path) {
            Ok(article) => articles.push((path.display().to_string(), article)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable news file");
                println!("  {} skipping {}: {}", "Warning:".yellow(), path.display(), e);
            }
        }
    }
    Ok(articles)
}

fn backends(config: &Config) -> Result<(Arc<dyn Segmenter>, Arc<dyn EmbeddingProvider>)> {
    create_backends(&config.segmenter, &config.embedder, &config.model_dir).with_context(|| {
        format!(
            "Failed to create backends (segmenter {}, embedder {})",
            config.segmenter, config.embedder
        )
    })
}

fn keyword_set(config: &Config, category: Category, args: &KeywordArgs) -> Result<KeywordSet> {
    let load_default = !args.no_default_keywords;
    if load_default {
        config.require_keywords(category)?;
    }
    let source = args.sources_for(category);
    Ok(KeywordSet::load(
        category,
        Some(&source),
        load_default,
        &config.keywords_dir,
    )?)
}

fn keyword_embeddings(
    config: &Config,
    category: Category,
    args: &KeywordArgs,
    embedder: &dyn EmbeddingProvider,
    save_cache: bool,
) -> Result<Arc<KeywordEmbeddings>> {
    let keywords = keyword_set(config, category, args)?;
    let options = CacheOptions {
        dir: config.cache_dir.clone(),
        load_cache: args.load_cache,
        save_cache,
        merge_cached_keywords: !args.no_cache_merge,
    };
    let embeddings = KeywordEmbeddings::build(keywords, embedder, &options)
        .with_context(|| format!("Failed to build {category} keyword embeddings"))?;
    Ok(Arc::new(embeddings))
}

fn simple_comparators(
    config: &Config,
    args: &KeywordArgs,
    options: SimpleOptions,
) -> Result<(Box<dyn Comparator>, Box<dyn Comparator>)> {
    let nn = SimpleComparator::new(keyword_set(config, Category::NegativeNews, args)?, options.clone());
    let esg = SimpleComparator::new(keyword_set(config, Category::EsgNews, args)?, options);
    Ok((Box::new(nn), Box::new(esg)))
}

fn embedding_comparators(
    config: &Config,
    args: &KeywordArgs,
    options: EmbeddingOptions,
) -> Result<(Box<dyn Comparator>, Box<dyn Comparator>)> {
    config.require_embedder()?;
    let (segmenter, embedder) = backends(config)?;

    let build = |category: Category| -> Result<Box<dyn Comparator>> {
        let embeddings = keyword_embeddings(config, category, args, embedder.as_ref(), false)?;
        let comparator = EmbeddingComparator::new(
            embeddings,
            Arc::clone(&segmenter),
            Arc::clone(&embedder),
            options.clone(),
        )?;
        Ok(Box::new(comparator))
    };

    Ok((build(Category::NegativeNews)?, build(Category::EsgNews)?))
}
