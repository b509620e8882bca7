// ============================================================
// CLI — Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `infer`, and all
// their configurable flags. clap's derive macros generate the
// help text, missing-argument errors, and type conversion.

use clap::{Args, Subcommand};

use crate::application::infer_use_case::InferConfig;
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train an LDA model on a corpus with collapsed Gibbs sampling
    Train(TrainArgs),

    /// Apply a trained model to new documents (parallel inference)
    Infer(InferArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Corpus file: one document per line, `id<TAB>token token ...`
    #[arg(long, default_value = "data/corpus.txt")]
    pub corpus: String,

    /// Directory for the model, wordmap, and reports
    #[arg(long, default_value = "model")]
    pub output_dir: String,

    /// Base name for all output files
    #[arg(long, default_value = "model")]
    pub model_name: String,

    /// Number of topics (K)
    #[arg(long, default_value_t = 50)]
    pub topics: usize,

    /// Symmetric document-topic prior (every alpha[k] gets this value)
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,

    /// Topic-word prior
    #[arg(long, default_value_t = 0.1)]
    pub beta: f64,

    /// Number of full Gibbs sweeps over the corpus
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// Words listed per topic in the top-words report,
    /// and topics listed per document in the bipartitions report
    #[arg(long, default_value_t = 10)]
    pub top_words: usize,

    /// Log the convergence gap every 10 iterations and write
    /// per-topic snapshots for document 0 at checkpoints
    #[arg(long)]
    pub diagnostics: bool,

    /// Seed for the sampler's RNG; omit for a fresh seed per run
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path: a.corpus,
            output_dir:  a.output_dir,
            model_name:  a.model_name,
            topics:      a.topics,
            alpha:       a.alpha,
            beta:        a.beta,
            iterations:  a.iterations,
            top_words:   a.top_words,
            diagnostics: a.diagnostics,
            seed:        a.seed,
        }
    }
}

/// All arguments for the `infer` command.
#[derive(Args, Debug)]
pub struct InferArgs {
    /// Corpus of new documents, same format as training
    #[arg(long, default_value = "data/new_corpus.txt")]
    pub corpus: String,

    /// Directory holding the trained model
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Name the model was trained under
    #[arg(long, default_value = "model")]
    pub model_name: String,

    /// Label for this run's output files
    #[arg(long, default_value = "inference")]
    pub output_name: String,

    /// Number of Gibbs sweeps over the new documents
    #[arg(long, default_value_t = 500)]
    pub iterations: usize,

    /// Iterations discarded before samples are averaged
    #[arg(long, default_value_t = 100)]
    pub burnin: usize,

    /// Stride between averaged post-burn-in samples
    #[arg(long, default_value_t = 5)]
    pub sampling_lag: usize,

    /// Worker threads; documents are split into that many
    /// contiguous partitions
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Hold out the second half of every document and report
    /// perplexity at each sampling checkpoint
    #[arg(long)]
    pub perplexity: bool,

    /// Topics listed per document in the bipartitions report
    #[arg(long, default_value_t = 10)]
    pub top_topics: usize,

    /// Abort the run if a single sweep exceeds this many seconds
    #[arg(long)]
    pub iteration_deadline_secs: Option<f64>,

    /// Seed for the sampler's RNG; omit for a fresh seed per run
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<InferArgs> for InferConfig {
    fn from(a: InferArgs) -> Self {
        InferConfig {
            corpus_path:  a.corpus,
            model_dir:    a.model_dir,
            model_name:   a.model_name,
            output_name:  a.output_name,
            iterations:   a.iterations,
            burnin:       a.burnin,
            sampling_lag: a.sampling_lag,
            threads:      a.threads,
            perplexity:   a.perplexity,
            top_topics:   a.top_topics,
            iteration_deadline_secs: a.iteration_deadline_secs,
            seed:         a.seed,
        }
    }
}
