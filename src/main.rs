//! Command-line front end for ontoval

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use ontoval::io::{
    format_component_report, format_edge_list, format_informative, format_sweep_report,
    load_corpus, load_descriptors, load_edge_list, load_frequency_table, load_ontology_terms,
    load_term_counts, load_term_list, load_term_set, read_text, sections_to_edges, to_json,
    write_text,
};
use ontoval::ontology::TermAlignment;
use ontoval::significance::{evaluate, trial_rng, EvaluationInputs};
use ontoval::{
    ComponentAnalyzer, Graph, Hierarchy, OntologyTerm, RunConfig, SweepPolicy, SweepRunner,
    TermStatistics, TextEncoding,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ontoval", version, about = "Validate extracted keyword relationships against an ontology")]
struct Cli {
    /// JSON run configuration; command-line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file, appended to
    #[arg(long, global = true, default_value = "ontoval.log")]
    log_file: PathBuf,

    /// Log to the file only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score extraction-graph components against the ontology hierarchy
    Components(ComponentsArgs),
    /// Test one keyword list for significant overlap with the reference set
    Evaluate(EvaluateArgs),
    /// Evaluate every candidate of a keyword-selection sweep in parallel
    Sweep(SweepArgs),
    /// List descriptors frequent enough to be informative
    Informative(InformativeArgs),
    /// Turn sectioned keyword output into an edge list
    Edges(EdgesArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("ontology").required(true).args(["descriptors", "ontology_edges"])))]
struct ComponentsArgs {
    /// Extraction edge list (`term_a<TAB>term_b`)
    #[arg(long)]
    edges: PathBuf,

    /// Descriptor file (`id<TAB>name<TAB>positions`); builds the ontology graph
    #[arg(long)]
    descriptors: Option<PathBuf>,

    /// Ontology edge list over identifiers, instead of descriptors
    #[arg(long)]
    ontology_edges: Option<PathBuf>,

    /// Ontology term list; defaults to descriptor names
    #[arg(long)]
    terms: Option<PathBuf>,

    /// Term list rows are `identifier,term`
    #[arg(long)]
    identified: bool,

    /// Term list encoding
    #[arg(long, default_value = "utf8")]
    encoding: TextEncoding,

    /// RMSD acceptance tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Longest word permutation generated per ontology term
    #[arg(long)]
    max_permutation_len: Option<usize>,

    /// Report path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SignificanceArgs {
    /// Background corpus, one term per line
    #[arg(long)]
    corpus: PathBuf,

    /// Reference term list
    #[arg(long)]
    reference: PathBuf,

    /// Reference list encoding
    #[arg(long, default_value = "latin1")]
    reference_encoding: TextEncoding,

    /// Random trials per evaluation
    #[arg(short, long)]
    trials: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct EvaluateArgs {
    #[command(flatten)]
    significance: SignificanceArgs,

    /// Method result, one keyword per line
    #[arg(long)]
    result: PathBuf,

    /// Label written to the record's threshold column
    #[arg(long, default_value_t = 0.0)]
    label: f64,

    /// Report path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    significance: SignificanceArgs,

    /// General-background frequency table
    #[arg(short, long)]
    general: PathBuf,

    /// Domain-specific frequency table
    #[arg(short, long)]
    specific: PathBuf,

    /// Domain terms must occur more often than this
    #[arg(short = 'f', long)]
    min_freq: Option<u64>,

    /// Worker pool size
    #[arg(short, long)]
    workers: Option<usize>,

    /// First threshold of the scan
    #[arg(long)]
    start: Option<f64>,

    /// Scan stops before this threshold
    #[arg(long)]
    end: Option<f64>,

    /// Threshold increment
    #[arg(long)]
    step: Option<f64>,

    /// Smallest top-N set; selects the top-N policy
    #[arg(long)]
    top_min: Option<usize>,

    /// Largest top-N set; selects the top-N policy
    #[arg(long)]
    top_max: Option<usize>,

    /// Also score domain terms missing from the general table
    #[arg(long)]
    include_unshared: bool,

    /// Report path
    #[arg(short, long, default_value = "sweep_results.tsv")]
    output: PathBuf,
}

#[derive(Args)]
struct InformativeArgs {
    /// Descriptor file (`id<TAB>name<TAB>positions`)
    #[arg(long)]
    descriptors: PathBuf,

    /// Document rows (`doc_id,id,id,...`)
    #[arg(long)]
    counts: PathBuf,

    /// Minimum occurrence count
    #[arg(long)]
    cutoff: u64,

    /// Report path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct EdgesArgs {
    /// Sectioned keyword file (sections end at lines starting with `=` or `*`)
    #[arg(long)]
    input: PathBuf,

    /// Edge list to write
    #[arg(short, long, default_value = "edge_list")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file, cli.quiet, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            RunConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    info!("###############################");
    match cli.command {
        Commands::Components(args) => run_components(args, config, cli.json),
        Commands::Evaluate(args) => run_evaluate(args, config, cli.json),
        Commands::Sweep(args) => run_sweep(args, config, cli.json),
        Commands::Informative(args) => run_informative(args, cli.json),
        Commands::Edges(args) => run_edges(args),
    }
}

/// Stdout layer (unless quiet) plus an append-only file layer
fn init_logging(log_file: &Path, quiet: bool, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stdout_layer = (!quiet).then(|| fmt::layer().with_writer(std::io::stdout));
    let file_layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// Write to `output`, or print when no path is given
fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            write_text(path, text)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn run_components(args: ComponentsArgs, mut config: RunConfig, json: bool) -> Result<()> {
    if let Some(tolerance) = args.tolerance {
        config.analysis.rmsd_tolerance = tolerance;
    }
    if let Some(len) = args.max_permutation_len {
        config.analysis.max_permutation_len = len;
    }
    config.analysis.validate()?;

    info!(edges = %args.edges.display(), "extraction graph");
    let extraction = load_edge_list(&args.edges)?;

    let hierarchy = match &args.descriptors {
        Some(path) => {
            info!(descriptors = %path.display(), "ontology hierarchy");
            Some(Hierarchy::new(load_descriptors(path)?))
        }
        None => None,
    };

    let ontology_graph: Graph = match (&hierarchy, &args.ontology_edges) {
        (_, Some(path)) => {
            info!(ontology_edges = %path.display(), "ontology graph");
            load_edge_list(path)?
        }
        (Some(hierarchy), None) => hierarchy.ontology_graph(),
        (None, None) => bail!("either --descriptors or --ontology-edges is required"),
    };

    let terms: Vec<OntologyTerm> = match (&args.terms, &hierarchy) {
        (Some(path), _) => load_ontology_terms(path, args.encoding, args.identified)?,
        (None, Some(hierarchy)) => hierarchy
            .descriptors()
            .iter()
            .map(|d| OntologyTerm::new(d.id.clone(), d.name.to_lowercase()))
            .collect(),
        (None, None) => bail!("--terms is required without --descriptors"),
    };

    let max_len = config.analysis.max_permutation_len;
    let alignment = TermAlignment::with_max_len(&terms, max_len);
    debug!(
        terms = alignment.term_count(),
        permutations = alignment.permutation_count(),
        max_len,
        "alignment set built"
    );

    let analyzer = ComponentAnalyzer::new(config.analysis, &alignment, &ontology_graph);
    let summary = analyzer.analyze(&extraction)?;

    let report = if json {
        to_json(&summary)?
    } else {
        format_component_report(&summary, hierarchy.as_ref())
    };
    emit(args.output.as_deref(), &report)
}

fn load_inputs(args: &SignificanceArgs) -> Result<EvaluationInputs> {
    info!(corpus = %args.corpus.display(), reference = %args.reference.display(), "significance inputs");
    let corpus = load_corpus(&args.corpus, TextEncoding::Utf8)?;
    let reference = load_term_set(&args.reference, args.reference_encoding)?;
    info!(
        corpus = corpus.len(),
        distinct = corpus.distinct_len(),
        reference = reference.len(),
        "significance inputs loaded"
    );
    Ok(EvaluationInputs::new(corpus, reference))
}

fn run_evaluate(args: EvaluateArgs, mut config: RunConfig, json: bool) -> Result<()> {
    if let Some(trials) = args.significance.trials {
        config.significance.trials = trials;
    }
    if args.significance.seed.is_some() {
        config.significance.seed = args.significance.seed;
    }
    config.significance.validate()?;

    let inputs = load_inputs(&args.significance)?;
    let result = load_term_list(&args.result, TextEncoding::Utf8)?;
    info!(result = %args.result.display(), size = result.len(), trials = config.significance.trials, "evaluating");

    let mut rng = trial_rng(config.significance.seed);
    let record = evaluate(
        &inputs.corpus,
        &result,
        &inputs.reference,
        config.significance.trials,
        args.label,
        &mut rng,
    )?;

    let report = if json {
        to_json(&record)?
    } else {
        format_sweep_report(std::slice::from_ref(&record))
    };
    emit(args.output.as_deref(), &report)
}

/// Policy after applying command-line bounds
fn sweep_policy(base: &SweepPolicy, args: &SweepArgs) -> SweepPolicy {
    if args.top_min.is_some() || args.top_max.is_some() {
        let (base_min, base_max) = match *base {
            SweepPolicy::TopN { min, max } => (min, max),
            SweepPolicy::ThresholdScan { .. } => (1, 1),
        };
        let min = args.top_min.unwrap_or(base_min);
        let max = args.top_max.unwrap_or(base_max.max(min));
        return SweepPolicy::TopN { min, max };
    }

    let scan_overridden = args.start.is_some() || args.end.is_some() || args.step.is_some();
    let scan = match base {
        SweepPolicy::ThresholdScan { .. } => base.clone(),
        SweepPolicy::TopN { .. } if scan_overridden => SweepPolicy::default(),
        SweepPolicy::TopN { .. } => return base.clone(),
    };

    match scan {
        SweepPolicy::ThresholdScan { start, end, step } => SweepPolicy::ThresholdScan {
            start: args.start.unwrap_or(start),
            end: args.end.unwrap_or(end),
            step: args.step.unwrap_or(step),
        },
        other => other,
    }
}

fn run_sweep(args: SweepArgs, config: RunConfig, json: bool) -> Result<()> {
    let mut sweep = config.sweep;
    sweep.policy = sweep_policy(&sweep.policy, &args);
    if let Some(freq) = args.min_freq {
        sweep.min_specific_freq = freq;
    }
    if let Some(workers) = args.workers {
        sweep.workers = workers;
    }
    if let Some(trials) = args.significance.trials {
        sweep.significance.trials = trials;
    }
    if args.significance.seed.is_some() {
        sweep.significance.seed = args.significance.seed;
    }
    if args.include_unshared {
        sweep.include_unshared = true;
    }

    info!(general = %args.general.display(), specific = %args.specific.display(), "frequency tables");
    info!(
        min_specific_freq = sweep.min_specific_freq,
        trials = sweep.significance.trials,
        workers = sweep.workers,
        policy = ?sweep.policy,
        "sweep settings"
    );

    let general = load_frequency_table(&args.general)?;
    let mut specific = load_frequency_table(&args.specific)?;
    specific.retain_above(sweep.min_specific_freq);
    let stats = TermStatistics::compute(&specific, &general, sweep.include_unshared);
    info!(
        retained = stats.len(),
        frequency_mean = stats.frequency_mean,
        weirdness_mean = stats.weirdness_mean,
        "term statistics computed"
    );

    let inputs = Arc::new(load_inputs(&args.significance)?);
    let runner = SweepRunner::new(sweep)?;
    let records = runner.run_policy(inputs, &stats)?;

    let report = if json {
        to_json(&records)?
    } else {
        format_sweep_report(&records)
    };
    emit(Some(args.output.as_path()), &report)
}

fn run_informative(args: InformativeArgs, json: bool) -> Result<()> {
    info!(descriptors = %args.descriptors.display(), counts = %args.counts.display(), cutoff = args.cutoff, "informative terms");
    let hierarchy = Hierarchy::new(load_descriptors(&args.descriptors)?);
    let ids: Vec<&str> = hierarchy.descriptors().iter().map(|d| d.id.as_str()).collect();
    let counts = load_term_counts(&args.counts, ids)?;

    let informative = hierarchy.informative_terms(&counts, args.cutoff);
    info!(informative = informative.len(), descriptors = hierarchy.len(), "informative terms found");

    let report = if json {
        to_json(&informative)?
    } else {
        format_informative(&informative, &hierarchy)
    };
    emit(args.output.as_deref(), &report)
}

fn run_edges(args: EdgesArgs) -> Result<()> {
    let text = read_text(&args.input, TextEncoding::Utf8)?;
    let edges = sections_to_edges(&text);
    info!(input = %args.input.display(), edges = edges.len(), "sections converted");
    emit(Some(args.output.as_path()), &format_edge_list(&edges))
}
