use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rwc::{
    init_tracing_once, Archive, CloudOptions, CommentSource, Credentials, FetchOptions, ListingFile, RedditClient,
    ReferenceWordlist, ReweightOptions, Target, WordCloud, YearMonth, DEFAULT_CREDENTIALS_FILE,
};
use std::path::PathBuf;

/// Fetches comments from a reddit post (or the hot posts of a subreddit) and makes a word cloud
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a word cloud from a thread or a subreddit feed
    Cloud(CloudArgs),
    /// Store the reddit app's client id and secret
    Configure {
        client_id: String,
        secret: String,
        /// Credentials file to write
        #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CloudArgs {
    /// The ID (or URL) of the reddit post; the subreddit name with --sub
    id: String,

    /// Treat ID as the name of a subreddit
    #[arg(long)]
    sub: bool,

    /// How many "load more comments" stubs to resolve (default: all)
    #[arg(short = 'n', value_name = "LIMIT")]
    more_limit: Option<usize>,

    /// Number of posts to fetch (subreddit mode only)
    #[arg(short = 'p', value_name = "POSTS")]
    posts: Option<usize>,

    /// Languages to add stopwords for (English is always included)
    #[arg(short = 'l', value_name = "LANG", num_args = 1..)]
    languages: Vec<String>,

    /// Write the cloud document (JSON) here
    #[arg(short = 'o', value_name = "OUT")]
    out: Option<PathBuf>,

    /// Scale of the word cloud
    #[arg(short = 's', value_name = "SCALE")]
    scale: Option<u32>,

    /// Mask image the cloud is shaped by
    #[arg(short = 'm', value_name = "MASK")]
    mask: Option<PathBuf>,

    /// Background color
    #[arg(short = 'b', value_name = "BACKGROUND")]
    background: Option<String>,

    /// Width and color of the mask contour
    #[arg(short = 'c', num_args = 2, value_names = ["CW", "CC"])]
    contour: Option<Vec<String>>,

    /// Use the mask as color source
    #[arg(long)]
    color: bool,

    /// Maximum number of words in the cloud
    #[arg(short = 'N', value_name = "MAX_WORDS")]
    max_words: Option<usize>,

    /// Font file for the renderer
    #[arg(long)]
    font: Option<PathBuf>,

    /// Don't merge plural forms into their singular
    #[arg(long)]
    no_plurals: bool,

    /// Reweight words against a reference wordlist
    #[arg(long)]
    reweight: bool,

    /// Reference wordlist (rank;word;count); implies --reweight
    #[arg(long)]
    wordlist: Option<PathBuf>,

    /// Drop words whose share of all words is below this
    #[arg(long, value_name = "FRACTION")]
    min_freq: Option<f64>,

    /// Multiplier for words missing from the wordlist
    #[arg(long)]
    boost: Option<f64>,

    /// Divisor for words found in the wordlist
    #[arg(long)]
    blow: Option<f64>,

    /// Credentials file
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
    config: PathBuf,

    /// Read from monthly dumps under this directory instead of the API
    #[arg(long, conflicts_with = "listing")]
    archive: Option<PathBuf>,

    /// First dump month (YYYY-MM)
    #[arg(long, requires = "archive")]
    from: Option<YearMonth>,

    /// Last dump month (YYYY-MM)
    #[arg(long, requires = "archive")]
    to: Option<YearMonth>,

    /// Dump files decoded in parallel
    #[arg(long, default_value_t = 1)]
    file_concurrency: usize,

    /// Read a saved /comments/<id>.json page instead of the API
    #[arg(long)]
    listing: Option<PathBuf>,

    /// Words shown in the terminal summary
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,
}

fn cloud_options(args: &CloudArgs) -> Result<CloudOptions> {
    let mut opts = CloudOptions::default().with_languages(args.languages.iter().cloned()).with_fold_plurals(!args.no_plurals);
    if let Some(n) = args.max_words {
        opts = opts.with_max_words(n);
    }
    if let Some(s) = args.scale {
        opts = opts.with_scale(s);
    }
    if let Some(b) = &args.background {
        opts = opts.with_background(b.clone());
    }
    if let Some(m) = &args.mask {
        opts = opts.with_mask(m, args.color);
    } else if args.color {
        return Err(anyhow!("--color needs a mask (-m)"));
    }
    if let Some(c) = &args.contour {
        let [width, color] = c.as_slice() else { return Err(anyhow!("-c takes a width and a color")) };
        let width: u32 = width.parse().with_context(|| format!("contour width {width:?}"))?;
        opts = opts.with_contour(width, color.clone());
    }
    if let Some(f) = &args.font {
        opts = opts.with_font(f);
    }
    if let Some(o) = &args.out {
        opts = opts.with_output(o);
    }

    if args.reweight || args.wordlist.is_some() {
        let mut rw = ReweightOptions::default();
        if let Some(p) = &args.wordlist {
            rw = rw.with_wordlist(p);
        }
        if let Some(v) = args.min_freq {
            rw = rw.with_min_relative_freq(v);
        }
        if let Some(v) = args.boost {
            rw = rw.with_boost(v);
        }
        if let Some(v) = args.blow {
            rw = rw.with_blow(v);
        }
        opts = opts.with_reweight(rw);
    } else if args.min_freq.is_some() || args.boost.is_some() || args.blow.is_some() {
        tracing::warn!("--min-freq/--boost/--blow only apply with --reweight or --wordlist");
    }

    opts.validate()?;
    Ok(opts)
}

fn run_cloud(args: CloudArgs) -> Result<()> {
    let opts = cloud_options(&args)?;
    // Load the wordlist before fetching so a bad file fails fast.
    let reference = opts.reweight.as_ref().map(|rw| ReferenceWordlist::load(&rw.wordlist)).transpose()?;

    let mut fetch = FetchOptions::default()
        .with_more_limit(args.more_limit)
        .with_file_concurrency(args.file_concurrency)
        .with_progress(!args.no_progress);
    if let Some(p) = args.posts {
        fetch = fetch.with_posts(p);
    }
    let target = if args.sub { Target::subreddit(&args.id, fetch.posts) } else { Target::submission(&args.id) };

    let source: Box<dyn CommentSource> = if let Some(path) = &args.listing {
        Box::new(ListingFile::new(path))
    } else if let Some(dir) = &args.archive {
        Box::new(Archive::new(dir).date_range(args.from, args.to).options(fetch))
    } else {
        let creds = Credentials::load(&args.config)?;
        Box::new(RedditClient::connect(&creds, fetch)?)
    };

    let threads = source.fetch(&target)?;
    let cloud = WordCloud::from_threads(&threads, &opts, reference.as_ref())?;

    println!("Done! Processed {} comments", cloud.comments);
    if cloud.is_empty() {
        println!("No words to show.");
    } else {
        print!("{}", cloud.summary(args.top));
    }
    if let Some(out) = &opts.output {
        cloud.write_json(out)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    match cli.command {
        Command::Cloud(args) => run_cloud(args),
        Command::Configure { client_id, secret, config } => {
            Credentials { client_id, secret }.save(&config)?;
            println!("Wrote credentials to {}", config.display());
            Ok(())
        }
    }
}
