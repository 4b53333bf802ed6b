mod config;
mod error;
mod util;

mod comments;
mod reweight;
mod wordlist;
mod stopwords;
mod tokenize;
mod cloud;

mod listing;
mod source;
mod reddit;

mod dumps;
mod zstd_jsonl;
mod concurrency;
mod archive;
mod progress;

pub use crate::config::{CloudOptions, Contour, Credentials, FetchOptions, RenderSettings, ReweightOptions, DEFAULT_CREDENTIALS_FILE};
pub use crate::error::CloudError;

// Core: comment flattening and frequency reweighting.
pub use crate::comments::{flatten, flatten_forest, strip_urls, CommentNode};
pub use crate::reweight::{reweight, validate_params, Weights};

// Word counting and the reference wordlist.
pub use crate::stopwords::{build_stopwords, stopwords_for, StopWords};
pub use crate::tokenize::{Tokenizer, WordCounts};
pub use crate::wordlist::ReferenceWordlist;

// Sources: live API, saved listing files, monthly dumps.
pub use crate::listing::{assemble, parse_comment_page, parse_more_children, parse_post_ids, MoreStub, ParsedThread, RawComment, Thread};
pub use crate::source::{normalize_submission_id, CommentSource, ListingFile, Target};
pub use crate::reddit::{comment_page, hot_ids, resolve_more, ListingApi, RedditClient};
pub use crate::archive::Archive;
pub use crate::dumps::YearMonth;

pub use crate::cloud::{corpus_of, CloudWord, WordCloud};
pub use crate::util::{init_tracing_once, normalize_sub};
