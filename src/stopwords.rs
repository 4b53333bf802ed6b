//! Built-in stopword lists. English is always applied; other languages are opt-in.

use std::collections::HashSet;

pub type StopWords = HashSet<String, ahash::RandomState>;

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "else", "ever", "few", "for", "from", "further", "get",
    "had", "hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her",
    "here", "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "however", "http",
    "https", "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "just", "k", "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor",
    "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the", "their",
    "theirs", "them", "themselves", "then", "there", "there's", "these", "they", "they'd", "they'll",
    "they're", "they've", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "wasn't", "we", "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when",
    "when's", "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "will",
    "with", "won't", "would", "wouldn't", "www", "you", "you'd", "you'll", "you're", "you've", "your",
    "yours", "yourself", "yourselves",
];

const GERMAN: &[&str] = &[
    "aber", "alle", "allem", "allen", "aller", "als", "also", "am", "an", "auch", "auf", "aus", "bei",
    "bin", "bis", "bist", "da", "damit", "dann", "das", "dass", "dem", "den", "denn", "der", "des", "die",
    "dies", "diese", "dieser", "dir", "doch", "dort", "du", "durch", "ein", "eine", "einem", "einen",
    "einer", "es", "etwas", "für", "hab", "habe", "haben", "hat", "hatte", "ich", "ihr", "im", "in",
    "ist", "ja", "jetzt", "kann", "kein", "keine", "man", "mehr", "mein", "mich", "mir", "mit", "nach",
    "nicht", "noch", "nur", "ob", "oder", "schon", "sehr", "sein", "sich", "sie", "sind", "so", "um",
    "und", "uns", "unter", "vom", "von", "vor", "war", "was", "weil", "wenn", "wie", "wir", "wird",
    "zu", "zum", "zur",
];

const SPANISH: &[&str] = &[
    "al", "algo", "como", "con", "cuando", "de", "del", "desde", "donde", "el", "ella", "en", "entre",
    "era", "es", "esa", "ese", "eso", "esta", "este", "esto", "está", "fue", "ha", "hay", "la", "las",
    "le", "lo", "los", "me", "mi", "muy", "más", "nada", "ni", "no", "nos", "o", "para", "pero", "por",
    "porque", "que", "qué", "se", "si", "sin", "sobre", "son", "su", "sus", "sí", "también", "te", "tiene",
    "todo", "tu", "un", "una", "uno", "y", "ya", "yo",
];

const FRENCH: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "c'est", "dans", "de", "des", "du", "elle", "en", "est", "et",
    "eu", "il", "ils", "je", "j'ai", "la", "le", "les", "leur", "lui", "ma", "mais", "me", "mes", "moi",
    "mon", "ne", "nous", "on", "ou", "par", "pas", "pour", "qu", "que", "qui", "sa", "se", "ses", "son",
    "sont", "sur", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos", "votre", "vous", "été",
    "être", "était", "fait", "plus", "tout", "très",
];

const ITALIAN: &[&str] = &[
    "ad", "al", "alla", "anche", "che", "chi", "ci", "come", "con", "così", "da", "dal", "dei", "del",
    "della", "di", "e", "è", "gli", "ha", "hanno", "ho", "i", "il", "in", "io", "la", "le", "lei", "lo",
    "loro", "lui", "ma", "mi", "mio", "ne", "nel", "nella", "non", "per", "perché", "più", "questo",
    "quello", "se", "si", "sono", "su", "sua", "suo", "ti", "tu", "tutto", "un", "una", "uno", "voi",
];

const DUTCH: &[&str] = &[
    "aan", "al", "alles", "als", "bij", "dan", "dat", "de", "der", "deze", "die", "dit", "doch", "door",
    "een", "en", "er", "ge", "geen", "had", "heb", "hebben", "heeft", "het", "hier", "hij", "hoe", "hun",
    "ik", "in", "is", "ja", "je", "kan", "maar", "me", "men", "met", "mij", "naar", "niet", "nog", "nu",
    "of", "om", "ook", "op", "over", "te", "tot", "uit", "van", "veel", "voor", "was", "wat", "we", "wel",
    "werd", "wij", "wordt", "zal", "ze", "zij", "zijn", "zo", "zou",
];

const PORTUGUESE: &[&str] = &[
    "ao", "aos", "as", "com", "como", "da", "das", "de", "do", "dos", "e", "ela", "ele", "em", "entre",
    "era", "essa", "esse", "está", "eu", "foi", "há", "isso", "já", "lhe", "mais", "mas", "me", "meu",
    "muito", "na", "nas", "no", "nos", "não", "o", "os", "ou", "para", "pela", "pelo", "por", "qual",
    "quando", "que", "se", "sem", "ser", "seu", "sua", "só", "também", "te", "tem", "um", "uma", "você",
];

/// Stopword list for a language code (`de`) or English name (`german`), case-insensitive.
pub fn stopwords_for(language: &str) -> Option<&'static [&'static str]> {
    match language.trim().to_lowercase().as_str() {
        "en" | "english" => Some(ENGLISH),
        "de" | "german" => Some(GERMAN),
        "es" | "spanish" => Some(SPANISH),
        "fr" | "french" => Some(FRENCH),
        "it" | "italian" => Some(ITALIAN),
        "nl" | "dutch" => Some(DUTCH),
        "pt" | "portuguese" => Some(PORTUGUESE),
        _ => None,
    }
}

/// English stopwords plus the lists for `languages`. Unknown languages are logged and skipped.
pub fn build_stopwords<S: AsRef<str>>(languages: &[S]) -> StopWords {
    let mut set: StopWords = ENGLISH.iter().map(|s| s.to_string()).collect();
    for lang in languages {
        match stopwords_for(lang.as_ref()) {
            Some(words) => set.extend(words.iter().map(|s| s.to_string())),
            None => tracing::warn!("No stopword list for language {:?}; ignoring", lang.as_ref()),
        }
    }
    set
}
