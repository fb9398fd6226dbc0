//! Best-effort programming language detection for untagged code.
//!
//! Every candidate language carries a profile of weighted signatures. The relevance of
//! a language is the sum of `weight * min(matches, 3)` over its signatures; superset
//! languages (TypeScript over JavaScript, C++ over C) add their base profile's score.
//! A guess is trusted only above a relevance threshold, so unknown or ambiguous input
//! yields no detection rather than a confident wrong answer.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DetectionConfig;

/// Matches of a single signature beyond this count add nothing
const MAX_COUNTED_MATCHES: usize = 3;

/// Bonus for input that parses as a JSON object or array
const JSON_STRUCTURE_BONUS: u32 = 10;

/// Closed set of languages the detector can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Css,
    Html,
    Json,
    Bash,
    Sql,
}

impl Language {
    /// All candidates, in tie-breaking order
    pub const ALL: [Language; 13] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Rust,
        Language::Go,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Css,
        Language::Html,
        Language::Json,
        Language::Bash,
        Language::Sql,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Css => "css",
            Language::Html => "html",
            Language::Json => "json",
            Language::Bash => "bash",
            Language::Sql => "sql",
        }
    }

    /// Resolve a canonical name or a common alias (`js`, `py`, `c++`, `sh`, ...)
    pub fn from_name(name: &str) -> Option<Language> {
        let language = match name.trim().to_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "typescript" | "ts" | "tsx" => Language::TypeScript,
            "python" | "py" | "python3" => Language::Python,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "c++" | "cc" | "cxx" | "hpp" => Language::Cpp,
            "css" => Language::Css,
            "html" | "htm" | "xhtml" => Language::Html,
            "json" => Language::Json,
            "bash" | "sh" | "shell" | "zsh" | "console" => Language::Bash,
            "sql" => Language::Sql,
            _ => return None,
        };
        Some(language)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal detector failure, never surfaced by [`detect_language`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("input too large for language detection ({len} bytes, max {max})")]
    InputTooLarge { len: usize, max: usize },
    #[error("input contains NUL bytes")]
    Binary,
    #[error("invalid signature pattern: {0}")]
    InvalidPattern(String),
}

/// Best candidate and its relevance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guess {
    pub language: Language,
    pub relevance: u32,
}

struct Signature {
    pattern: &'static str,
    weight: u32,
}

const fn sig(pattern: &'static str, weight: u32) -> Signature {
    Signature { pattern, weight }
}

struct Profile {
    language: Language,
    extends: Option<Language>,
    signatures: &'static [Signature],
}

const JAVASCRIPT: &[Signature] = &[
    sig(r"\b(const|let|var)\s+[A-Za-z_$][\w$]*\s*=", 1),
    sig(r"\bfunction\b\s*[\w$]*\s*\(", 2),
    sig(r"=>", 1),
    sig(r"\bconsole\.(log|error|warn|info)\s*\(", 3),
    sig(r#"\brequire\s*\(\s*['"]"#, 3),
    sig(r"\bmodule\.exports\b", 3),
    sig(r"\b(document|window)\.\w+", 2),
    sig(r"===|!==", 2),
    sig(r#"\bimport\s+[\w{}\s,*]+\s+from\s+['"]"#, 2),
    sig(r"\b(async|await)\b", 1),
    sig(r"\bnew\s+Promise\b", 2),
    sig(r"\bundefined\b", 1),
    sig(r"\.(then|catch|map|filter|forEach|reduce)\s*\(", 1),
];

const TYPESCRIPT: &[Signature] = &[
    sig(r":\s*(string|number|boolean|any|void|unknown|never)\b", 3),
    sig(r"\binterface\s+[A-Z]\w*", 3),
    sig(r"\btype\s+[A-Z]\w*\s*=", 3),
    sig(r"\b(public|private|protected|readonly)\s+\w+", 2),
    sig(r"\benum\s+[A-Z]\w*\s*\{", 2),
    sig(r"\bas\s+(const|string|number|any|unknown)\b", 2),
    sig(r"\w<[A-Z]\w*(\[\])?>", 1),
    sig(r"\bimplements\s+[A-Z]", 2),
];

const PYTHON: &[Signature] = &[
    sig(r"(?m)^\s*def\s+\w+\s*\(", 4),
    sig(r"(?m)^\s*class\s+\w+(\(.*\))?\s*:\s*$", 4),
    sig(r"(?m)^\s*from\s+[\w.]+\s+import\s+\w", 3),
    sig(r"(?m)^\s*import\s+[\w.]+(\s+as\s+\w+)?\s*$", 2),
    sig(r"\bself\b", 2),
    sig(r"(?m)^\s*(if|elif|else|for|while|try|except|finally|with)\b.*:\s*$", 2),
    sig(r"\belif\b", 3),
    sig(r"\bprint\s*\(", 1),
    sig(r"\b(None|True|False)\b", 1),
    sig(r"__\w+__", 2),
    sig(r"(?m)^\s*@\w+", 1),
    sig(r"\blambda\b", 1),
];

const RUST: &[Signature] = &[
    sig(r"\bfn\s+\w+\s*(<[^>]*>)?\s*\(", 4),
    sig(r"\blet\s+mut\b", 4),
    sig(r"\bimpl\b", 3),
    sig(r"\bpub\s+(fn|struct|enum|mod|use|trait|crate)\b", 3),
    sig(r"\buse\s+\w+(::\w+)+", 3),
    sig(r"\b(Some|Ok|Err)\(", 2),
    sig(r"&mut\b|&self\b|&'\w+", 3),
    sig(r"\b(println|print|format|vec|panic|assert|assert_eq|write|writeln)!", 3),
    sig(r"\bmatch\s+[^{\n]+\{", 1),
    sig(r"->\s*[A-Z&\w]", 1),
    sig(r"#\[\w+", 3),
    sig(r"::", 1),
    sig(r"\bstruct\s+[A-Z]\w*", 1),
];

const GO: &[Signature] = &[
    sig(r"(?m)^\s*package\s+\w+\s*$", 4),
    sig(r"\bfunc\s+(\([^)]*\)\s*)?\w+\s*\(", 4),
    sig(r":=", 2),
    sig(r"\bfmt\.\w+\(", 3),
    sig(r"\bimport\s*\(", 2),
    sig(r"\b(chan|defer)\b|\bgo\s+func\b", 2),
    sig(r"\berr\s*!=\s*nil\b", 4),
    sig(r"\btype\s+\w+\s+(struct|interface)\b", 3),
    sig(r"\bnil\b", 1),
];

const JAVA: &[Signature] = &[
    sig(r"\b(public|private|protected)\s+(static\s+)?(final\s+)?(class|interface|enum|void)\b", 3),
    sig(r"\bSystem\.(out|err)\.print", 4),
    sig(r"@Override\b", 3),
    sig(r"(?m)^\s*import\s+javax?\.", 4),
    sig(r"\bString\[\]\s+\w+", 3),
    sig(
        r"\b(public|private|protected)\s+(static\s+)?(final\s+)?[A-Z]\w*(<[^>]*>)?\s+\w+\s*[;=(]",
        2,
    ),
    sig(r"\bthrows\s+[A-Z]", 2),
    sig(r"(?m)^\s*package\s+[\w.]+;", 3),
    sig(r"\bnew\s+[A-Z]\w*(<[^>]*>)?\s*\(", 1),
];

const C: &[Signature] = &[
    sig(r#"(?m)^\s*#include\s*[<"][\w/.]+[>"]"#, 4),
    sig(r"\bint\s+main\s*\(", 3),
    sig(r"\bprintf\s*\(", 3),
    sig(r"\b(malloc|calloc|free|sizeof)\s*\(", 2),
    sig(r"\bNULL\b", 1),
    sig(r"(?m)^\s*#define\s+\w+", 3),
    sig(r"\b(unsigned|char|int|long|double|float|void)\s+\*+\w+", 2),
    sig(r"\w->\w", 1),
    sig(r"\bstruct\s+\w+\s*\{", 1),
];

const CPP: &[Signature] = &[
    sig(r"\bstd::\w+", 4),
    sig(r"\b(cout|cerr)\s*<<|\bcin\s*>>", 3),
    sig(r"\btemplate\s*<", 4),
    sig(r"\bnamespace\s+\w+|\busing\s+namespace\b", 3),
    sig(r"#include\s*<(iostream|vector|string|map|memory|algorithm)>", 4),
    sig(r"\bnullptr\b", 3),
    sig(r"\bauto\s+[&*]?\w+\s*[=:]", 1),
    sig(r"\b(public|private|protected)\s*:", 2),
    sig(r"\bvirtual\b", 2),
];

const CSS: &[Signature] = &[
    sig(r"(?m)^\s*[.#][\w-]+[^{\n]*\{", 2),
    sig(r"(?m)^\s*[\w-]+\s*:\s*[^;{}\n]+;\s*$", 1),
    sig(r"\b\d+(\.\d+)?(px|em|rem|vh|vw|pt)\b", 2),
    sig(r"#([0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b", 1),
    sig(r"@(media|import|keyframes|font-face)\b", 4),
    sig(r":(hover|focus|active|before|after|root|nth-child)\b", 2),
    sig(
        r"(?m)^\s*(color|margin|padding|display|font-size|font-family|background|border|width|height)(-[\w-]+)?\s*:",
        2,
    ),
];

const HTML: &[Signature] = &[
    sig(r"(?i)<!DOCTYPE\s+html", 10),
    sig(
        r"<(html|head|body|div|span|p|a|ul|ol|li|script|style|meta|link|table|tr|td|form|input|button|h[1-6]|section|nav|header|footer)\b[^>]*>",
        2,
    ),
    sig(
        r"</(html|head|body|div|span|p|a|ul|ol|li|script|style|table|form|button|h[1-6]|section|nav|header|footer)>",
        2,
    ),
    sig(r#"\b(class|href|src|id|rel|alt)="[^"]*""#, 1),
];

const JSON: &[Signature] = &[sig(r#""[^"\n]+"\s*:"#, 1)];

const BASH: &[Signature] = &[
    sig(r"\A#!\s*/(usr/)?bin/(env\s+)?(ba|z)?sh", 10),
    sig(
        r"(?m)^\s*(sudo|apt|apt-get|brew|npm|npx|yarn|pnpm|cargo|pip|pip3|git|cd|ls|mkdir|rm|cp|mv|echo|curl|wget|chmod|chown|docker|kubectl|make|source|grep|cat)\s",
        2,
    ),
    sig(r"\$\{?[A-Za-z_]\w*\}?", 1),
    sig(r"(?m)^\s*(fi|done|esac)\s*$", 3),
    sig(r"(?m)(\bthen|\bdo)\s*$", 2),
    sig(r"&&|\|\|", 1),
    sig(r"(?m)^\s*\$\s+\w", 2),
    sig(r"\s--?[a-z][\w-]*", 1),
    sig(r"\|\s*(grep|awk|sed|xargs|sort|head|tail|wc)\b", 3),
];

const SQL: &[Signature] = &[
    sig(r"(?is)\bselect\b.+?\bfrom\b", 5),
    sig(r"(?i)\b(insert\s+into|delete\s+from)\b", 5),
    sig(r"(?i)\bupdate\s+\w+\s+set\b", 5),
    sig(r"(?i)\bcreate\s+(table|index|view|database)\b", 5),
    sig(r"(?i)\bwhere\b", 2),
    sig(
        r"(?i)\b(inner\s+join|left\s+join|group\s+by|order\s+by|primary\s+key|varchar|not\s+null)\b",
        2,
    ),
];

const PROFILES: &[Profile] = &[
    Profile { language: Language::JavaScript, extends: None, signatures: JAVASCRIPT },
    Profile {
        language: Language::TypeScript,
        extends: Some(Language::JavaScript),
        signatures: TYPESCRIPT,
    },
    Profile { language: Language::Python, extends: None, signatures: PYTHON },
    Profile { language: Language::Rust, extends: None, signatures: RUST },
    Profile { language: Language::Go, extends: None, signatures: GO },
    Profile { language: Language::Java, extends: None, signatures: JAVA },
    Profile { language: Language::C, extends: None, signatures: C },
    Profile { language: Language::Cpp, extends: Some(Language::C), signatures: CPP },
    Profile { language: Language::Css, extends: None, signatures: CSS },
    Profile { language: Language::Html, extends: None, signatures: HTML },
    Profile { language: Language::Json, extends: None, signatures: JSON },
    Profile { language: Language::Bash, extends: None, signatures: BASH },
    Profile { language: Language::Sql, extends: None, signatures: SQL },
];

struct CompiledProfile {
    language: Language,
    extends: Option<Language>,
    rules: Vec<(Regex, u32)>,
}

static COMPILED: LazyLock<Result<Vec<CompiledProfile>, regex::Error>> = LazyLock::new(|| {
    PROFILES
        .iter()
        .map(|profile| {
            let rules = profile
                .signatures
                .iter()
                .map(|s| Regex::new(s.pattern).map(|re| (re, s.weight)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledProfile { language: profile.language, extends: profile.extends, rules })
        })
        .collect()
});

/// Guess the language of `code` with the default thresholds
///
/// Returns `None` when no candidate is confident enough or the detector fails.
///
/// # Examples
///
/// ```
/// use transcript_lens::content::{Language, detect_language};
///
/// let code = "fn main() {\n    let mut n = 0;\n    println!(\"{}\", n);\n}";
/// assert_eq!(detect_language(code), Some(Language::Rust));
/// assert_eq!(detect_language("just some words"), None);
/// ```
pub fn detect_language(code: &str) -> Option<Language> {
    detect_language_with(code, &DetectionConfig::default())
}

/// Guess the language of `code`, trusting the guess only above `min_relevance`
pub fn detect_language_with(code: &str, config: &DetectionConfig) -> Option<Language> {
    match guess_language(code, config.max_detect_bytes) {
        Ok(Some(guess)) if guess.relevance > config.min_relevance => Some(guess.language),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, len = code.len(), "language detection failed");
            None
        }
    }
}

/// Score every candidate and return the best one, if any scored above zero
///
/// Ties go to the candidate listed first in [`Language::ALL`].
pub fn guess_language(code: &str, max_bytes: usize) -> Result<Option<Guess>, DetectError> {
    if code.len() > max_bytes {
        return Err(DetectError::InputTooLarge { len: code.len(), max: max_bytes });
    }
    if code.contains('\0') {
        return Err(DetectError::Binary);
    }

    let profiles =
        (*COMPILED).as_ref().map_err(|e| DetectError::InvalidPattern(e.to_string()))?;

    let own_scores: Vec<(Language, u32)> =
        profiles.iter().map(|p| (p.language, profile_score(p, code))).collect();
    let own_score = |language: Language| {
        own_scores.iter().find(|(l, _)| *l == language).map(|(_, s)| *s).unwrap_or(0)
    };

    let mut best: Option<Guess> = None;
    for profile in profiles {
        let mut relevance = own_score(profile.language);
        if let Some(base) = profile.extends {
            relevance += own_score(base);
        }
        if profile.language == Language::Json {
            relevance += json_structure_bonus(code);
        }

        if relevance > 0 && best.is_none_or(|b| relevance > b.relevance) {
            best = Some(Guess { language: profile.language, relevance });
        }
    }

    Ok(best)
}

fn profile_score(profile: &CompiledProfile, code: &str) -> u32 {
    profile
        .rules
        .iter()
        .map(|(re, weight)| {
            let matches = re.find_iter(code).take(MAX_COUNTED_MATCHES).count();
            weight * matches as u32
        })
        .sum()
}

fn json_structure_bonus(code: &str) -> u32 {
    let trimmed = code.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return 0;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_)) => JSON_STRUCTURE_BONUS,
        _ => 0,
    }
}
