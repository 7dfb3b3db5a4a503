//! Rule-based English lemmatizer.
//!
//! Irregular forms come from an exception table; everything else goes through
//! a handful of suffix rules:
//!
//! 1. `-ies`/`-ied` → `-y`
//! 2. `-sses` → `-ss`; `-ches`/`-shes`/`-xes`/`-zzes` drop `-es`
//! 3. plural `-s` (but not `-ss`, `-us`, `-is`)
//! 4. `-ing`/`-ed` when the remaining stem has a vowel, undoubling a final
//!    double consonant (`running` → `run`) or restoring a silent `e` on short
//!    consonant-vowel-consonant stems (`loving` → `love`)
//!
//! The rules are applied until the word stops changing. Every suffix rule
//! shortens the word and every exception target is itself left alone by the
//! rules, so the loop terminates and the result is a fixed point.
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::analysis::token_filter::lemma::Lemmatizer;
//! use tweet_sentiment::analysis::token_filter::lemma::rule::RuleLemmatizer;
//!
//! let lemmatizer = RuleLemmatizer::new();
//!
//! assert_eq!(lemmatizer.lemmatize("running"), "run");
//! assert_eq!(lemmatizer.lemmatize("loved"), "love");
//! assert_eq!(lemmatizer.lemmatize("cities"), "city");
//! assert_eq!(lemmatizer.lemmatize("went"), "go");
//! assert_eq!(lemmatizer.lemmatize("amazing"), "amazing");
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::analysis::token_filter::lemma::Lemmatizer;

/// Irregular forms and words the suffix rules would mangle.
const EXCEPTIONS: &[(&str, &str)] = &[
    // be / have / do / go
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("goes", "go"),
    ("went", "go"),
    ("gone", "go"),
    ("going", "go"),
    // irregular verbs
    ("ate", "eat"),
    ("eaten", "eat"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("broke", "break"),
    ("broken", "break"),
    ("came", "come"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("dying", "die"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("felt", "feel"),
    ("flew", "fly"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("got", "get"),
    ("gotten", "get"),
    ("heard", "hear"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("left", "leave"),
    ("lost", "lose"),
    ("lying", "lie"),
    ("made", "make"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("said", "say"),
    ("sat", "sit"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("slept", "sleep"),
    ("spent", "spend"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stood", "stand"),
    ("taken", "take"),
    ("took", "take"),
    ("thought", "think"),
    ("told", "tell"),
    ("tying", "tie"),
    ("understood", "understand"),
    ("won", "win"),
    ("wrote", "write"),
    ("written", "write"),
    ("agreed", "agree"),
    ("excited", "excite"),
    ("used", "use"),
    // irregular nouns
    ("children", "child"),
    ("cookies", "cookie"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("movies", "movie"),
    ("people", "people"),
    ("teeth", "tooth"),
    ("women", "woman"),
    // comparatives
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    // forms the suffix rules must leave alone
    ("amazing", "amazing"),
    ("annoying", "annoying"),
    ("anything", "anything"),
    ("boring", "boring"),
    ("ceiling", "ceiling"),
    ("evening", "evening"),
    ("everything", "everything"),
    ("exciting", "exciting"),
    ("interesting", "interesting"),
    ("morning", "morning"),
    ("news", "news"),
    ("nothing", "nothing"),
    ("series", "series"),
    ("something", "something"),
    ("thanks", "thanks"),
    ("wedding", "wedding"),
];

static DEFAULT_EXCEPTIONS: LazyLock<Arc<HashMap<String, String>>> = LazyLock::new(|| {
    Arc::new(
        EXCEPTIONS
            .iter()
            .map(|&(from, to)| (from.to_string(), to.to_string()))
            .collect(),
    )
});

/// Rule-based English lemmatizer with an exception table.
#[derive(Debug, Clone)]
pub struct RuleLemmatizer {
    exceptions: Arc<HashMap<String, String>>,
}

impl RuleLemmatizer {
    /// Create a new lemmatizer with the built-in exception table.
    pub fn new() -> Self {
        RuleLemmatizer {
            exceptions: Arc::clone(&DEFAULT_EXCEPTIONS),
        }
    }

    /// Number of entries in the exception table.
    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Apply one round of rewriting: an exception lookup or a single suffix rule.
    fn step(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return lemma.clone();
        }

        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 3 {
            return word.to_string();
        }

        if chars.len() > 4 {
            if let Some(stem) = word
                .strip_suffix("ies")
                .or_else(|| word.strip_suffix("ied"))
            {
                return format!("{stem}y");
            }
        }

        if let Some(stem) = word.strip_suffix("sses") {
            return format!("{stem}ss");
        }

        for suffix in ["ches", "shes", "xes", "zzes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }

        if let Some(stem) = word.strip_suffix('s') {
            if !(stem.ends_with('s') || stem.ends_with('u') || stem.ends_with('i')) {
                return stem.to_string();
            }
            return word.to_string();
        }

        if word.ends_with("eed") {
            return word.to_string();
        }

        if let Some(stem) = word
            .strip_suffix("ing")
            .or_else(|| word.strip_suffix("ed"))
        {
            let stem: Vec<char> = stem.chars().collect();
            if stem.len() >= 2 && (0..stem.len()).any(|i| is_vowel(&stem, i)) {
                return restore_stem(&stem);
            }
        }

        word.to_string()
    }
}

impl Default for RuleLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for RuleLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        loop {
            let next = self.step(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn name(&self) -> &'static str {
        "rule"
    }
}

/// Vowel test in the Porter sense: `y` is a vowel after a consonant.
fn is_vowel(chars: &[char], pos: usize) -> bool {
    match chars[pos] {
        'a' | 'e' | 'i' | 'o' | 'u' => true,
        'y' if pos > 0 => !is_vowel(chars, pos - 1),
        _ => false,
    }
}

/// Number of vowel-consonant sequences in the word.
fn measure(chars: &[char]) -> usize {
    let mut m = 0;
    let mut previous_vowel = false;
    for i in 0..chars.len() {
        let vowel = is_vowel(chars, i);
        if previous_vowel && !vowel {
            m += 1;
        }
        previous_vowel = vowel;
    }
    m
}

/// Ends consonant-vowel-consonant, where the last consonant is not w, x or y.
fn ends_cvc(chars: &[char]) -> bool {
    let n = chars.len();
    n >= 3
        && !is_vowel(chars, n - 3)
        && is_vowel(chars, n - 2)
        && !is_vowel(chars, n - 1)
        && !matches!(chars[n - 1], 'w' | 'x' | 'y')
}

/// Repair a stem left behind by removing `-ing` or `-ed`.
fn restore_stem(stem: &[char]) -> String {
    let n = stem.len();
    let last = stem[n - 1];
    if n >= 2 && last == stem[n - 2] && !is_vowel(stem, n - 1) && !matches!(last, 'l' | 's' | 'z')
    {
        return stem[..n - 1].iter().collect();
    }

    let mut restored: String = stem.iter().collect();
    if ends_cvc(stem) && measure(stem) == 1 {
        restored.push('e');
    }
    restored
}
