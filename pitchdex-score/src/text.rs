//! Markup stripping, tokenization and raw text counts

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, CharacterTokens, StartTag, TagToken, Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

/// Characters trimmed from both ends of every token
pub const TRIM_CHARS: &[char] = &[' ', ',', '.', ';', '!', '?', '"', '-'];

/// Collects character tokens in stream order
#[derive(Default)]
struct TextCollector {
    text: String,
}

impl TokenSink for TextCollector {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            CharacterTokens(chars) => self.text.push_str(&chars),
            // Element contents the tokenizer must not read as markup
            TagToken(tag) if tag.kind == StartTag && !tag.self_closing => {
                match &*tag.name {
                    "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                        return TokenSinkResult::RawData(RawKind::Rawtext)
                    }
                    "title" | "textarea" => return TokenSinkResult::RawData(RawKind::Rcdata),
                    _ => {}
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Remove markup, keeping text in document order
///
/// Works at the tokenizer level: no tree is built, so tags never move text
/// around and malformed or unbalanced tags are simply skipped. Entities are
/// decoded. Whitespace inside text runs is kept as-is.
pub fn strip_markup(text: &str) -> String {
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(text));

    let mut tokenizer = Tokenizer::new(TextCollector::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.text
}

/// Normalize one raw token: trim [`TRIM_CHARS`] and lowercase
pub fn base_word(word: &str) -> String {
    word.trim_matches(TRIM_CHARS).to_lowercase()
}

/// Split plain text on single spaces into normalized, non-empty tokens
pub fn tokenize(plain: &str) -> Vec<String> {
    plain
        .split(' ')
        .map(base_word)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Naive sentence count: number of '.' characters
pub fn sentence_count(plain: &str) -> usize {
    plain.matches('.').count()
}

/// A review body stripped and tokenized once, shared by every metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMetrics {
    pub plain: String,
    pub tokens: Vec<String>,
}

impl TextMetrics {
    pub fn analyze(body: &str) -> Self {
        let plain = strip_markup(body);
        let tokens = tokenize(&plain);
        Self { plain, tokens }
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    /// Length in characters, not bytes
    pub fn character_count(&self) -> usize {
        self.plain.chars().count()
    }

    pub fn sentence_count(&self) -> usize {
        sentence_count(&self.plain)
    }
}
