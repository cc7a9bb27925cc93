use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::domain::{Chunk, RawDocument};
use crate::error::{codes, AppError};

// Cut preference at a char offset, strongest first.
const CUT_PARAGRAPH: u8 = 4;
const CUT_LINE: u8 = 3;
const CUT_SENTENCE: u8 = 2;
const CUT_WORD: u8 = 1;
const CUT_NONE: u8 = 0;

/// Splits raw text into overlapping character windows.
///
/// Every chunk is at most `chunk_size` characters. Each chunk after the first starts exactly
/// `chunk_overlap` characters before the end of its predecessor, so consecutive chunks share
/// that many characters verbatim. Cut points prefer paragraph breaks, then line breaks, then
/// sentence boundaries, then word boundaries; a hard cut happens only when the usable window
/// has none of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(AppError::new(
                codes::CONFIG_INVALID,
                "Chunk overlap must be smaller than a non-zero chunk size",
            )
            .with_details(format!("chunk_size={chunk_size}; chunk_overlap={chunk_overlap}")));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(cfg: &ChunkingConfig) -> Result<Self, AppError> {
        Self::new(cfg.chunk_size, cfg.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk each document in order; `sequence_index` restarts at 0 per source.
    pub fn chunk_documents(&self, docs: &[RawDocument]) -> Vec<Chunk> {
        let mut out = Vec::new();
        for doc in docs {
            for (i, text) in self.split_text(&doc.text).into_iter().enumerate() {
                out.push(Chunk {
                    text,
                    source_id: doc.source_id.clone(),
                    sequence_index: i as u32,
                });
            }
        }
        out
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        if n <= self.chunk_size {
            return vec![text.to_string()];
        }

        let ranks = cut_ranks(text, &chars);
        // Cuts earlier than half a chunk produce too many tiny chunks; the `+ 1` guarantees progress.
        let min_advance = (self.chunk_overlap + 1).max(self.chunk_size / 2);

        let mut out = Vec::new();
        let mut start = 0usize;
        loop {
            if n - start <= self.chunk_size {
                out.push(chars[start..].iter().collect());
                break;
            }
            let hi = start + self.chunk_size;
            let lo = start + min_advance;
            let end = best_cut(&ranks, lo, hi).unwrap_or(hi);
            out.push(chars[start..end].iter().collect());
            start = end - self.chunk_overlap;
        }
        out
    }
}

/// `ranks[i]` scores cutting right before `chars[i]`.
fn cut_ranks(text: &str, chars: &[char]) -> Vec<u8> {
    let n = chars.len();
    let mut ranks = vec![CUT_NONE; n + 1];

    let mut pos = 0usize;
    for sentence in text.split_sentence_bounds() {
        if pos > 0 && pos < n {
            ranks[pos] = CUT_SENTENCE;
        }
        pos += sentence.chars().count();
    }

    for i in 1..n {
        let prev = chars[i - 1];
        let rank = if prev == '\n' && i >= 2 && chars[i - 2] == '\n' {
            CUT_PARAGRAPH
        } else if prev == '\n' {
            CUT_LINE
        } else if prev.is_whitespace() && !chars[i].is_whitespace() {
            CUT_WORD
        } else {
            CUT_NONE
        };
        ranks[i] = ranks[i].max(rank);
    }
    ranks
}

/// Strongest cut in `lo..=hi`; among equals, the latest one.
fn best_cut(ranks: &[u8], lo: usize, hi: usize) -> Option<usize> {
    let mut best: Option<(u8, usize)> = None;
    for i in (lo..=hi).rev() {
        let r = ranks[i];
        if r == CUT_NONE {
            continue;
        }
        match best {
            Some((br, _)) if br >= r => {}
            _ => best = Some((r, i)),
        }
        if r == CUT_PARAGRAPH {
            break;
        }
    }
    best.map(|(_, i)| i)
}
