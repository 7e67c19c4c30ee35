//! Line classifier and block segmenter
//!
//! Splits one page's line stream into per-starter blocks. A block opens on
//! one of two header shapes:
//!
//! - single-line: `7 Testhorse 2025: 10 Starts - 3 Siege - ...`
//! - wrapped: a name-only line, a start-number-only line, then the
//!   pedigree line (`4j. ...`)
//!
//! Every other line belongs to the open block, or to the page preamble
//! when no block is open yet.

use regex::Regex;
use serde::Serialize;

/// Which header shape opened a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockShape {
    SingleLine,
    Wrapped,
}

/// Contiguous run of lines belonging to one starter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub shape: BlockShape,
    /// First line is the (possibly synthesized) header line
    pub lines: Vec<String>,
}

impl Block {
    fn open(shape: BlockShape, header: String) -> Self {
        Self {
            shape,
            lines: vec![header],
        }
    }

    pub fn header(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    /// All block lines joined with '\n'
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub struct BlockSegmenter {
    single_line: Regex,
    name_only: Regex,
    number_only: Regex,
    pedigree_start: Regex,
}

impl Default for BlockSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSegmenter {
    pub fn new() -> Self {
        Self {
            single_line: Regex::new(
                r"^(\d{1,2})\s+(\p{Lu}[\p{L}\s'\-]+?)\s+(?:[\d.]+\s*€\s+)?\d{4}:\s*\d+\s+Starts?",
            )
            .unwrap(),
            name_only: Regex::new(r"^(\p{Lu}[\p{L}\s'\-]+)$").unwrap(),
            number_only: Regex::new(r"^(\d{1,2})$").unwrap(),
            pedigree_start: Regex::new(r"^\d+j\.").unwrap(),
        }
    }

    pub fn is_single_line_header(&self, line: &str) -> bool {
        self.single_line.is_match(line)
    }

    /// Wrapped header at `lines[i]`: returns the synthesized header line
    fn wrapped_header(&self, lines: &[&str], i: usize) -> Option<String> {
        let name = lines.get(i)?;
        let number = lines.get(i + 1)?.trim();
        let pedigree = lines.get(i + 2)?;

        if self.name_only.is_match(name)
            && self.number_only.is_match(number)
            && self.pedigree_start.is_match(pedigree)
        {
            Some(format!("{} {}", number, name.trim()))
        } else {
            None
        }
    }

    /// Split a page into blocks, dropping preamble lines
    pub fn segment(&self, lines: &[&str]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut current: Option<Block> = None;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if self.single_line.is_match(line) {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(Block::open(BlockShape::SingleLine, line.to_string()));
                i += 1;
                continue;
            }

            if let Some(header) = self.wrapped_header(lines, i) {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                let mut block = Block::open(BlockShape::Wrapped, header);
                block.lines.push(lines[i + 2].to_string());
                current = Some(block);
                i += 3;
                continue;
            }

            match current.as_mut() {
                Some(block) => block.lines.push(line.to_string()),
                None => tracing::trace!("preamble line: {:?}", line),
            }
            i += 1;
        }

        if let Some(block) = current {
            blocks.push(block);
        }

        blocks
    }
}
