//! Reader output units.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Where a block of text came from inside its document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BlockKind {
    /// Running prose.
    Paragraph,
    /// Section title; never becomes an item on its own.
    Heading,
    /// A line from a line-oriented source such as PDF text.
    Line,
    /// One row of a word-processor table.
    TableRow,
    /// One row of a spreadsheet. The first sheet row holds the headers.
    SheetRow,
}

/// A unit of document text produced by a reader.
///
/// Single-cell kinds (paragraph, heading, line) keep their text in `cells[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub cells: Vec<String>,
}

impl TextBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::single(BlockKind::Paragraph, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::single(BlockKind::Heading, text)
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self::single(BlockKind::Line, text)
    }

    pub fn table_row(cells: Vec<String>) -> Self {
        Self {
            kind: BlockKind::TableRow,
            cells,
        }
    }

    pub fn sheet_row(cells: Vec<String>) -> Self {
        Self {
            kind: BlockKind::SheetRow,
            cells,
        }
    }

    fn single(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            cells: vec![text.into()],
        }
    }

    /// Text of the block with cells joined by a tab.
    pub fn text(&self) -> String {
        self.cells.join("\t")
    }

    /// Whether every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Flatten blocks into plain text, one block per line.
///
/// Table and sheet rows keep their cells separated by ` | ` so a model can
/// still see the column structure.
pub fn blocks_to_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| !b.is_blank())
        .map(|b| match b.kind {
            BlockKind::TableRow | BlockKind::SheetRow => b
                .cells
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" | "),
            _ => b.cells.first().map(|c| c.trim().to_string()).unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_wire_names() {
        assert_eq!(BlockKind::TableRow.to_string(), "tableRow");
        assert_eq!(
            serde_json::to_string(&BlockKind::SheetRow).unwrap(),
            "\"sheetRow\""
        );
    }

    #[test]
    fn test_blocks_to_text() {
        let blocks = vec![
            TextBlock::heading("Scope"),
            TextBlock::table_row(vec!["1".into(), "Is the fund open?".into(), "".into()]),
            TextBlock::paragraph("   "),
        ];
        assert_eq!(blocks_to_text(&blocks), "Scope\n1 | Is the fund open?");
    }
}
