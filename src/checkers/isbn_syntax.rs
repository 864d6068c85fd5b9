use crate::emit;
use crate::engine::analysis::PageAnalysis;
use crate::parser::scanner::byte_at;
use crate::parser::types::Isbn;
use crate::types::{Finding, Replacement};

use super::Checker;

pub const ID: u32 = 69;

/// ISBNs with a bad checksum, a bad length or noise around the number.
pub struct IsbnSyntaxChecker;

impl Checker for IsbnSyntaxChecker {
    fn id(&self) -> u32 {
        ID
    }

    fn name(&self) -> &'static str {
        "ISBN wrong syntax"
    }

    fn analyze(
        &self,
        analysis: &PageAnalysis,
        mut findings: Option<&mut Vec<Finding>>,
        only_automatic: bool,
    ) -> bool {
        let contents = analysis.contents();
        let mut found = false;
        for isbn in analysis.isbns().iter().filter(|i| !i.is_correct()) {
            found = true;
            emit!(findings, only_automatic, {
                let mut finding = Finding::new(ID, isbn.begin, isbn.end, message(isbn));
                // A valid number glued to a letter may be part of something else.
                let glued = byte_at(contents, isbn.end).is_some_and(|b| b.is_ascii_alphabetic());
                if isbn.valid_number && !glued {
                    finding.add_replacement(Replacement::automatic(
                        format!("ISBN {}", isbn.number),
                        true,
                    ));
                }
                finding
            });
        }
        found
    }
}

fn message(isbn: &Isbn) -> String {
    if !isbn.valid_number {
        format!("Invalid ISBN number \"{}\"", isbn.number)
    } else {
        format!("Incorrect ISBN syntax \"{}\"", isbn.raw.trim())
    }
}
