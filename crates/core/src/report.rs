//! Post-import sanity report.

use crate::error::CodeResult;
use crate::node::CodeNode;
use crate::store::CodeStore;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub code: String,
    pub description: String,
    pub child_count: usize,
    pub first_child: Option<CodeNode>,
}

/// Node total plus a look at one chapter, to confirm an import landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub total: usize,
    pub chapter_code: String,
    pub chapter: Option<ChapterReport>,
}

pub fn verify(store: &dyn CodeStore, chapter_code: &str) -> CodeResult<VerifyReport> {
    let total = store.count()?;
    let chapter = match store.find_by_code(chapter_code)? {
        Some(node) => {
            let children = store.children_of(&node.id)?;
            Some(ChapterReport {
                code: node.code,
                description: node.description,
                child_count: children.len(),
                first_child: children.into_iter().next(),
            })
        }
        None => None,
    };

    Ok(VerifyReport {
        total,
        chapter_code: chapter_code.to_string(),
        chapter,
    })
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total ICD10 Codes: {}", self.total)?;
        match &self.chapter {
            Some(chapter) => {
                writeln!(f, "Chapter {} found: {}", chapter.code, chapter.description)?;
                write!(
                    f,
                    "Chapter {} children count: {}",
                    chapter.code, chapter.child_count
                )?;
                if let Some(child) = &chapter.first_child {
                    write!(f, "\nFirst child: {} - {}", child.code, child.description)?;
                }
                Ok(())
            }
            None => write!(f, "Chapter {} NOT found", self.chapter_code),
        }
    }
}
