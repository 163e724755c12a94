use crate::content::document::{parse_document, render_document, RawDocument, MARKER};

/// Separator the content generator writes between documents of a collection file.
pub const SEPARATOR: &str = "\n---\n\n";

/// Splits a collection file into raw document texts.
///
/// The separator is also what a closing marker followed by a blank line looks
/// like, so a split can cut a document between its metadata block and its
/// body. A marker-led chunk followed by a chunk that is not marker-led is
/// rejoined as metadata plus body; a marker-led chunk followed by another
/// marker-led chunk (or nothing) is a metadata-only document. Chunks that are
/// neither are orphans and are dropped.
pub fn split_collection(input: &str) -> Vec<String> {
    let chunks: Vec<&str> = input
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    let mut documents = Vec::with_capacity(chunks.len());
    let mut i = 0;

    while i < chunks.len() {
        let chunk = chunks[i];
        i += 1;

        if !chunk.starts_with(MARKER) {
            tracing::debug!("Dropping orphaned chunk in collection ({} bytes)", chunk.len());
            continue;
        }

        let mut document = close_metadata(chunk);
        if let Some(body) = chunks.get(i).filter(|next| !next.starts_with(MARKER)) {
            document.push_str("\n\n");
            document.push_str(body);
            i += 1;
        }
        documents.push(document);
    }

    documents
}

/// Splits and parses a collection file, dropping documents without metadata.
pub fn parse_collection(input: &str) -> Vec<RawDocument> {
    split_collection(input)
        .iter()
        .map(|text| parse_document(text))
        .filter(|doc| {
            if doc.is_empty() {
                tracing::debug!("Dropping collection document with no metadata");
            }
            !doc.is_empty()
        })
        .collect()
}

/// Writes documents in the collection file convention.
pub fn join_collection(documents: &[RawDocument]) -> String {
    let mut out = documents
        .iter()
        .map(render_document)
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Re-appends the closing marker when the split consumed it.
fn close_metadata(chunk: &str) -> String {
    let has_closing = chunk.lines().skip(1).any(|line| line.trim_end() == MARKER);
    if has_closing {
        chunk.to_string()
    } else {
        format!("{chunk}\n{MARKER}")
    }
}
