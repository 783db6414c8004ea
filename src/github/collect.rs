// src/github/collect.rs
// =============================================================================
// Walks a repository tree and gathers the text of every source file.
//
// How it works:
// 1. List the directory (the root on the first call)
// 2. For each entry, in the order GitHub returned it:
//    - file with an allow-listed extension: take its text
//    - directory: walk it completely, then carry on with the next sibling
//    - anything else: skip
// 3. The first error stops the whole walk; nothing collected so far is kept
//
// Walking is strictly sequential and depth-first so that the same repository
// always produces the same aggregate.
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::contents::{decode_inline, EntryKind, RepositorySource, TreeEntry};
use super::repo::RepoId;
use crate::error::CollectError;

/// File extensions that are read into the aggregate.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "html", "css", "scss", "md", "json", "txt", "py", "java", "cpp",
    "c", "go", "rs", "php", "rb", "swift", "kt", "dart", "vue",
];

/// One file that made it into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedFile {
    pub name: String,
    pub path: String,
    pub text: String,
}

/// Lowercased text after the last '.', or None when the name has no dot.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether a file name passes the extension allow-list.
pub fn is_allowed(name: &str) -> bool {
    extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Collects every allow-listed file of `repo`, depth-first in listing order.
pub async fn collect<S>(source: &S, repo: &RepoId) -> Result<Vec<CollectedFile>, CollectError>
where
    S: RepositorySource + ?Sized,
{
    info!(repo = %repo, access = ?repo.access, "collecting repository files");

    let files = collect_dir(source, repo, String::new()).await?;

    info!(
        files = files.len(),
        bytes = files.iter().map(|f| f.text.len()).sum::<usize>(),
        "repository collected"
    );
    Ok(files)
}

/// Joins collected files into the single text blob sent to the generator.
///
/// Each file becomes `"<name> \n\n<text>"`, with no separator between files.
pub fn flatten(files: &[CollectedFile]) -> String {
    let mut aggregate = String::new();
    for file in files {
        aggregate.push_str(&file.name);
        aggregate.push_str(" \n\n");
        aggregate.push_str(&file.text);
    }
    aggregate
}

// Async functions can't call themselves directly (the future would have an
// infinite size), so the recursive step returns a boxed future.
fn collect_dir<'a, S>(
    source: &'a S,
    repo: &'a RepoId,
    path: String,
) -> BoxFuture<'a, Result<Vec<CollectedFile>, CollectError>>
where
    S: RepositorySource + ?Sized,
{
    async move {
        let entries = source.list(repo, &path).await?;
        debug!(path = %path, entries = entries.len(), "listed directory");

        let mut files = Vec::new();

        for entry in entries {
            match entry.kind {
                EntryKind::File => {
                    if !is_allowed(&entry.name) {
                        debug!(path = %entry.path, "skipping file outside allow-list");
                        continue;
                    }
                    if let Some(file) = read_file(source, repo, entry).await? {
                        files.push(file);
                    }
                }
                EntryKind::Dir => {
                    let nested = collect_dir(source, repo, entry.path).await?;
                    files.extend(nested);
                }
                EntryKind::Symlink | EntryKind::Submodule | EntryKind::Other => {
                    debug!(path = %entry.path, kind = ?entry.kind, "skipping entry");
                }
            }
        }

        Ok(files)
    }
    .boxed()
}

// Inline content is only trusted for private reads; everything else goes
// through the raw download URL.
async fn read_file<S>(
    source: &S,
    repo: &RepoId,
    entry: TreeEntry,
) -> Result<Option<CollectedFile>, CollectError>
where
    S: RepositorySource + ?Sized,
{
    let inline = match (&entry.content, repo.access.is_private()) {
        (Some(content), true) => {
            let decoded = decode_inline(content);
            if decoded.is_none() {
                warn!(path = %entry.path, "inline content is not valid base64, downloading instead");
            }
            decoded
        }
        _ => None,
    };

    let text = match (inline, &entry.download_url) {
        (Some(text), _) => text,
        (None, Some(url)) => source.download(url).await?,
        (None, None) => {
            warn!(path = %entry.path, "file has no content and no download URL, skipping");
            return Ok(None);
        }
    };

    debug!(path = %entry.path, bytes = text.len(), "collected file");

    Ok(Some(CollectedFile {
        name: entry.name,
        path: entry.path,
        text,
    }))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is BoxFuture?
//    - Pin<Box<dyn Future<Output = T> + Send + 'a>>
//    - Boxing puts the future on the heap, giving it a known size
//    - .boxed() from FutureExt does the pinning and boxing for us
//
// 2. What does `S: RepositorySource + ?Sized` mean?
//    - S can be any type implementing the trait...
//    - ...including `dyn RepositorySource`, which has no size known at
//      compile time (?Sized lifts the default Sized requirement)
//
// 3. Why does the walk return Vec<CollectedFile> instead of a String?
//    - `collect --json` prints the file list; `flatten` builds the blob
//    - Both views come from the same walk
// -----------------------------------------------------------------------------
