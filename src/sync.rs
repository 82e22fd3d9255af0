// ABOUTME: Backup orchestration across starred items and tags
// ABOUTME: Fetches each stream, renders Markdown, writes one file per scope

use crate::{
    api::{ApiClient, FetchOutcome, StreamId},
    convert::{render_document, DocumentHeader},
    storage::BackupDir,
    Error, Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// What the user asked to back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Starred,
    Tag(String),
    AllTags,
}

/// Starred items run first; a named tag replaces the all-tags sweep, and
/// `--starred` alone suppresses it.
pub fn plan_scopes(tag: Option<String>, starred: bool) -> Vec<Scope> {
    let mut scopes = Vec::new();
    if starred {
        scopes.push(Scope::Starred);
    }
    match tag {
        Some(tag) => scopes.push(Scope::Tag(tag)),
        None if !starred => scopes.push(Scope::AllTags),
        None => {}
    }
    scopes
}

#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    /// Abort the run when a stream could only be fetched partially.
    pub fail_fast: bool,
}

#[derive(Debug, Clone)]
pub struct ScopeReport {
    pub name: String,
    pub items: usize,
    pub pages: usize,
    pub path: Option<PathBuf>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BackupReport {
    pub scopes: Vec<ScopeReport>,
}

impl BackupReport {
    pub fn total_items(&self) -> usize {
        self.scopes.iter().map(|s| s.items).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScopeReport> {
        self.scopes.iter().filter(|s| s.error.is_some())
    }
}

fn resolve_streams(client: &ApiClient, scopes: &[Scope]) -> Result<Vec<StreamId>> {
    let mut streams = Vec::new();
    for scope in scopes {
        match scope {
            Scope::Starred => streams.push(StreamId::Starred),
            Scope::Tag(name) => streams.push(StreamId::Label(name.clone())),
            Scope::AllTags => {
                let tags = client.list_tags()?;
                println!("Found {} tags: {}", tags.len(), tags.join(", "));
                streams.extend(tags.into_iter().map(StreamId::Label));
            }
        }
    }
    Ok(streams)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("[{bar:40}] {pos}/{len} tags")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}

fn backup_stream(
    client: &ApiClient,
    dir: &BackupDir,
    stream: &StreamId,
    pb: &ProgressBar,
) -> Result<(ScopeReport, Option<Error>)> {
    let name = stream.display_name().to_string();
    let (noun, header) = match stream {
        StreamId::Starred => ("starred items", DocumentHeader::Starred),
        StreamId::Label(tag) => ("items", DocumentHeader::Tag(tag)),
    };

    pb.suspend(|| match stream {
        StreamId::Starred => println!("Backing up starred items..."),
        StreamId::Label(tag) => println!("Backing up tag: {}", tag),
    });

    let FetchOutcome {
        items,
        pages,
        error,
    } = client.fetch_stream(stream, |fetched| {
        pb.suspend(|| println!("  Fetched {} {}, continuing...", fetched, noun));
    });

    if let Some(e) = &error {
        pb.suspend(|| println!("Error fetching items for {}: {}", name, e));
    }

    let path = if items.is_empty() {
        pb.suspend(|| println!("No {} found for '{}'", noun, name));
        None
    } else {
        let document = render_document(header, &items)?;
        let path = dir.write(&name, &document)?;
        pb.suspend(|| println!("Saved {} {} for '{}' to {}", items.len(), noun, name, path.display()));
        Some(path)
    };

    info!(scope = %name, items = items.len(), pages, complete = error.is_none(), "scope finished");

    let report = ScopeReport {
        name,
        items: items.len(),
        pages,
        path,
        error: error.as_ref().map(ToString::to_string),
    };
    Ok((report, error))
}

/// Runs every scope in order. Tag listing failures abort the run; a stream
/// that fails mid-pagination keeps what it fetched and is reported, or aborts
/// the run after writing when `fail_fast` is set.
pub fn run_backup(
    client: &ApiClient,
    dir: &BackupDir,
    scopes: &[Scope],
    options: &BackupOptions,
) -> Result<BackupReport> {
    dir.ensure()?;

    let streams = resolve_streams(client, scopes)?;
    let pb = progress_bar(streams.len());
    let mut report = BackupReport::default();

    for stream in &streams {
        let (scope_report, error) = backup_stream(client, dir, stream, &pb)?;

        if let Some(cause) = error {
            warn!(scope = %scope_report.name, items = scope_report.items, "partial backup");
            if options.fail_fast {
                pb.abandon();
                return Err(Error::PartialFetch {
                    scope: scope_report.name,
                    cause: cause.to_string(),
                });
            }
        }

        pb.suspend(|| {
            println!(
                "Completed backup of {} items for: {}",
                scope_report.items, scope_report.name
            )
        });
        report.scopes.push(scope_report);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}
