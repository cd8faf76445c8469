use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::task::spawn_blocking;

use crate::config::{AssociationsOptions, HttpOptions, MarkerPolicy, ProteinTreeOptions};
use crate::locate::output_path;
use crate::parse::{category_links, extract_table, identifier_tokens};
use crate::request::{fetch_many, Session};
use crate::table::RecordSet;
use crate::tree::{CategoryKey, ProteinTree};
use crate::{info_time, warn_time, Error, Result, DBDB_FILE_NAME, SYNSYS_FILE_NAME};

/// Scrapes the DBDB association table into `<out_dir>/rochester-dbdb-associations.csv`.
/// Returns the path that was written.
pub async fn process_associations(
    http: &HttpOptions,
    opts: &AssociationsOptions,
    out_dir: &Path,
) -> Result<PathBuf> {
    let start_time = Local::now();
    let path = output_path(out_dir, DBDB_FILE_NAME);
    let session = Session::new(http)?;

    info_time!("Requesting {}", opts.url);
    let html = session.get_text(&opts.url).await?;

    let records = spawn_blocking({
        let matcher = opts.table.clone();
        move || -> Result<RecordSet> {
            let table = extract_table(&html, &matcher)?;
            info_time!(
                "Found {} with {} columns and {} rows",
                matcher,
                table.header.len(),
                table.rows.len()
            );
            RecordSet::from_rows(table.header, table.rows)
        }
    })
    .await??;

    records.save(&path)?;
    info_time!(start_time, "Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}

/// Walks the SynSysNet class overview, visits every category page and writes
/// the identifiers found under each `class:subclass` to
/// `<out_dir>/SynSysNet-Synaptic-Protein-Tree.csv`. Returns the path that was written.
pub async fn process_protein_tree(
    http: &HttpOptions,
    opts: &ProteinTreeOptions,
    out_dir: &Path,
) -> Result<PathBuf> {
    let start_time = Local::now();
    let path = output_path(out_dir, SYNSYS_FILE_NAME);
    let session = Session::new(http)?;

    info_time!("Requesting {}", opts.url);
    let html = session.get_text(&opts.url).await?;
    let links = spawn_blocking({
        let base_url = opts.base_url.clone();
        move || category_links(&html, &base_url)
    })
    .await??;
    info_time!("Found {} category links", links.len());

    // Keys come from the URL alone, so a bad link is caught before anything is fetched.
    let targets = category_targets(links, opts.on_missing_marker)?;

    let pages_time = Local::now();
    let pages = fetch_many(&session, targets, opts.concurrency, opts.on_page_error).await?;
    info_time!(pages_time, "Fetched {} category pages", pages.len());

    let tree = spawn_blocking({
        let on_missing = opts.on_missing_marker;
        let on_duplicate = opts.on_duplicate;
        move || -> Result<ProteinTree> {
            let mut tree = ProteinTree::new();
            for (key, page) in pages {
                let tokens = identifier_tokens(&page, on_missing)?;
                tree.insert(key, tokens, on_duplicate)?;
            }
            Ok(tree)
        }
    })
    .await??;

    let records = tree.into_record_set();
    records.save(&path)?;
    info_time!(start_time, "Wrote {} categories to {}", records.len(), path.display());
    Ok(path)
}

fn category_targets(
    links: Vec<String>,
    on_missing: MarkerPolicy,
) -> Result<Vec<(CategoryKey, String)>> {
    let mut targets = Vec::with_capacity(links.len());
    for url in links {
        match CategoryKey::from_url(&url) {
            Ok(key) => targets.push((key, url)),
            Err(err @ Error::MissingMarker { .. }) if on_missing == MarkerPolicy::Skip => {
                warn_time!("skipping category link: {}", err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_keep_link_order() {
        let links = vec![
            "http://h/index.php?site=search&Function=B&synapt=X".to_string(),
            "http://h/index.php?site=search&Function=A&synapt=X".to_string(),
        ];
        let targets = category_targets(links.clone(), MarkerPolicy::Fail).unwrap();
        let keys: Vec<String> = targets.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["X:B", "X:A"]);
        assert_eq!(targets[1].1, links[1]);
    }

    #[test]
    fn bad_link_policy() {
        let links = vec![
            "http://h/index.php?site=search&Function=B".to_string(),
            "http://h/index.php?site=search&Function=A&synapt=X".to_string(),
        ];
        let err = category_targets(links.clone(), MarkerPolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::MissingMarker { marker: "synapt=", .. }));

        let targets = category_targets(links, MarkerPolicy::Skip).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0.to_string(), "X:A");
    }
}
