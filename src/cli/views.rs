//! Offline commands: `views` and `endpoint`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use url::Url;

use crate::channel::derive_endpoint;
use crate::config::ClientConfig;
use crate::dom::{Document, TlParser};
use crate::event::EventCategory;
use crate::log;
use crate::view::discover_anchors;

/// Read and parse a server-rendered page.
pub fn load_page(path: &Path) -> Result<Document> {
    let markup = fs::read_to_string(path)
        .with_context(|| format!("failed to read page {}", path.display()))?;
    Document::parse(&markup, &TlParser)
        .with_context(|| format!("failed to parse page {}", path.display()))
}

/// One view declared by a page.
#[derive(Debug, PartialEq, Eq)]
pub struct ViewSummary {
    pub view: String,
    pub anchors: usize,
    /// `category:event` pairs declared under the view's anchors
    pub events: Vec<String>,
}

/// Views of `doc` in order of first appearance.
pub fn summarize(doc: &Document, attribute: &str) -> Vec<ViewSummary> {
    let mut summaries: Vec<ViewSummary> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for (anchor, view) in discover_anchors(doc, attribute) {
        let slot = *index.entry(view.clone()).or_insert_with(|| {
            summaries.push(ViewSummary {
                view: view.clone(),
                anchors: 0,
                events: Vec::new(),
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];
        summary.anchors += 1;

        for node in doc.descendants(anchor) {
            // events below a nested anchor belong to that view
            if doc.closest_with_attr(node, attribute) != Some(anchor) {
                continue;
            }
            for category in EventCategory::ALL {
                if let Some(event) = doc.attr(node, category.attribute())
                    && !event.is_empty()
                {
                    let entry = format!("{category}:{event}");
                    if !summary.events.contains(&entry) {
                        summary.events.push(entry);
                    }
                }
            }
        }
    }
    summaries
}

pub fn list_views(config: &ClientConfig, page: &Path) -> Result<()> {
    let doc = load_page(page)?;
    let summaries = summarize(&doc, &config.views.attribute);

    if summaries.is_empty() {
        log!("view"; "no `{}` anchors in {}", config.views.attribute, page.display());
        return Ok(());
    }

    let mut out = String::new();
    for summary in &summaries {
        let _ = write!(out, "{} ({} anchor", summary.view, summary.anchors);
        if summary.anchors != 1 {
            out.push('s');
        }
        out.push(')');
        if !summary.events.is_empty() {
            let _ = write!(out, ": {}", summary.events.join(", "));
        }
        out.push('\n');
    }
    print!("{out}");
    Ok(())
}

pub fn print_endpoint(config: &ClientConfig, url: &Url) -> Result<()> {
    let endpoint = derive_endpoint(url, &config.channel.route)
        .with_context(|| format!("cannot derive an endpoint from {url}"))?;
    println!("{endpoint}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTR: &str = "data-live-view";

    #[test]
    fn test_summarize_groups_shared_views() {
        let doc = Document::parse(
            r#"
            <div data-live-view="clock"></div>
            <div data-live-view="todo">
              <input live-input="search"><button live-click="add">+</button>
              <button live-click="add">+</button>
            </div>
            <div data-live-view="clock"></div>
            "#,
            &TlParser,
        )
        .unwrap();

        let summaries = summarize(&doc, ATTR);
        assert_eq!(
            summaries,
            vec![
                ViewSummary {
                    view: "clock".into(),
                    anchors: 2,
                    events: vec![],
                },
                ViewSummary {
                    view: "todo".into(),
                    anchors: 1,
                    events: vec!["input:search".into(), "click:add".into()],
                },
            ]
        );
    }

    #[test]
    fn test_nested_view_events_not_counted_twice() {
        let doc = Document::parse(
            r#"<div data-live-view="outer"><div data-live-view="inner"><button live-click="x">x</button></div></div>"#,
            &TlParser,
        )
        .unwrap();

        let summaries = summarize(&doc, ATTR);
        assert!(summaries[0].events.is_empty());
        assert_eq!(summaries[1].events, vec!["click:x".to_string()]);
    }

    #[test]
    fn test_load_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, r#"<div data-live-view="a"></div>"#).unwrap();
        let doc = load_page(&path).unwrap();
        assert_eq!(discover_anchors(&doc, ATTR).len(), 1);

        assert!(load_page(&dir.path().join("missing.html")).is_err());
    }
}
