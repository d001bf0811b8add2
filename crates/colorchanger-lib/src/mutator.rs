//! Recolor qualifying `Neutral` elements.
//!
//! A `Neutral` qualifies when at least one `Origin` element sits anywhere
//! below it. Every qualifying `Neutral` loses its existing `Actor.Color`
//! children and gains exactly one new `Actor.Color` as its last child.
//! Everything else in the document is left alone.

use std::collections::BTreeSet;

use serde::Serialize;
use xmltree::Element;

use crate::color::RgbColor;
use crate::document::{Document, NodePath};
use crate::error::Result;
use crate::report::Reporter;

pub const NEUTRAL: &str = "Neutral";
pub const ORIGIN: &str = "Origin";
pub const ACTOR_COLOR: &str = "Actor.Color";

/// Counts from one [`DocumentMutator::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationSummary {
    /// Qualifying `Neutral` elements, each of which received a new color.
    pub neutrals_modified: usize,
    /// Pre-existing `Actor.Color` elements removed from qualifying `Neutral`s.
    pub colors_removed: usize,
}

/// Applies the strip-and-insert recoloring to a [`Document`].
pub struct DocumentMutator<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> DocumentMutator<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        DocumentMutator { reporter }
    }

    /// Recolor every qualifying `Neutral` in `doc` in place.
    ///
    /// Old colors are all removed before any new one is appended, so no
    /// `Neutral` ever holds two `Actor.Color` children. The qualifying set is
    /// selected again after removal.
    pub fn apply(&self, doc: &mut Document, color: RgbColor) -> Result<MutationSummary> {
        // A set keyed by path: each node is removed exactly once even if
        // several Origins lead to the same Neutral.
        let stale_colors: BTreeSet<NodePath> = qualifying_neutrals(doc)
            .iter()
            .flat_map(|neutral| doc.child_elements_named(neutral, ACTOR_COLOR))
            .collect();

        // Descending order: removing a node only shifts paths that sort after it.
        let mut colors_removed = 0;
        for path in stale_colors.iter().rev() {
            doc.remove(path)?;
            colors_removed += 1;
        }

        let neutrals = qualifying_neutrals(doc);
        self.warn_on_nesting(doc, &neutrals);
        for neutral in &neutrals {
            doc.append_child(neutral, color_element(color))?;
        }

        Ok(MutationSummary {
            neutrals_modified: neutrals.len(),
            colors_removed,
        })
    }

    fn warn_on_nesting(&self, doc: &Document, neutrals: &BTreeSet<NodePath>) {
        let nested = neutrals
            .iter()
            .filter(|n| {
                doc.ancestors_named(n, NEUTRAL)
                    .iter()
                    .any(|a| neutrals.contains(a))
            })
            .count();
        if nested > 0 {
            self.reporter.warn(&format!(
                "{nested} qualifying {NEUTRAL} element(s) are nested inside another \
                 qualifying {NEUTRAL}; each one is recolored independently"
            ));
        }
    }
}

/// Every `Neutral` that has an `Origin` somewhere below it, in document order.
pub fn qualifying_neutrals(doc: &Document) -> BTreeSet<NodePath> {
    doc.find_descendants(|el| el.name == ORIGIN)
        .iter()
        .flat_map(|origin| doc.ancestors_named(origin, NEUTRAL))
        .collect()
}

/// A fresh `<Actor.Color R=".." G=".." B=".."/>` element.
pub fn color_element(color: RgbColor) -> Element {
    let mut el = Element::new(ACTOR_COLOR);
    el.attributes.insert("R".into(), color.r.to_string());
    el.attributes.insert("G".into(), color.g.to_string());
    el.attributes.insert("B".into(), color.b.to_string());
    el
}
