//! Categories and name reconciliation.
//!
//! Category names are unique per backend, compared case-insensitively. The
//! reconciler turns a list of suggested names into category ids, creating the
//! missing ones exactly once.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::CategoryStore;

/// A named label attachable to many tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub usage_count: Option<u64>,
}

/// Body of `POST /api/categories/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// Normalise a category name for comparison: trimmed and lowercased.
pub fn normalise_category_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Find a category by name, ignoring case and surrounding whitespace.
pub fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let wanted = normalise_category_name(name);
    categories.iter().find(|c| normalise_category_name(&c.name) == wanted)
}

/// Outcome of resolving suggested names into category ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Resolved ids in suggestion order, without duplicates.
    pub ids: Vec<u64>,
    /// Categories created during this run.
    pub created: Vec<Category>,
    /// Names that could not be resolved or created.
    pub skipped: Vec<String>,
}

/// Resolve each name to an existing category or create it.
///
/// The category list is read once up front and extended with every category
/// created along the way, so repeated names (in any case) resolve to the
/// same id. A rejected create is assumed to be a concurrent creator winning
/// the race: the list is re-read once and the existing category used. Other
/// per-name failures are logged and the name skipped. Only a failure of the
/// initial listing is returned as an error.
pub fn reconcile_categories<S>(store: &S, names: &[&str]) -> Result<Reconciliation>
where
    S: CategoryStore + ?Sized,
{
    let mut known = store.list_categories()?;
    let mut out = Reconciliation::default();

    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }

        let id = match find_category(&known, name) {
            Some(existing) => {
                tracing::debug!(name, id = existing.id, "category already exists");
                existing.id
            }
            None => match store.create_category(name) {
                Ok(created) => {
                    tracing::info!(name, id = created.id, "created category");
                    let id = created.id;
                    out.created.push(created.clone());
                    known.push(created);
                    id
                }
                Err(e) if e.is_conflict() => match store.list_categories() {
                    Ok(fresh) => {
                        known = fresh;
                        match find_category(&known, name) {
                            Some(existing) => {
                                tracing::info!(name, id = existing.id, "category created concurrently, reusing it");
                                existing.id
                            }
                            None => {
                                tracing::warn!(name, error = %e, "category create rejected");
                                out.skipped.push(name.to_string());
                                continue;
                            }
                        }
                    }
                    Err(list_err) => {
                        tracing::warn!(name, error = %list_err, "could not re-read categories after rejected create");
                        out.skipped.push(name.to_string());
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(name, error = %e, "failed to create category");
                    out.skipped.push(name.to_string());
                    continue;
                }
            },
        };

        if !out.ids.contains(&id) {
            out.ids.push(id);
        }
    }

    Ok(out)
}
