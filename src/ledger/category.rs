// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user category forest. Parent edges live in a flat table keyed by id;
//! containment is an iterative walk over the child index so a corrupted
//! cycle terminates at the depth guard instead of recursing forever.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::ledger::currency;
use crate::models::{Category, CategoryNode};

/// Walks deeper than any sane category forest; trips only on corrupted data.
const MAX_DEPTH: usize = 64;

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        parent: row.get(3)?,
    })
}

const SELECT: &str = "SELECT c.id, c.name, cur.isocode, c.parent_id
    FROM categories c JOIN currencies cur ON c.currency_id=cur.id";

fn get(conn: &Connection, user: &str, id: i64) -> Result<Category> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE c.id=?1 AND c.owner=?2"))?;
    stmt.query_row(params![id, user], from_row)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("category", id.to_string()))
}

fn children_of(conn: &Connection, id: i64) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE c.parent_id=?1 ORDER BY c.name"))?;
    let rows = stmt.query_map(params![id], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn create(
    conn: &Connection,
    user: &str,
    name: &str,
    currency_code: &str,
    parent: Option<i64>,
) -> Result<Category> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("category name is required".into()));
    }
    let ccy = currency::resolve(conn, user, currency_code)?;
    if let Some(parent_id) = parent {
        get(conn, user, parent_id)?;
    }
    conn.execute(
        "INSERT INTO categories(owner, parent_id, currency_id, name) VALUES (?1, ?2, ?3, ?4)",
        params![user, parent, ccy.id, name],
    )?;
    get(conn, user, conn.last_insert_rowid())
}

/// The user's root categories, each with its immediate children only.
pub fn list(conn: &Connection, user: &str) -> Result<Vec<CategoryNode>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE c.owner=?1 AND c.parent_id IS NULL ORDER BY c.name"
    ))?;
    let rows = stmt.query_map(params![user], from_row)?;
    let mut roots = Vec::new();
    for row in rows {
        roots.push(row?);
    }
    let mut out = Vec::new();
    for category in roots {
        let children = children_of(conn, category.id)?;
        out.push(CategoryNode { category, children });
    }
    Ok(out)
}

pub fn read(conn: &Connection, user: &str, id: i64) -> Result<CategoryNode> {
    let category = get(conn, user, id)?;
    let children = children_of(conn, category.id)?;
    Ok(CategoryNode { category, children })
}

/// Whether `target` appears in the subtree rooted at `root` (inclusive).
/// Iterative DFS over the child index, O(subtree size).
pub fn contains(conn: &Connection, root: i64, target: i64) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE parent_id=?1")?;
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if id == target {
            return Ok(true);
        }
        if depth >= MAX_DEPTH {
            return Err(LedgerError::Conflict(
                "category tree exceeds maximum depth".into(),
            ));
        }
        let rows = stmt.query_map(params![id], |r| r.get::<_, i64>(0))?;
        for row in rows {
            stack.push((row?, depth + 1));
        }
    }
    Ok(false)
}

#[derive(Debug, Default, Clone)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub currency: Option<String>,
}

pub fn update(
    conn: &Connection,
    user: &str,
    id: i64,
    changes: &CategoryChanges,
) -> Result<Category> {
    let category = get(conn, user, id)?;
    if let Some(name) = &changes.name {
        conn.execute(
            "UPDATE categories SET name=?1 WHERE id=?2",
            params![name, category.id],
        )?;
    }
    if let Some(code) = &changes.currency {
        let ccy = currency::resolve(conn, user, code)?;
        conn.execute(
            "UPDATE categories SET currency_id=?1 WHERE id=?2",
            params![ccy.id, category.id],
        )?;
    }
    get(conn, user, id)
}

/// Re-parent a category. Rejected when the new parent is the category
/// itself or any of its descendants.
pub fn move_category(
    conn: &Connection,
    user: &str,
    id: i64,
    new_parent: Option<i64>,
) -> Result<Category> {
    let category = get(conn, user, id)?;
    if let Some(parent_id) = new_parent {
        get(conn, user, parent_id)?;
        if contains(conn, category.id, parent_id)? {
            return Err(LedgerError::Conflict(
                "cannot move a category under itself or one of its descendants".into(),
            ));
        }
    }
    conn.execute(
        "UPDATE categories SET parent_id=?1 WHERE id=?2",
        params![new_parent, category.id],
    )?;
    get(conn, user, id)
}

/// Delete a category. Its children are reparented to the deleted node's
/// parent (promoted to root when it had none); its category splits are
/// cascaded, leaving the owning transactions intact.
pub fn delete(conn: &mut Connection, user: &str, id: i64) -> Result<()> {
    let category = get(conn, user, id)?;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE categories SET parent_id=?1 WHERE parent_id=?2",
        params![category.parent, category.id],
    )?;
    tx.execute("DELETE FROM categories WHERE id=?1", params![category.id])?;
    tx.commit()?;
    Ok(())
}
