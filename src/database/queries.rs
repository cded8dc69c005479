use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

use crate::models::{
    ActionLogEntry, ExtraWork, ExtraWorkChanges, NewExtraWork, NewResource, Params, Resource,
    ResourceChanges,
};

const EXTRAWORK_COLUMNS: &str = "id, code, title, description, status, priority,
     start_date, end_date, created_at, updated_at";

const RESOURCE_COLUMNS: &str = "id, name, resource_type, availability, url, metadata,
     extrawork_id, created_at, updated_at";

fn extrawork_from_row(row: &Row) -> rusqlite::Result<ExtraWork> {
    let id: i64 = row.get(0)?;
    Ok(ExtraWork {
        id,
        code: row
            .get::<_, Option<String>>(1)?
            .unwrap_or_else(|| format_code(id)),
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_column(row, 4)?,
        priority: parse_column(row, 5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        resources: Vec::new(),
    })
}

/// Text column decoded through `FromStr`; unknown values are a row error.
fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|err: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
    })
}

fn resource_from_row(row: &Row) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        name: row.get(1)?,
        resource_type: row.get(2)?,
        availability: row.get(3)?,
        url: row.get(4)?,
        metadata: row.get(5)?,
        extra_work_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Default code for a work item created without one: `EW-001`, `EW-042`, ...
pub fn format_code(id: i64) -> String {
    format!("EW-{:03}", id)
}

/// `LIKE` operand matching `text` literally; pair with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn like_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query.trim()))
}

// ─── ExtraWorks ───

pub fn insert_extrawork(conn: &Connection, extrawork: &NewExtraWork) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO extraworks (code, title, description, status, priority, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            extrawork.code,
            extrawork.title,
            extrawork.description,
            extrawork.status.as_str(),
            extrawork.priority.as_str(),
            extrawork.start_date,
            extrawork.end_date,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    if extrawork.code.is_none() {
        conn.execute(
            "UPDATE extraworks SET code = ?1 WHERE id = ?2",
            params![format_code(id), id],
        )?;
    }

    Ok(id)
}

pub fn get_extrawork(conn: &Connection, id: i64) -> Result<Option<ExtraWork>> {
    let extrawork = conn
        .query_row(
            &format!("SELECT {} FROM extraworks WHERE id = ?1", EXTRAWORK_COLUMNS),
            [id],
            extrawork_from_row,
        )
        .optional()?;

    match extrawork {
        Some(mut ew) => {
            ew.resources = get_resources_for_extrawork(conn, ew.id)?;
            Ok(Some(ew))
        }
        None => Ok(None),
    }
}

/// Case-insensitive exact code match, falling back to the first code that
/// starts with `<code>-` so `EW-001` finds `EW-001-FACHADA`.
pub fn get_extrawork_by_code(conn: &Connection, code: &str) -> Result<Option<ExtraWork>> {
    let code = code.trim();
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM extraworks
             WHERE LOWER(code) = LOWER(?1) OR LOWER(code) LIKE LOWER(?2) || '-%' ESCAPE '\\'
             ORDER BY LOWER(code) = LOWER(?1) DESC, id ASC
             LIMIT 1",
            params![code, escape_like(code)],
            |row| row.get(0),
        )
        .optional()?;

    match id {
        Some(id) => get_extrawork(conn, id),
        None => Ok(None),
    }
}

pub fn list_extraworks(conn: &Connection) -> Result<Vec<ExtraWork>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM extraworks ORDER BY id ASC",
        EXTRAWORK_COLUMNS
    ))?;

    let extraworks = stmt
        .query_map([], extrawork_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    attach_resources(conn, extraworks)
}

pub fn search_extraworks(conn: &Connection, query: &str) -> Result<Vec<ExtraWork>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM extraworks
         WHERE title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\' OR code LIKE ?1 ESCAPE '\\'
         ORDER BY id ASC",
        EXTRAWORK_COLUMNS
    ))?;

    let extraworks = stmt
        .query_map([like_pattern(query)], extrawork_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    attach_resources(conn, extraworks)
}

/// Returns `false` when no row has that id.
pub fn update_extrawork(conn: &Connection, id: i64, changes: &ExtraWorkChanges) -> Result<bool> {
    let mut sets = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(title) = &changes.title {
        sets.push("title");
        values.push(Box::new(title.clone()));
    }
    if let Some(description) = &changes.description {
        sets.push("description");
        values.push(Box::new(description.clone()));
    }
    if let Some(status) = changes.status {
        sets.push("status");
        values.push(Box::new(status.as_str()));
    }
    if let Some(priority) = changes.priority {
        sets.push("priority");
        values.push(Box::new(priority.as_str()));
    }

    sets.push("updated_at");
    values.push(Box::new(chrono::Utc::now().timestamp()));
    values.push(Box::new(id));

    let assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect();
    let sql = format!(
        "UPDATE extraworks SET {} WHERE id = ?{}",
        assignments.join(", "),
        values.len()
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let affected = conn.execute(&sql, param_refs.as_slice())?;

    Ok(affected > 0)
}

pub fn delete_extrawork(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM extraworks WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

pub fn count_extraworks(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM extraworks", [], |row| row.get(0))?;
    Ok(count)
}

fn attach_resources(conn: &Connection, mut extraworks: Vec<ExtraWork>) -> Result<Vec<ExtraWork>> {
    if extraworks.is_empty() {
        return Ok(extraworks);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM resources WHERE extrawork_id IS NOT NULL ORDER BY id ASC",
        RESOURCE_COLUMNS
    ))?;
    let mut by_extrawork: HashMap<i64, Vec<Resource>> = HashMap::new();
    for resource in stmt.query_map([], resource_from_row)? {
        let resource = resource?;
        if let Some(ew_id) = resource.extra_work_id {
            by_extrawork.entry(ew_id).or_default().push(resource);
        }
    }

    for ew in extraworks.iter_mut() {
        ew.resources = by_extrawork.remove(&ew.id).unwrap_or_default();
    }

    Ok(extraworks)
}

// ─── Resources ───

pub fn insert_resource(conn: &Connection, resource: &NewResource) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let availability = resource
        .availability
        .clone()
        .unwrap_or_else(|| crate::models::resource::AVAILABLE.to_string());

    conn.execute(
        "INSERT INTO resources (name, resource_type, availability, url, metadata, extrawork_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            resource.name,
            resource.resource_type,
            availability,
            resource.url,
            resource.metadata,
            resource.extra_work_id,
            now,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_resource(conn: &Connection, id: i64) -> Result<Option<Resource>> {
    let resource = conn
        .query_row(
            &format!("SELECT {} FROM resources WHERE id = ?1", RESOURCE_COLUMNS),
            [id],
            resource_from_row,
        )
        .optional()?;
    Ok(resource)
}

pub fn list_resources(conn: &Connection) -> Result<Vec<Resource>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM resources ORDER BY id ASC",
        RESOURCE_COLUMNS
    ))?;
    let resources = stmt
        .query_map([], resource_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(resources)
}

pub fn get_resources_for_extrawork(conn: &Connection, extrawork_id: i64) -> Result<Vec<Resource>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM resources WHERE extrawork_id = ?1 ORDER BY id ASC",
        RESOURCE_COLUMNS
    ))?;
    let resources = stmt
        .query_map([extrawork_id], resource_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(resources)
}

/// Substring match on name or type, in id order.
pub fn search_resources(conn: &Connection, query: &str) -> Result<Vec<Resource>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM resources
         WHERE name LIKE ?1 ESCAPE '\\' OR resource_type LIKE ?1 ESCAPE '\\'
         ORDER BY id ASC",
        RESOURCE_COLUMNS
    ))?;
    let resources = stmt
        .query_map([like_pattern(query)], resource_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(resources)
}

pub fn update_resource(conn: &Connection, id: i64, changes: &ResourceChanges) -> Result<bool> {
    let now = chrono::Utc::now().timestamp();
    let affected = conn.execute(
        "UPDATE resources SET
            name = COALESCE(?1, name),
            resource_type = COALESCE(?2, resource_type),
            availability = COALESCE(?3, availability),
            url = COALESCE(?4, url),
            metadata = COALESCE(?5, metadata),
            updated_at = ?6
         WHERE id = ?7",
        params![
            changes.name,
            changes.resource_type,
            changes.availability,
            changes.url,
            changes.metadata,
            now,
            id,
        ],
    )?;
    Ok(affected > 0)
}

pub fn assign_resource(conn: &Connection, resource_id: i64, extrawork_id: i64) -> Result<bool> {
    let now = chrono::Utc::now().timestamp();
    let affected = conn.execute(
        "UPDATE resources SET extrawork_id = ?1, updated_at = ?2 WHERE id = ?3",
        params![extrawork_id, now, resource_id],
    )?;
    Ok(affected > 0)
}

pub fn delete_resource(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM resources WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

// ─── Action log ───

pub fn insert_action_log(
    conn: &Connection,
    query: Option<&str>,
    intent: &str,
    params: &Params,
    success: bool,
    message: Option<&str>,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let params_json = serde_json::to_string(params)?;

    conn.execute(
        "INSERT INTO action_logs (query, intent, params, success, message, executed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![query, intent, params_json, success, message, now],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn recent_action_logs(conn: &Connection, limit: usize) -> Result<Vec<ActionLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, query, intent, params, success, message, executed_at
         FROM action_logs
         ORDER BY executed_at DESC, id DESC
         LIMIT ?1",
    )?;

    let entries = stmt
        .query_map([limit as i64], |row| {
            let params_json: String = row.get(3)?;
            Ok(ActionLogEntry {
                id: row.get(0)?,
                query: row.get(1)?,
                intent: row.get(2)?,
                params: serde_json::from_str(&params_json).unwrap_or_default(),
                success: row.get(4)?,
                message: row.get(5)?,
                executed_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;
    use crate::models::ExtraWorkStatus;

    fn new_extrawork(title: &str) -> NewExtraWork {
        NewExtraWork {
            title: title.to_string(),
            description: format!("{} description", title),
            ..NewExtraWork::default()
        }
    }

    #[test]
    fn insert_assigns_sequential_code() {
        let conn = open_in_memory().unwrap();
        let id = insert_extrawork(&conn, &new_extrawork("Pintar pared")).unwrap();

        let ew = get_extrawork(&conn, id).unwrap().unwrap();
        assert_eq!(ew.code, "EW-001");
        assert_eq!(ew.status, ExtraWorkStatus::Pending);
    }

    #[test]
    fn code_lookup_accepts_short_prefix() {
        let conn = open_in_memory().unwrap();
        let mut ew = new_extrawork("Fachada");
        ew.code = Some("EW-001-FACHADA".to_string());
        let id = insert_extrawork(&conn, &ew).unwrap();

        let found = get_extrawork_by_code(&conn, "ew-001").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(get_extrawork_by_code(&conn, "EW-00").unwrap().is_none());
    }

    #[test]
    fn partial_update_leaves_other_columns() {
        let conn = open_in_memory().unwrap();
        let id = insert_extrawork(&conn, &new_extrawork("Original")).unwrap();

        let changes = ExtraWorkChanges {
            status: Some(ExtraWorkStatus::Completed),
            ..ExtraWorkChanges::default()
        };
        assert!(update_extrawork(&conn, id, &changes).unwrap());
        assert!(!update_extrawork(&conn, id + 1, &changes).unwrap());

        let ew = get_extrawork(&conn, id).unwrap().unwrap();
        assert_eq!(ew.title, "Original");
        assert_eq!(ew.status, ExtraWorkStatus::Completed);
    }

    #[test]
    fn deleting_extrawork_unlinks_resources() {
        let conn = open_in_memory().unwrap();
        let ew_id = insert_extrawork(&conn, &new_extrawork("Con recursos")).unwrap();
        let res_id = insert_resource(
            &conn,
            &NewResource {
                name: "Grúa Torre".to_string(),
                resource_type: "equipment".to_string(),
                extra_work_id: Some(ew_id),
                ..NewResource::default()
            },
        )
        .unwrap();

        assert_eq!(get_extrawork(&conn, ew_id).unwrap().unwrap().resources.len(), 1);
        assert!(delete_extrawork(&conn, ew_id).unwrap());

        let resource = get_resource(&conn, res_id).unwrap().unwrap();
        assert_eq!(resource.extra_work_id, None);
    }

    #[test]
    fn search_treats_like_wildcards_literally() {
        let conn = open_in_memory().unwrap();
        crate::database::seed::seed_demo_data(&conn).unwrap();
        insert_resource(
            &conn,
            &NewResource {
                name: "Descuento 50%_obra".to_string(),
                resource_type: "document".to_string(),
                ..NewResource::default()
            },
        )
        .unwrap();

        assert!(search_resources(&conn, "__").unwrap().is_empty());
        assert!(search_resources(&conn, "G_úa").unwrap().is_empty());
        assert_eq!(search_resources(&conn, "%%").unwrap().len(), 0);
        assert!(search_extraworks(&conn, "%").unwrap().is_empty());

        let literal = search_resources(&conn, "50%_").unwrap();
        assert_eq!(literal.len(), 1);
        assert_eq!(literal[0].name, "Descuento 50%_obra");
        assert!(!search_resources(&conn, "Grúa").unwrap().is_empty());
    }

    #[test]
    fn code_prefix_lookup_ignores_wildcards() {
        let conn = open_in_memory().unwrap();
        let mut ew = new_extrawork("Fachada");
        ew.code = Some("EW-001-FACHADA".to_string());
        insert_extrawork(&conn, &ew).unwrap();

        assert!(get_extrawork_by_code(&conn, "EW_001").unwrap().is_none());
        assert!(get_extrawork_by_code(&conn, "%").unwrap().is_none());
    }

    #[test]
    fn unknown_status_in_a_row_is_an_error() {
        let conn = open_in_memory().unwrap();
        let id = insert_extrawork(&conn, &new_extrawork("Raro")).unwrap();
        conn.execute(
            "UPDATE extraworks SET status = 'archived' WHERE id = ?1",
            [id],
        )
        .unwrap();

        let err = get_extrawork(&conn, id).unwrap_err();
        assert!(err.to_string().contains("archived"), "{}", err);
    }
}
