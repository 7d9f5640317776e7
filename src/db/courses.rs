use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Course, CourseUpdate};

/// Retrieve every course ordered by course number, with prerequisites in the
/// order they were stored. One joined query keeps this a single round trip.
pub fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.course_number, c.title, p.prerequisite
             FROM courses c
             LEFT JOIN course_prerequisites p ON p.course_id = c.id
             ORDER BY c.course_number, p.position",
        )
        .context("failed to prepare course query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .context("failed to load courses")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect courses")?;

    let mut courses: Vec<Course> = Vec::new();
    for (number, title, prerequisite) in rows {
        let same_course = courses.last().is_some_and(|last| last.number == number);
        if !same_course {
            courses.push(Course::new(number, title, Vec::new()));
        }
        if let (Some(prerequisite), Some(course)) = (prerequisite, courses.last_mut()) {
            course.prerequisites.push(prerequisite);
        }
    }

    Ok(courses)
}

/// Look up one course. A missing course is `Ok(None)`, not an error.
pub fn find_course(conn: &Connection, number: &str) -> Result<Option<Course>> {
    let row = conn
        .query_row(
            "SELECT id, title FROM courses WHERE course_number = ?1",
            [number],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .context("failed to query course")?;

    let Some((course_id, title)) = row else {
        return Ok(None);
    };

    let prerequisites = fetch_prerequisites(conn, course_id)?;
    Ok(Some(Course::new(number, title, prerequisites)))
}

/// Check whether a course number is already stored.
pub fn course_exists(conn: &Connection, number: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM courses WHERE course_number = ?1)",
        [number],
        |row| row.get(0),
    )
    .context("failed to check for existing course")
}

/// Insert a course unless its number is already stored. Returns `false` when
/// the existing row was left alone.
pub fn create_course(conn: &Connection, course: &Course) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    let inserted = insert_course(&tx, course)?;
    tx.commit().context("failed to commit course")?;
    Ok(inserted)
}

/// Insert-if-absent without opening a transaction, for callers that batch many
/// inserts in one.
pub(crate) fn insert_course(conn: &Connection, course: &Course) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO courses (course_number, title) VALUES (?1, ?2)",
            params![course.number, course.title],
        )
        .context("failed to insert course")?;

    if inserted == 0 {
        return Ok(false);
    }

    let course_id = conn.last_insert_rowid();
    write_prerequisites(conn, course_id, &course.prerequisites)?;
    Ok(true)
}

/// Apply a partial update to the course with `number`. We surface an explicit
/// error when nothing matched so the UI can say so instead of silently
/// continuing.
pub fn update_course(conn: &Connection, number: &str, update: &CourseUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(anyhow!("No updates were provided."));
    }

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let course_id: Option<i64> = tx
        .query_row(
            "SELECT id FROM courses WHERE course_number = ?1",
            [number],
            |row| row.get(0),
        )
        .optional()
        .context("failed to query course")?;

    let Some(course_id) = course_id else {
        return Err(anyhow!("No matching course was found."));
    };

    if let Some(title) = &update.title {
        tx.execute(
            "UPDATE courses SET title = ?1 WHERE id = ?2",
            params![title, course_id],
        )
        .context("failed to update course title")?;
    }

    if let Some(prerequisites) = &update.prerequisites {
        tx.execute(
            "DELETE FROM course_prerequisites WHERE course_id = ?1",
            [course_id],
        )
        .context("failed to clear prerequisites")?;
        write_prerequisites(&tx, course_id, prerequisites)?;
    }

    tx.commit().context("failed to commit course update")
}

/// Remove a course. Prerequisite rows cascade with it.
pub fn delete_course(conn: &Connection, number: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM courses WHERE course_number = ?1", [number])
        .context("failed to delete course")?;

    if deleted == 0 {
        Err(anyhow!("No matching course was found."))
    } else {
        Ok(())
    }
}

/// Delete every stored course and return how many were removed.
pub fn clear_courses(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM courses", [])
        .context("failed to clear courses")
}

fn fetch_prerequisites(conn: &Connection, course_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT prerequisite FROM course_prerequisites
             WHERE course_id = ?1
             ORDER BY position",
        )
        .context("failed to prepare prerequisite query")?;

    let prerequisites = stmt
        .query_map([course_id], |row| row.get(0))
        .context("failed to load prerequisites")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect prerequisites")?;

    Ok(prerequisites)
}

fn write_prerequisites(conn: &Connection, course_id: i64, prerequisites: &[String]) -> Result<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO course_prerequisites (course_id, position, prerequisite)
             VALUES (?1, ?2, ?3)",
        )
        .context("failed to prepare prerequisite insert")?;

    for (position, prerequisite) in prerequisites.iter().enumerate() {
        stmt.execute(params![course_id, position as i64, prerequisite])
            .context("failed to insert prerequisite")?;
    }
    Ok(())
}
