//! SQLite-backed storage for users, persons, events, and tokens.

use async_trait::async_trait;
use famtree_domain::{
    AncestorTree, Event, EventId, Location, Person, PersonId, User, Username,
};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{AuthRepo, EventRepo, PersonRepo, RepoError, TreeRepo};

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        person_id TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS persons (
        person_id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        gender TEXT NOT NULL CHECK (gender IN ('m', 'f')),
        father_id TEXT,
        mother_id TEXT,
        spouse_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        event_id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        person_id TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL,
        event_type TEXT NOT NULL CHECK (event_type IN ('birth', 'marriage', 'death')),
        year INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auth_tokens (
        token TEXT PRIMARY KEY,
        username TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS persons_by_username ON persons (username)",
    "CREATE INDEX IF NOT EXISTS events_by_username ON events (username)",
];

/// One SQLite database implementing every storage port.
pub struct SqliteFamilyStore {
    pool: SqlitePool,
}

impl SqliteFamilyStore {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }

        tracing::info!(db_path = %db_path, "SQLite family store ready");
        Ok(Self { pool })
    }

    async fn count(&self, table: &'static str, username: &Username) -> Result<i64, RepoError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {} WHERE username = ?", table);
        let row = sqlx::query(&sql)
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count", e))?;
        row.try_get("n").map_err(|e| RepoError::database("count", e))
    }

    /// Persons stored for `username`, root included.
    pub async fn person_count(&self, username: &Username) -> Result<i64, RepoError> {
        self.count("persons", username).await
    }

    pub async fn event_count(&self, username: &Username) -> Result<i64, RepoError> {
        self.count("events", username).await
    }
}

// =============================================================================
// Statement helpers (shared by pool and transaction callers)
// =============================================================================

async fn delete_tree_rows(
    conn: &mut SqliteConnection,
    username: &Username,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM events WHERE username = ?")
        .bind(username.as_str())
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r#"
        DELETE FROM persons
        WHERE username = ?
          AND person_id NOT IN (SELECT person_id FROM users WHERE username = ?)
        "#,
    )
    .bind(username.as_str())
    .bind(username.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn delete_all_rows(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for table in ["events", "persons", "users", "auth_tokens"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (username, person_id) VALUES (?, ?)")
        .bind(user.username.as_str())
        .bind(user.person_id.to_string())
        .execute(&mut *conn)
        .await?;
    if let Some(token) = &user.auth_token {
        sqlx::query("INSERT INTO auth_tokens (token, username) VALUES (?, ?)")
            .bind(token)
            .bind(user.username.as_str())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_person(conn: &mut SqliteConnection, person: &Person) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO persons
            (person_id, username, first_name, last_name, gender, father_id, mother_id, spouse_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(person.id.to_string())
    .bind(person.username.as_str())
    .bind(&person.first_name)
    .bind(&person.last_name)
    .bind(person.gender.as_str())
    .bind(person.father_id.map(|id| id.to_string()))
    .bind(person.mother_id.map(|id| id.to_string()))
    .bind(person.spouse_id.map(|id| id.to_string()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_event(conn: &mut SqliteConnection, event: &Event) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO events
            (event_id, username, person_id, latitude, longitude, country, city, event_type, year)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.id.to_string())
    .bind(event.username.as_str())
    .bind(event.person_id.to_string())
    .bind(event.location.latitude)
    .bind(event.location.longitude)
    .bind(&event.location.country)
    .bind(&event.location.city)
    .bind(event.event_type.as_str())
    .bind(event.year)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Duplicate keys in caller-supplied rows are a constraint violation, not a
/// storage fault.
fn insert_failed(operation: &'static str, e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::constraint(db.message())
        }
        _ => RepoError::database(operation, e),
    }
}

// =============================================================================
// Row conversion helpers
// =============================================================================

fn column<T>(row: &SqliteRow, name: &str) -> Result<T, RepoError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepoError::corrupt(format!("column {}: {}", name, e)))
}

fn optional_id(row: &SqliteRow, name: &str) -> Result<Option<PersonId>, RepoError> {
    column::<Option<String>>(row, name)?
        .map(|raw| raw.parse().map_err(RepoError::corrupt))
        .transpose()
}

fn row_to_person(row: &SqliteRow) -> Result<Person, RepoError> {
    let id: PersonId = column::<String>(row, "person_id")?
        .parse()
        .map_err(RepoError::corrupt)?;
    let username = Username::new(column::<String>(row, "username")?).map_err(RepoError::corrupt)?;
    let gender = column::<String>(row, "gender")?
        .parse()
        .map_err(RepoError::corrupt)?;

    Ok(Person {
        id,
        username,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        gender,
        father_id: optional_id(row, "father_id")?,
        mother_id: optional_id(row, "mother_id")?,
        spouse_id: optional_id(row, "spouse_id")?,
    })
}

fn row_to_event(row: &SqliteRow) -> Result<Event, RepoError> {
    let id: EventId = column::<String>(row, "event_id")?
        .parse()
        .map_err(RepoError::corrupt)?;
    let username = Username::new(column::<String>(row, "username")?).map_err(RepoError::corrupt)?;
    let person_id: PersonId = column::<String>(row, "person_id")?
        .parse()
        .map_err(RepoError::corrupt)?;
    let location = Location::new(
        column::<String>(row, "country")?,
        column::<String>(row, "city")?,
        column(row, "latitude")?,
        column(row, "longitude")?,
    )
    .map_err(RepoError::corrupt)?;
    let event_type = column::<String>(row, "event_type")?
        .parse()
        .map_err(RepoError::corrupt)?;

    Ok(Event::new(
        id,
        username,
        person_id,
        location,
        event_type,
        column(row, "year")?,
    ))
}

// =============================================================================
// Port implementations
// =============================================================================

#[async_trait]
impl PersonRepo for SqliteFamilyStore {
    async fn get(&self, id: PersonId) -> Result<Option<Person>, RepoError> {
        let row = sqlx::query("SELECT * FROM persons WHERE person_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_person", e))?;
        row.as_ref().map(row_to_person).transpose()
    }

    async fn list_for_user(&self, username: &Username) -> Result<Vec<Person>, RepoError> {
        let rows = sqlx::query("SELECT * FROM persons WHERE username = ? ORDER BY rowid")
            .bind(username.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_persons", e))?;
        rows.iter().map(row_to_person).collect()
    }

    async fn find_root(&self, username: &Username) -> Result<Option<Person>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT p.* FROM persons p
            JOIN users u ON u.person_id = p.person_id
            WHERE u.username = ?
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("find_root", e))?;
        row.as_ref().map(row_to_person).transpose()
    }

    async fn save_root(&self, root: &Person) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("save_root", e))?;

        sqlx::query("INSERT INTO users (username, person_id) VALUES (?, ?)")
            .bind(root.username.as_str())
            .bind(root.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::constraint(format!("user {}: {}", root.username, e)))?;
        insert_person(&mut tx, root)
            .await
            .map_err(|e| RepoError::database("save_root", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("save_root", e))?;
        tracing::debug!(username = %root.username, person_id = %root.id, "Saved root person");
        Ok(())
    }
}

#[async_trait]
impl EventRepo for SqliteFamilyStore {
    async fn get(&self, id: EventId) -> Result<Option<Event>, RepoError> {
        let row = sqlx::query("SELECT * FROM events WHERE event_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_event", e))?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn list_for_user(&self, username: &Username) -> Result<Vec<Event>, RepoError> {
        let rows = sqlx::query("SELECT * FROM events WHERE username = ? ORDER BY rowid")
            .bind(username.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_events", e))?;
        rows.iter().map(row_to_event).collect()
    }
}

#[async_trait]
impl TreeRepo for SqliteFamilyStore {
    async fn delete_generated_tree(&self, username: &Username) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("delete_generated_tree", e))?;
        delete_tree_rows(&mut tx, username)
            .await
            .map_err(|e| RepoError::database("delete_generated_tree", e))?;
        tx.commit()
            .await
            .map_err(|e| RepoError::database("delete_generated_tree", e))?;
        Ok(())
    }

    async fn persist_tree(&self, persons: &[Person], events: &[Event]) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("persist_tree", e))?;
        for person in persons {
            insert_person(&mut tx, person)
                .await
                .map_err(|e| RepoError::database("persist_tree", e))?;
        }
        for event in events {
            insert_event(&mut tx, event)
                .await
                .map_err(|e| RepoError::database("persist_tree", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| RepoError::database("persist_tree", e))?;
        Ok(())
    }

    async fn replace_tree(&self, tree: &AncestorTree) -> Result<(), RepoError> {
        let root = tree.root();
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("replace_tree", e))?;

        delete_tree_rows(&mut tx, &root.username)
            .await
            .map_err(|e| RepoError::database("replace_tree", e))?;

        let relinked = sqlx::query(
            "UPDATE persons SET father_id = ?, mother_id = ? WHERE person_id = ? AND username = ?",
        )
        .bind(root.father_id.map(|id| id.to_string()))
        .bind(root.mother_id.map(|id| id.to_string()))
        .bind(root.id.to_string())
        .bind(root.username.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("replace_tree", e))?;
        if relinked.rows_affected() != 1 {
            return Err(RepoError::not_found("Root person", root.id));
        }

        for person in tree.ancestors() {
            insert_person(&mut tx, person)
                .await
                .map_err(|e| RepoError::database("replace_tree", e))?;
        }
        for event in tree.events() {
            insert_event(&mut tx, event)
                .await
                .map_err(|e| RepoError::database("replace_tree", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("replace_tree", e))?;

        tracing::debug!(
            username = %root.username,
            persons = tree.person_count(),
            events = tree.event_count(),
            "Replaced stored tree"
        );
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("clear_all", e))?;
        delete_all_rows(&mut tx)
            .await
            .map_err(|e| RepoError::database("clear_all", e))?;
        tx.commit()
            .await
            .map_err(|e| RepoError::database("clear_all", e))?;
        Ok(())
    }

    async fn replace_all(
        &self,
        users: &[User],
        persons: &[Person],
        events: &[Event],
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("replace_all", e))?;

        delete_all_rows(&mut tx)
            .await
            .map_err(|e| RepoError::database("replace_all", e))?;
        for user in users {
            insert_user(&mut tx, user)
                .await
                .map_err(|e| insert_failed("replace_all", e))?;
        }
        for person in persons {
            insert_person(&mut tx, person)
                .await
                .map_err(|e| insert_failed("replace_all", e))?;
        }
        for event in events {
            insert_event(&mut tx, event)
                .await
                .map_err(|e| insert_failed("replace_all", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("replace_all", e))?;

        tracing::debug!(
            users = users.len(),
            persons = persons.len(),
            events = events.len(),
            "Replaced store contents"
        );
        Ok(())
    }
}

#[async_trait]
impl AuthRepo for SqliteFamilyStore {
    async fn resolve_user(&self, token: &str) -> Result<Option<Username>, RepoError> {
        let row = sqlx::query("SELECT username FROM auth_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("resolve_user", e))?;
        row.map(|row| {
            Username::new(column::<String>(&row, "username")?).map_err(RepoError::corrupt)
        })
        .transpose()
    }

    async fn save_token(&self, token: &str, username: &Username) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO auth_tokens (token, username) VALUES (?, ?)")
            .bind(token)
            .bind(username.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("save_token", e))?;
        Ok(())
    }
}
