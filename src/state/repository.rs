use rusqlite::{Connection, OpenFlags, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::star::Star;

/// Errors surfaced by the star repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A read was attempted before a successful open. This is a caller bug,
    /// not a runtime condition - correct code never triggers it.
    #[error("no star database is open")]
    NotOpen,

    #[error("database file not found: {0}")]
    NotFound(PathBuf),

    #[error("not a valid star database: {0}")]
    InvalidDatabase(String),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

/// Columns shared by both star queries, in SELECT order
const STAR_COLUMNS: &str = "id, name, spectral, radius, mass, luminosity, temp, x, y, z";

/// Bodies that are their own system root, have no parent, and carry a
/// spectral type - i.e. single-star systems.
const SINGLE_STAR_FILTER: &str =
    "id = system_id AND parent_id = 0 AND COALESCE(spectral, '') <> ''";

/// Bodies whose immediate parent is a pure container: a system root with no
/// parent and no spectral type of its own.
const COMPONENT_FILTER: &str =
    "p.parent_id = 0 AND p.id = p.system_id AND COALESCE(p.spectral, '') = ''";

/// Read-only access to a star catalog database.
///
/// The repository owns at most one SQLite connection. `open` releases any
/// previous connection before acquiring the next one, and every read on a
/// closed repository fails fast with `RepositoryError::NotOpen` instead of
/// touching a stale handle. Dropping the repository closes the connection.
pub struct StarRepository {
    conn: Option<Connection>,
}

impl StarRepository {
    /// Create a repository with no database open
    pub fn new() -> Self {
        StarRepository { conn: None }
    }

    /// Open a catalog database read-only (shared-cache mode).
    ///
    /// Any previously open connection is closed first, even if this open
    /// fails - a failed open always leaves the repository closed.
    pub fn open(&mut self, path: &Path) -> Result<(), RepositoryError> {
        self.close();

        if !path.exists() {
            return Err(RepositoryError::NotFound(path.to_path_buf()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_SHARED_CACHE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;

        // SQLite opens lazily; force a read so a non-database file is
        // rejected here instead of on the first star query
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| RepositoryError::InvalidDatabase(e.to_string()))?;

        println!("📁 Opened star database: {}", path.display());

        self.conn = Some(conn);
        Ok(())
    }

    /// Close the current database, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Whether a database is currently open
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn connection(&self) -> Result<&Connection, RepositoryError> {
        self.conn.as_ref().ok_or(RepositoryError::NotOpen)
    }

    /// Read every star in the catalog: single-star systems first, then the
    /// components of multi-star systems, each group ordered by name.
    pub fn read_all_stars(&self) -> Result<Vec<Star>, RepositoryError> {
        let mut stars = self.read_single_stars()?;
        stars.extend(self.read_component_stars()?);
        Ok(stars)
    }

    /// Count all stars with one aggregate query, without materializing rows.
    /// Used for the status line, never for control flow.
    pub fn count_stars(&self) -> Result<i64, RepositoryError> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT (SELECT COUNT(*) FROM bodies WHERE {SINGLE_STAR_FILTER})
                  + (SELECT COUNT(*) FROM bodies c JOIN bodies p ON c.parent_id = p.id
                     WHERE {COMPONENT_FILTER})"
        );
        let count = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Best-effort read of the sector name from the optional `sector_info`
    /// table. Returns an empty string on any query failure (missing table
    /// included); only a closed repository is an error.
    pub fn sector_name(&self) -> Result<String, RepositoryError> {
        let conn = self.connection()?;
        let name = conn
            .query_row("SELECT name FROM sector_info LIMIT 1", [], |row| {
                row.get::<_, String>(0)
            })
            .unwrap_or_default();
        Ok(name)
    }

    /// For each multi-star system, pick the component with the greatest
    /// radius (ties broken by luminosity, descending). The viewport draws
    /// this one representative instead of the overlapping components.
    pub fn largest_per_system(&self) -> Result<HashMap<String, Star>, RepositoryError> {
        let components = self.read_component_stars()?;

        let mut best: HashMap<String, Star> = HashMap::new();
        for star in components {
            let Some(system) = star.system_name.clone() else {
                continue;
            };
            let replace = match best.get(&system) {
                Some(current) => {
                    star.radius > current.radius
                        || (star.radius == current.radius && star.luminosity > current.luminosity)
                }
                None => true,
            };
            if replace {
                best.insert(system, star);
            }
        }

        Ok(best)
    }

    fn read_single_stars(&self) -> Result<Vec<Star>, RepositoryError> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {STAR_COLUMNS} FROM bodies WHERE {SINGLE_STAR_FILTER} ORDER BY name"
        );
        let mut stmt = conn.prepare(&sql)?;

        let star_iter = stmt.query_map([], |row| {
            let star = Self::star_from_row(row)?;
            Ok(star)
        })?;

        let mut stars = Vec::new();
        for star in star_iter {
            stars.push(star?);
        }

        Ok(stars)
    }

    fn read_component_stars(&self) -> Result<Vec<Star>, RepositoryError> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT c.id, c.name, c.spectral, c.radius, c.mass, c.luminosity, c.temp,
                    c.x, c.y, c.z, p.name, p.x, p.y, p.z
             FROM bodies c JOIN bodies p ON c.parent_id = p.id
             WHERE {COMPONENT_FILTER}
             ORDER BY c.name"
        );
        let mut stmt = conn.prepare(&sql)?;

        let star_iter = stmt.query_map([], |row| {
            let mut star = Self::star_from_row(row)?;
            // A container with a blank name cannot group anything; leave the
            // star looking like a single so it is drawn exactly once
            let container: String = row.get(10)?;
            if !container.is_empty() {
                star.system_name = Some(container);
                star.system_x = row.get(11)?;
                star.system_y = row.get(12)?;
                star.system_z = row.get(13)?;
            }
            Ok(star)
        })?;

        let mut stars = Vec::new();
        for star in star_iter {
            stars.push(star?);
        }

        Ok(stars)
    }

    /// Map the shared column prefix into a Star. The system fields default
    /// to the star's own position, which is exactly right for single stars;
    /// the component query overrides them from the container row.
    fn star_from_row(row: &Row<'_>) -> rusqlite::Result<Star> {
        let x: f64 = row.get(7)?;
        let y: f64 = row.get(8)?;
        let z: f64 = row.get(9)?;
        Ok(Star {
            id: row.get(0)?,
            name: row.get(1)?,
            spectral: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            radius: row.get(3)?,
            mass: row.get(4)?,
            luminosity: row.get(5)?,
            temp: row.get(6)?,
            x,
            y,
            z,
            system_name: None,
            system_x: x,
            system_y: y,
            system_z: z,
        })
    }
}

impl Default for StarRepository {
    fn default() -> Self {
        Self::new()
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for StarRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarRepository")
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    /// Build a throwaway catalog database under the system temp directory
    fn temp_db(label: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "star_atlas_test_{}_{}.db",
            label,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn create_schema(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE bodies (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                spectral    TEXT,
                radius      REAL,
                mass        REAL,
                luminosity  REAL,
                temp        REAL,
                x           REAL,
                y           REAL,
                z           REAL,
                parent_id   INTEGER,
                system_id   INTEGER
            )",
        )
        .unwrap();
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_body(
        conn: &Connection,
        id: i64,
        name: &str,
        spectral: &str,
        radius: f64,
        luminosity: f64,
        pos: (f64, f64, f64),
        parent_id: i64,
        system_id: i64,
    ) {
        conn.execute(
            "INSERT INTO bodies (id, name, spectral, radius, mass, luminosity, temp,
                                 x, y, z, parent_id, system_id)
             VALUES (?1, ?2, ?3, ?4, 1.0, ?5, 5800.0, ?6, ?7, ?8, ?9, ?10)",
            params![id, name, spectral, radius, luminosity, pos.0, pos.1, pos.2, parent_id, system_id],
        )
        .unwrap();
    }

    /// Standard fixture: Sol alone at the origin, plus an "Alpha" container
    /// with two component stars
    fn seed_catalog(path: &Path) {
        let conn = Connection::open(path).unwrap();
        create_schema(&conn);
        insert_body(&conn, 1, "Sol", "G2V", 1.0, 1.0, (0.0, 0.0, 0.0), 0, 1);
        insert_body(&conn, 2, "Alpha", "", 0.0, 0.0, (4.3, 0.0, 0.0), 0, 2);
        insert_body(&conn, 3, "Alpha A", "G2V", 1.2, 1.5, (4.3, 0.0, 0.0), 2, 2);
        insert_body(&conn, 4, "Alpha B", "K1V", 0.8, 0.4, (4.3, 0.0, 0.0), 2, 2);
    }

    #[test]
    fn test_read_before_open_fails_fast() {
        let repository = StarRepository::new();
        assert!(matches!(
            repository.read_all_stars(),
            Err(RepositoryError::NotOpen)
        ));
        assert!(matches!(
            repository.count_stars(),
            Err(RepositoryError::NotOpen)
        ));
        assert!(matches!(
            repository.sector_name(),
            Err(RepositoryError::NotOpen)
        ));
    }

    #[test]
    fn test_open_missing_file_fails_and_stays_closed() {
        let mut repository = StarRepository::new();
        let result = repository.open(Path::new("/nonexistent/catalog.db"));
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert!(!repository.is_open());
    }

    #[test]
    fn test_open_rejects_non_database_file() {
        let path = temp_db("not_a_db");
        std::fs::write(&path, b"this is not a sqlite file, not even close").unwrap();

        let mut repository = StarRepository::new();
        let result = repository.open(&path);
        assert!(matches!(result, Err(RepositoryError::InvalidDatabase(_))));
        assert!(!repository.is_open());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_all_stars_singles_first() {
        let path = temp_db("read_all");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        let stars = repository.read_all_stars().unwrap();
        assert_eq!(stars.len(), 3);

        // Single stars come first, then components, by name within each group
        assert_eq!(stars[0].name, "Sol");
        assert_eq!(stars[1].name, "Alpha A");
        assert_eq!(stars[2].name, "Alpha B");

        // Sol is a single-star system: no container, own coords as system coords
        assert!(!stars[0].is_multi_star());
        assert_eq!(stars[0].system_name, None);
        assert_eq!(
            (stars[0].system_x, stars[0].system_y, stars[0].system_z),
            (stars[0].x, stars[0].y, stars[0].z)
        );

        // Components carry the container's name and position
        assert!(stars[1].is_multi_star());
        assert_eq!(stars[1].system_name.as_deref(), Some("Alpha"));
        assert_eq!(stars[1].system_x, 4.3);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_count_matches_read_all() {
        let path = temp_db("count");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        let count = repository.count_stars().unwrap();
        let stars = repository.read_all_stars().unwrap();
        assert_eq!(count, stars.len() as i64);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_largest_per_system_picks_biggest_radius() {
        let path = temp_db("largest");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        let largest = repository.largest_per_system().unwrap();
        assert_eq!(largest.len(), 1);
        assert_eq!(largest["Alpha"].name, "Alpha A");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_largest_per_system_ties_broken_by_luminosity() {
        let path = temp_db("tiebreak");
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn);
        insert_body(&conn, 1, "Beta", "", 0.0, 0.0, (10.0, 0.0, 0.0), 0, 1);
        insert_body(&conn, 2, "Beta A", "A1V", 2.0, 1.0, (10.0, 0.0, 0.0), 1, 1);
        insert_body(&conn, 3, "Beta B", "A2V", 2.0, 3.0, (10.0, 0.0, 0.0), 1, 1);
        drop(conn);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        let largest = repository.largest_per_system().unwrap();
        assert_eq!(largest["Beta"].name, "Beta B");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_sector_name_degrades_to_empty() {
        let path = temp_db("no_sector");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        // No sector_info table at all - still not an error
        assert_eq!(repository.sector_name().unwrap(), "");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_sector_name_reads_metadata_row() {
        let path = temp_db("sector");
        seed_catalog(&path);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE sector_info (name TEXT);
                 INSERT INTO sector_info (name) VALUES ('Local Bubble');",
            )
            .unwrap();
        }

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();
        assert_eq!(repository.sector_name().unwrap(), "Local Bubble");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_close_is_idempotent_and_reopen_works() {
        let path = temp_db("reopen");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();
        repository.close();
        repository.close();
        assert!(!repository.is_open());
        assert!(matches!(
            repository.read_all_stars(),
            Err(RepositoryError::NotOpen)
        ));

        // Opening again replaces the (absent) previous connection
        repository.open(&path).unwrap();
        assert!(repository.is_open());
        assert_eq!(repository.read_all_stars().unwrap().len(), 3);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_blank_container_name_components_stay_single() {
        let path = temp_db("blank_container");
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn);
        insert_body(&conn, 1, "", "", 0.0, 0.0, (7.0, 0.0, 0.0), 0, 1);
        insert_body(&conn, 2, "Gamma A", "F5V", 1.3, 2.0, (7.0, 1.0, 0.0), 1, 1);
        insert_body(&conn, 3, "Gamma B", "M0V", 0.5, 0.1, (7.0, -1.0, 0.0), 1, 1);
        drop(conn);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        // Components of a nameless container read as singles: no system
        // name, own coordinates reported as the system position
        let stars = repository.read_all_stars().unwrap();
        assert_eq!(stars.len(), 2);
        for star in &stars {
            assert!(!star.is_multi_star());
            assert_eq!(star.system_name, None);
            assert_eq!(
                (star.system_x, star.system_y, star.system_z),
                (star.x, star.y, star.z)
            );
        }

        // ...and nothing groups under an empty key, so no star is ever
        // drawn both as itself and as a system representative
        let largest = repository.largest_per_system().unwrap();
        assert!(largest.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_container_rows_are_not_stars() {
        let path = temp_db("container");
        seed_catalog(&path);

        let mut repository = StarRepository::new();
        repository.open(&path).unwrap();

        // The "Alpha" container row itself (empty spectral) never appears
        let stars = repository.read_all_stars().unwrap();
        assert!(stars.iter().all(|star| star.name != "Alpha"));

        let _ = std::fs::remove_file(&path);
    }
}
