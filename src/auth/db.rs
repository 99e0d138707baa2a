//! Admin account storage (`admin_users`).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::password;
use crate::config::BootstrapAdmin;

/// Stored admin account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub last_login_at: Option<String>,
}

/// Create a new admin, returns the user ID. `password_hash` must already be hashed.
pub fn create_admin(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO admin_users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Look up an admin by username (case-insensitive)
pub fn get_admin_by_username(conn: &Connection, username: &str) -> Result<Option<AdminUser>> {
    conn.query_row(
        "SELECT id, username, password_hash, last_login_at FROM admin_users WHERE username = ?1",
        params![username],
        |row| {
            Ok(AdminUser {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                last_login_at: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn count_admins(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM admin_users", [], |row| row.get(0))
}

/// Update an admin's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE admin_users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// Check credentials, returning the account when they match
pub fn authenticate(conn: &Connection, username: &str, plain_password: &str) -> Result<Option<AdminUser>> {
    let user = get_admin_by_username(conn, username.trim())?;
    Ok(user.filter(|u| password::verify_password(plain_password, &u.password_hash)))
}

/// Create the configured admin when no admin exists yet.
/// Returns true when an account was created.
pub fn ensure_bootstrap_admin(conn: &Connection, admin: &BootstrapAdmin) -> Result<bool> {
    if count_admins(conn)? > 0 {
        return Ok(false);
    }

    let hash = password::hash_password(&admin.password)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(e.to_string().into()))?;
    create_admin(conn, admin.username.trim(), &hash)?;
    tracing::info!("Created admin account '{}'", admin.username.trim());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    fn bootstrap(username: &str, password: &str) -> BootstrapAdmin {
        BootstrapAdmin {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_bootstrap_creates_once() {
        let env = TestEnv::new().unwrap();
        assert!(ensure_bootstrap_admin(&env.conn, &bootstrap("admin", "pw1")).unwrap());
        assert!(!ensure_bootstrap_admin(&env.conn, &bootstrap("other", "pw2")).unwrap());
        assert_eq!(count_admins(&env.conn).unwrap(), 1);
        assert!(get_admin_by_username(&env.conn, "other").unwrap().is_none());
    }

    #[test]
    fn test_authenticate() {
        let env = TestEnv::new().unwrap();
        ensure_bootstrap_admin(&env.conn, &bootstrap("admin", "correct horse")).unwrap();

        let user = authenticate(&env.conn, "admin", "correct horse").unwrap();
        assert_eq!(user.map(|u| u.username), Some("admin".to_string()));

        assert!(authenticate(&env.conn, "admin", "wrong").unwrap().is_none());
        assert!(authenticate(&env.conn, "nobody", "correct horse").unwrap().is_none());
    }

    #[test]
    fn test_username_lookup_ignores_case() {
        let env = TestEnv::new().unwrap();
        create_admin(&env.conn, "Admin", "hash").unwrap();
        assert!(get_admin_by_username(&env.conn, "admin").unwrap().is_some());
        assert!(create_admin(&env.conn, "ADMIN", "hash").is_err());
    }

    #[test]
    fn test_update_last_login() {
        let env = TestEnv::new().unwrap();
        let id = create_admin(&env.conn, "admin", "hash").unwrap();
        assert!(get_admin_by_username(&env.conn, "admin").unwrap().unwrap().last_login_at.is_none());

        update_last_login(&env.conn, id).unwrap();
        assert!(get_admin_by_username(&env.conn, "admin").unwrap().unwrap().last_login_at.is_some());
    }
}
