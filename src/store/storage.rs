use crate::error::AppError;
use actix_web::web;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::MySqlPool;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Key/value backend holding each collection as one JSON array.
///
/// Reads and writes always move the whole collection; there are no
/// partial updates.
pub enum Storage {
    Memory(Mutex<HashMap<String, String>>),
    File(PathBuf),
    MySql(MySqlPool),
}

impl Storage {
    pub fn memory() -> Self {
        Storage::Memory(Mutex::new(HashMap::new()))
    }

    pub fn file(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Storage::File(dir))
    }

    pub async fn mysql(pool: MySqlPool) -> Result<Self, AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name VARCHAR(64) NOT NULL PRIMARY KEY,
                body LONGTEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Storage::MySql(pool))
    }

    /// Loads a collection; a key that was never written is an empty list.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        match self.read_raw(key).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        let body = serde_json::to_string(items)?;
        self.write_raw(key, body).await
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        match self {
            Storage::Memory(map) => Ok(lock(map)?.get(key).cloned()),
            Storage::File(dir) => {
                let path = collection_path(dir, key);
                let body = web::block(move || match fs::read_to_string(&path) {
                    Ok(body) => Ok(Some(body)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e),
                })
                .await??;
                Ok(body)
            }
            Storage::MySql(pool) => {
                let body =
                    sqlx::query_scalar::<_, String>("SELECT body FROM collections WHERE name = ?")
                        .bind(key)
                        .fetch_optional(pool)
                        .await?;
                Ok(body)
            }
        }
    }

    async fn write_raw(&self, key: &str, body: String) -> Result<(), AppError> {
        match self {
            Storage::Memory(map) => {
                lock(map)?.insert(key.to_string(), body);
                Ok(())
            }
            Storage::File(dir) => {
                let path = collection_path(dir, key);
                web::block(move || write_atomically(&path, &body)).await??;
                Ok(())
            }
            Storage::MySql(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO collections (name, body)
                    VALUES (?, ?)
                    ON DUPLICATE KEY UPDATE body = VALUES(body)
                    "#,
                )
                .bind(key)
                .bind(body)
                .execute(pool)
                .await?;
                Ok(())
            }
        }
    }
}

fn lock(
    map: &Mutex<HashMap<String, String>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
    map.lock()
        .map_err(|_| AppError::Internal("memory storage lock poisoned".into()))
}

fn collection_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

// Readers never observe a half-written collection.
fn write_atomically(path: &Path, body: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)
}
