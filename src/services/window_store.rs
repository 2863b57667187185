use crate::error::Result;
use crate::proceed_error;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Хранилище флагов, ограниченное одним окном.
///
/// Реализация обязана изолировать окна: запись в одном окне никогда не видна
/// и не затирается из другого.
pub trait WindowStore: Send + Sync {
    fn get_flag(&self, key: &str) -> Result<Option<bool>>;
    fn set_flag(&self, key: &str, value: bool) -> Result<()>;

    fn get_flag_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.get_flag(key)?.unwrap_or(default))
    }
}

/// Общая память на процесс, из которой выдаются представления по окнам
#[derive(Clone, Default)]
pub struct MemoryStorage {
    flags: Arc<DashMap<(String, String), bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_window(&self, window: &str) -> MemoryWindowStore {
        MemoryWindowStore {
            flags: Arc::clone(&self.flags),
            window: window.to_string(),
        }
    }
}

pub struct MemoryWindowStore {
    flags: Arc<DashMap<(String, String), bool>>,
    window: String,
}

impl WindowStore for MemoryWindowStore {
    fn get_flag(&self, key: &str) -> Result<Option<bool>> {
        Ok(self
            .flags
            .get(&(self.window.clone(), key.to_string()))
            .map(|entry| *entry.value()))
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        self.flags.insert((self.window.clone(), key.to_string()), value);
        Ok(())
    }
}

type FlagTable = BTreeMap<String, bool>;

/// Идентификатор окна пригоден как имя файла: `[A-Za-z0-9._-]`, не с точки
pub fn is_valid_window_id(window: &str) -> bool {
    !window.is_empty()
        && !window.starts_with('.')
        && window
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Каталог с отдельным JSON-файлом на окно: `<dir>/<окно>.json`.
///
/// Окна живут в разных процессах, поэтому у каждого свой файл и свой
/// временный файл для атомарной замены. `write_lock` защищает только от
/// гонок внутри одного процесса.
///
/// Запись синхронная и выполняется прямо на потоке рантайма: файл в пару
/// десятков байт. Если данных станет больше, переносить в `spawn_blocking`.
pub struct FileWindowStore {
    path: PathBuf,
    tmp_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWindowStore {
    pub fn new<P: AsRef<Path>>(dir: P, window: &str) -> Result<Self> {
        if !is_valid_window_id(window) {
            return Err(proceed_error!(store, "недопустимый идентификатор окна '{}'", window));
        }

        let dir = dir.as_ref();
        let path = dir.join(format!("{}.json", window));
        let tmp_path = dir.join(format!(".{}.json.{}.tmp", window, std::process::id()));
        info!("Состояние окна '{}' хранится в {:?}", window, path);

        Ok(Self {
            path,
            tmp_path,
            write_lock: Mutex::new(()),
        })
    }

    fn read_table(&self) -> Result<FlagTable> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(FlagTable::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| proceed_error!(store, "повреждён файл {:?}: {}", self.path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FlagTable::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_table(&self, table: &FlagTable) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.tmp_path, serde_json::to_vec_pretty(table)?)?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }
}

impl WindowStore for FileWindowStore {
    fn get_flag(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.read_table()?.get(key).copied())
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        let _lock = self.write_lock.lock();
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value);
        self.write_table(&table)
    }
}
