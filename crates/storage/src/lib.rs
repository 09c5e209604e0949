use directories::ProjectDirs;
use measure_core::{MeasureRequest, MeasurementResult, Point, ScaleSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

const SESSIONS_SCHEMA_VERSION: u32 = 1;
const SESSIONS_FILE: &str = "sessions.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("unsupported session file version {0}")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A saved measurement: the request parameters plus the computed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub points: Vec<Point>,
    pub closed: bool,
    pub scale: ScaleSpec,
    pub measurement: MeasurementResult,
}

impl SessionRecord {
    /// Record `request` with the multiplier it was measured with filled in
    pub fn new(request: &MeasureRequest, measurement: MeasurementResult) -> Self {
        let scale = ScaleSpec {
            units_per_pixel: measurement.unit_multiplier.or(request.scale.units_per_pixel),
            ..request.scale
        };

        Self { points: request.points.clone(), closed: request.closed, scale, measurement }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionsEnvelope {
    version: u32,
    sessions: BTreeMap<String, SessionRecord>,
}

/// JSON-file store of session records keyed by session id
///
/// The whole file is read and rewritten on every operation.
#[derive(Debug)]
pub struct SessionStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "ImageMeasure", "ImageMeasure")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self::with_root(dirs.data_local_dir()))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), lock: Mutex::new(()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.root.join(SESSIONS_FILE)
    }

    pub fn save_session(&self, session_id: &str, record: SessionRecord) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut envelope = self.read()?;
        envelope.sessions.insert(session_id.to_owned(), record);
        self.write(envelope)?;

        info!(session_id, "saved session");
        Ok(())
    }

    pub fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        let _guard = self.guard();
        let mut envelope = self.read()?;
        Ok(envelope.sessions.remove(session_id))
    }

    /// Remove a session, returning whether it existed
    pub fn delete_session(&self, session_id: &str) -> Result<bool, StorageError> {
        let _guard = self.guard();
        let mut envelope = self.read()?;
        if envelope.sessions.remove(session_id).is_none() {
            return Ok(false);
        }
        self.write(envelope)?;

        info!(session_id, "deleted session");
        Ok(true)
    }

    pub fn list_sessions(&self) -> Result<BTreeMap<String, SessionRecord>, StorageError> {
        let _guard = self.guard();
        Ok(self.read()?.sessions)
    }

    pub fn session_ids(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.list_sessions()?.into_keys().collect())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // Guards file access only; a poisoned lock holds no state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Result<SessionsEnvelope, StorageError> {
        let path = self.sessions_path();
        if !path.exists() {
            debug!(path = %path.display(), "session file absent, starting empty");
            return Ok(SessionsEnvelope {
                version: SESSIONS_SCHEMA_VERSION,
                sessions: BTreeMap::new(),
            });
        }

        let bytes = fs::read(&path)?;
        let envelope: SessionsEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > SESSIONS_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        Ok(envelope)
    }

    fn write(&self, mut envelope: SessionsEnvelope) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        envelope.version = SESSIONS_SCHEMA_VERSION;
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        // Write to file atomically using a temporary file
        let path = self.sessions_path();
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        debug!(path = %path.display(), sessions = envelope.sessions.len(), "wrote session file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use measure_core::Unit;

    fn square_record(unit: Unit, units_per_pixel: f64) -> SessionRecord {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let request = MeasureRequest::new(points, true, ScaleSpec::direct(unit, units_per_pixel));
        let measurement = request.measure().expect("request should be valid");
        SessionRecord::new(&request, measurement)
    }

    #[test]
    fn session_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());

        let record = square_record(Unit::Mile, 0.5);
        store.save_session("abc", record.clone()).expect("save should succeed");

        let loaded = store.load_session("abc").expect("load should succeed");
        assert_eq!(loaded, Some(record));
    }

    #[test]
    fn record_carries_resolved_multiplier() {
        let request = MeasureRequest::new(
            vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)],
            false,
            ScaleSpec::reference(Unit::Centimetre, 20.0, 10.0),
        );
        let record = SessionRecord::new(&request, request.measure().expect("valid"));

        assert_eq!(record.scale.units_per_pixel, Some(2.0));
        assert_eq!(record.scale.reference_distance, Some(20.0));
        assert_eq!(record.scale.reference_pixel_length, Some(10.0));
        assert_eq!(record.measurement.total_units, Some(10.0));
    }

    #[test]
    fn empty_store_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path().join("nested"));

        assert!(store.list_sessions().expect("list should succeed").is_empty());
        assert_eq!(store.load_session("missing").expect("load should succeed"), None);
        assert!(!store.sessions_path().exists());
    }

    #[test]
    fn list_is_sorted_by_session_id() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());

        for id in ["zeta", "alpha", "mu"] {
            store.save_session(id, square_record(Unit::Centimetre, 1.0)).expect("save");
        }

        assert_eq!(store.session_ids().expect("ids"), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn save_overwrites_existing_session() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());

        store.save_session("s1", square_record(Unit::Centimetre, 1.0)).expect("save");
        store.save_session("s1", square_record(Unit::Centimetre, 2.0)).expect("save");

        let sessions = store.list_sessions().expect("list");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions["s1"].measurement.unit_multiplier, Some(2.0));
    }

    #[test]
    fn delete_reports_whether_session_existed() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());

        store.save_session("s1", square_record(Unit::Millimetre, 1.0)).expect("save");
        assert!(store.delete_session("s1").expect("delete"));
        assert!(!store.delete_session("s1").expect("delete"));
        assert_eq!(store.load_session("s1").expect("load"), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());
        fs::write(store.sessions_path(), b"{ not json").expect("write");

        assert!(matches!(store.list_sessions(), Err(StorageError::Serde(_))));
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());
        fs::write(store.sessions_path(), br#"{"version": 99, "sessions": {}}"#).expect("write");

        assert!(matches!(store.list_sessions(), Err(StorageError::UnsupportedVersion(99))));
    }

    #[test]
    fn file_uses_request_and_measurement_shape() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SessionStore::with_root(temp.path());
        store.save_session("abc", square_record(Unit::Pixel, 1.0)).expect("save");

        let bytes = fs::read(store.sessions_path()).expect("read");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

        let session = &value["sessions"]["abc"];
        assert_eq!(value["version"], 1);
        assert_eq!(session["closed"], true);
        assert_eq!(session["points"][2]["x"], 10.0);
        assert_eq!(session["scale"]["unit_name"], "px");
        assert_eq!(session["measurement"]["area_pixels"], 100.0);
    }
}
