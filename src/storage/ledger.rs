//! Appointment ledger backends
//!
//! CSV layout (header row, one booking per line):
//!
//! ```text
//! Fecha,Hora,Cliente,Zona,Servicio,lat,lon,Estado
//! 2024-03-15,09:00,Ana,Pocitos,Corte,-34.9081,-56.1449,Pendiente
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{has_content, open_for_append, LedgerStore, StorageError};
use crate::types::clock::{format_date, format_time, parse_date, parse_time};
use crate::types::Appointment;

/// One CSV row. Dates and times stay as text so a single bad row can be
/// skipped instead of failing the whole file.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "Hora")]
    time: String,
    #[serde(rename = "Cliente")]
    client: String,
    #[serde(rename = "Zona")]
    neighborhood: String,
    #[serde(rename = "Servicio", default)]
    service: String,
    lat: f64,
    lon: f64,
    #[serde(rename = "Estado", default)]
    status: String,
}

impl LedgerRecord {
    fn from_appointment(a: &Appointment) -> Self {
        Self {
            date: format_date(a.date),
            time: format_time(a.time),
            client: a.client.clone(),
            neighborhood: a.neighborhood.clone(),
            service: a.service.clone(),
            lat: a.lat,
            lon: a.lon,
            status: a.status.clone(),
        }
    }

    fn into_appointment(self) -> Option<Appointment> {
        let date = parse_date(&self.date).ok()?;
        let time = parse_time(&self.time).ok()?;
        Some(Appointment {
            date,
            time,
            client: self.client,
            neighborhood: self.neighborhood,
            service: self.service,
            lat: self.lat,
            lon: self.lon,
            status: self.status,
        })
    }
}

fn sort_by_time(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.time);
}

// ============================================================================
// CSV Ledger
// ============================================================================

/// Flat-file ledger.
///
/// Appends go through an in-process mutex so concurrent requests in one
/// process never interleave rows. Separate processes writing the same file
/// are not coordinated.
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "CSV ledger opened");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Every parseable row in file order. Missing file reads as empty.
    fn read_all(&self) -> Result<Vec<Appointment>, StorageError> {
        if !has_content(&self.path)? {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;

        let mut rows = Vec::new();
        for (line, record) in reader.deserialize::<LedgerRecord>().enumerate() {
            let record = record.map_err(|e| StorageError::csv(&self.path, e))?;
            let raw_date = record.date.clone();
            let raw_time = record.time.clone();
            match record.into_appointment() {
                Some(appointment) => rows.push(appointment),
                None => warn!(
                    path = %self.path.display(),
                    row = line + 2,
                    date = %raw_date,
                    time = %raw_time,
                    "Skipping ledger row with unparseable date/time"
                ),
            }
        }
        Ok(rows)
    }
}

impl LedgerStore for CsvLedger {
    fn load(&self, date: NaiveDate) -> Result<Vec<Appointment>, StorageError> {
        let mut day: Vec<Appointment> = self
            .read_all()?
            .into_iter()
            .filter(|a| a.date == date)
            .collect();
        sort_by_time(&mut day);
        debug!(date = %date, count = day.len(), "Ledger day loaded");
        Ok(day)
    }

    fn append(&self, appointment: &Appointment) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let write_header = !has_content(&self.path)?;
        let file = open_for_append(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(LedgerRecord::from_appointment(appointment))
            .map_err(|e| StorageError::csv(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(
            date = %appointment.date,
            time = %format_time(appointment.time),
            client = %appointment.client,
            neighborhood = %appointment.neighborhood,
            "Appointment appended to ledger"
        );
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let mut dates: Vec<NaiveDate> = self.read_all()?.into_iter().map(|a| a.date).collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    fn backend_name(&self) -> &'static str {
        "CSV"
    }
}

// ============================================================================
// In-Memory Ledger
// ============================================================================

/// Not durable; data is lost on drop.
#[derive(Default)]
pub struct InMemoryLedger {
    rows: RwLock<Vec<Appointment>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedger {
    fn load(&self, date: NaiveDate) -> Result<Vec<Appointment>, StorageError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let mut day: Vec<Appointment> = rows.iter().filter(|a| a.date == date).cloned().collect();
        sort_by_time(&mut day);
        Ok(day)
    }

    fn append(&self, appointment: &Appointment) -> Result<(), StorageError> {
        self.rows
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .push(appointment.clone());
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let mut dates: Vec<NaiveDate> = rows.iter().map(|a| a.date).collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt(date: &str, time: &str, client: &str) -> Appointment {
        Appointment {
            date: parse_date(date).unwrap(),
            time: parse_time(time).unwrap(),
            client: client.to_string(),
            neighborhood: "Pocitos".to_string(),
            service: "Corte".to_string(),
            lat: -34.9081,
            lon: -56.1449,
            status: "Pendiente".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("agenda_db.csv"));
        let day = ledger.load(parse_date("2024-03-15").unwrap()).unwrap();
        assert!(day.is_empty());
        assert!(ledger.dates().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("data").join("agenda_db.csv"));
        ledger.append(&appt("2024-03-15", "14:00", "Carla")).unwrap();
        ledger.append(&appt("2024-03-16", "08:00", "Other day")).unwrap();
        ledger.append(&appt("2024-03-15", "09:00", "Ana")).unwrap();

        let day = ledger.load(parse_date("2024-03-15").unwrap()).unwrap();
        let names: Vec<&str> = day.iter().map(|a| a.client.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Carla"]);
        assert_eq!(day[0].lat, -34.9081);

        let dates = ledger.dates().unwrap();
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda_db.csv");
        let ledger = CsvLedger::new(&path);
        ledger.append(&appt("2024-03-15", "09:00", "Ana")).unwrap();
        ledger.append(&appt("2024-03-15", "10:00", "Bea")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("Fecha,Hora,Cliente,Zona,Servicio,lat,lon,Estado"));
        assert_eq!(raw.matches("Fecha").count(), 1);
        assert_eq!(raw.lines().count(), 3);
    }

    #[test]
    fn test_reads_existing_export_and_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda_db.csv");
        std::fs::write(
            &path,
            "Fecha,Hora,Cliente,Zona,Servicio,lat,lon,Estado\n\
             2024-03-15,10:30:00,Bea,Centro,Corte,-34.905,-56.19,Confirmado\n\
             not-a-date,09:00,Ghost,Centro,Corte,-34.905,-56.19,Pendiente\n\
             2024-03-15,09:00,Ana,Pocitos,Color,-34.908,-56.145,Pendiente\n",
        )
        .unwrap();

        let ledger = CsvLedger::new(&path);
        let day = ledger.load(parse_date("2024-03-15").unwrap()).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].client, "Ana");
        assert_eq!(format_time(day[1].time), "10:30");
        assert_eq!(day[1].status, "Confirmado");
    }

    #[test]
    fn test_corrupt_numeric_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda_db.csv");
        std::fs::write(
            &path,
            "Fecha,Hora,Cliente,Zona,Servicio,lat,lon,Estado\n\
             2024-03-15,09:00,Ana,Pocitos,Corte,north,-56.145,Pendiente\n",
        )
        .unwrap();
        let ledger = CsvLedger::new(&path);
        let err = ledger.load(parse_date("2024-03-15").unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::Csv { .. }));
    }

    #[test]
    fn test_in_memory_ledger_keeps_tie_order() {
        let ledger = InMemoryLedger::new();
        ledger.append(&appt("2024-03-15", "09:00", "First")).unwrap();
        ledger.append(&appt("2024-03-15", "08:00", "Early")).unwrap();
        ledger.append(&appt("2024-03-15", "09:00", "Second")).unwrap();

        let day = ledger.load(parse_date("2024-03-15").unwrap()).unwrap();
        let names: Vec<&str> = day.iter().map(|a| a.client.as_str()).collect();
        assert_eq!(names, vec!["Early", "First", "Second"]);
    }

    #[test]
    fn test_trait_object() {
        let ledger: Box<dyn LedgerStore> = Box::new(InMemoryLedger::new());
        assert_eq!(ledger.backend_name(), "InMemory");
        ledger.append(&appt("2024-03-15", "09:00", "Ana")).unwrap();
        assert_eq!(ledger.dates().unwrap().len(), 1);
    }
}
