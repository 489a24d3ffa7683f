//! Client directory backends
//!
//! CSV header: `Nombre,Zona,Contacto,Notas Técnicas`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};
use tracing::info;

use super::{has_content, open_for_append, ClientBook, StorageError};
use crate::types::Client;

#[derive(Debug, Serialize, Deserialize)]
struct ClientRecord {
    #[serde(rename = "Nombre")]
    name: String,
    #[serde(rename = "Zona")]
    neighborhood: String,
    #[serde(rename = "Contacto", default)]
    contact: String,
    #[serde(rename = "Notas Técnicas", default)]
    notes: String,
}

impl From<&Client> for ClientRecord {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name.clone(),
            neighborhood: c.neighborhood.clone(),
            contact: c.contact.clone(),
            notes: c.notes.clone(),
        }
    }
}

impl From<ClientRecord> for Client {
    fn from(r: ClientRecord) -> Self {
        Self {
            name: r.name,
            neighborhood: r.neighborhood,
            contact: r.contact,
            notes: r.notes,
        }
    }
}

// ============================================================================
// CSV Client Book
// ============================================================================

pub struct CsvClientBook {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvClientBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl ClientBook for CsvClientBook {
    fn list(&self) -> Result<Vec<Client>, StorageError> {
        if !has_content(&self.path)? {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;

        reader
            .deserialize::<ClientRecord>()
            .map(|row| {
                row.map(Client::from)
                    .map_err(|e| StorageError::csv(&self.path, e))
            })
            .collect()
    }

    fn add(&self, client: &Client) -> Result<(), StorageError> {
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
            .serialize(ClientRecord::from(client))
            .map_err(|e| StorageError::csv(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(name = %client.name, neighborhood = %client.neighborhood, "Client registered");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "CSV"
    }
}

// ============================================================================
// In-Memory Client Book
// ============================================================================

#[derive(Default)]
pub struct InMemoryClientBook {
    clients: RwLock<Vec<Client>>,
}

impl InMemoryClientBook {
    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self {
            clients: RwLock::new(clients),
        }
    }
}

impl ClientBook for InMemoryClientBook {
    fn list(&self) -> Result<Vec<Client>, StorageError> {
        Ok(self
            .clients
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .clone())
    }

    fn add(&self, client: &Client) -> Result<(), StorageError> {
        self.clients
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .push(client.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let book = CsvClientBook::new(dir.path().join("clientes_db.csv"));
        assert!(book.list().unwrap().is_empty());
        assert!(book.find("Ana").unwrap().is_none());
    }

    #[test]
    fn test_add_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientes_db.csv");
        let book = CsvClientBook::new(&path);

        let mut ana = Client::new("Ana", "Pocitos");
        ana.contact = "099 123 456".to_string();
        ana.notes = "Cabello fino, sin amoníaco".to_string();
        book.add(&ana).unwrap();
        book.add(&Client::new("Bea", "Centro")).unwrap();

        let found = book.find("Ana").unwrap().unwrap();
        assert_eq!(found, ana);
        assert_eq!(book.list().unwrap().len(), 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("Nombre,Zona,Contacto,Notas Técnicas\n"));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let book = InMemoryClientBook::with_clients(vec![
            Client::new("Ana", "Pocitos"),
            Client::new("Ana", "Prado"),
        ]);
        assert_eq!(book.find("Ana").unwrap().unwrap().neighborhood, "Pocitos");
    }

    #[test]
    fn test_reads_export_without_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientes_db.csv");
        std::fs::write(&path, "Nombre,Zona\nCarla,Carrasco\n").unwrap();
        let book = CsvClientBook::new(&path);
        let clients = book.list().unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].neighborhood, "Carrasco");
        assert!(clients[0].contact.is_empty());
    }
}
