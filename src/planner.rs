//! Route Planner - evaluate and confirm bookings for a given day
//!
//! Flow for an evaluation:
//!
//! ```text
//! client name -> ClientBook -> neighborhood
//!             -> GeoLookup (+ jitter) -> Candidate
//! date        -> LedgerStore -> day's schedule
//!             -> ProximityAdvisor::evaluate -> Recommendation
//! ```
//!
//! Confirmation resolves fresh coordinates for the client's neighborhood and
//! appends the appointment to the ledger. Requests are explicit values; the
//! planner holds no per-user selection state.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::advisor::ProximityAdvisor;
use crate::config::{BookingConfig, RouteConfig};
use crate::error::RouteError;
use crate::geo::{GeoLookup, JitterSource};
use crate::route::{occupancy, DayRoute, OccupancySlot};
use crate::storage::{ClientBook, CsvClientBook, CsvLedger, LedgerStore};
use crate::types::clock::{format_time, hhmm, parse_date, parse_time};
use crate::types::{Appointment, BaseLocation, Candidate, Client, Recommendation};

// ============================================================================
// Requests
// ============================================================================

/// "Would `client` at `time` on `date` fit the route?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub date: NaiveDate,
    pub client: String,
    pub time: NaiveTime,
}

impl EvaluationRequest {
    /// Build from raw text as typed by a user.
    pub fn parse(date: &str, client: &str, time: &str) -> Result<Self, RouteError> {
        Ok(Self {
            date: parse_date(date)?,
            client: required_name(client)?,
            time: parse_time(time)?,
        })
    }
}

/// Confirm a booking. `service` falls back to the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub client: String,
    pub time: NaiveTime,
    pub service: Option<String>,
}

impl BookingRequest {
    pub fn parse(date: &str, client: &str, time: &str, service: Option<&str>) -> Result<Self, RouteError> {
        Ok(Self {
            date: parse_date(date)?,
            client: required_name(client)?,
            time: parse_time(time)?,
            service: service
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

fn required_name(raw: &str) -> Result<String, RouteError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RouteError::MalformedInput("client name is empty".to_string()));
    }
    Ok(name.to_string())
}

/// Everything a caller needs to present an evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub client: Client,
    pub candidate: Candidate,
    pub recommendation: Recommendation,
    /// Set when the day's schedule could not be read and the evaluation
    /// ran against an empty day instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub scheduled_count: usize,
    pub occupancy: Vec<OccupancySlot>,
}

// ============================================================================
// Planner
// ============================================================================

pub struct RoutePlanner {
    advisor: ProximityAdvisor,
    lookup: Arc<GeoLookup>,
    base: BaseLocation,
    ledger: Arc<dyn LedgerStore>,
    clients: Arc<dyn ClientBook>,
    booking: BookingConfig,
}

impl RoutePlanner {
    pub fn new(
        advisor: ProximityAdvisor,
        lookup: Arc<GeoLookup>,
        base: BaseLocation,
        ledger: Arc<dyn LedgerStore>,
        clients: Arc<dyn ClientBook>,
        booking: BookingConfig,
    ) -> Self {
        info!(
            base = %base.name,
            ledger = ledger.backend_name(),
            clients = clients.backend_name(),
            "Route planner ready"
        );
        Self {
            advisor,
            lookup,
            base,
            ledger,
            clients,
            booking,
        }
    }

    /// Planner backed by the CSV files named in `config.storage`.
    pub fn from_config(config: &RouteConfig) -> Self {
        let lookup = Arc::new(GeoLookup::from_config(&config.geo));
        let base = lookup.base(&config.operator.base_neighborhood);
        Self::new(
            ProximityAdvisor::new(config.thresholds),
            lookup,
            base,
            Arc::new(CsvLedger::new(config.storage.agenda_path())),
            Arc::new(CsvClientBook::new(config.storage.clients_path())),
            config.booking.clone(),
        )
    }

    pub fn base(&self) -> &BaseLocation {
        &self.base
    }

    pub fn lookup(&self) -> &GeoLookup {
        &self.lookup
    }

    pub fn standard_slots(&self) -> &[String] {
        &self.booking.standard_slots
    }

    fn require_client(&self, name: &str) -> Result<Client, RouteError> {
        self.clients
            .find(name)?
            .ok_or_else(|| RouteError::UnknownClient(name.to_string()))
    }

    /// Classify a proposed booking without persisting anything.
    ///
    /// A ledger read failure does not abort the evaluation: it proceeds
    /// against an empty day and reports the failure in `notice`.
    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        jitter: &mut dyn JitterSource,
    ) -> Result<Assessment, RouteError> {
        let client = self.require_client(&request.client)?;
        let candidate = self.lookup.candidate(&client.neighborhood, request.time, jitter);

        let (schedule, notice) = match self.ledger.load(request.date) {
            Ok(schedule) => (schedule, None),
            Err(e) => {
                warn!(date = %request.date, error = %e, "Ledger unreadable, evaluating against an empty day");
                (Vec::new(), Some(format!("Could not read the schedule: {e}")))
            }
        };

        let recommendation = self.advisor.evaluate(&schedule, &candidate, &self.base);
        info!(
            date = %request.date,
            time = %format_time(request.time),
            client = %client.name,
            neighborhood = %client.neighborhood,
            classification = %recommendation.classification,
            reason = %recommendation.reason_label,
            distance_km = recommendation.distance_km,
            "Booking evaluated"
        );

        Ok(Assessment {
            date: request.date,
            time: request.time,
            occupancy: occupancy(&schedule, request.time, self.booking.near_window_hours),
            scheduled_count: schedule.len(),
            client,
            candidate,
            recommendation,
            notice,
        })
    }

    /// Append a confirmed booking to the ledger and return the stored row.
    pub fn confirm(
        &self,
        request: &BookingRequest,
        jitter: &mut dyn JitterSource,
    ) -> Result<Appointment, RouteError> {
        let client = self.require_client(&request.client)?;
        let location = self.lookup.resolve_jittered(&client.neighborhood, jitter);

        let appointment = Appointment {
            date: request.date,
            time: request.time,
            client: client.name,
            neighborhood: client.neighborhood,
            service: request
                .service
                .clone()
                .unwrap_or_else(|| self.booking.default_service.clone()),
            lat: location.lat,
            lon: location.lon,
            status: self.booking.default_status.clone(),
        };
        self.ledger.append(&appointment)?;
        Ok(appointment)
    }

    /// The day's schedule sorted by time.
    pub fn schedule(&self, date: NaiveDate) -> Result<Vec<Appointment>, RouteError> {
        Ok(self.ledger.load(date)?)
    }

    pub fn day_route(&self, date: NaiveDate) -> Result<DayRoute, RouteError> {
        let schedule = self.schedule(date)?;
        Ok(DayRoute::build(&schedule, &self.base))
    }

    pub fn booked_dates(&self) -> Result<Vec<NaiveDate>, RouteError> {
        Ok(self.ledger.dates()?)
    }

    pub fn clients(&self) -> Result<Vec<Client>, RouteError> {
        Ok(self.clients.list()?)
    }

    /// Register a client. Unknown neighborhoods are accepted (they resolve
    /// to the fallback point) but logged.
    pub fn add_client(&self, client: Client) -> Result<Client, RouteError> {
        let client = Client {
            name: required_name(&client.name)?,
            neighborhood: client.neighborhood.trim().to_string(),
            ..client
        };
        if client.neighborhood.is_empty() {
            return Err(RouteError::MalformedInput("neighborhood is empty".to_string()));
        }
        if !self.lookup.contains(&client.neighborhood) {
            warn!(
                name = %client.name,
                neighborhood = %client.neighborhood,
                "Client registered with a neighborhood outside the lookup table"
            );
        }
        self.clients.add(&client)?;
        Ok(client)
    }
}
