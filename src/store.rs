use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::limits::*;
use crate::model::{Activity, BookingStatus, RawBooking, Span, VenueInfo, VenueUnit};

/// Storage collaborator the engine pulls report inputs from. Implementations
/// own their own connection handling and transaction boundaries; the engine
/// neither retries nor swallows their failures.
#[async_trait]
pub trait VenueStore: Send + Sync {
    /// Active venues joined with their organization's working hours,
    /// optionally restricted to one organization.
    async fn fetch_venues(
        &self,
        organization: Option<Ulid>,
    ) -> Result<Vec<VenueInfo>, StoreError>;

    /// Bookings overlapping `range` on the given venues. Cancelled bookings
    /// are excluded unless `include_cancelled`.
    async fn fetch_bookings_overlapping(
        &self,
        venue_ids: &[Ulid],
        range: Span,
        include_cancelled: bool,
    ) -> Result<Vec<RawBooking>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    LimitExceeded(&'static str),
    /// Backend I/O failure (connection loss, query error, ...).
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
            StoreError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            StoreError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            StoreError::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// An organization and its working-hours configuration. Hours of `None`
/// mean "not configured"; the engine substitutes its fallback window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: Ulid,
    pub name: String,
    pub work_start: Option<NaiveTime>,
    pub work_end: Option<NaiveTime>,
    pub open_24h: bool,
}

#[derive(Debug, Clone)]
struct StoredBooking {
    id: Ulid,
    unit_id: Option<Ulid>,
    activity: Activity,
    status: BookingStatus,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

/// Mutable per-venue state. Bookings are kept sorted by start instant.
pub struct VenueState {
    id: Ulid,
    organization_id: Ulid,
    name: String,
    active: bool,
    units: Vec<VenueUnit>,
    bookings: Vec<StoredBooking>,
}

impl VenueState {
    fn new(id: Ulid, organization_id: Ulid, name: String) -> Self {
        Self {
            id,
            organization_id,
            name,
            active: true,
            units: Vec::new(),
            bookings: Vec::new(),
        }
    }

    /// Insert a booking maintaining sort order by start instant.
    fn insert_booking(&mut self, booking: StoredBooking) {
        let pos = self
            .bookings
            .binary_search_by_key(&booking.starts_at, |b| b.starts_at)
            .unwrap_or_else(|e| e);
        self.bookings.insert(pos, booking);
    }

    /// Bookings whose `[starts_at, ends_at)` overlaps the query range.
    /// Binary search skips everything starting at or after `range.end`.
    fn overlapping(&self, range: &Span) -> impl Iterator<Item = &StoredBooking> {
        let right = self
            .bookings
            .partition_point(|b| b.starts_at.timestamp() < range.end);
        self.bookings[..right]
            .iter()
            .filter(move |b| b.ends_at.timestamp() > range.start)
    }

    /// Resolve a unit id to its code; a vanished unit resolves to `None`
    /// (whole venue), the engine's safe default.
    fn unit_code(&self, unit_id: Option<Ulid>) -> Option<String> {
        let uid = unit_id?;
        self.units.iter().find(|u| u.id == uid).map(|u| u.code.clone())
    }
}

pub type SharedVenueState = Arc<RwLock<VenueState>>;

/// In-memory reference store. Serves as the test backend and as the model
/// for database-backed implementations.
pub struct InMemoryStore {
    organizations: DashMap<Ulid, Organization>,
    venues: DashMap<Ulid, SharedVenueState>,
    /// Reverse lookup: booking id → venue id.
    booking_index: DashMap<Ulid, Ulid>,
    /// Reverse lookup: unit id → venue id.
    unit_index: DashMap<Ulid, Ulid>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            organizations: DashMap::new(),
            venues: DashMap::new(),
            booking_index: DashMap::new(),
            unit_index: DashMap::new(),
        }
    }

    fn get_venue(&self, id: &Ulid) -> Option<SharedVenueState> {
        self.venues.get(id).map(|e| e.value().clone())
    }

    // ── Organization / venue management ──────────────────────

    pub fn create_organization(&self, org: Organization) -> Result<(), StoreError> {
        if org.name.len() > MAX_NAME_LEN {
            return Err(StoreError::LimitExceeded("organization name too long"));
        }
        if self.organizations.contains_key(&org.id) {
            return Err(StoreError::AlreadyExists(org.id));
        }
        self.organizations.insert(org.id, org);
        Ok(())
    }

    pub fn create_venue(
        &self,
        id: Ulid,
        organization_id: Ulid,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        let name = name.into();
        if name.len() > MAX_NAME_LEN {
            return Err(StoreError::LimitExceeded("venue name too long"));
        }
        if !self.organizations.contains_key(&organization_id) {
            return Err(StoreError::NotFound(organization_id));
        }
        if self.venues.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let state = VenueState::new(id, organization_id, name);
        self.venues.insert(id, Arc::new(RwLock::new(state)));
        Ok(())
    }

    pub async fn set_venue_active(&self, id: Ulid, active: bool) -> Result<(), StoreError> {
        let venue = self.get_venue(&id).ok_or(StoreError::NotFound(id))?;
        venue.write().await.active = active;
        Ok(())
    }

    // ── Unit management ──────────────────────────────────────

    pub async fn create_unit(
        &self,
        id: Ulid,
        venue_id: Ulid,
        code: impl Into<String>,
    ) -> Result<(), StoreError> {
        let code = code.into();
        if code.len() > MAX_UNIT_CODE_LEN {
            return Err(StoreError::LimitExceeded("unit code too long"));
        }
        if self.unit_index.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let venue = self.get_venue(&venue_id).ok_or(StoreError::NotFound(venue_id))?;
        let mut guard = venue.write().await;
        guard.units.push(VenueUnit { id, venue_id, code, active: true });
        self.unit_index.insert(id, venue_id);
        Ok(())
    }

    pub async fn set_unit_active(&self, id: Ulid, active: bool) -> Result<(), StoreError> {
        let venue_id = *self.unit_index.get(&id).ok_or(StoreError::NotFound(id))?;
        let venue = self.get_venue(&venue_id).ok_or(StoreError::NotFound(venue_id))?;
        let mut guard = venue.write().await;
        let unit = guard
            .units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;
        unit.active = active;
        Ok(())
    }

    // ── Booking management ───────────────────────────────────

    pub async fn record_booking(
        &self,
        id: Ulid,
        venue_id: Ulid,
        unit_id: Option<Ulid>,
        activity: Activity,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if starts_at >= ends_at {
            return Err(StoreError::LimitExceeded("booking range is empty"));
        }
        if self.booking_index.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        if let Some(uid) = unit_id
            && self.unit_index.get(&uid).map(|e| *e.value()) != Some(venue_id)
        {
            return Err(StoreError::NotFound(uid));
        }
        let venue = self.get_venue(&venue_id).ok_or(StoreError::NotFound(venue_id))?;
        let mut guard = venue.write().await;
        guard.insert_booking(StoredBooking {
            id,
            unit_id,
            activity,
            status: BookingStatus::Confirmed,
            starts_at,
            ends_at,
        });
        self.booking_index.insert(id, venue_id);
        Ok(())
    }

    /// Mark a booking cancelled. It stays on record and can still be pulled
    /// into reports that ask for cancelled bookings.
    pub async fn cancel_booking(&self, id: Ulid) -> Result<Ulid, StoreError> {
        let venue_id = *self.booking_index.get(&id).ok_or(StoreError::NotFound(id))?;
        let venue = self.get_venue(&venue_id).ok_or(StoreError::NotFound(venue_id))?;
        let mut guard = venue.write().await;
        let booking = guard
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound(id))?;
        booking.status = BookingStatus::Cancelled;
        Ok(venue_id)
    }
}

#[async_trait]
impl VenueStore for InMemoryStore {
    async fn fetch_venues(
        &self,
        organization: Option<Ulid>,
    ) -> Result<Vec<VenueInfo>, StoreError> {
        // Clone the Arcs first so no DashMap shard guard is held across await.
        let shared: Vec<SharedVenueState> =
            self.venues.iter().map(|e| e.value().clone()).collect();

        let mut out = Vec::new();
        for venue in shared {
            let guard = venue.read().await;
            if !guard.active {
                continue;
            }
            if let Some(filter) = organization
                && guard.organization_id != filter
            {
                continue;
            }
            let Some(org) = self
                .organizations
                .get(&guard.organization_id)
                .map(|e| e.value().clone())
            else {
                continue;
            };
            out.push(VenueInfo {
                id: guard.id,
                name: guard.name.clone(),
                organization_id: org.id,
                organization_name: org.name,
                work_start: org.work_start,
                work_end: org.work_end,
                open_24h: org.open_24h,
            });
        }
        Ok(out)
    }

    async fn fetch_bookings_overlapping(
        &self,
        venue_ids: &[Ulid],
        range: Span,
        include_cancelled: bool,
    ) -> Result<Vec<RawBooking>, StoreError> {
        if venue_ids.len() > MAX_VENUE_IDS_PER_FETCH {
            return Err(StoreError::LimitExceeded("too many venue ids"));
        }

        let mut out = Vec::new();
        for venue_id in venue_ids {
            // A venue deleted between the two listing calls is simply absent.
            let Some(venue) = self.get_venue(venue_id) else { continue };
            let guard = venue.read().await;
            for booking in guard.overlapping(&range) {
                if booking.status == BookingStatus::Cancelled && !include_cancelled {
                    continue;
                }
                out.push(RawBooking {
                    venue_id: *venue_id,
                    unit_code: guard.unit_code(booking.unit_id),
                    activity: booking.activity,
                    status: booking.status,
                    starts_at: booking.starts_at,
                    ends_at: booking.ends_at,
                });
            }
        }
        Ok(out)
    }
}
