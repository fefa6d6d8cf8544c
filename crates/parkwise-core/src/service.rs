//! Parking service: the engine wired to a store

use chrono::{DateTime, Local};
use parkwise_api::{
    normalize_vehicle_number, require_non_blank, validate_email, Bill, BillDetails, DashboardStats,
    EntryRequest, Guard, GuardUpdate, NewGuard, ParkingError, ParkingPass, PricingTable,
    PricingUpdate, Result, Vehicle, VehicleFilter,
};
use parkwise_config::FacilityConfig;
use parkwise_store::{AuditEvent, AuditEventType, EntryWrite, ExitWrite, Store, StoreError};
use parkwise_util::{GuardId, VehicleId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    billing, compute_dashboard_stats, provider_for, stats_window, Checkout, IdProvider, PassSale,
    Registration,
};

/// Behaviour switches taken from the facility config
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Refuse an entry while the same plate has an active stay
    pub reject_duplicate_entries: bool,

    /// Day rates used until an admin saves a pricing table
    pub default_pricing: PricingTable,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            reject_duplicate_entries: true,
            default_pricing: PricingTable::default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &FacilityConfig) -> Self {
        Self {
            reject_duplicate_entries: config.facility.reject_duplicate_entries,
            default_pricing: config.pricing,
        }
    }
}

/// Everything recorded about one stay
#[derive(Debug, Clone, Serialize)]
pub struct VehicleHistory {
    pub vehicle: Vehicle,
    pub bills: Vec<Bill>,
    pub passes: Vec<ParkingPass>,
    pub events: Vec<AuditEvent>,
}

/// Entry, exit, pass, guard and pricing operations over a [`Store`].
///
/// All methods take `&self`; the service can be shared behind an `Arc`.
/// Operations that depend on the clock take `now` explicitly.
pub struct ParkingService {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdProvider>,
    settings: ServiceSettings,
}

impl ParkingService {
    pub fn new(store: Arc<dyn Store>, ids: Arc<dyn IdProvider>, settings: ServiceSettings) -> Self {
        Self {
            store,
            ids,
            settings,
        }
    }

    /// Build a service from a validated config, seeding the store with the
    /// configured pricing table and any configured guards it does not know.
    pub fn from_config(
        config: &FacilityConfig,
        store: Arc<dyn Store>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let marks = store.sequence_marks()?;
        let ids = provider_for(config.facility.id_strategy, marks);

        if store.load_pricing()?.is_none() {
            store.save_pricing(&config.pricing)?;
            debug!(pricing = ?config.pricing, "Seeded pricing table");
        }

        for guard in &config.guards {
            if store.get_guard(&guard.id)?.is_none() {
                store.insert_guard(guard)?;
                debug!(guard_id = %guard.id, "Seeded guard");
            }
        }

        let service = Self::new(store, ids, ServiceSettings::from_config(config));
        service.audit(
            AuditEventType::ConfigLoaded {
                guard_count: config.guards.len(),
            },
            now,
        );

        info!(
            facility = %config.facility.name,
            id_strategy = ?config.facility.id_strategy,
            "Parking service initialized"
        );

        Ok(service)
    }

    fn audit(&self, event: AuditEventType, now: DateTime<Local>) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event, now)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    // Vehicles

    /// Admit a vehicle: validate the guard and plate, then store the
    /// active record with its entry receipt.
    pub fn register_entry(
        &self,
        request: EntryRequest,
        now: DateTime<Local>,
    ) -> Result<Registration> {
        let guard = self
            .store
            .get_guard(&request.guard_id)?
            .ok_or_else(|| ParkingError::GuardNotFound(request.guard_id.clone()))?;

        if !guard.is_active() {
            return Err(ParkingError::GuardInactive(guard.id));
        }

        let registration = billing::register_entry(
            &request.vehicle_number,
            request.vehicle_type,
            &guard,
            request.details,
            now,
            self.ids.as_ref(),
        )?;
        let vehicle = &registration.vehicle;

        match self.store.insert_entry(
            vehicle,
            &registration.bill,
            self.settings.reject_duplicate_entries,
        )? {
            EntryWrite::Inserted => {}
            EntryWrite::AlreadyParked(existing) => {
                warn!(
                    vehicle_number = %existing.vehicle_number,
                    vehicle_id = %existing.id,
                    "Entry rejected: vehicle already parked"
                );
                self.audit(
                    AuditEventType::EntryRejected {
                        vehicle_number: existing.vehicle_number.clone(),
                        reason: "already parked".into(),
                    },
                    now,
                );
                return Err(ParkingError::already_parked(existing));
            }
        }

        self.audit(
            AuditEventType::VehicleEntered {
                vehicle_id: vehicle.id.clone(),
                vehicle_number: vehicle.vehicle_number.clone(),
                vehicle_type: vehicle.vehicle_type,
                guard_id: vehicle.guard_id.clone(),
                bill_number: registration.bill.bill_number.clone(),
            },
            now,
        );

        info!(
            vehicle_id = %vehicle.id,
            vehicle_number = %vehicle.vehicle_number,
            vehicle_type = %vehicle.vehicle_type,
            guard_id = %vehicle.guard_id,
            "Vehicle entered"
        );

        Ok(registration)
    }

    /// Look up the current stay of a plate (case-insensitive).
    ///
    /// An active stay wins over any later finished one. Fails with
    /// `VehicleAlreadyExited` if the plate has no active stay left.
    pub fn find_active_vehicle(&self, vehicle_number: &str) -> Result<Vehicle> {
        let number = normalize_vehicle_number(vehicle_number)?;

        if let Some(vehicle) = self.store.find_active_by_number(&number)? {
            return Ok(vehicle);
        }

        match self.store.find_latest_by_number(&number)? {
            Some(vehicle) => Err(ParkingError::already_exited(vehicle)),
            None => Err(ParkingError::VehicleNotFound(number)),
        }
    }

    /// Most recent stay of a plate, active or not
    pub fn find_latest_vehicle(&self, vehicle_number: &str) -> Result<Vehicle> {
        let number = normalize_vehicle_number(vehicle_number)?;

        self.store
            .find_latest_by_number(&number)?
            .ok_or(ParkingError::VehicleNotFound(number))
    }

    pub fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle> {
        self.store
            .get_vehicle(id)?
            .ok_or_else(|| ParkingError::VehicleNotFound(id.to_string()))
    }

    /// Bill a parked vehicle and record its exit.
    ///
    /// Of two concurrent exits for the same vehicle only one is recorded; the
    /// other fails with `VehicleAlreadyExited` carrying the winning record.
    pub fn process_exit(&self, vehicle_id: &VehicleId, now: DateTime<Local>) -> Result<Checkout> {
        let vehicle = self.get_vehicle(vehicle_id)?;
        let pricing = self.pricing()?;

        let checkout = match billing::compute_exit_fee(&vehicle, &pricing, now, self.ids.as_ref()) {
            Ok(checkout) => checkout,
            Err(e) => {
                self.reject_exit(vehicle_id, &e, now);
                return Err(e);
            }
        };

        match self.store.record_exit(&checkout.vehicle, &checkout.bill)? {
            ExitWrite::Recorded => {}
            ExitWrite::AlreadyExited(stored) => {
                let e = ParkingError::already_exited(stored);
                self.reject_exit(vehicle_id, &e, now);
                return Err(e);
            }
            ExitWrite::NotFound => {
                return Err(ParkingError::VehicleNotFound(vehicle_id.to_string()));
            }
        }

        let fees = checkout.bill.amount;
        let days = match &checkout.bill.details {
            BillDetails::Exit { days, .. } => *days,
            _ => 0,
        };

        self.audit(
            AuditEventType::VehicleExited {
                vehicle_id: vehicle_id.clone(),
                vehicle_number: checkout.vehicle.vehicle_number.clone(),
                days,
                fees,
                bill_number: checkout.bill.bill_number.clone(),
            },
            now,
        );

        info!(
            vehicle_id = %vehicle_id,
            vehicle_number = %checkout.vehicle.vehicle_number,
            days,
            fees,
            bill_number = %checkout.bill.bill_number,
            "Vehicle exited"
        );

        Ok(checkout)
    }

    fn reject_exit(&self, vehicle_id: &VehicleId, error: &ParkingError, now: DateTime<Local>) {
        warn!(vehicle_id = %vehicle_id, error = %error, "Exit rejected");
        self.audit(
            AuditEventType::ExitRejected {
                vehicle_id: vehicle_id.clone(),
                reason: error.to_string(),
            },
            now,
        );
    }

    /// Sell a prepaid pass starting `now` for a known vehicle
    pub fn create_parking_pass(
        &self,
        vehicle_id: &VehicleId,
        months_duration: u32,
        rate_per_month: u64,
        now: DateTime<Local>,
    ) -> Result<PassSale> {
        let vehicle = self.get_vehicle(vehicle_id)?;
        let sale = billing::create_parking_pass(
            &vehicle,
            months_duration,
            rate_per_month,
            now,
            self.ids.as_ref(),
        )?;

        self.store.insert_pass(&sale.pass, &sale.bill)?;

        self.audit(
            AuditEventType::PassCreated {
                pass_id: sale.pass.id.clone(),
                vehicle_id: vehicle_id.clone(),
                months_duration,
                amount: sale.pass.amount,
                bill_number: sale.bill.bill_number.clone(),
            },
            now,
        );

        info!(
            pass_id = %sale.pass.id,
            vehicle_id = %vehicle_id,
            months_duration,
            amount = sale.pass.amount,
            "Parking pass created"
        );

        Ok(sale)
    }

    pub fn vehicles(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>> {
        Ok(self.store.list_vehicles(filter)?)
    }

    pub fn active_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.vehicles(&VehicleFilter::active())
    }

    pub fn vehicle_history(&self, id: &VehicleId) -> Result<VehicleHistory> {
        Ok(VehicleHistory {
            vehicle: self.get_vehicle(id)?,
            bills: self.store.list_bills_for_vehicle(id)?,
            passes: self.store.list_passes(id)?,
            events: self.store.get_vehicle_audits(id)?,
        })
    }

    // Guards

    pub fn list_guards(&self) -> Result<Vec<Guard>> {
        Ok(self.store.list_guards()?)
    }

    pub fn get_guard(&self, id: &GuardId) -> Result<Guard> {
        self.store
            .get_guard(id)?
            .ok_or_else(|| ParkingError::GuardNotFound(id.clone()))
    }

    pub fn create_guard(&self, new_guard: NewGuard, now: DateTime<Local>) -> Result<Guard> {
        let name = new_guard.name.trim().to_string();
        let email = new_guard.email.trim().to_string();
        require_non_blank(&name, "name")?;
        validate_email(&email)?;

        // Sequential IDs may point at a guard seeded before a restart
        let attempts = self.store.list_guards()?.len() + 1;
        for _ in 0..attempts {
            let guard = Guard {
                id: self.ids.next_guard_id(),
                name: name.clone(),
                email: email.clone(),
                shift: new_guard.shift,
                status: new_guard.status,
            };

            match self.store.insert_guard(&guard) {
                Ok(()) => {
                    self.audit(
                        AuditEventType::GuardCreated {
                            guard_id: guard.id.clone(),
                        },
                        now,
                    );
                    info!(guard_id = %guard.id, shift = guard.shift.as_str(), "Guard created");
                    return Ok(guard);
                }
                Err(StoreError::Duplicate(_)) => {
                    debug!(guard_id = %guard.id, "Guard ID taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ParkingError::internal("could not allocate a free guard ID"))
    }

    pub fn update_guard(
        &self,
        id: &GuardId,
        update: &GuardUpdate,
        now: DateTime<Local>,
    ) -> Result<Guard> {
        let current = self.get_guard(id)?;
        let mut guard = update.apply_to(&current);
        guard.name = guard.name.trim().to_string();
        guard.email = guard.email.trim().to_string();

        require_non_blank(&guard.name, "name")?;
        validate_email(&guard.email)?;

        if !self.store.update_guard(&guard)? {
            return Err(ParkingError::GuardNotFound(id.clone()));
        }

        self.audit(AuditEventType::GuardUpdated { guard_id: id.clone() }, now);
        info!(guard_id = %id, status = guard.status.as_str(), "Guard updated");

        Ok(guard)
    }

    /// Remove a guard account. Vehicles keep the guard name they were
    /// admitted with.
    pub fn delete_guard(&self, id: &GuardId, now: DateTime<Local>) -> Result<()> {
        if !self.store.delete_guard(id)? {
            return Err(ParkingError::GuardNotFound(id.clone()));
        }

        self.audit(AuditEventType::GuardDeleted { guard_id: id.clone() }, now);
        info!(guard_id = %id, "Guard deleted");
        Ok(())
    }

    // Pricing

    /// Current day rates
    pub fn pricing(&self) -> Result<PricingTable> {
        Ok(self
            .store
            .load_pricing()?
            .unwrap_or(self.settings.default_pricing))
    }

    /// Apply a partial rate change. Exits already billed keep their fee.
    pub fn update_pricing(
        &self,
        update: &PricingUpdate,
        now: DateTime<Local>,
    ) -> Result<PricingTable> {
        let current = self.pricing()?;
        if update.is_empty() {
            return Ok(current);
        }

        let pricing = current.with_update(update);
        self.store.save_pricing(&pricing)?;

        self.audit(AuditEventType::PricingUpdated { pricing }, now);
        info!(
            two_wheeler = pricing.two_wheeler,
            three_wheeler = pricing.three_wheeler,
            four_wheeler = pricing.four_wheeler,
            "Pricing updated"
        );

        Ok(pricing)
    }

    // Reporting

    pub fn dashboard_stats(&self, now: DateTime<Local>) -> Result<DashboardStats> {
        let vehicles = self.store.list_vehicles(&VehicleFilter::default())?;
        let (from, to) = stats_window(now)?;
        let bills = self.store.list_bills_between(from, to)?;
        let guards = self.store.list_guards()?;

        compute_dashboard_stats(&vehicles, &bills, &guards, now)
    }

    /// Latest audit events, newest first
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        Ok(self.store.get_recent_audits(limit)?)
    }

    pub fn is_healthy(&self) -> bool {
        self.store.is_healthy()
    }
}
