//! SQLite-based store implementation

use chrono::{DateTime, Local};
use parkwise_api::{
    Bill, Guard, ParkingPass, PricingTable, Vehicle, VehicleFilter, VehicleStatus,
};
use parkwise_util::{
    parse_sequence_number, BillNumber, GuardId, VehicleId, BILL_PREFIX, GUARD_ID_PREFIX,
    PASS_BILL_PREFIX, PASS_ID_PREFIX, VEHICLE_ID_PREFIX,
};
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{
    AuditEvent, AuditEventType, EntryWrite, ExitWrite, SequenceMarks, Store, StoreError,
    StoreResult,
};

/// SQLite-based store
///
/// Records are kept as JSON documents next to the few columns the queries
/// need. All access goes through one connection behind a mutex, which also
/// serializes the multi-statement transactions.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- One row per parking stay
            CREATE TABLE IF NOT EXISTS vehicles (
                id TEXT PRIMARY KEY,
                vehicle_number TEXT NOT NULL,
                status TEXT NOT NULL,
                entry_ms INTEGER NOT NULL,
                vehicle_json TEXT NOT NULL
            );

            -- Receipts (entry, exit, pass)
            CREATE TABLE IF NOT EXISTS bills (
                bill_number TEXT PRIMARY KEY,
                vehicle_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_ms INTEGER NOT NULL,
                bill_json TEXT NOT NULL
            );

            -- Prepaid passes
            CREATE TABLE IF NOT EXISTS passes (
                id TEXT PRIMARY KEY,
                vehicle_id TEXT NOT NULL,
                start_ms INTEGER NOT NULL,
                pass_json TEXT NOT NULL
            );

            -- Guard accounts
            CREATE TABLE IF NOT EXISTS guards (
                id TEXT PRIMARY KEY,
                guard_json TEXT NOT NULL
            );

            -- Pricing table (single row)
            CREATE TABLE IF NOT EXISTS pricing (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                pricing_json TEXT NOT NULL
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                vehicle_id TEXT,
                event_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_vehicles_number ON vehicles(vehicle_number, status);
            CREATE INDEX IF NOT EXISTS idx_bills_created ON bills(created_ms);
            CREATE INDEX IF NOT EXISTS idx_bills_vehicle ON bills(vehicle_id);
            CREATE INDEX IF NOT EXISTS idx_passes_vehicle ON passes(vehicle_id);
            CREATE INDEX IF NOT EXISTS idx_audit_vehicle ON audit_log(vehicle_id);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn insert_bill(conn: &Connection, bill: &Bill) -> StoreResult<()> {
    let bill_json = serde_json::to_string(bill)?;

    conn.execute(
        "INSERT INTO bills (bill_number, vehicle_id, kind, created_ms, bill_json) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            bill.bill_number.as_str(),
            bill.vehicle_id.as_str(),
            bill.kind().as_str(),
            bill.created_at.timestamp_millis(),
            bill_json
        ],
    )?;

    debug!(bill_number = %bill.bill_number, kind = bill.kind().as_str(), "Bill stored");
    Ok(())
}

/// Run a query whose first column is a JSON document and decode every row
fn query_json<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

    let mut items = Vec::new();
    for row in rows {
        items.push(serde_json::from_str(&row?)?);
    }
    Ok(items)
}

fn query_json_opt<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> StoreResult<Option<T>> {
    let json: Option<String> = conn
        .query_row(sql, params, |row| row.get(0))
        .optional()?;

    match json {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Serialization(format!("bad timestamp {s:?}: {e}")))
}

fn normalize_number(vehicle_number: &str) -> String {
    vehicle_number.trim().to_ascii_uppercase()
}

/// Most recent active stay for an already normalized plate
fn active_by_number(conn: &Connection, vehicle_number: &str) -> StoreResult<Option<Vehicle>> {
    query_json_opt(
        conn,
        "SELECT vehicle_json FROM vehicles WHERE vehicle_number = ?1 AND status = 'active' \
         ORDER BY entry_ms DESC, rowid DESC LIMIT 1",
        [vehicle_number],
    )
}

/// Highest number among `column` values of the form `<prefix>-<digits>`
fn max_sequence(conn: &Connection, table: &str, column: &str, prefix: &str) -> StoreResult<u64> {
    let mut stmt = conn.prepare(&format!("SELECT {column} FROM {table} WHERE {column} LIKE ?1"))?;
    let ids = stmt.query_map([format!("{prefix}-%")], |row| row.get::<_, String>(0))?;

    let mut highest = 0;
    for id in ids {
        if let Some(n) = parse_sequence_number(&id?, prefix) {
            highest = highest.max(n);
        }
    }
    Ok(highest)
}

impl Store for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;
        let vehicle_id = event.event.vehicle_id().map(|id| id.as_str().to_string());

        conn.execute(
            "INSERT INTO audit_log (timestamp, vehicle_id, event_json) VALUES (?1, ?2, ?3)",
            params![event.timestamp.to_rfc3339(), vehicle_id, event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        read_audits(
            &conn,
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?1",
            [limit],
        )
    }

    fn get_vehicle_audits(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;
        read_audits(
            &conn,
            "SELECT id, timestamp, event_json FROM audit_log WHERE vehicle_id = ?1 ORDER BY id ASC",
            [vehicle_id.as_str()],
        )
    }

    fn insert_entry(
        &self,
        vehicle: &Vehicle,
        bill: &Bill,
        reject_duplicate: bool,
    ) -> StoreResult<EntryWrite> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if reject_duplicate {
            let parked = active_by_number(&tx, &normalize_number(&vehicle.vehicle_number))?;

            if let Some(parked) = parked {
                debug!(
                    vehicle_number = %vehicle.vehicle_number,
                    "Entry write skipped, plate already parked"
                );
                return Ok(EntryWrite::AlreadyParked(parked));
            }
        }

        let vehicle_json = serde_json::to_string(vehicle)?;
        tx.execute(
            "INSERT INTO vehicles (id, vehicle_number, status, entry_ms, vehicle_json) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                vehicle.id.as_str(),
                normalize_number(&vehicle.vehicle_number),
                vehicle.status.as_str(),
                vehicle.entry_time.timestamp_millis(),
                vehicle_json
            ],
        )?;
        insert_bill(&tx, bill)?;
        tx.commit()?;

        debug!(vehicle_id = %vehicle.id, "Vehicle entry stored");
        Ok(EntryWrite::Inserted)
    }

    fn get_vehicle(&self, id: &VehicleId) -> StoreResult<Option<Vehicle>> {
        let conn = self.conn()?;
        query_json_opt(
            &conn,
            "SELECT vehicle_json FROM vehicles WHERE id = ?1",
            [id.as_str()],
        )
    }

    fn find_latest_by_number(&self, vehicle_number: &str) -> StoreResult<Option<Vehicle>> {
        let conn = self.conn()?;
        query_json_opt(
            &conn,
            "SELECT vehicle_json FROM vehicles WHERE vehicle_number = ?1 \
             ORDER BY entry_ms DESC, rowid DESC LIMIT 1",
            [normalize_number(vehicle_number)],
        )
    }

    fn find_active_by_number(&self, vehicle_number: &str) -> StoreResult<Option<Vehicle>> {
        let conn = self.conn()?;
        active_by_number(&conn, &normalize_number(vehicle_number))
    }

    fn list_vehicles(&self, filter: &VehicleFilter) -> StoreResult<Vec<Vehicle>> {
        let conn = self.conn()?;
        let status = filter.status.map(|s| s.as_str());
        let number = filter.vehicle_number.as_deref().map(normalize_number);

        let vehicles: Vec<Vehicle> = query_json(
            &conn,
            "SELECT vehicle_json FROM vehicles \
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR vehicle_number = ?2) \
             ORDER BY entry_ms DESC, rowid DESC",
            params![status, number],
        )?;

        Ok(vehicles.into_iter().filter(|v| filter.matches(v)).collect())
    }

    fn record_exit(&self, vehicle: &Vehicle, bill: &Bill) -> StoreResult<ExitWrite> {
        debug_assert_eq!(vehicle.status, VehicleStatus::Exited);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let stored: Option<Vehicle> = query_json_opt(
            &tx,
            "SELECT vehicle_json FROM vehicles WHERE id = ?1",
            [vehicle.id.as_str()],
        )?;
        let Some(stored) = stored else {
            return Ok(ExitWrite::NotFound);
        };

        let vehicle_json = serde_json::to_string(vehicle)?;
        let updated = tx.execute(
            "UPDATE vehicles SET status = ?2, vehicle_json = ?3 \
             WHERE id = ?1 AND status = 'active'",
            params![vehicle.id.as_str(), vehicle.status.as_str(), vehicle_json],
        )?;

        if updated == 0 {
            debug!(vehicle_id = %vehicle.id, "Exit write skipped, vehicle already exited");
            return Ok(ExitWrite::AlreadyExited(stored));
        }

        insert_bill(&tx, bill)?;
        tx.commit()?;

        debug!(vehicle_id = %vehicle.id, bill_number = %bill.bill_number, "Vehicle exit stored");
        Ok(ExitWrite::Recorded)
    }

    fn get_bill(&self, bill_number: &BillNumber) -> StoreResult<Option<Bill>> {
        let conn = self.conn()?;
        query_json_opt(
            &conn,
            "SELECT bill_json FROM bills WHERE bill_number = ?1",
            [bill_number.as_str()],
        )
    }

    fn list_bills_for_vehicle(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<Bill>> {
        let conn = self.conn()?;
        query_json(
            &conn,
            "SELECT bill_json FROM bills WHERE vehicle_id = ?1 ORDER BY created_ms ASC, rowid ASC",
            [vehicle_id.as_str()],
        )
    }

    fn list_bills_between(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> StoreResult<Vec<Bill>> {
        let conn = self.conn()?;
        query_json(
            &conn,
            "SELECT bill_json FROM bills WHERE created_ms >= ?1 AND created_ms < ?2 \
             ORDER BY created_ms ASC, rowid ASC",
            params![from.timestamp_millis(), to.timestamp_millis()],
        )
    }

    fn insert_pass(&self, pass: &ParkingPass, bill: &Bill) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let pass_json = serde_json::to_string(pass)?;

        tx.execute(
            "INSERT INTO passes (id, vehicle_id, start_ms, pass_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                pass.id.as_str(),
                pass.vehicle_id.as_str(),
                pass.start_date.timestamp_millis(),
                pass_json
            ],
        )?;
        insert_bill(&tx, bill)?;
        tx.commit()?;

        debug!(pass_id = %pass.id, vehicle_id = %pass.vehicle_id, "Parking pass stored");
        Ok(())
    }

    fn list_passes(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<ParkingPass>> {
        let conn = self.conn()?;
        query_json(
            &conn,
            "SELECT pass_json FROM passes WHERE vehicle_id = ?1 ORDER BY start_ms ASC, rowid ASC",
            [vehicle_id.as_str()],
        )
    }

    fn insert_guard(&self, guard: &Guard) -> StoreResult<()> {
        let conn = self.conn()?;
        let guard_json = serde_json::to_string(guard)?;

        conn.execute(
            "INSERT INTO guards (id, guard_json) VALUES (?1, ?2)",
            params![guard.id.as_str(), guard_json],
        )?;

        debug!(guard_id = %guard.id, "Guard stored");
        Ok(())
    }

    fn get_guard(&self, id: &GuardId) -> StoreResult<Option<Guard>> {
        let conn = self.conn()?;
        query_json_opt(
            &conn,
            "SELECT guard_json FROM guards WHERE id = ?1",
            [id.as_str()],
        )
    }

    fn list_guards(&self) -> StoreResult<Vec<Guard>> {
        let conn = self.conn()?;
        query_json(&conn, "SELECT guard_json FROM guards ORDER BY rowid ASC", [])
    }

    fn update_guard(&self, guard: &Guard) -> StoreResult<bool> {
        let conn = self.conn()?;
        let guard_json = serde_json::to_string(guard)?;

        let updated = conn.execute(
            "UPDATE guards SET guard_json = ?2 WHERE id = ?1",
            params![guard.id.as_str(), guard_json],
        )?;

        Ok(updated > 0)
    }

    fn delete_guard(&self, id: &GuardId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM guards WHERE id = ?1", [id.as_str()])?;
        Ok(deleted > 0)
    }

    fn load_pricing(&self) -> StoreResult<Option<PricingTable>> {
        let conn = self.conn()?;
        query_json_opt(&conn, "SELECT pricing_json FROM pricing WHERE id = 1", [])
    }

    fn save_pricing(&self, pricing: &PricingTable) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(pricing)?;

        conn.execute(
            r#"
            INSERT INTO pricing (id, pricing_json)
            VALUES (1, ?1)
            ON CONFLICT(id)
            DO UPDATE SET pricing_json = excluded.pricing_json
            "#,
            [json],
        )?;

        debug!("Pricing saved");
        Ok(())
    }

    fn sequence_marks(&self) -> StoreResult<SequenceMarks> {
        let conn = self.conn()?;

        Ok(SequenceMarks {
            vehicles: max_sequence(&conn, "vehicles", "id", VEHICLE_ID_PREFIX)?,
            guards: max_sequence(&conn, "guards", "id", GUARD_ID_PREFIX)?,
            passes: max_sequence(&conn, "passes", "id", PASS_ID_PREFIX)?,
            bills: max_sequence(&conn, "bills", "bill_number", BILL_PREFIX)?,
            pass_bills: max_sequence(&conn, "bills", "bill_number", PASS_BILL_PREFIX)?,
        })
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

fn read_audits(conn: &Connection, sql: &str, params: impl Params) -> StoreResult<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt.query_map(params, |row| {
        let id: i64 = row.get(0)?;
        let timestamp_str: String = row.get(1)?;
        let event_json: String = row.get(2)?;
        Ok((id, timestamp_str, event_json))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (id, timestamp_str, event_json) = row?;
        let event: AuditEventType = serde_json::from_str(&event_json)?;

        events.push(AuditEvent {
            id,
            timestamp: parse_timestamp(&timestamp_str)?,
            event,
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parkwise_api::{BillDetails, GuardStatus, PassDetails, Shift, VehicleCategory};
    use parkwise_util::PassId;

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, day, hour, 0, 0).single().unwrap()
    }

    fn vehicle(id: &str, number: &str, entry: DateTime<Local>) -> Vehicle {
        Vehicle {
            id: VehicleId::new(id),
            vehicle_number: number.into(),
            vehicle_type: VehicleCategory::FourWheeler,
            entry_time: entry,
            exit_time: None,
            guard_id: GuardId::new("g1"),
            guard_name: "John Doe".into(),
            shift: Shift::Day,
            fees: None,
            status: VehicleStatus::Active,
            parking_spot: None,
            color: None,
            brand: None,
        }
    }

    fn bill(
        number: &str,
        vehicle: &Vehicle,
        amount: u64,
        details: BillDetails,
        created: DateTime<Local>,
    ) -> Bill {
        Bill {
            bill_number: BillNumber::new(number),
            vehicle_id: vehicle.id.clone(),
            vehicle_number: vehicle.vehicle_number.clone(),
            vehicle_type: vehicle.vehicle_type,
            amount,
            guard_id: vehicle.guard_id.clone(),
            guard_name: vehicle.guard_name.clone(),
            shift: vehicle.shift,
            created_at: created,
            details,
        }
    }

    fn entry_bill(number: &str, vehicle: &Vehicle) -> Bill {
        let details = BillDetails::Entry {
            entry_time: vehicle.entry_time,
        };
        bill(number, vehicle, 0, details, vehicle.entry_time)
    }

    fn exited(vehicle: &Vehicle, exit: DateTime<Local>, fees: u64) -> Vehicle {
        Vehicle {
            exit_time: Some(exit),
            fees: Some(fees),
            status: VehicleStatus::Exited,
            ..vehicle.clone()
        }
    }

    fn exit_bill(number: &str, vehicle: &Vehicle) -> Bill {
        let exit_time = vehicle.exit_time.unwrap();
        let details = BillDetails::Exit {
            entry_time: vehicle.entry_time,
            exit_time,
            days: 1,
            duration: "1 day".into(),
        };
        bill(number, vehicle, vehicle.fees.unwrap(), details, exit_time)
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
        assert_eq!(store.sequence_marks().unwrap(), SequenceMarks::default());
    }

    #[test]
    fn test_entry_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let v = vehicle("v1", "KA01AB1234", at(15, 9));

        let write = store.insert_entry(&v, &entry_bill("BILL-1", &v), true).unwrap();
        assert_eq!(write, EntryWrite::Inserted);

        assert_eq!(store.get_vehicle(&v.id).unwrap(), Some(v.clone()));
        assert_eq!(store.find_latest_by_number("ka01ab1234").unwrap(), Some(v.clone()));
        assert!(store.get_bill(&BillNumber::new("BILL-1")).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_active_plate() {
        let store = SqliteStore::in_memory().unwrap();
        let first = vehicle("v1", "KA01AB1234", at(15, 9));
        let second = vehicle("v2", "KA01AB1234", at(15, 10));

        store.insert_entry(&first, &entry_bill("BILL-1", &first), true).unwrap();

        let write = store.insert_entry(&second, &entry_bill("BILL-2", &second), true).unwrap();
        assert_eq!(write, EntryWrite::AlreadyParked(first.clone()));
        assert!(store.get_vehicle(&second.id).unwrap().is_none());
        assert!(store.get_bill(&BillNumber::new("BILL-2")).unwrap().is_none());

        // Permissive mode stores both stays
        let write = store.insert_entry(&second, &entry_bill("BILL-2", &second), false).unwrap();
        assert_eq!(write, EntryWrite::Inserted);
        assert_eq!(store.find_latest_by_number("KA01AB1234").unwrap().unwrap().id, second.id);
    }

    #[test]
    fn test_record_exit_once() {
        let store = SqliteStore::in_memory().unwrap();
        let v = vehicle("v1", "KA01AB1234", at(15, 9));
        store.insert_entry(&v, &entry_bill("BILL-1", &v), true).unwrap();

        let done = exited(&v, at(15, 11), 200);
        let write = store.record_exit(&done, &exit_bill("BILL-2", &done)).unwrap();
        assert_eq!(write, ExitWrite::Recorded);

        // A second exit with a different fee must not overwrite the first
        let again = exited(&v, at(17, 11), 600);
        let write = store.record_exit(&again, &exit_bill("BILL-3", &again)).unwrap();
        assert_eq!(write, ExitWrite::AlreadyExited(done.clone()));

        assert_eq!(store.get_vehicle(&v.id).unwrap(), Some(done));
        assert!(store.get_bill(&BillNumber::new("BILL-3")).unwrap().is_none());
        assert_eq!(store.list_bills_for_vehicle(&v.id).unwrap().len(), 2);
    }

    #[test]
    fn test_record_exit_unknown_vehicle() {
        let store = SqliteStore::in_memory().unwrap();
        let v = exited(&vehicle("ghost", "KA01AB1234", at(15, 9)), at(15, 10), 200);

        let write = store.record_exit(&v, &exit_bill("BILL-9", &v)).unwrap();
        assert_eq!(write, ExitWrite::NotFound);
    }

    #[test]
    fn test_list_vehicles_filters() {
        let store = SqliteStore::in_memory().unwrap();
        let a = vehicle("v1", "KA01AB1234", at(15, 9));
        let mut b = vehicle("v2", "KA02CD5678", at(15, 10));
        b.vehicle_type = VehicleCategory::TwoWheeler;

        store.insert_entry(&a, &entry_bill("BILL-1", &a), true).unwrap();
        store.insert_entry(&b, &entry_bill("BILL-2", &b), true).unwrap();
        let done = exited(&a, at(15, 12), 200);
        store.record_exit(&done, &exit_bill("BILL-3", &done)).unwrap();

        let all = store.list_vehicles(&VehicleFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b.id); // newest entry first

        let active = store.list_vehicles(&VehicleFilter::active()).unwrap();
        assert_eq!(active, vec![b.clone()]);

        let two_wheelers = store
            .list_vehicles(&VehicleFilter {
                vehicle_type: Some(VehicleCategory::TwoWheeler),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(two_wheelers.len(), 1);
    }

    #[test]
    fn test_bills_between() {
        let store = SqliteStore::in_memory().unwrap();
        let v = vehicle("v1", "KA01AB1234", at(15, 9));
        store.insert_entry(&v, &entry_bill("BILL-1", &v), true).unwrap();
        let done = exited(&v, at(16, 9), 200);
        store.record_exit(&done, &exit_bill("BILL-2", &done)).unwrap();

        let day_16 = store.list_bills_between(at(16, 0), at(17, 0)).unwrap();
        assert_eq!(day_16.len(), 1);
        assert_eq!(day_16[0].amount, 200);

        let both = store.list_bills_between(at(15, 0), at(17, 0)).unwrap();
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_passes() {
        let store = SqliteStore::in_memory().unwrap();
        let v = vehicle("v1", "KA01AB1234", at(15, 9));
        store.insert_entry(&v, &entry_bill("BILL-1", &v), true).unwrap();

        let pass = ParkingPass {
            id: PassId::new("p1"),
            vehicle_id: v.id.clone(),
            vehicle_number: v.vehicle_number.clone(),
            start_date: at(15, 12),
            end_date: Local.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).single().unwrap(),
            months_duration: 3,
            rate_per_month: 1000,
            amount: 3000,
            bill_number: BillNumber::new("PASS-1"),
            created_at: at(15, 12),
        };
        let details = BillDetails::Pass(PassDetails {
            pass_id: pass.id.clone(),
            start_date: pass.start_date,
            end_date: pass.end_date,
            months_duration: 3,
        });
        let pass_bill = bill("PASS-1", &v, 3000, details, at(15, 12));

        store.insert_pass(&pass, &pass_bill).unwrap();

        assert_eq!(store.list_passes(&v.id).unwrap(), vec![pass]);
        assert!(store.get_bill(&BillNumber::new("PASS-1")).unwrap().unwrap().is_parking_pass());
    }

    #[test]
    fn test_sequence_marks_follow_highest_number() {
        let store = SqliteStore::in_memory().unwrap();
        let a = vehicle("V-000001", "KA01AA0001", at(15, 9));
        let b = vehicle("V-000003", "KA01AA0002", at(15, 10));
        store.insert_entry(&a, &entry_bill("BILL-000001", &a), true).unwrap();
        store.insert_entry(&b, &entry_bill("BILL-000003", &b), true).unwrap();

        // UUID-style numbers sharing the prefix are ignored
        let c = vehicle("0b7e6f0e-4d1c", "KA01AA0003", at(15, 11));
        store.insert_entry(&c, &entry_bill("BILL-9F00AA", &c), true).unwrap();

        let marks = store.sequence_marks().unwrap();
        assert_eq!(marks.vehicles, 3);
        assert_eq!(marks.bills, 3);
        assert_eq!(marks.guards, 0);
        assert_eq!(marks.pass_bills, 0);
    }

    #[test]
    fn test_find_active_by_number_skips_exited_stays() {
        let store = SqliteStore::in_memory().unwrap();
        let older = vehicle("v1", "KA01AB1234", at(15, 9));
        let newer = vehicle("v2", "KA01AB1234", at(15, 10));
        store.insert_entry(&older, &entry_bill("BILL-1", &older), false).unwrap();
        store.insert_entry(&newer, &entry_bill("BILL-2", &newer), false).unwrap();

        let done = exited(&newer, at(15, 11), 200);
        store.record_exit(&done, &exit_bill("BILL-3", &done)).unwrap();

        assert_eq!(store.find_latest_by_number("KA01AB1234").unwrap(), Some(done));
        assert_eq!(store.find_active_by_number("ka01ab1234").unwrap(), Some(older));
    }

    #[test]
    fn test_guards_crud() {
        let store = SqliteStore::in_memory().unwrap();
        let mut guard = Guard {
            id: GuardId::new("1"),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            shift: Shift::Day,
            status: GuardStatus::Active,
        };

        store.insert_guard(&guard).unwrap();
        assert!(matches!(store.insert_guard(&guard), Err(StoreError::Duplicate(_))));

        guard.shift = Shift::Night;
        assert!(store.update_guard(&guard).unwrap());
        assert_eq!(store.get_guard(&guard.id).unwrap().unwrap().shift, Shift::Night);
        assert_eq!(store.list_guards().unwrap().len(), 1);

        assert!(store.delete_guard(&guard.id).unwrap());
        assert!(!store.delete_guard(&guard.id).unwrap());
        assert!(!store.update_guard(&guard).unwrap());
        assert!(store.get_guard(&guard.id).unwrap().is_none());
    }

    #[test]
    fn test_pricing() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_pricing().unwrap().is_none());

        let pricing = PricingTable::default();
        store.save_pricing(&pricing).unwrap();
        assert_eq!(store.load_pricing().unwrap(), Some(pricing));

        let raised = PricingTable {
            four_wheeler: 250,
            ..pricing
        };
        store.save_pricing(&raised).unwrap();
        assert_eq!(store.load_pricing().unwrap(), Some(raised));
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();
        let vehicle_id = VehicleId::new("v1");

        store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStarted, at(15, 8)))
            .unwrap();
        store
            .append_audit(AuditEvent::new(
                AuditEventType::ExitRejected {
                    vehicle_id: vehicle_id.clone(),
                    reason: "already exited".into(),
                },
                at(15, 9),
            ))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1].event, AuditEventType::ServiceStarted));

        let history = store.get_vehicle_audits(&vehicle_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].timestamp, at(15, 9));
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parkwise.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_pricing(&PricingTable::default()).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_pricing().unwrap(), Some(PricingTable::default()));
    }
}
