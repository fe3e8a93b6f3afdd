use std::{
	collections::BTreeMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use matrix_storage::{
	Result,
	models::{LocationRecord, MatrixRecord},
	scan::MatrixScan,
	store::{BoxFuture, MatrixStore},
};

/// An in-process [`MatrixStore`] with the same ordering and filtering rules as Postgres.
///
/// Every scan is recorded so tests can assert on the exact store traffic.
#[derive(Default)]
pub struct MemoryStore {
	records: Mutex<BTreeMap<String, MatrixRecord>>,
	locations: Mutex<Vec<LocationRecord>>,
	scans: Mutex<Vec<MatrixScan>>,
	location_calls: AtomicUsize,
	fail_scans: AtomicBool,
}
impl MemoryStore {
	pub fn new(records: Vec<MatrixRecord>, locations: Vec<LocationRecord>) -> Self {
		let store = Self::default();

		store.put_records(records);
		store.set_locations(locations);

		store
	}

	pub fn put_records(&self, records: Vec<MatrixRecord>) {
		let mut guard = self.records.lock().unwrap_or_else(|err| err.into_inner());

		for record in records {
			guard.insert(record.gtin.clone(), record);
		}
	}

	pub fn set_locations(&self, locations: Vec<LocationRecord>) {
		*self.locations.lock().unwrap_or_else(|err| err.into_inner()) = locations;
	}

	/// Makes every following scan fail with a pool timeout.
	pub fn fail_scans(&self, fail: bool) {
		self.fail_scans.store(fail, Ordering::SeqCst);
	}

	pub fn scans(&self) -> Vec<MatrixScan> {
		self.scans.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn scan_calls(&self) -> usize {
		self.scans.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn location_calls(&self) -> usize {
		self.location_calls.load(Ordering::SeqCst)
	}

	fn run_scan(&self, scan: &MatrixScan) -> Result<Vec<MatrixRecord>> {
		self.scans.lock().unwrap_or_else(|err| err.into_inner()).push(scan.clone());

		if self.fail_scans.load(Ordering::SeqCst) {
			return Err(sqlx::Error::PoolTimedOut.into());
		}

		scan.validate()?;

		let guard = self.records.lock().unwrap_or_else(|err| err.into_inner());
		let mut rows: Vec<MatrixRecord> = guard
			.values()
			.filter(|record| scan.matches(record) && scan.is_after_anchor(record))
			.cloned()
			.collect();

		rows.sort_by(|left, right| scan.order.compare(left, right));
		rows.truncate(scan.limit as usize);

		Ok(rows)
	}
}

impl MatrixStore for MemoryStore {
	fn scan<'a>(&'a self, scan: &'a MatrixScan) -> BoxFuture<'a, Result<Vec<MatrixRecord>>> {
		let result = self.run_scan(scan);

		Box::pin(async move { result })
	}

	fn get<'a>(&'a self, gtin: &'a str) -> BoxFuture<'a, Result<Option<MatrixRecord>>> {
		let record = self.records.lock().unwrap_or_else(|err| err.into_inner()).get(gtin).cloned();

		Box::pin(async move { Ok(record) })
	}

	fn list_locations(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
		self.location_calls.fetch_add(1, Ordering::SeqCst);

		let locations = self.locations.lock().unwrap_or_else(|err| err.into_inner()).clone();

		Box::pin(async move { Ok(locations) })
	}
}
