use std::{future::Future, pin::Pin};

use crate::{
	Result,
	models::{LocationRecord, MatrixRecord},
	scan::MatrixScan,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the matrix aggregate and the location directory.
pub trait MatrixStore
where
	Self: Send + Sync,
{
	/// Returns up to `scan.limit` records matching `scan.filter`, strictly after `scan.after`,
	/// in `scan.order`.
	fn scan<'a>(&'a self, scan: &'a MatrixScan) -> BoxFuture<'a, Result<Vec<MatrixRecord>>>;

	fn get<'a>(&'a self, gtin: &'a str) -> BoxFuture<'a, Result<Option<MatrixRecord>>>;

	fn list_locations(&self) -> BoxFuture<'_, Result<Vec<LocationRecord>>>;
}
