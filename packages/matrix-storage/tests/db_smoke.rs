use matrix_config::Postgres;
use matrix_storage::{
	db::Db,
	scan::{MatrixScan, ScanAnchor, ScanFilter, ScanOrder, SearchField},
	store::MatrixStore,
};
use matrix_testkit::{
	TestDatabase,
	fixtures::{location, record},
};

async fn seeded_db(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let records = vec![
		record("00000001", "Cola 330ml").price("L1", 1.0).price("L2", 1.5).build(),
		record("00000002", "Cola Zero 330ml").price("L1", 1.0).build(),
		record("00000003", "Fanta 200ml").price("L2", 0.8).price("L3", 1.8).build(),
	];
	let locations = vec![location("L1", Some("Corner Mart")), location("L2", None)];

	matrix_testkit::seed(&db.pool, &records, &locations).await.expect("Failed to seed matrix.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MATRIX_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = matrix_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set MATRIX_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Failed to re-apply schema.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name IN ('gtin_matrix', 'matrix_locations')",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MATRIX_PG_DSN to run."]
async fn prefix_scan_resumes_after_composite_anchor() {
	let Some(base_dsn) = matrix_testkit::env_dsn() else {
		eprintln!("Skipping prefix_scan_resumes_after_composite_anchor; set MATRIX_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let scan = MatrixScan {
		order: ScanOrder::SearchKey(SearchField::Name),
		filter: ScanFilter { key_prefix: Some("cola".to_string()), ..Default::default() },
		after: Some(ScanAnchor::SearchKey {
			key: "cola330ml".to_string(),
			gtin: "00000001".to_string(),
		}),
		limit: 10,
	};
	let rows = db.scan(&scan).await.expect("Failed to scan matrix.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].gtin, "00000002");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MATRIX_PG_DSN to run."]
async fn token_scan_orders_by_spread_and_round_trips_prices() {
	let Some(base_dsn) = matrix_testkit::env_dsn() else {
		eprintln!("Skipping token_scan_orders_by_spread_and_round_trips_prices; set MATRIX_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let scan = MatrixScan {
		order: ScanOrder::SpreadDesc,
		filter: ScanFilter { mismatch_only: true, ..Default::default() },
		after: None,
		limit: 10,
	};
	let rows = db.scan(&scan).await.expect("Failed to scan matrix.");
	let gtins: Vec<&str> = rows.iter().map(|row| row.gtin.as_str()).collect();

	assert_eq!(gtins, vec!["00000003", "00000001"]);

	let fetched = db
		.get("00000001")
		.await
		.expect("Failed to fetch record.")
		.expect("Expected seeded record.");
	let expected = record("00000001", "Cola 330ml").price("L1", 1.0).price("L2", 1.5).build();

	assert_eq!(fetched, expected);

	let locations = db.list_locations().await.expect("Failed to list locations.");

	assert_eq!(locations.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
