// Small dev utility: create the schema and seed a demo database.
//
// Usage:
//   cargo run --bin seed_demo_db -- [db_path]
//
// Existing tables are dropped first; this is a dev tool, not a migration.

use chrono::{Duration, Local};
use medequip_dss::db::{get_default_db_path, open_sqlite_connection, CURRENT_SCHEMA_VERSION};
use rusqlite::params;
use std::error::Error;

const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS schema_version;
DROP TABLE IF EXISTS equipment_unit;
DROP TABLE IF EXISTS model;
DROP TABLE IF EXISTS part;
DROP TABLE IF EXISTS part_model_compat;
DROP TABLE IF EXISTS stock_policy_tier;
DROP TABLE IF EXISTS inventory;
DROP TABLE IF EXISTS service_event;
DROP TABLE IF EXISTS service_part_usage;
DROP TABLE IF EXISTS technician;
DROP TABLE IF EXISTS config_kv;

CREATE TABLE schema_version (version INTEGER NOT NULL);

CREATE TABLE model (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    brand TEXT NOT NULL
);

CREATE TABLE equipment_unit (
    id TEXT PRIMARY KEY,
    model_id TEXT NOT NULL REFERENCES model(id),
    client_id TEXT NOT NULL,
    install_date TEXT,
    last_failure_date TEXT,
    failure_count INTEGER NOT NULL DEFAULT 0,
    operating_days INTEGER NOT NULL DEFAULT 0,
    state TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE TABLE part (
    id TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    criticality TEXT NOT NULL
);

CREATE TABLE part_model_compat (
    part_id TEXT NOT NULL REFERENCES part(id),
    model_id TEXT NOT NULL REFERENCES model(id),
    PRIMARY KEY (part_id, model_id)
);

CREATE TABLE stock_policy_tier (
    id TEXT PRIMARY KEY,
    part_id TEXT NOT NULL REFERENCES part(id),
    units_min INTEGER NOT NULL,
    units_max INTEGER,
    min_stock REAL NOT NULL
);

CREATE TABLE inventory (
    part_id TEXT PRIMARY KEY REFERENCES part(id),
    current_stock
);

CREATE TABLE technician (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    gross_salary REAL NOT NULL,
    vehicle_km_per_liter REAL NOT NULL
);

CREATE TABLE service_event (
    id TEXT PRIMARY KEY,
    service_date TEXT NOT NULL,
    technician_id TEXT NOT NULL,
    equipment_id TEXT NOT NULL,
    duration_hours REAL NOT NULL,
    km_traveled REAL NOT NULL
);

CREATE TABLE service_part_usage (
    service_id TEXT NOT NULL REFERENCES service_event(id),
    part_id TEXT NOT NULL,
    quantity REAL NOT NULL,
    unit_price REAL NOT NULL
);

CREATE TABLE config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = open_sqlite_connection(&db_path)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;

    let today = Local::now().date_naive();

    // Models
    conn.execute_batch(
        r#"
        INSERT INTO model VALUES ('M-ANL-300', 'Analyzer 300', 'BioLab');
        INSERT INTO model VALUES ('M-CFG-12', 'Centrifuge C12', 'SpinTech');
        INSERT INTO model VALUES ('M-INC-8', 'Incubator I8', 'BioLab');
        "#,
    )?;

    // Equipment units: one per priority band
    let units: &[(&str, &str, i64, Option<i64>, i64, i64, &str)] = &[
        // (id, model, install_days_ago, last_failure_days_ago, failures, op_days, state)
        ("EQ-1001", "M-ANL-300", 900, Some(100), 2, 730, "ACTIVE"), // MTBF 365 -> normal
        ("EQ-1002", "M-ANL-300", 300, Some(40), 3, 90, "ACTIVE"),   // MTBF 30 -> high priority
        ("EQ-1003", "M-CFG-12", 500, Some(60), 8, 400, "ACTIVE"),   // MTBF 50 -> critical
        ("EQ-1004", "M-CFG-12", 200, None, 0, 180, "ACTIVE"),       // no failures -> no data
        ("EQ-1005", "M-INC-8", 1200, Some(400), 1, 1100, "RETIRED"),
    ];
    for &(id, model, inst_ago, fail_ago, failures, op_days, state) in units {
        conn.execute(
            r#"
            INSERT INTO equipment_unit
                (id, model_id, client_id, install_date, last_failure_date,
                 failure_count, operating_days, state)
            VALUES (?1, ?2, 'CL-01', ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                model,
                (today - Duration::days(inst_ago)).to_string(),
                fail_ago.map(|d| (today - Duration::days(d)).to_string()),
                failures,
                op_days,
                state
            ],
        )?;
    }

    // Parts, compatibility, policy tiers, inventory
    conn.execute_batch(
        r#"
        INSERT INTO part VALUES ('P-FLT-01', 'HEPA filter', 'FILTER', 'HIGH');
        INSERT INTO part VALUES ('P-ROT-02', 'Rotor assembly', 'MECHANICAL', 'MEDIUM');
        INSERT INTO part VALUES ('P-LMP-03', 'UV lamp', 'OPTICS', 'LOW');

        INSERT INTO part_model_compat VALUES ('P-FLT-01', 'M-ANL-300');
        INSERT INTO part_model_compat VALUES ('P-FLT-01', 'M-INC-8');
        INSERT INTO part_model_compat VALUES ('P-ROT-02', 'M-CFG-12');
        INSERT INTO part_model_compat VALUES ('P-LMP-03', 'M-ANL-300');

        INSERT INTO stock_policy_tier VALUES ('T-01', 'P-FLT-01', 1, 5, 2.0);
        INSERT INTO stock_policy_tier VALUES ('T-02', 'P-FLT-01', 6, NULL, 4.0);
        INSERT INTO stock_policy_tier VALUES ('T-03', 'P-ROT-02', 1, NULL, 1.0);
        INSERT INTO stock_policy_tier VALUES ('T-04', 'P-LMP-03', 3, NULL, 2.0);

        INSERT INTO inventory VALUES ('P-FLT-01', 1);
        INSERT INTO inventory VALUES ('P-ROT-02', 'broken-value'); -- coerces to 0
        "#,
    )?;

    // Technicians and service events
    conn.execute_batch(
        r#"
        INSERT INTO technician VALUES ('T-01', 'A. Ramos', 3200.0, 12.0);
        INSERT INTO technician VALUES ('T-02', 'L. Ferrer', 2800.0, 10.0);
        "#,
    )?;
    conn.execute(
        r#"
        INSERT INTO service_event VALUES
            ('S-0001', ?1, 'T-01', 'EQ-1003', 4.0, 60.0),
            ('S-0002', ?2, 'T-02', 'EQ-1002', 1.5, 25.0)
        "#,
        params![
            (today - Duration::days(7)).to_string(),
            (today - Duration::days(2)).to_string()
        ],
    )?;
    conn.execute_batch(
        r#"
        INSERT INTO service_part_usage VALUES ('S-0001', 'P-ROT-02', 1.0, 180.0);
        INSERT INTO service_part_usage VALUES ('S-0001', 'P-FLT-01', 2.0, 35.0);

        INSERT INTO config_kv VALUES ('global', 'cache/refresh_interval_seconds', '300');
        INSERT INTO config_kv VALUES ('global', 'cost/fuel_price_per_liter', '1.45');
        "#,
    )?;

    println!("seeded demo db at {}", db_path);
    Ok(())
}
