use crate::db::Database;
use crate::error::Result;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS predictions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        farmer TEXT NOT NULL,
        prediction_type TEXT NOT NULL CHECK (prediction_type IN ('crop', 'fertilizer', 'disease')),
        input_data TEXT NOT NULL,
        output_data TEXT NOT NULL,
        confidence REAL,
        model_used TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sensor_readings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        soil_moisture REAL NOT NULL,
        soil_ph REAL NOT NULL,
        nitrogen REAL NOT NULL,
        phosphorus REAL NOT NULL,
        potassium REAL NOT NULL,
        temperature REAL NOT NULL,
        humidity REAL NOT NULL,
        timestamp TEXT NOT NULL,
        location TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_predictions_farmer_created
        ON predictions(farmer, created_at);
    CREATE INDEX IF NOT EXISTS idx_sensor_readings_timestamp
        ON sensor_readings(timestamp);
"#;

/// Create tables and indexes if they do not exist. Safe to run on every open.
pub fn bootstrap(db: &Database) -> Result<()> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    })
}
