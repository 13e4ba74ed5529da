use crate::db::Database;
use crate::error::{AgriSenseError, Result};
use crate::logic::calculations::round2;
use crate::models::{
    PredictionKind, PredictionRecord, PredictionSummary, SensorAverages, SensorReading,
    SensorStats,
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_SENSOR_LIMIT: usize = 100;

fn to_db_time(ts: &DateTime<Utc>) -> String {
    // Fixed width keeps lexical order equal to time order.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_db_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(timestamp = %s, "Unparseable timestamp in database");
            Utc::now()
        })
}

// Prediction history

impl Database {
    pub fn record_prediction(&self, record: &PredictionRecord) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO predictions
                    (farmer, prediction_type, input_data, output_data, confidence, model_used, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.farmer,
                    record.kind.as_str(),
                    record.input_data,
                    record.output_data,
                    record.confidence,
                    record.model_used,
                    to_db_time(&record.created_at),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first, optionally filtered by kind.
    pub fn list_predictions(
        &self,
        farmer: &str,
        kind: Option<PredictionKind>,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM predictions
                WHERE farmer = ?1 AND (?2 IS NULL OR prediction_type = ?2)
                ORDER BY created_at DESC, id DESC
                LIMIT ?3
                "#,
            )?;

            let records = stmt
                .query_map(
                    params![farmer, kind.map(|k| k.as_str()), limit as i64],
                    row_to_prediction,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })
    }

    /// A record owned by another farmer is reported as missing.
    pub fn get_prediction(&self, farmer: &str, id: i64) -> Result<PredictionRecord> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM predictions WHERE id = ?1 AND farmer = ?2",
                params![id, farmer],
                row_to_prediction,
            )
            .optional()?
            .ok_or_else(|| AgriSenseError::NotFound(format!("prediction {}", id)))
        })
    }

    pub fn prediction_summary(&self, farmer: &str) -> Result<PredictionSummary> {
        let week_ago = to_db_time(&(Utc::now() - Duration::days(7)));

        self.with_conn(|conn| {
            let mut summary = PredictionSummary::default();

            let mut stmt = conn.prepare(
                r#"
                SELECT prediction_type, COUNT(*) FROM predictions
                WHERE farmer = ?1
                GROUP BY prediction_type
                "#,
            )?;
            let counts = stmt
                .query_map([farmer], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
            for entry in counts {
                let (kind, count) = entry?;
                summary.total_predictions += count;
                summary.predictions_by_type.insert(kind, count);
            }

            summary.recent_activity_7days = conn.query_row(
                "SELECT COUNT(*) FROM predictions WHERE farmer = ?1 AND created_at >= ?2",
                params![farmer, week_ago],
                |row| row.get(0),
            )?;

            Ok(summary)
        })
    }
}

fn row_to_prediction(row: &Row) -> rusqlite::Result<PredictionRecord> {
    let kind_str: String = row.get("prediction_type")?;
    let created_at_str: String = row.get("created_at")?;

    let kind = PredictionKind::from_str(&kind_str).unwrap_or_else(|| {
        warn!(prediction_type = %kind_str, "Unknown prediction_type in database, defaulting to crop");
        PredictionKind::Crop
    });

    Ok(PredictionRecord {
        id: Some(row.get("id")?),
        farmer: row.get("farmer")?,
        kind,
        input_data: row.get("input_data")?,
        output_data: row.get("output_data")?,
        confidence: row.get("confidence")?,
        model_used: row.get("model_used")?,
        created_at: from_db_time(&created_at_str),
    })
}

// Sensor telemetry

impl Database {
    pub fn record_sensor_reading(&self, reading: &SensorReading) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO sensor_readings
                    (soil_moisture, soil_ph, nitrogen, phosphorus, potassium,
                     temperature, humidity, timestamp, location)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    reading.soil_moisture,
                    reading.soil_ph,
                    reading.nitrogen,
                    reading.phosphorus,
                    reading.potassium,
                    reading.temperature,
                    reading.humidity,
                    to_db_time(&reading.timestamp),
                    reading.location,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first.
    pub fn recent_sensor_readings(&self, limit: usize) -> Result<Vec<SensorReading>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM sensor_readings ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )?;
            let readings = stmt
                .query_map([limit as i64], row_to_sensor_reading)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(readings)
        })
    }

    pub fn sensor_stats(&self) -> Result<SensorStats> {
        self.with_conn(|conn| {
            conn.query_row(
                r#"
                SELECT
                    AVG(soil_moisture), AVG(soil_ph), AVG(nitrogen), AVG(phosphorus),
                    AVG(potassium), AVG(temperature), AVG(humidity),
                    COUNT(*), MIN(timestamp), MAX(timestamp)
                FROM sensor_readings
                "#,
                [],
                |row| {
                    let avg = |idx: usize| -> rusqlite::Result<f64> {
                        Ok(round2(row.get::<_, Option<f64>>(idx)?.unwrap_or(0.0)))
                    };
                    let first: Option<String> = row.get(8)?;
                    let last: Option<String> = row.get(9)?;

                    Ok(SensorStats {
                        averages: SensorAverages {
                            soil_moisture: avg(0)?,
                            soil_ph: avg(1)?,
                            nitrogen: avg(2)?,
                            phosphorus: avg(3)?,
                            potassium: avg(4)?,
                            temperature: avg(5)?,
                            humidity: avg(6)?,
                        },
                        total_readings: row.get(7)?,
                        first_reading: first.as_deref().map(from_db_time),
                        last_reading: last.as_deref().map(from_db_time),
                    })
                },
            )
            .map_err(Into::into)
        })
    }
}

fn row_to_sensor_reading(row: &Row) -> rusqlite::Result<SensorReading> {
    let timestamp_str: String = row.get("timestamp")?;

    Ok(SensorReading {
        soil_moisture: row.get("soil_moisture")?,
        soil_ph: row.get("soil_ph")?,
        nitrogen: row.get("nitrogen")?,
        phosphorus: row.get("phosphorus")?,
        potassium: row.get("potassium")?,
        temperature: row.get("temperature")?,
        humidity: row.get("humidity")?,
        timestamp: from_db_time(&timestamp_str),
        location: row.get("location")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(farmer: &str, kind: PredictionKind, age_days: i64) -> PredictionRecord {
        PredictionRecord {
            id: None,
            farmer: farmer.to_string(),
            kind,
            input_data: r#"{"crop_type":"wheat"}"#.to_string(),
            output_data: r#"{"ok":true}"#.to_string(),
            confidence: match kind {
                PredictionKind::Fertilizer => None,
                _ => Some(0.78),
            },
            model_used: "Rule-based".to_string(),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn reading(moisture: f64, minutes_ago: i64) -> SensorReading {
        SensorReading {
            soil_moisture: moisture,
            soil_ph: 6.5,
            nitrogen: 45.0,
            phosphorus: 38.0,
            potassium: 42.0,
            temperature: 28.0,
            humidity: 70.0,
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            location: Some("Farm-1".to_string()),
        }
    }

    #[test]
    fn test_record_and_get_prediction() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .record_prediction(&record("demo", PredictionKind::Disease, 0))
            .unwrap();

        let fetched = db.get_prediction("demo", id).unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.kind, PredictionKind::Disease);
        assert_eq!(fetched.confidence, Some(0.78));
        assert_eq!(fetched.input_data, r#"{"crop_type":"wheat"}"#);
    }

    #[test]
    fn test_get_prediction_scoped_to_farmer() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .record_prediction(&record("alice", PredictionKind::Crop, 0))
            .unwrap();

        assert!(matches!(
            db.get_prediction("bob", id),
            Err(AgriSenseError::NotFound(_))
        ));
        assert!(matches!(
            db.get_prediction("alice", id + 100),
            Err(AgriSenseError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_predictions_newest_first_with_filter() {
        let db = Database::open_in_memory().unwrap();
        db.record_prediction(&record("demo", PredictionKind::Crop, 3)).unwrap();
        db.record_prediction(&record("demo", PredictionKind::Fertilizer, 2)).unwrap();
        db.record_prediction(&record("demo", PredictionKind::Crop, 1)).unwrap();
        db.record_prediction(&record("other", PredictionKind::Crop, 0)).unwrap();

        let all = db.list_predictions("demo", None, DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].created_at > all[1].created_at);
        assert!(all[1].created_at > all[2].created_at);

        let crops = db
            .list_predictions("demo", Some(PredictionKind::Crop), DEFAULT_HISTORY_LIMIT)
            .unwrap();
        assert_eq!(crops.len(), 2);
        assert!(crops.iter().all(|r| r.kind == PredictionKind::Crop));

        let limited = db.list_predictions("demo", None, 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].kind, PredictionKind::Crop);
    }

    #[test]
    fn test_fertilizer_confidence_is_null() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .record_prediction(&record("demo", PredictionKind::Fertilizer, 0))
            .unwrap();
        assert_eq!(db.get_prediction("demo", id).unwrap().confidence, None);
    }

    #[test]
    fn test_prediction_summary() {
        let db = Database::open_in_memory().unwrap();
        db.record_prediction(&record("demo", PredictionKind::Crop, 0)).unwrap();
        db.record_prediction(&record("demo", PredictionKind::Crop, 10)).unwrap();
        db.record_prediction(&record("demo", PredictionKind::Disease, 1)).unwrap();
        db.record_prediction(&record("other", PredictionKind::Disease, 0)).unwrap();

        let summary = db.prediction_summary("demo").unwrap();
        assert_eq!(summary.total_predictions, 3);
        assert_eq!(summary.predictions_by_type.get("crop"), Some(&2));
        assert_eq!(summary.predictions_by_type.get("disease"), Some(&1));
        assert_eq!(summary.predictions_by_type.get("fertilizer"), None);
        assert_eq!(summary.recent_activity_7days, 2);
    }

    #[test]
    fn test_empty_summary() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.prediction_summary("nobody").unwrap(), PredictionSummary::default());
    }

    #[test]
    fn test_sensor_readings_and_stats() {
        let db = Database::open_in_memory().unwrap();
        db.record_sensor_reading(&reading(60.0, 10)).unwrap();
        db.record_sensor_reading(&reading(65.0, 5)).unwrap();
        db.record_sensor_reading(&reading(70.5, 0)).unwrap();

        let recent = db.recent_sensor_readings(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].soil_moisture, 70.5);
        assert_eq!(recent[1].soil_moisture, 65.0);
        assert_eq!(recent[0].location.as_deref(), Some("Farm-1"));

        let stats = db.sensor_stats().unwrap();
        assert_eq!(stats.total_readings, 3);
        assert_eq!(stats.averages.soil_moisture, 65.17);
        assert_eq!(stats.averages.soil_ph, 6.5);
        assert!(stats.first_reading.unwrap() < stats.last_reading.unwrap());
    }

    #[test]
    fn test_sensor_stats_empty() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.sensor_stats().unwrap();
        assert_eq!(stats.total_readings, 0);
        assert_eq!(stats.averages.nitrogen, 0.0);
        assert!(stats.first_reading.is_none());
    }
}
