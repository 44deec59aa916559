#[cfg(test)]
mod telemetry_tests {
    use std::time::Duration;

    use tabwire_core::api;
    use tabwire_core::io::{InputSource, OutputSink};
    use tabwire_core::prelude::*;
    use tabwire_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn sample() -> DataSet {
        let mut t = DataTable::new([("k", DataType::Int32), ("v", DataType::Double)]);
        for i in 0..10 {
            let v = if i % 2 == 0 { Some(Value::Double(i as f64 / 2.0)) } else { None };
            t.push_row(vec![Some(Value::Int32(i)), v]).unwrap();
        }
        let mut set = DataSet::new(10);
        set.push_table(t);
        set
    }

    #[test]
    fn counters_accumulate() {
        let mut c = TelemetryCounters::default();
        c.add_result(3);
        c.add_row(3, 2);
        c.add_row(3, 3);
        c.add_drained(1);
        assert_eq!(c.results, 1);
        assert_eq!(c.columns, 3);
        assert_eq!(c.rows, 2);
        assert_eq!(c.cells, 6);
        assert_eq!(c.null_cells, 1);

        let mut total = TelemetryCounters::default();
        total += c.clone();
        total.merge(&c);
        assert_eq!(total.rows, 4);
        assert_eq!(total.rows_drained, 2);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Rows, Duration::from_millis(2));
        times.add(Stage::Rows, Duration::from_millis(3));
        assert_eq!(times.get(Stage::Rows), Duration::from_millis(5));
        assert_eq!(times.get(Stage::Drain), Duration::ZERO);
        assert!(times.has_all(&[Stage::Rows]));
        assert!(!times.has_all(&[Stage::Rows, Stage::Schema]));
        assert_eq!(Stage::Schema.to_string(), "schema");
    }

    #[test]
    fn snapshot_ratios() {
        let mut c = TelemetryCounters::default();
        c.add_row(4, 1);
        let mut timer = TelemetryTimer::new();
        timer.finish();
        let snap = TelemetrySnapshot::from(&c, &timer);
        assert_eq!(snap.null_ratio, 0.75);
        assert!(snap.output.is_none());
        assert!(snap.sanity_check());
    }

    #[test]
    fn encoder_telemetry() {
        let set = sample();
        let mut encoder = DataEncoder::new(Vec::new());
        encoder.encode(&mut set.reader()).unwrap();
        let snap = encoder.telemetry();
        assert_eq!(snap.results, 1);
        assert_eq!(snap.rows, 10);
        assert_eq!(snap.cells, 20);
        assert_eq!(snap.null_cells, 5);
        assert!(snap.has_all_stages(&[Stage::Schema, Stage::Rows]));

        let bytes = encoder.finish().unwrap();
        assert_eq!(snap.bytes_wire, bytes.len() as u64);
    }

    #[test]
    fn serialize_to_memory_attaches_output() {
        let set = sample();
        let snap = api::serialize(&mut set.reader(), OutputSink::Memory, EncodeOptions::default()).unwrap();
        let expected = encode_to_vec(&mut set.reader()).unwrap();
        assert_eq!(snap.output.as_deref(), Some(expected.as_slice()));
        assert_eq!(snap.bytes_wire, expected.len() as u64);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"rows\":10"));
    }

    #[test]
    fn deserialize_from_memory() {
        let set = sample();
        let bytes = encode_to_vec(&mut set.reader()).unwrap();
        let mut cursor = api::deserialize(InputSource::Memory(bytes.clone()), DecodeOptions::default()).unwrap();
        let loaded = DataSet::load(&mut cursor).unwrap();
        assert_eq!(loaded, set);

        let snap = cursor.telemetry();
        assert_eq!(snap.rows, 10);
        assert_eq!(snap.bytes_wire, bytes.len() as u64);
        cursor.close();
        assert_eq!(cursor.telemetry().bytes_wire, bytes.len() as u64);
    }

    #[test]
    fn file_round_trip() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("tabwire-{}.bin", std::process::id()));
        let set = sample();
        let snap = api::serialize(&mut set.reader(), OutputSink::File(path.clone()), EncodeOptions::default())?;
        assert!(snap.output.is_none());

        let mut cursor = api::deserialize(InputSource::File(path.clone()), DecodeOptions::default())?;
        assert_eq!(DataSet::load(&mut cursor)?, set);
        cursor.close();
        std::fs::remove_file(&path)?;
        Ok(())
    }
}
