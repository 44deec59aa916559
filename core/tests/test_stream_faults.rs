// Decoder against hand-built and damaged streams.

#[cfg(test)]
mod tests {
    use tabwire_core::constants::{column_fields, result_fields, COLUMN_FIELD, RECORD_FIELD, RESULT_FIELD};
    use tabwire_core::prelude::*;
    use tabwire_core::wire::{ProtoWriter, WireError, WireType, WireWriter};

    fn ids(n: i32) -> DataSet {
        let mut t = DataTable::new([("id", DataType::Int32), ("tag", DataType::String)]);
        for i in 0..n {
            t.push_row(vec![Some(Value::Int32(i)), Some(Value::String(format!("row-{i}")))])
                .unwrap();
        }
        let mut set = DataSet::new(0);
        set.push_table(t);
        set
    }

    /// One result with a single Int32 column "x", written by hand. The column group carries
    /// unknown fields and the record closes without an end sentinel. With `result_sentinel`
    /// the result group itself is closed by a sentinel before its end marker.
    fn hand_built(result_sentinel: bool) -> Vec<u8> {
        let mut w = ProtoWriter::new(Vec::new());
        w.write_u32(1).unwrap();
        w.write_i64(3).unwrap();

        let result = w.start_group(RESULT_FIELD).unwrap();
        let columns = w.start_group(result_fields::COLUMNS).unwrap();
        let column = w.start_group(COLUMN_FIELD).unwrap();
        w.write_field_header(column_fields::NAME, WireType::LengthDelimited).unwrap();
        w.write_str("x").unwrap();
        w.write_field_header(7, WireType::LengthDelimited).unwrap();
        w.write_str("ignored").unwrap();
        let extra = w.start_group(8).unwrap();
        w.write_field_header(1, WireType::Varint).unwrap();
        w.write_u32(1).unwrap();
        w.end_group(extra).unwrap();
        w.write_field_header(column_fields::TYPE, WireType::Varint).unwrap();
        w.write_u32(DataType::Int32.tag() as u32).unwrap();
        w.end_group(column).unwrap();
        w.write_end().unwrap();
        w.end_group(columns).unwrap();

        let records = w.start_group(result_fields::RECORDS).unwrap();
        let record = w.start_group(RECORD_FIELD).unwrap();
        w.write_field_header(1, WireType::Varint).unwrap();
        w.write_i32(5).unwrap();
        w.end_group(record).unwrap();
        w.write_end().unwrap();
        w.end_group(records).unwrap();
        if result_sentinel {
            w.write_end().unwrap();
        }
        w.end_group(result).unwrap();
        w.write_end().unwrap();
        w.finish().unwrap()
    }

    #[test]
    fn unknown_column_fields_and_missing_sentinel() {
        let mut cursor = DataCursor::from_bytes(hand_built(false)).unwrap();
        assert_eq!(cursor.records_affected().unwrap(), 3);
        assert_eq!(cursor.get_name(0).unwrap(), "x");
        assert_eq!(cursor.get_data_type(0).unwrap(), DataType::Int32);
        assert!(cursor.advance_row().unwrap());
        assert_eq!(cursor.get_int32(0).unwrap(), 5);
        assert!(!cursor.advance_row().unwrap());
        assert!(!cursor.advance_result().unwrap());
    }

    #[test]
    fn result_closed_by_sentinel() {
        let mut cursor = DataCursor::from_bytes(hand_built(true)).unwrap();
        assert!(cursor.advance_row().unwrap());
        assert_eq!(cursor.get_int32(0).unwrap(), 5);
        assert!(!cursor.advance_row().unwrap());
        assert_eq!(cursor.state(), CursorState::ResultExhausted);
        assert!(!cursor.advance_result().unwrap());
        assert_eq!(cursor.state(), CursorState::StreamExhausted);
        assert!(!cursor.is_closed());
    }

    #[test]
    fn version_mismatch() {
        let err = DataCursor::from_bytes(vec![0x02, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, DataError::VersionMismatch { have: 2, need: 1 }));
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn custom_expected_version() {
        let options = DecodeOptions { expected_version: 2, ..DecodeOptions::default() };
        let cursor = DataCursor::open_with(&[0x02u8, 0x00, 0x00][..], options).unwrap();
        assert_eq!(cursor.state(), CursorState::StreamExhausted);
    }

    #[test]
    fn top_level_field_must_be_a_result() {
        // version 1, records affected 0, then field 2 as a varint.
        let err = DataCursor::from_bytes(vec![0x01, 0x00, 0x10, 0x00]).unwrap_err();
        assert!(matches!(err, DataError::Malformed(_)));
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn empty_input_is_a_format_violation() {
        let err = DataCursor::from_bytes(Vec::new()).unwrap_err();
        assert!(matches!(err, DataError::Wire(WireError::UnexpectedEof)));
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn truncated_stream_faults_and_releases() {
        let mut bytes = encode_to_vec(&mut ids(20).reader()).unwrap();
        bytes.truncate(bytes.len() - 3);

        let mut cursor = DataCursor::from_bytes(bytes).unwrap();
        let err = loop {
            match cursor.advance_row() {
                Ok(true) => continue,
                Ok(false) => panic!("truncated stream decoded to the end"),
                Err(e) => break e,
            }
        };
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
        assert!(err.is_fatal());

        // The fault released the stream.
        assert!(cursor.is_closed());
        assert_eq!(cursor.advance_row().unwrap_err().kind(), ErrorKind::ClosedUse);
    }

    #[test]
    fn record_field_beyond_columns() {
        let mut bytes = encode_to_vec(&mut ids(1).reader()).unwrap();
        // Field 1 (id) of the only record becomes field 3.
        let at = bytes.iter().rposition(|b| *b == 0x08).unwrap();
        bytes[at] = 0x18;

        let mut cursor = DataCursor::from_bytes(bytes).unwrap();
        let err = cursor.advance_row().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn payload_bound_applies_to_cells() {
        let bytes = encode_to_vec(&mut ids(1).reader()).unwrap();
        let options = DecodeOptions { max_payload_len: 4, ..DecodeOptions::default() };
        let mut cursor = DataCursor::open_with(&bytes[..], options).unwrap();
        let err = cursor.advance_row().unwrap_err();
        assert!(matches!(err, DataError::Wire(WireError::PayloadTooLarge { have: 5, max: 4 })));
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn invalid_options_are_rejected_at_open() {
        let options = DecodeOptions { max_group_depth: 3, ..DecodeOptions::default() };
        let err = DataCursor::open_with(&[0x01u8, 0x00, 0x00][..], options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
