// Wire codec: exact byte layouts, framing rules and fault detection.

#[cfg(test)]
mod tests {
    use tabwire_core::wire::{FieldHeader, ProtoReader, ProtoWriter, WireError, WireReader, WireType, WireWriter};

    fn written(f: impl FnOnce(&mut ProtoWriter<Vec<u8>>)) -> Vec<u8> {
        let mut w = ProtoWriter::new(Vec::new());
        f(&mut w);
        w.finish().unwrap()
    }

    // ## 1️⃣ Primitive layouts

    #[test]
    fn varint_layout() {
        let bytes = written(|w| {
            w.write_varint(1).unwrap();
            w.write_varint(300).unwrap();
        });
        assert_eq!(bytes, vec![0x01, 0xAC, 0x02]);
    }

    #[test]
    fn header_then_value() {
        let bytes = written(|w| {
            w.write_field_header(1, WireType::Varint).unwrap();
            w.write_varint(150).unwrap();
        });
        assert_eq!(bytes, vec![0x08, 0x96, 0x01]);
    }

    #[test]
    fn negative_ints_are_sign_extended() {
        let bytes = written(|w| w.write_i32(-1).unwrap());
        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes[9], 0x01);

        let mut r = ProtoReader::new(&bytes[..]);
        assert_eq!(r.read_i32().unwrap(), -1);
    }

    #[test]
    fn fixed_width_is_little_endian() {
        let bytes = written(|w| {
            w.write_fixed32(0x0403_0201).unwrap();
            w.write_f64(1.0).unwrap();
        });
        assert_eq!(&bytes[..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[4..], &1.0f64.to_bits().to_le_bytes());
    }

    #[test]
    fn zigzag_round_trip() {
        let bytes = written(|w| {
            w.write_zigzag_i64(-1).unwrap();
            w.write_zigzag_i64(i64::MIN).unwrap();
        });
        assert_eq!(bytes[0], 0x01);
        let mut r = ProtoReader::new(&bytes[..]);
        assert_eq!(r.read_zigzag_i64().unwrap(), -1);
        assert_eq!(r.read_zigzag_i64().unwrap(), i64::MIN);
    }

    #[test]
    fn field_header_raw_round_trip() {
        let h = FieldHeader::new(5, WireType::LengthDelimited).unwrap();
        assert_eq!(h.to_raw(), 0x2A);
        assert_eq!(FieldHeader::from_raw(0x2A).unwrap(), h);
        assert!(matches!(FieldHeader::new(0, WireType::Varint), Err(WireError::InvalidFieldNumber { field: 0 })));
    }

    // ## 2️⃣ Group framing

    #[test]
    fn group_with_end_sentinel() {
        let bytes = written(|w| {
            let g = w.start_group(3).unwrap();
            w.write_field_header(1, WireType::Varint).unwrap();
            w.write_u32(5).unwrap();
            w.write_end().unwrap();
            w.end_group(g).unwrap();
        });
        assert_eq!(bytes, vec![0x1B, 0x08, 0x05, 0x00, 0x1C]);

        let mut r = ProtoReader::new(&bytes[..]);
        let h = r.read_field_header().unwrap().unwrap();
        assert_eq!((h.field, h.wire_type), (3, WireType::StartGroup));
        let g = r.start_group().unwrap();
        assert_eq!(r.depth(), 1);
        assert_eq!(r.read_field_header().unwrap().map(|h| h.field), Some(1));
        assert_eq!(r.read_u32().unwrap(), 5);
        assert!(r.read_field_header().unwrap().is_none());
        r.end_group(g).unwrap();
        assert_eq!(r.depth(), 0);
        assert_eq!(r.bytes_read(), 5);
    }

    #[test]
    fn group_without_end_sentinel() {
        let bytes = vec![0x1B, 0x08, 0x05, 0x1C];
        let mut r = ProtoReader::new(&bytes[..]);
        let g = r.open_group(3).unwrap();
        r.read_field_header().unwrap().unwrap();
        assert_eq!(r.read_u32().unwrap(), 5);
        // The end marker is reported once and held until end_group.
        assert!(r.read_field_header().unwrap().is_none());
        assert!(r.read_field_header().unwrap().is_none());
        r.end_group(g).unwrap();
    }

    #[test]
    fn writer_rejects_out_of_order_end() {
        let mut w = ProtoWriter::new(Vec::new());
        let outer = w.start_group(1).unwrap();
        let _inner = w.start_group(2).unwrap();
        let err = w.end_group(outer).unwrap_err();
        assert!(matches!(err, WireError::GroupMismatch { expected: Some(2), actual: 1 }));
    }

    #[test]
    fn writer_finish_requires_balanced_groups() {
        let mut w = ProtoWriter::new(Vec::new());
        let _open = w.start_group(1).unwrap();
        assert!(matches!(w.finish(), Err(WireError::UnbalancedGroups { open: 1 })));
    }

    #[test]
    fn writer_rejects_dangling_header() {
        let mut w = ProtoWriter::new(Vec::new());
        w.write_field_header(1, WireType::Varint).unwrap();
        let err = w.write_field_header(2, WireType::Varint).unwrap_err();
        assert!(matches!(err, WireError::DanglingHeader { field: 1 }));
    }

    #[test]
    fn writer_requires_headers_inside_groups() {
        let mut w = ProtoWriter::new(Vec::new());
        let _g = w.start_group(1).unwrap();
        let err = w.write_varint(7).unwrap_err();
        assert!(matches!(err, WireError::MissingHeader { expected: WireType::Varint }));
    }

    #[test]
    fn writer_checks_value_matches_header() {
        let mut w = ProtoWriter::new(Vec::new());
        w.write_field_header(1, WireType::Fixed32).unwrap();
        let err = w.write_varint(7).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedWireType { field: 1, .. }));
    }

    // ## 3️⃣ Reader faults

    #[test]
    fn truncated_varint_is_eof() {
        let mut r = ProtoReader::new(&[0x96u8][..]);
        assert!(matches!(r.read_varint(), Err(WireError::UnexpectedEof)));
    }

    #[test]
    fn overlong_varint_is_rejected() {
        let bytes = [0xFFu8; 11];
        let mut r = ProtoReader::new(&bytes[..]);
        assert!(matches!(r.read_varint(), Err(WireError::VarintOverflow)));
    }

    #[test]
    fn unknown_wire_type_is_rejected() {
        let mut r = ProtoReader::new(&[0x0Eu8][..]);
        assert!(matches!(r.read_field_header(), Err(WireError::InvalidWireType { raw: 6 })));
    }

    #[test]
    fn value_must_match_header() {
        let bytes = [0x0Du8, 0, 0, 0, 0];
        let mut r = ProtoReader::new(&bytes[..]);
        r.read_field_header().unwrap();
        let err = r.read_varint().unwrap_err();
        assert!(matches!(
            err,
            WireError::UnexpectedWireType { field: 1, expected: WireType::Varint, actual: WireType::Fixed32 }
        ));
    }

    #[test]
    fn foreign_end_marker_is_rejected() {
        let bytes = [0x1Bu8, 0x24];
        let mut r = ProtoReader::new(&bytes[..]);
        let _g = r.open_group(3).unwrap();
        let err = r.read_field_header().unwrap_err();
        assert!(matches!(err, WireError::GroupMismatch { expected: Some(3), actual: 4 }));
    }

    #[test]
    fn sentinel_where_end_marker_expected() {
        let bytes = [0x1Bu8, 0x00, 0x00];
        let mut r = ProtoReader::new(&bytes[..]);
        let g = r.open_group(3).unwrap();
        assert!(r.read_field_header().unwrap().is_none());
        let err = r.end_group(g).unwrap_err();
        assert!(matches!(err, WireError::ExpectedEndGroup { field: 3, found: 0 }));
    }

    #[test]
    fn open_group_reports_wrong_field() {
        let bytes = [0x13u8, 0x14];
        let mut r = ProtoReader::new(&bytes[..]);
        let err = r.open_group(1).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedField { expected: 1, actual: 2 }));
    }

    #[test]
    fn depth_limit() {
        let bytes = [0x0Bu8, 0x0B, 0x0C, 0x0C];
        let mut r = ProtoReader::with_limits(&bytes[..], 1024, 1);
        let _outer = r.open_group(1).unwrap();
        let err = r.open_group(1).unwrap_err();
        assert!(matches!(err, WireError::GroupTooDeep { depth: 2, max: 1 }));
    }

    #[test]
    fn payload_limit() {
        let bytes = written(|w| {
            w.write_field_header(1, WireType::LengthDelimited).unwrap();
            w.write_str("abc").unwrap();
        });
        let mut r = ProtoReader::with_limits(&bytes[..], 2, 16);
        r.read_field_header().unwrap();
        assert!(matches!(r.read_bytes(), Err(WireError::PayloadTooLarge { have: 3, max: 2 })));
    }

    #[test]
    fn invalid_utf8_text() {
        let bytes = [0x0Au8, 0x02, 0xC3, 0x28];
        let mut r = ProtoReader::new(&bytes[..]);
        r.read_field_header().unwrap();
        assert!(matches!(r.read_string(), Err(WireError::InvalidUtf8)));
    }

    #[test]
    fn narrow_reads_are_range_checked() {
        let bytes = written(|w| w.write_varint(300).unwrap());
        let mut r = ProtoReader::new(&bytes[..]);
        assert!(matches!(r.read_u8(), Err(WireError::ValueOverflow { value: 300, target: "u8" })));
    }

    // ## 4️⃣ Skipping

    #[test]
    fn skip_field_is_balanced_over_nested_groups() {
        let bytes = written(|w| {
            let g = w.start_group(2).unwrap();
            w.write_field_header(1, WireType::LengthDelimited).unwrap();
            w.write_str("abc").unwrap();
            let inner = w.start_group(4).unwrap();
            w.write_field_header(1, WireType::Fixed32).unwrap();
            w.write_fixed32(9).unwrap();
            w.end_group(inner).unwrap();
            w.write_field_header(2, WireType::Fixed64).unwrap();
            w.write_fixed64(9).unwrap();
            w.end_group(g).unwrap();
            w.write_field_header(3, WireType::Varint).unwrap();
            w.write_u32(7).unwrap();
        });

        let mut r = ProtoReader::new(&bytes[..]);
        let h = r.read_field_header().unwrap().unwrap();
        assert_eq!(h.field, 2);
        r.skip_field().unwrap();
        assert_eq!(r.depth(), 0);
        let h = r.read_field_header().unwrap().unwrap();
        assert_eq!((h.field, h.wire_type), (3, WireType::Varint));
        assert_eq!(r.read_u32().unwrap(), 7);
    }
}
