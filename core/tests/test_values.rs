// Structured values: Decimal and Guid types, and the nested wire layouts of
// DateTime, TimeSpan, Decimal and Guid.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    use tabwire_core::types::ErrorKind;
    use tabwire_core::values::{bcl, Decimal, Guid, Value};
    use tabwire_core::wire::{ProtoReader, ProtoWriter, WireReader};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn write(f: impl FnOnce(&mut ProtoWriter<Vec<u8>>)) -> Vec<u8> {
        let mut w = ProtoWriter::new(Vec::new());
        f(&mut w);
        w.finish().unwrap()
    }

    /// Reader positioned after the value's group header.
    fn reader(bytes: &[u8]) -> ProtoReader<&[u8]> {
        let mut r = ProtoReader::new(bytes);
        r.read_field_header().unwrap().unwrap();
        r
    }

    // ## Decimal / Guid

    #[test]
    fn decimal_display() {
        assert_eq!(Decimal::new(12345, 2).unwrap().to_string(), "123.45");
        assert_eq!(Decimal::new(-5, 3).unwrap().to_string(), "-0.005");
        assert_eq!(Decimal::new(7, 0).unwrap().to_string(), "7");
    }

    #[test]
    fn decimal_bounds() {
        assert!(Decimal::new((1i128 << 96) - 1, 28).is_ok());
        let err = Decimal::new(1i128 << 96, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
        assert!(Decimal::new(1, 29).is_err());
    }

    #[test]
    fn guid_display_and_halves() {
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let g = Guid::from_bytes(bytes);
        assert_eq!(g.to_string(), "00010203-0405-0607-0809-0a0b0c0d0e0f");
        let (lo, hi) = g.to_halves();
        assert_eq!(lo, 0x0706_0504_0302_0100);
        assert_eq!(Guid::from_halves(lo, hi), g);
        assert!(Guid::NIL.is_nil());
    }

    #[test]
    fn value_defaults_match_types() {
        for info in tabwire_core::registry::entries() {
            assert_eq!(Value::default_for(info.data_type).data_type(), info.data_type);
        }
        assert!(Value::ByteArray(Vec::new()).is_empty_array());
        assert!(!Value::String(String::new()).is_empty_array());
    }

    // ## DateTime

    #[test]
    fn datetime_uses_coarsest_scale() {
        // One day after the epoch: value 1 (zigzag 2), scale Days omitted.
        let bytes = write(|w| bcl::write_datetime(w, 1, &date(1970, 1, 2)).unwrap());
        assert_eq!(bytes, vec![0x0B, 0x08, 0x02, 0x0C]);
        assert_eq!(bcl::read_datetime(&mut reader(&bytes)).unwrap(), date(1970, 1, 2));
    }

    #[test]
    fn epoch_is_an_empty_group() {
        let bytes = write(|w| bcl::write_datetime(w, 1, &date(1970, 1, 1)).unwrap());
        assert_eq!(bytes, vec![0x0B, 0x0C]);
    }

    #[test]
    fn datetime_before_epoch() {
        let dt = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap().and_hms_milli_opt(23, 59, 59, 250).unwrap();
        let bytes = write(|w| bcl::write_datetime(w, 1, &dt).unwrap());
        assert_eq!(bcl::read_datetime(&mut reader(&bytes)).unwrap(), dt);
    }

    #[test]
    fn datetime_truncates_below_one_tick() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_nano_opt(0, 0, 0, 150).unwrap();
        let bytes = write(|w| bcl::write_datetime(w, 1, &dt).unwrap());
        let back = bcl::read_datetime(&mut reader(&bytes)).unwrap();
        assert_eq!(back, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_nano_opt(0, 0, 0, 100).unwrap());
    }

    #[test]
    fn datetime_extremes_use_min_max_marker() {
        for dt in [NaiveDateTime::MIN, NaiveDateTime::MAX] {
            let bytes = write(|w| bcl::write_datetime(w, 1, &dt).unwrap());
            assert_eq!(bcl::read_datetime(&mut reader(&bytes)).unwrap(), dt);
        }
    }

    // ## TimeSpan

    #[test]
    fn timespan_in_minutes() {
        let bytes = write(|w| bcl::write_timespan(w, 1, &TimeDelta::minutes(90)).unwrap());
        assert_eq!(bytes, vec![0x0B, 0x08, 0xB4, 0x01, 0x10, 0x02, 0x0C]);
        assert_eq!(bcl::read_timespan(&mut reader(&bytes)).unwrap(), TimeDelta::minutes(90));
    }

    #[test]
    fn negative_fractional_timespan() {
        let d = TimeDelta::milliseconds(-1500);
        let bytes = write(|w| bcl::write_timespan(w, 1, &d).unwrap());
        assert_eq!(bcl::read_timespan(&mut reader(&bytes)).unwrap(), d);
    }

    #[test]
    fn timespan_extremes() {
        for d in [TimeDelta::MIN, TimeDelta::MAX] {
            let bytes = write(|w| bcl::write_timespan(w, 1, &d).unwrap());
            assert_eq!(bcl::read_timespan(&mut reader(&bytes)).unwrap(), d);
        }
    }

    #[test]
    fn bad_min_max_marker_is_malformed() {
        // value 2 (zigzag 4) with scale 15.
        let bytes = [0x0Bu8, 0x08, 0x04, 0x10, 0x0F, 0x0C];
        let err = bcl::read_timespan(&mut reader(&bytes)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    // ## Decimal / Guid layouts

    #[test]
    fn decimal_layout_and_round_trip() {
        let d = Decimal::new(-12_345, 2).unwrap();
        let bytes = write(|w| bcl::write_decimal(w, 1, &d).unwrap());
        // lo = 12345, signScale = 1 | 2 << 1 = 5
        assert_eq!(bytes, vec![0x0B, 0x08, 0xB9, 0x60, 0x18, 0x05, 0x0C]);
        assert_eq!(bcl::read_decimal(&mut reader(&bytes)).unwrap(), d);

        let wide = Decimal::new((1i128 << 90) + 7, 28).unwrap();
        let bytes = write(|w| bcl::write_decimal(w, 1, &wide).unwrap());
        assert_eq!(bcl::read_decimal(&mut reader(&bytes)).unwrap(), wide);
    }

    #[test]
    fn guid_layout_skips_zero_halves() {
        let g = Guid::from_halves(0, 0xAB);
        let bytes = write(|w| bcl::write_guid(w, 1, &g).unwrap());
        // only hi: header (2, Fixed64) = 0x11
        assert_eq!(bytes[1], 0x11);
        assert_eq!(bytes.len(), 1 + 1 + 8 + 1);
        assert_eq!(bcl::read_guid(&mut reader(&bytes)).unwrap(), g);
    }

    #[test]
    fn unknown_subfields_are_skipped() {
        // Guid group with lo = 1 and an extra varint field 7.
        let mut bytes = vec![0x0Bu8, 0x09];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&[0x38, 0x05, 0x0C]);
        let g = bcl::read_guid(&mut reader(&bytes)).unwrap();
        assert_eq!(g, Guid::from_halves(1, 0));
    }

    #[test]
    fn out_of_range_datetime_is_rejected() {
        // i64::MAX days
        let mut bytes = vec![0x0Bu8, 0x08];
        let mut v = (i64::MAX as u64) << 1;
        while v >= 0x80 {
            bytes.push((v as u8) | 0x80);
            v >>= 7;
        }
        bytes.push(v as u8);
        bytes.push(0x0C);
        let err = bcl::read_datetime(&mut reader(&bytes)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
    }
}
