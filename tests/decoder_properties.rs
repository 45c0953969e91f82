//! Property-based tests for report decoding across every registered model.

use proptest::prelude::*;
use spacemouse::decoder::{axis_channels, encode_axes, encode_buttons};
use spacemouse::{registry, to_int16, Axis, DecodeEvent, ReportDecoder, SpaceMouseError};

fn device_index() -> impl Strategy<Value = usize> {
    0..registry::all().len()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any byte pair reads back as its little-endian i16.
    #[test]
    fn prop_to_int16_is_little_endian(raw in any::<i16>()) {
        let [lo, hi] = raw.to_le_bytes();
        prop_assert_eq!(to_int16(lo, hi), raw);
    }

    /// Encoding one motion sample and decoding it yields sign * raw / scale
    /// on every axis, and repeating the decode gives identical output.
    #[test]
    fn prop_motion_sample_decodes_deterministically(
        idx in device_index(),
        raw in prop::array::uniform6(any::<i16>()),
        t in 0.0f64..1.0e6,
    ) {
        let spec = &registry::all()[idx];
        let decoder = ReportDecoder::new(spec.clone());

        let mut state = decoder.initial_state();
        let mut last = DecodeEvent::Idle;
        for channel in axis_channels(spec) {
            let report = encode_axes(spec, channel, raw);
            let (first, event) = decoder.decode(&state, &report, t).expect("well-formed");
            let (again, _) = decoder.decode(&state, &report, t).expect("well-formed");
            prop_assert_eq!(&first, &again);
            state = first;
            last = event;
        }
        prop_assert_eq!(last, DecodeEvent::Motion);

        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let expected = spec.axes.get(axis).sign.factor() * f64::from(raw[i]) / spec.axis_scale;
            prop_assert!((state.axis(axis) - expected).abs() < 1e-12, "{} mismatch", axis);
        }
        prop_assert_eq!(state.t, t);
    }

    /// Only the last channel of a split pair publishes.
    #[test]
    fn prop_first_half_of_pair_is_partial(
        idx in device_index(),
        raw in prop::array::uniform6(any::<i16>()),
    ) {
        let spec = &registry::all()[idx];
        let decoder = ReportDecoder::new(spec.clone());
        let channels = axis_channels(spec);
        let state = decoder.initial_state();
        for channel in &channels[..channels.len() - 1] {
            let (_, event) = decoder
                .decode(&state, &encode_axes(spec, *channel, raw), 0.0)
                .expect("well-formed");
            prop_assert_eq!(event, DecodeEvent::Partial);
        }
    }

    /// A truncated axis report is rejected and the previous state survives intact.
    #[test]
    fn prop_short_report_is_malformed(
        idx in device_index(),
        raw in prop::array::uniform6(any::<i16>()),
        next in prop::array::uniform6(any::<i16>()),
        cut in 1usize..64,
    ) {
        let spec = &registry::all()[idx];
        let decoder = ReportDecoder::new(spec.clone());
        let mut state = decoder.initial_state();
        for channel in axis_channels(spec) {
            state = decoder.decode(&state, &encode_axes(spec, channel, raw), 1.0).expect("well-formed").0;
        }

        for channel in axis_channels(spec) {
            let full = encode_axes(spec, channel, next);
            let len = 1 + cut % (full.len() - 1);
            if len == full.len() {
                continue;
            }
            let mut target = state.clone();
            let result = decoder.decode_into(&mut target, &full[..len], 2.0);
            let is_malformed = matches!(result, Err(SpaceMouseError::MalformedReport { .. }));
            prop_assert!(is_malformed);
            prop_assert_eq!(&target, &state);
        }
    }

    /// Every pressed flag lands on its button and nothing else.
    #[test]
    fn prop_buttons_decode_to_pressed_flags(
        idx in device_index(),
        seed in any::<u32>(),
    ) {
        let spec = &registry::all()[idx];
        let decoder = ReportDecoder::new(spec.clone());
        let pressed: Vec<bool> = (0..spec.buttons.len()).map(|i| (seed >> (i % 32)) & 1 == 1).collect();
        let (state, event) = decoder
            .decode(&decoder.initial_state(), &encode_buttons(spec, &pressed), 0.5)
            .expect("well-formed");
        prop_assert_eq!(event, DecodeEvent::Buttons);
        prop_assert_eq!(state.buttons.as_slice(), pressed.as_slice());
    }

    /// Unknown channels only stamp the time; empty reads change nothing.
    #[test]
    fn prop_unknown_channel_is_ignored(
        idx in device_index(),
        channel in 4u8..=255,
        tail in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let spec = &registry::all()[idx];
        let decoder = ReportDecoder::new(spec.clone());
        let state = decoder.initial_state();

        let mut report = vec![channel];
        report.extend(tail);
        let (next, event) = decoder.decode(&state, &report, 9.0).expect("ignored");
        prop_assert_eq!(event, DecodeEvent::Ignored(channel));
        prop_assert_eq!(next.t, 9.0);
        prop_assert_eq!(&next.buttons, &state.buttons);
        for axis in Axis::ALL {
            prop_assert_eq!(next.axis(axis), state.axis(axis));
        }

        let (idle, event) = decoder.decode(&state, &[], 9.0).expect("empty");
        prop_assert_eq!(event, DecodeEvent::Idle);
        prop_assert_eq!(&idle, &state);
    }
}

#[test]
fn all_ones_is_minus_one() {
    assert_eq!(to_int16(0xFF, 0xFF), -1);
}

#[test]
fn transport_ids_are_unique() {
    let ids: Vec<_> = registry::all().iter().map(|s| s.transport_id()).collect();
    for (i, id) in ids.iter().enumerate() {
        assert!(!ids[i + 1..].contains(id), "duplicate transport id {id:04x?}");
    }
}
