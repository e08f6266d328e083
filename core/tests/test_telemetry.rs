// Telemetry and configuration:
// * counters merge and snapshot invariants
// * stage coverage of a full run
// * JSON output of snapshots and config loading

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use sts_mux_core::config::MuxConfig;
    use sts_mux_core::stream::{compare, Multiplexer, OutputSink, SharedBuffer, SourceInput};
    use sts_mux_core::telemetry::{MuxCounters, Stage, StageTimes, TelemetrySnapshot, TelemetryTimer};
    use sts_mux_core::types::{MuxError, SourceId};

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn scenario_b_snapshot() -> TelemetrySnapshot {
        let mux = Multiplexer::new(MuxConfig::default().with_frame_size(2)).unwrap();
        let run = mux
            .run(vec![
                SourceInput::Memory(b"ab".to_vec()),
                SourceInput::Memory(b"vwxyz".to_vec()),
                SourceInput::Memory(b"cd".to_vec()),
            ])
            .unwrap();
        run.telemetry
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn counters_merge_and_add_assign_agree() {
        let mut a = MuxCounters::default();
        a.add_frame(810);
        a.add_round(3, 0);

        let mut b = MuxCounters::default();
        b.add_frame(12);
        b.add_round(1, 2);
        b.add_recovered(4);

        let mut merged = a.clone();
        merged.merge(&b);
        let mut summed = a;
        summed += b;

        assert_eq!(merged, summed);
        assert_eq!(merged.frames_read, 2);
        assert_eq!(merged.bytes_read, 822);
        assert_eq!(merged.rounds, 2);
        assert_eq!(merged.total_slots(), 6);
    }

    #[test]
    fn snapshot_of_uneven_run() {
        let snap = scenario_b_snapshot();

        assert_eq!(snap.source_count, 3);
        assert_eq!(snap.rounds, 5);
        assert_eq!(snap.bytes_read, 9);
        assert_eq!(snap.slots_present, 9);
        assert_eq!(snap.slots_absent, 6);
        assert_eq!(snap.bytes_recovered, 9);
        // ab -> 1 frame, vwxyz -> 3 frames, cd -> 1 frame
        assert_eq!(snap.frames_read, 5);
        assert!((snap.padding_ratio - 0.4).abs() < 1e-9);
        assert!(snap.sanity_check());
        assert!(snap.has_all_stages(&[
            Stage::Open,
            Stage::Read,
            Stage::Interleave,
            Stage::Reconstruct,
            Stage::Verify,
        ]));
        assert!(!snap.has_all_stages(&[Stage::Persist]));
    }

    #[test]
    fn persist_is_charged_to_snapshot() {
        let mux = Multiplexer::new(MuxConfig::default().with_frame_size(2)).unwrap();
        let mut run = mux
            .run(vec![
                SourceInput::Memory(b"ab".to_vec()),
                SourceInput::Memory(b"vwxyz".to_vec()),
                SourceInput::Memory(b"cd".to_vec()),
            ])
            .unwrap();
        assert!(!run.telemetry.has_all_stages(&[Stage::Persist]));

        let sinks = vec![SharedBuffer::new(), SharedBuffer::new(), SharedBuffer::new()];
        run.persist(sinks.iter().cloned().map(OutputSink::Memory).collect()).unwrap();

        assert!(run.telemetry.has_all_stages(&[Stage::Persist]));
        assert_eq!(sinks[1].contents(), b"vwxyz".to_vec());
        assert!(run.telemetry.to_json().unwrap().contains("Persist"));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = scenario_b_snapshot();
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"rounds\": 5"));

        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rounds, snap.rounds);
        assert_eq!(back.elapsed, snap.elapsed);
        assert_eq!(back.stage_times, snap.stage_times);
        assert_eq!(back.started_at, snap.started_at);
    }

    #[test]
    fn broken_invariants_fail_sanity_check() {
        let mut counters = MuxCounters::default();
        counters.add_frame(2);
        counters.add_round(2, 0); // two slots for a width of three
        let snap = TelemetrySnapshot::from(&counters, &TelemetryTimer::new(), Utc::now(), 3);
        assert!(!snap.sanity_check());
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Read, Duration::from_millis(2));
        times.add(Stage::Read, Duration::from_millis(3));
        times.add(Stage::Verify, Duration::from_millis(1));

        assert_eq!(times.get(Stage::Read), Duration::from_millis(5));
        assert_eq!(times.total(), Duration::from_millis(6));
        assert_eq!(times.get(Stage::Persist), Duration::ZERO);
        assert_eq!(times.summary(), "read=5.000ms verify=1.000ms");
    }

    #[test]
    fn timer_charges_closures_to_stages() {
        let mut timer = TelemetryTimer::new();
        let v = timer.time(Stage::Reconstruct, || 41 + 1);
        timer.finish();
        assert_eq!(v, 42);
        assert!(timer.stage_times.has_all(&[Stage::Reconstruct]));
        assert!(timer.elapsed() >= timer.stage_times.get(Stage::Reconstruct));
    }

    #[test]
    fn compare_flags_lossy_recovery() {
        let ok = compare(SourceId(1), b"abc", b"abc");
        assert!(ok.matches());

        let lossy = compare(SourceId(2), &[1, 0, 2], &[1, 2]);
        assert!(!lossy.matches());
        assert_eq!(lossy.expected_len, 3);
        assert_eq!(lossy.actual_len, 2);
    }

    #[test]
    fn config_defaults_follow_sts1() {
        let config = MuxConfig::default();
        assert_eq!(config.frame_size, 810);
        assert_eq!(config.source_count, 3);
        assert_eq!(config.channel_capacity, 810);
        assert_eq!(config.round_timeout(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_partial_json() {
        let config = MuxConfig::from_json_str(r#"{ "frame_size": 90, "round_timeout_ms": null }"#).unwrap();
        assert_eq!(config.frame_size, 90);
        assert_eq!(config.source_count, 3);
        assert_eq!(config.round_timeout(), None);
    }

    #[test]
    fn config_rejects_bad_json_and_values() {
        assert!(matches!(MuxConfig::from_json_str("{ not json"), Err(MuxError::Config(_))));
        assert!(matches!(
            MuxConfig::from_json_str(r#"{ "channel_capacity": 0 }"#),
            Err(MuxError::Config(_))
        ));
        assert!(matches!(
            MuxConfig::from_json_str(r#"{ "round_timeout_ms": 0 }"#),
            Err(MuxError::Config(_))
        ));
    }

    #[test]
    fn config_rounds_sub_millisecond_timeouts_up() {
        let config = MuxConfig::default().with_round_timeout(Some(Duration::from_micros(500)));
        assert_eq!(config.round_timeout_ms, Some(1));
        assert!(Multiplexer::new(config).is_ok());

        let config = MuxConfig::default().with_round_timeout(Some(Duration::from_micros(1_500)));
        assert_eq!(config.round_timeout(), Some(Duration::from_millis(2)));
    }
}
