// De-multiplexer behaviour:
// * exact reconstruction from tagged slots
// * legacy wire reconstruction and its zero-byte loss
// * alignment violations are reported, never truncated
// * persisting recovered streams to sinks

#[cfg(test)]
mod tests {
    use sts_mux_core::stream::{
        reconstruct, reconstruct_wire, CombinedSequence, OutputSink, SharedBuffer,
    };
    use sts_mux_core::types::{MuxError, Slot, SourceId};

    use Slot::{Absent, Present};

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn slots_are_routed_by_position_mod_width() {
        let combined = CombinedSequence::from_slots(
            3,
            vec![
                Present(1), Present(10), Present(20),
                Present(2), Present(11), Present(21),
                Absent, Present(12), Absent,
            ],
        );
        let recovered = reconstruct(&combined).unwrap();

        assert_eq!(recovered.len(), 3);
        assert_eq!(recovered.to_vecs(), vec![vec![1, 2], vec![10, 11, 12], vec![20, 21]]);
        assert_eq!(recovered.get(SourceId(2)).unwrap().id, SourceId(2));
        assert_eq!(recovered.total_bytes(), 7);
    }

    #[test]
    fn present_zero_bytes_survive_slot_reconstruction() {
        let combined =
            CombinedSequence::from_slots(3, vec![Present(0), Present(0), Absent, Present(7), Absent, Absent]);
        let recovered = reconstruct(&combined).unwrap();
        assert_eq!(recovered.to_vecs(), vec![vec![0, 7], vec![0], vec![]]);
    }

    #[test]
    fn wire_reconstruction_drops_placeholders() {
        // sources of length 2, 5, 2
        let wire = [1, 10, 20, 2, 11, 21, 0, 12, 0, 0, 13, 0, 0, 14, 0];
        let recovered = reconstruct_wire(&wire, 3).unwrap();
        assert_eq!(
            recovered.to_vecs(),
            vec![vec![1, 2], vec![10, 11, 12, 13, 14], vec![20, 21]]
        );
    }

    #[test]
    fn wire_reconstruction_loses_genuine_zero_bytes() {
        // Source 1 really sent [5, 0, 6]; the zero is taken for padding.
        let wire = [5, 1, 2, 0, 3, 4, 6, 0, 0];
        let recovered = reconstruct_wire(&wire, 3).unwrap();
        assert_eq!(recovered.get(SourceId(1)).unwrap().bytes.as_ref(), &[5, 6]);
        assert_eq!(recovered.get(SourceId(2)).unwrap().bytes.as_ref(), &[1, 3]);
        assert_eq!(recovered.get(SourceId(3)).unwrap().bytes.as_ref(), &[2, 4]);
    }

    #[test]
    fn wire_round_trip_through_combined_sequence() {
        let wire = [1, 2, 0, 3, 0, 0];
        let combined = CombinedSequence::from_wire(3, &wire);
        assert_eq!(combined.absent_count(), 3);
        assert_eq!(combined.to_wire_bytes(), wire.to_vec());
        assert_eq!(reconstruct(&combined).unwrap(), reconstruct_wire(&wire, 3).unwrap());
    }

    #[test]
    fn misaligned_sequence_is_a_protocol_violation() {
        let err = reconstruct_wire(&[1, 2, 3, 4], 3).unwrap_err();
        assert!(matches!(err, MuxError::ProtocolInvariantViolation { len: 4, width: 3 }));

        let combined = CombinedSequence::from_slots(3, vec![Present(1); 5]);
        assert!(!combined.is_aligned());
        assert!(matches!(
            reconstruct(&combined),
            Err(MuxError::ProtocolInvariantViolation { len: 5, width: 3 })
        ));
    }

    #[test]
    fn zero_width_is_a_protocol_violation() {
        assert!(matches!(
            reconstruct_wire(&[], 0),
            Err(MuxError::ProtocolInvariantViolation { len: 0, width: 0 })
        ));
    }

    #[test]
    fn empty_sequence_recovers_empty_streams() {
        let recovered = reconstruct_wire(&[], 3).unwrap();
        assert_eq!(recovered.to_vecs(), vec![Vec::<u8>::new(); 3]);
    }

    #[test]
    fn persist_writes_each_stream_to_its_sink() {
        let recovered = reconstruct_wire(&[1, 2, 3, 4, 0, 5], 3).unwrap();
        let sinks: Vec<SharedBuffer> = (0..3).map(|_| SharedBuffer::new()).collect();

        recovered
            .persist(sinks.iter().cloned().map(OutputSink::Memory).collect())
            .unwrap();

        assert_eq!(sinks[0].contents(), vec![1, 4]);
        assert_eq!(sinks[1].contents(), vec![2]);
        assert_eq!(sinks[2].contents(), vec![3, 5]);
    }

    #[test]
    fn persist_rejects_wrong_sink_count() {
        let recovered = reconstruct_wire(&[1, 2, 3], 3).unwrap();
        let err = recovered
            .persist(vec![OutputSink::Memory(SharedBuffer::new())])
            .unwrap_err();
        assert!(matches!(err, MuxError::Config(_)));
    }
}
