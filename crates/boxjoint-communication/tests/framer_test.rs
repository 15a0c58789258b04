use boxjoint_communication::LineFramer;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_chunking_does_not_change_records(
        lines in proptest::collection::vec("[0-9,]{0,20}", 0..10),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let stream: Vec<u8> = lines
            .iter()
            .flat_map(|l| l.bytes().chain(std::iter::once(b'\n')))
            .collect();

        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(stream.len() + 1)).collect();
        offsets.push(0);
        offsets.push(stream.len());
        offsets.sort_unstable();

        let mut framer = LineFramer::new();
        let mut records = Vec::new();
        for window in offsets.windows(2) {
            records.extend(framer.push(&stream[window[0]..window[1]]));
        }

        prop_assert_eq!(records, lines);
        prop_assert_eq!(framer.pending(), 0);
    }
}
