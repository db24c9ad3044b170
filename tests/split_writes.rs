//! Property-based invariant tests for streaming resumption
//!
//! The parser's key correctness property: for any byte stream and any split
//! of it into successive writes, the resulting screen state is identical to
//! writing the whole stream at once. Fragments below cover text, control
//! characters, complete and aborted escapes, OSC/APC payloads, multi-byte
//! UTF-8 and invalid bytes, so splits land inside every parser mode.

use std::io::Write;

use ansi_screen::Screen;
use proptest::prelude::*;

fn arb_fragment() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        // Plain printable text
        "[ -~]{0,12}".prop_map(String::into_bytes),
        // Carriage controls
        Just(b"\n".to_vec()),
        Just(b"\r".to_vec()),
        Just(b"\x08".to_vec()),
        // SGR and cursor sequences
        Just(b"\x1b[31m".to_vec()),
        Just(b"\x1b[1;38;5;208m".to_vec()),
        Just(b"\x1b[0m".to_vec()),
        Just(b"\x1b[2A".to_vec()),
        Just(b"\x1b[5C".to_vec()),
        Just(b"\x1b[1;5H".to_vec()),
        Just(b"\x1b[0K".to_vec()),
        Just(b"\x1b[2J".to_vec()),
        Just(b"\x1b[?25h".to_vec()),
        // Direct escapes and charset designation
        Just(b"\x1bM".to_vec()),
        Just(b"\x1b7".to_vec()),
        Just(b"\x1b8".to_vec()),
        Just(b"\x1b(B".to_vec()),
        // Aborted escapes
        Just(b"\x1bz".to_vec()),
        Just(b"\x1b[31~".to_vec()),
        // OSC: hyperlinks, elements, ignored commands, both terminators
        Just(b"\x1b]8;;https://x/\x07".to_vec()),
        Just(b"\x1b]8;;\x07".to_vec()),
        Just(b"\x1b]1339;url=https://x/;content=hi\x1b\\".to_vec()),
        Just(b"\x1b]0;title\x07".to_vec()),
        // APC timestamps
        Just(b"\x1b_bk;t=1000\x07".to_vec()),
        Just(b"\x1b_bk;dt=50\x1b\\".to_vec()),
        // Multi-byte UTF-8 and an invalid byte
        Just("é中🎉".as_bytes().to_vec()),
        Just(vec![0xFF]),
    ]
}

fn render(screen: &Screen) -> (String, String, (usize, usize)) {
    (
        screen.as_html(),
        screen.as_plain_text(),
        screen.cursor(),
    )
}

proptest! {
    #[test]
    fn split_anywhere_matches_unsplit(
        fragments in prop::collection::vec(arb_fragment(), 0..10),
        split_numerator in 0usize..=100,
    ) {
        let bytes: Vec<u8> = fragments.concat();
        let split = bytes.len() * split_numerator / 100;

        let mut whole = Screen::new();
        whole.write_all(&bytes).unwrap();

        let mut parts = Screen::new();
        parts.write_all(&bytes[..split]).unwrap();
        parts.write_all(&bytes[split..]).unwrap();

        prop_assert_eq!(render(&whole), render(&parts));
    }

    #[test]
    fn byte_at_a_time_matches_unsplit(
        fragments in prop::collection::vec(arb_fragment(), 0..6),
    ) {
        let bytes: Vec<u8> = fragments.concat();

        let mut whole = Screen::new();
        whole.write_all(&bytes).unwrap();

        let mut dribble = Screen::new();
        for byte in &bytes {
            dribble.write_all(std::slice::from_ref(byte)).unwrap();
        }

        prop_assert_eq!(render(&whole), render(&dribble));
    }

    #[test]
    fn write_reports_full_length_for_any_input(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut screen = Screen::new();
        let n = screen.write(&bytes).unwrap();
        prop_assert_eq!(n, bytes.len());
    }

    #[test]
    fn cursor_stays_in_viewport_after_motion(
        motions in prop::collection::vec(
            prop_oneof![
                Just(b'A'), Just(b'B'), Just(b'C'), Just(b'D'),
                Just(b'E'), Just(b'F'), Just(b'G'), Just(b'H'),
            ],
            1..20,
        ),
        counts in prop::collection::vec(0u8..=200, 1..20),
    ) {
        let mut screen = Screen::builder().size(20, 10).build().unwrap();
        for (motion, count) in motions.iter().zip(&counts) {
            let seq = format!("\x1b[{}{}", count, *motion as char);
            screen.write_all(seq.as_bytes()).unwrap();
            let (x, y) = screen.cursor();
            prop_assert!(x < 20);
            prop_assert!(y < 10);
        }
    }
}
