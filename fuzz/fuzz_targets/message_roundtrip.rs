#![no_main]
use libfuzzer_sys::fuzz_target;

use lumen_core::BuildOptions;
use lumen_core::Message;
use lumen_core::RawMessage;

fn assert_message_eq(left: &Message, right: &Message) {
    match (left, right) {
        (
            Message::LightSetPower { level, duration },
            Message::LightSetPower {
                level: level2,
                duration: duration2,
            },
        ) => {
            // building normalizes any nonzero level to 65535
            assert_eq!(duration, duration2);
            if *level > 0 {
                assert!(*level2 > 0);
            } else {
                assert!(*level2 == 0);
            }
        }
        (Message::Acknowledgement { .. }, Message::Acknowledgement { seq }) => {
            // the builder leaves the sequence for the sending path to stamp
            assert_eq!(*seq, 0);
        }
        (
            Message::StateMultiZone { count, index, colors },
            Message::StateMultiZone {
                count: count2,
                index: index2,
                colors: colors2,
            },
        ) => {
            // parsing reads min(8, count - index) colors, so an arbitrary
            // input with extra colors comes back truncated
            assert_eq!(count, count2);
            assert_eq!(index, index2);
            assert!(colors.starts_with(colors2));
        }
        (a, b) => assert_eq!(a, b),
    }
}

fuzz_target!(|data: Message| {
    let opts = BuildOptions {
        ..Default::default()
    };

    let orig = data.clone();
    let raw = match RawMessage::build(&opts, &data) {
        // tile messages without exactly 64 colors refuse to build
        Err(_) => return,
        Ok(raw) => raw,
    };

    let bytes = raw.pack().unwrap();
    let reparsed = RawMessage::unpack(&bytes).unwrap();
    assert_eq!(raw, reparsed);

    match Message::from_raw(&reparsed) {
        Ok(parsed_msg) => assert_message_eq(&orig, &parsed_msg),
        // multizone payloads shorter than the count/index imply don't parse
        Err(_) => {}
    }
});
