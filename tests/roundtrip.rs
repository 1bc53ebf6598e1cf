use paste::paste;
use wust_frame::{Frame, FrameFactory, FrameParser, Opcode, OwnedFrame};

const OPCODES: [Opcode; 6] = [
    Opcode::Cont,
    Opcode::Text,
    Opcode::Bin,
    Opcode::Close,
    Opcode::Ping,
    Opcode::Pong,
];

#[allow(clippy::cast_possible_truncation)]
fn make_payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i * 31 + 7) as u8).collect() }

fn roundtrip(len: usize) {
    let payload = make_payload(len);
    let mut factory = FrameFactory::with_seed(0, 0xDEAD, 0xBEEF);
    let mut parser = FrameParser::with_capacity(0);

    for opcode in OPCODES {
        for fin in [true, false] {
            for mask in [true, false] {
                let wire = factory.construct(fin, opcode, mask, &payload).unwrap();
                let frame = parser.update(wire).expect("complete frame");

                assert_eq!(frame.fin, fin);
                assert_eq!(frame.opcode, opcode);
                assert_eq!(frame.is_masked(), mask);
                assert_eq!(frame.payload.len(), len);

                if let Some(key) = frame.masking_key {
                    // still masked on the way out of the parser
                    let mut unmasked = frame.payload.to_vec();
                    wust_frame::mask(&mut unmasked, key);
                    assert_eq!(unmasked, payload);
                    if key.iter().take(len).any(|&k| k != 0) {
                        assert_ne!(frame.payload, &payload[..]);
                    }
                } else {
                    assert_eq!(frame.payload, &payload[..]);
                }
                assert_eq!(parser.buffered(), 0);
            }
        }
    }
}

macro_rules! roundtrip_lengths {
    ($($len:expr),* $(,)?) => {
        $(paste! {
            #[test]
            fn [<roundtrip_len_ $len>]() {
                roundtrip($len);
            }
        })*
    };
}

roundtrip_lengths!(0, 1, 125, 126, 65535, 65536);

#[test]
fn every_chunk_size_yields_one_identical_frame() {
    let payload = make_payload(130);
    let mut factory = FrameFactory::with_seed(0, 1, 2);
    let wire = factory.binary(false, true, &payload).to_vec();

    let mut whole = FrameParser::new();
    let expected: OwnedFrame = whole.update(&wire).unwrap().into();

    for chunk_size in 1..=wire.len() {
        let mut parser = FrameParser::with_capacity(0);
        let mut frames = Vec::new();
        let chunks: Vec<_> = wire.chunks(chunk_size).collect();
        for (i, chunk) in chunks.iter().enumerate() {
            if let Some(frame) = parser.update(chunk) {
                assert_eq!(i + 1, chunks.len(), "chunk size {chunk_size}: emitted early");
                frames.push(frame.into_owned());
            }
        }
        assert_eq!(frames, [expected.clone()], "chunk size {chunk_size}");
    }
}

#[test]
fn two_frames_in_one_chunk() {
    let mut factory = FrameFactory::new();
    let mut wire = factory.text(true, false, b"one").to_vec();
    wire.extend_from_slice(factory.ping(true, b"two").unwrap());

    let mut parser = FrameParser::new();
    let first = parser.update(&wire).unwrap();
    assert_eq!(first.opcode, Opcode::Text);
    assert_eq!(first.payload, b"one");

    let second = parser.update(&[]).unwrap();
    assert_eq!(second.opcode, Opcode::Ping);
    assert!(second.fin);
    assert_eq!(second.unmask(), &b"two"[..]);

    assert!(parser.update(&[]).is_none());
}

#[test]
fn stream_of_mixed_frames_split_arbitrarily() {
    let mut factory = FrameFactory::with_seed(0, 3, 4);
    let sent = [
        OwnedFrame::from(Frame::new(false, Opcode::Text, None, b"hel")),
        OwnedFrame::from(Frame::new(true, Opcode::Cont, None, b"lo")),
        OwnedFrame::from(Frame::new(true, Opcode::Ping, None, b"")),
        OwnedFrame::from(Frame::new(true, Opcode::Bin, None, &[0xAB; 70_000])),
        OwnedFrame::from(Frame::new(true, Opcode::Close, None, &[0x03, 0xE8])),
    ];
    let mut wire = Vec::new();
    for frame in &sent {
        wire.extend_from_slice(factory.encode(&frame.as_frame()).unwrap());
    }

    let mut parser = FrameParser::with_capacity(16);
    let mut received = Vec::new();
    for chunk in wire.chunks(997) {
        let mut next = parser.update(chunk).map(Frame::into_owned);
        while let Some(frame) = next {
            received.push(frame);
            next = parser.poll().map(Frame::into_owned);
        }
    }
    assert_eq!(received, sent);
}

#[test]
fn control_frame_size_limit() {
    let mut factory = FrameFactory::new();
    let max = [b'a'; 125];
    let over = [b'a'; 126];

    assert_eq!(factory.ping(false, &max).unwrap().len(), 127);
    assert_eq!(factory.pong(false, &max).unwrap().len(), 127);
    assert_eq!(factory.close(true, &max).unwrap().len(), 131);

    assert!(factory.ping(false, &over).is_err());
    assert!(factory.pong(true, &over).is_err());
    assert!(factory.close(false, &over).is_err());
}

#[test]
fn seeded_factories_are_reproducible() {
    let mut a = FrameFactory::with_seed(0, 11, 22);
    let mut b = FrameFactory::with_seed(0, 11, 22);
    for i in 0..20 {
        let payload = make_payload(i);
        assert_eq!(a.text(true, true, &payload), b.text(true, true, &payload));
    }
}

#[test]
fn parsed_frame_can_be_re_encoded() {
    let mut factory = FrameFactory::new();
    let wire = factory.binary(true, true, b"echo").to_vec();

    let mut parser = FrameParser::new();
    let frame = parser.update(&wire).unwrap();
    assert_eq!(factory.encode(&frame).unwrap(), &wire[..]);
}
