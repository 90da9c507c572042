mod common;

use common::{feed_str, session, session_with, RecordingOutputs};
use serialprot::config::ProtocolConfig;
use serialprot::outputs::OutputState;
use serialprot::protocol::{frame, LineOutcome, MessageKind, ProtocolError};

#[test]
fn add_numbers() {
    let mut s = session();
    match s.process_line("#add,3:4\r") {
        LineOutcome::Ack { kind, reply } => {
            assert_eq!(kind, MessageKind::NumberNumber);
            assert_eq!(reply.value.as_deref(), Some("7"));
        }
        other => panic!("Expected Ack, got {:?}", other),
    }
    let out = feed_str(&mut s, "#add,3:4\r");
    assert!(out.contains("#a,7"), "{out:?}");
}

#[test]
fn ascii_code_of_letter() {
    let mut s = session();
    match s.process_line("#asc,A:0\r") {
        LineOutcome::Ack { kind, reply } => {
            assert_eq!(kind, MessageKind::TextNumber);
            assert_eq!(reply.value.as_deref(), Some("65"));
        }
        other => panic!("Expected Ack, got {:?}", other),
    }
    assert!(feed_str(&mut s, "#asc,A:0\r").contains("#a,65"));
}

#[test]
fn inverted_random_bounds_are_rejected() {
    let mut s = session();
    match s.process_line("#rdm,5:1\r") {
        LineOutcome::Nack(ProtocolError::HandlerRejected { name, .. }) => assert_eq!(name, "rdm"),
        other => panic!("Expected HandlerRejected, got {:?}", other),
    }
    let out = feed_str(&mut s, "#rdm,5:1\r");
    assert_eq!(out, "#rdm,5:1\n\rNACK -> #rdm,5:1\r\n\rInput> ");
}

#[test]
fn gpo_acks_without_value() {
    let mut s = session_with(&ProtocolConfig::default(), RecordingOutputs::default());
    let out = feed_str(&mut s, "#gpo,bl:on\r");
    assert!(out.ends_with("\n\rACK -> #gpo,bl:on\n\rInput> "), "{out:?}");
    assert!(!out.contains("#a,"));
    assert_eq!(s.outputs().calls, vec![("bl".to_string(), OutputState::On)]);
}

#[test]
fn long_name_is_malformed_before_dispatch() {
    let mut s = session_with(&ProtocolConfig::default(), RecordingOutputs::default());
    match s.process_line("#zzzz,1:2\r") {
        LineOutcome::Nack(e) => assert!(e.is_grammar(), "{e:?}"),
        other => panic!("Expected Nack, got {:?}", other),
    }
    assert!(feed_str(&mut s, "#zzzz,1:2\r").contains("NACK -> #zzzz,1:2\r"));
    assert!(s.outputs().calls.is_empty());
}

#[test]
fn bare_terminator_gets_blank_response() {
    let mut s = session();
    assert_eq!(s.process_line("\r"), LineOutcome::Empty);
    let out = feed_str(&mut s, "\r");
    assert_eq!(out, "\n\rInput> ");
    assert!(!out.contains("ACK"));
}

#[test]
fn random_value_stays_in_bounds() {
    let mut s = session();
    for _ in 0..50 {
        match s.process_line("#rdm,10:13\r") {
            LineOutcome::Ack { reply, .. } => {
                let v: u32 = reply.value.as_deref().unwrap().parse().unwrap();
                assert!((10..=13).contains(&v), "out of range: {v}");
            }
            other => panic!("Expected Ack, got {:?}", other),
        }
    }
}

#[test]
fn same_line_twice_gives_same_outcome_class() {
    let lines = [
        "#add,12:30\r",
        "#rdm,1:9\r",
        "#asc,x:0\r",
        "#gpo,rt:off\r",
        "#foo,1:2\r",
        "#ad,1:2\r",
    ];
    let mut s = session();
    for line in lines {
        let first = s.process_line(line);
        let second = s.process_line(line);
        assert_eq!(
            std::mem::discriminant(&first),
            std::mem::discriminant(&second),
            "{line:?}"
        );
        if let (LineOutcome::Nack(a), LineOutcome::Nack(b)) = (&first, &second) {
            assert_eq!(a.class(), b.class());
        }
    }
}

#[test]
fn parsed_frame_reserializes_to_valid_line() {
    for line in ["#add,3:4\r", "#gpo,bl:on\r", "#asc,A:0\r", "#rdm,1:9999\r"] {
        let frame = frame::parse(line).unwrap();
        let again = frame.to_line();
        assert_eq!(again, line);
        assert_eq!(frame::parse(&again).unwrap(), frame);
    }
}

#[test]
fn unknown_command_for_kind() {
    let mut s = session();
    // gpo needs two alphabetic parameters
    match s.process_line("#gpo,1:2\r") {
        LineOutcome::Nack(ProtocolError::UnknownCommand { name, .. }) => assert_eq!(name, "gpo"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
    match s.process_line("#xyz,ab:cd\r") {
        LineOutcome::Nack(ProtocolError::UnknownCommand { .. }) => {}
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

#[test]
fn failing_output_is_handler_failure() {
    let mut s = session_with(&ProtocolConfig::default(), RecordingOutputs::failing_on("rt"));
    match s.process_line("#gpo,rt:on\r") {
        LineOutcome::Nack(ProtocolError::HandlerFailed { name, .. }) => assert_eq!(name, "gpo"),
        other => panic!("Expected HandlerFailed, got {:?}", other),
    }
    let out = feed_str(&mut s, "#gpo,rt:on\r");
    assert!(out.contains("NACK -> #gpo,rt:on\r"));
}

#[test]
fn bad_output_state_is_handler_failure() {
    let mut s = session();
    match s.process_line("#gpo,bl:up\r") {
        LineOutcome::Nack(ProtocolError::HandlerFailed { .. }) => {}
        other => panic!("Expected HandlerFailed, got {:?}", other),
    }
    assert_eq!(s.outputs().state("bl"), Some(OutputState::Off));
}

#[test]
fn marker_prefix_is_applied() {
    let config = ProtocolConfig {
        marker_prefix: "STM32-".into(),
        ..ProtocolConfig::default()
    };
    let mut s = session_with(&config, RecordingOutputs::default());
    let ok = feed_str(&mut s, "#add,1:2\r");
    assert!(ok.contains("\n\rSTM32-ACK -> #add,1:2 => #a,3\n\r"), "{ok:?}");
    let bad = feed_str(&mut s, "add\r");
    assert!(bad.contains("\n\rSTM32-NACK -> add\r\n\r"), "{bad:?}");
}

#[test]
fn ascii_with_two_numbers_is_unknown() {
    let mut s = session();
    match s.process_line("#asc,5:0\r") {
        LineOutcome::Nack(ProtocolError::UnknownCommand { name, kind }) => {
            assert_eq!(name, "asc");
            assert_eq!(kind, MessageKind::NumberNumber.as_str());
        }
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
    assert!(feed_str(&mut s, "#asc,5:0\r").contains("NACK -> #asc,5:0\r"));
    // A digit symbol still works when the second parameter is text
    assert!(feed_str(&mut s, "#asc,5:x\r").contains("#a,53"));
}

#[test]
fn space_in_parameter_changes_kind() {
    let mut s = session();
    // " 1" is neither numeric nor alphabetic, so the pair is text-number
    match s.process_line("#add, 1:2\r") {
        LineOutcome::Nack(ProtocolError::UnknownCommand { name, kind }) => {
            assert_eq!(name, "add");
            assert_eq!(kind, MessageKind::TextNumber.as_str());
        }
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
    let out = feed_str(&mut s, "#add, 1:2\r");
    assert!(out.starts_with("#add, 1:2\n\rNACK -> "), "{out:?}");
}
