#![cfg(feature = "runtime")]

use typeline::Segmenter;
use typeline::prelude::*;

#[test]
fn prelude_drives_a_full_run() {
    let config = TypedTextConfig::new([
        LineDescriptor::segments([
            TextSegment::new("Hello, "),
            TextSegment::new("world").bold().color("#22d3ee"),
        ]),
        LineDescriptor::plain("again").pause_at(2, 250),
    ])
    .timing(TimingConfig::default().ms_per_char(40))
    .repeat("1".parse::<Repeat>().expect("valid repeat"));

    let mut host = SimHost::new();
    let mut ctl = RunController::new(config);
    ctl.mount(&mut host);
    host.run_until_settled(&mut ctl, Duration::from_secs(60));

    assert_eq!(ctl.phase(), RunPhase::Done);
    assert_eq!(ctl.counts(), &[12, 5]);
    assert_eq!(ctl.runs_completed(), 2);

    let view = ctl.line_view(0).expect("first line");
    assert_eq!(view.runs.len(), 2);
    assert_eq!(view.text(), "Hello,\u{a0}world");
    assert_eq!(ctl.caret(0), Some(CaretState::Hidden));
    assert!(ctl.caret(1).is_some_and(CaretState::is_visible));
}

#[test]
fn errors_convert_and_display() {
    let err: Error = "sometimes".parse::<Repeat>().unwrap_err().into();
    assert!(err.to_string().contains("sometimes"));
    assert!(std::error::Error::source(&err).is_some());

    let err = typeline::parse_strategy("polling").unwrap_err();
    assert_eq!(err, Error::UnknownStrategy("polling".to_owned()));
    assert_eq!(typeline::parse_strategy(" Frames "), Ok(Strategy::Frames));
    assert_eq!(typeline::parse_strategy("timers"), Ok(Strategy::Timers));
}

#[test]
fn segmenter_follows_grapheme_feature() {
    let config = TypedTextConfig::new(["e\u{301}"]);
    let expected = if cfg!(feature = "grapheme-clusters") {
        Segmenter::Graphemes
    } else {
        Segmenter::Scalars
    };
    assert_eq!(config.segmenter, expected);

    let units = if expected.is_degraded() { 2 } else { 1 };
    assert_eq!(RunController::new(config).plan().lengths(), vec![units]);
}
