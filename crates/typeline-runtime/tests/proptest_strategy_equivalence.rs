//! Property tests: both scheduling strategies follow the compiled plan.
//!
//! 1. Timers: after advancing to `t`, counts equal `visible_counts_at(t)`.
//! 2. Frames: after advancing to `t`, counts equal `visible_counts_at` at the
//!    last refresh boundary at or before `t`.
//! 3. Both complete exactly once, with counts at full line lengths.
//! 4. Counts never decrease within a run.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use proptest::prelude::*;
use typeline_core::{LineDescriptor, Segmenter, TimingConfig};
use typeline_runtime::{RunController, RunPhase, SimHost, Strategy as Schedule, TypedTextConfig};

// ── Strategies ────────────────────────────────────────────────────────────

fn line_strategy() -> impl Strategy<Value = LineDescriptor> {
    (
        "[a-z ]{0,10}",
        proptest::option::of(1u64..=60),
        proptest::option::of(0u64..=80),
        proptest::collection::vec((0usize..=12, 0u64..=200), 0..3),
    )
        .prop_map(|(text, rate, gap, pauses)| {
            let mut line = LineDescriptor::plain(text);
            if let Some(rate) = rate {
                line = line.ms_per_char(rate);
            }
            if let Some(gap) = gap {
                line = line.line_delay(gap);
            }
            for (index, extra) in pauses {
                line = line.pause_at(index, extra);
            }
            line
        })
}

fn config_strategy() -> impl Strategy<Value = TypedTextConfig> {
    (
        proptest::collection::vec(line_strategy(), 0..4),
        1u64..=60,
        0u64..=100,
        0u64..=100,
    )
        .prop_map(|(lines, rate, inter, start)| {
            TypedTextConfig::new(lines)
                .timing(
                    TimingConfig::default()
                        .ms_per_char(rate)
                        .inter_line_delay(inter)
                        .start_delay(start),
                )
                .segmenter(Segmenter::Scalars)
        })
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn counted(config: TypedTextConfig) -> (RunController, Arc<AtomicU32>) {
    let fired = Arc::new(AtomicU32::new(0));
    let sink = Arc::clone(&fired);
    let ctl = RunController::new(config).on_complete(move || {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    (ctl, fired)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn timers_match_plan_at_any_time(
        config in config_strategy(),
        mut samples in proptest::collection::vec(0u64..=3_000, 1..12),
    ) {
        samples.sort_unstable();
        let (mut ctl, fired) = counted(config.strategy(Schedule::Timers));
        let mut host = SimHost::new();
        ctl.start(&mut host);

        let mut prev = ctl.counts().to_vec();
        for t in samples {
            host.advance_to(ms(t), &mut ctl);
            let expected = ctl.plan().visible_counts_at(ms(t));
            prop_assert_eq!(ctl.counts(), expected.as_slice());
            prop_assert!(prev.iter().zip(ctl.counts()).all(|(a, b)| a <= b));
            prev = ctl.counts().to_vec();
        }

        host.run_until_settled(&mut ctl, Duration::MAX);
        let lengths = ctl.plan().lengths();
        prop_assert_eq!(ctl.counts(), lengths.as_slice());
        prop_assert_eq!(fired.load(Ordering::SeqCst), 1);
        prop_assert_eq!(ctl.phase(), RunPhase::Done);
    }

    #[test]
    fn frames_match_plan_at_refresh_boundaries(
        config in config_strategy(),
        interval in 1u64..=25,
        mut samples in proptest::collection::vec(0u64..=3_000, 1..12),
    ) {
        samples.sort_unstable();
        let (mut ctl, fired) = counted(config.strategy(Schedule::Frames));
        let mut host = SimHost::with_frame_interval(ms(interval));
        ctl.start(&mut host);

        for t in samples {
            host.advance_to(ms(t), &mut ctl);
            let last_frame = ms(t / interval * interval);
            let expected = ctl.plan().visible_counts_at(last_frame);
            prop_assert_eq!(ctl.counts(), expected.as_slice());
        }

        host.run_until_settled(&mut ctl, Duration::MAX);
        let lengths = ctl.plan().lengths();
        prop_assert_eq!(ctl.counts(), lengths.as_slice());
        prop_assert_eq!(fired.load(Ordering::SeqCst), 1);
        prop_assert_eq!(ctl.phase(), RunPhase::Done);
        prop_assert_eq!(host.pending(), 0);
    }

    #[test]
    fn strategies_finish_with_identical_counts(config in config_strategy()) {
        let mut finals = Vec::new();
        for schedule in [Schedule::Timers, Schedule::Frames] {
            let (mut ctl, _) = counted(config.clone().strategy(schedule));
            let mut host = SimHost::new();
            ctl.start(&mut host);
            host.run_until_settled(&mut ctl, Duration::MAX);
            finals.push(ctl.counts().to_vec());
        }
        prop_assert_eq!(&finals[0], &finals[1]);
    }
}
