use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Fps, PixelSize};
use crate::key::params::KeyParams;
use crate::media::frame::VideoFrame;
use crate::media::source::MemorySource;
use crate::render::{BackendKind, create_compositor};

fn clip(colors: &[[u8; 4]], buffering: Duration) -> PlaybackSession {
    let frames = colors
        .iter()
        .map(|&c| VideoFrame::solid(4, 4, c).unwrap())
        .collect();
    let source = MemorySource::new(frames, Fps::new(25, 1).unwrap()).with_buffering(buffering);
    let compositor = create_compositor(
        BackendKind::Cpu,
        PixelSize {
            width: 2,
            height: 2,
        },
        &KeyParams::default(),
    )
    .unwrap();
    PlaybackSession::new(Box::new(source), compositor)
}

#[test]
fn render_to_sink_pushes_every_drawn_surface() {
    let ended = Rc::new(Cell::new(0));
    let ended_cb = Rc::clone(&ended);
    let mut session = clip(
        &[[255, 0, 0, 255], [0, 255, 8, 255], [0, 0, 255, 255]],
        Duration::ZERO,
    )
    .on_ended(move || ended_cb.set(ended_cb.get() + 1));

    let mut sink = InMemorySink::new();
    let summary = render_to_sink(&mut session, &mut sink).unwrap();

    assert!(summary.ended);
    assert_eq!(summary.frames_drawn, 3);
    assert_eq!(ended.get(), 1);
    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().width, 2);

    let frames = sink.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].1.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(frames[1].1.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(frames[2].1.pixel(1, 0), [0, 0, 255, 255]);
}

#[test]
fn buffering_ticks_leave_index_gaps() {
    let mut session = clip(&[[255, 0, 0, 255]], Duration::from_millis(80));
    let mut sink = InMemorySink::new();
    let summary = render_to_sink(&mut session, &mut sink).unwrap();
    assert_eq!(summary.frames_drawn, 1);
    let idx: Vec<_> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [2]);
}

#[test]
fn run_until_ended_stops_on_end_of_stream() {
    let mut session = clip(&[[255, 0, 0, 255]; 4], Duration::ZERO);
    let mut clock = ManualClock::new(Duration::from_millis(10));
    let summary = run_until_ended(&mut session, &mut clock);
    assert!(summary.ended);
    assert_eq!(summary.frames_drawn, 16);
    assert_eq!(summary.ticks, 17);
}

#[test]
fn run_until_ended_returns_when_cancelled() {
    let mut session = clip(&[[255, 0, 0, 255]; 4], Duration::ZERO);
    session.handle().cancel();
    let summary = run_until_ended(&mut session, &mut ManualClock::new(Duration::from_millis(10)));
    assert!(!summary.ended);
    assert_eq!(summary.ticks, 0);
}
