use bt_core::{Host, Status};
use bt_tools::{HostEvent, RecordingHost, SharedTraceSink, TraceEvent, TraceSink, VecTraceSink};

#[test]
fn vec_sink_keeps_events_in_order() {
    let mut sink = VecTraceSink::default();
    sink.emit(TraceEvent::new(1, "bt.node.start").with_node(3));
    sink.emit(
        TraceEvent::new(1, "bt.node.stop")
            .with_node(3)
            .with_code(TraceEvent::status_code(Status::Success)),
    );

    assert_eq!(sink.events.len(), 2);
    assert_eq!(sink.events[0].tag, "bt.node.start");
    assert_eq!(sink.events[1].node, 3);
    assert_eq!(sink.events[1].code, 1);
}

#[test]
fn shared_sink_clones_write_to_one_log() {
    let shared = SharedTraceSink::new();
    let mut handle: Box<dyn TraceSink> = Box::new(shared.clone());

    handle.emit(TraceEvent::new(2, "bt.node.start").with_node(1));
    handle.emit(TraceEvent::new(2, "bt.node.start").with_node(2));
    handle.emit(TraceEvent::new(3, "bt.node.abort").with_node(2));

    shared.with_log(|log| {
        assert_eq!(log.count("bt.node.start"), 2);
        assert_eq!(log.count_for("bt.node.abort", 2), 1);
        assert_eq!(log.count_for("bt.node.abort", 1), 0);
    });

    let taken = shared.take();
    assert_eq!(taken.events.len(), 3);
    shared.with_log(|log| assert!(log.events.is_empty()));
}

#[test]
fn recording_host_clones_share_effects() {
    let host = RecordingHost::new();
    let mut bound = host.clone();

    bound.log("hello");
    bound.debug_break();
    bound.log("again");

    assert_eq!(host.logs(), vec!["hello".to_string(), "again".to_string()]);
    assert_eq!(host.breaks(), 1);
    assert_eq!(host.events()[1], HostEvent::Break);
}
