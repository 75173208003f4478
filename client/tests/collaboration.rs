use syncsketch_client::{
    fill_stroke, redraw, App, CanvasEvent, Layer, Outbox, Raster, Rgba, State, StrokePhase,
    FILL_LINE_WIDTH,
};
use syncsketch_shared::{
    ClientMessage, Color, Point, ServerMessage, Stroke, StrokeBody, StrokeId, Tool, UserId,
};

type TestApp = App<Outbox, Vec<CanvasEvent>>;

fn app() -> TestApp {
    App::new(64, 48, Outbox::new(), Vec::new())
}

/// What a coordinating service forwards to the other peers.
fn relay(message: ClientMessage, user: &str) -> Option<ServerMessage> {
    let user_id = UserId::from(user);
    let relayed = match message {
        ClientMessage::DrawStart {
            stroke_id,
            tool,
            color,
            line_width,
            x,
            y,
            fill_pixels,
        } => ServerMessage::DrawStart {
            stroke_id,
            tool,
            color,
            line_width,
            x,
            y,
            user_id,
            fill_pixels,
        },
        ClientMessage::DrawMove { stroke_id, x, y } => ServerMessage::DrawMove { stroke_id, x, y },
        ClientMessage::DrawEnd { stroke_id } => ServerMessage::DrawEnd { stroke_id },
        ClientMessage::CursorMove { .. } | ClientMessage::Undo | ClientMessage::Redo => {
            return None
        }
    };
    Some(relayed)
}

/// Sends everything `from` queued to `to` as JSON frames.
fn deliver(from: &TestApp, to: &mut TestApp) {
    for message in from.transport().drain() {
        if let Some(message) = relay(message, "alice") {
            let text = serde_json::to_string(&message).unwrap();
            to.handle_text(&text).unwrap();
        }
    }
}

/// Drains `from` and returns what the service would relay to peers.
fn relayed(from: &TestApp) -> Vec<ServerMessage> {
    from.transport()
        .drain()
        .into_iter()
        .filter_map(|message| relay(message, "alice"))
        .collect()
}

fn only_stroke(app: &TestApp) -> &Stroke {
    assert_eq!(app.state().store.len(), 1);
    app.state().store.iter().next().unwrap()
}

#[test]
fn local_and_remote_freehand_strokes_match() {
    let mut local = app();
    let mut remote = app();
    local.set_color("#FF0000".parse().unwrap());
    local.set_line_width(5.0);

    local.pointer_down(Point::new(10.0, 10.0));
    local.pointer_move(Point::new(12.0, 10.0));
    local.pointer_move(Point::new(14.0, 12.0));
    local.pointer_up();
    deliver(&local, &mut remote);

    let expected = [
        Point::new(10.0, 10.0),
        Point::new(12.0, 10.0),
        Point::new(14.0, 12.0),
    ];
    assert_eq!(only_stroke(&local).points(), &expected);
    assert_eq!(only_stroke(&remote).points(), &expected);
    assert_eq!(only_stroke(&remote).user_id, UserId::from("alice"));
    assert_eq!(local.state().raster, remote.state().raster);
    assert!(local.state().raster.count(|pixel| pixel[3] != 0) > 0);
}

#[test]
fn shapes_are_announced_only_on_commit() {
    let mut local = app();
    local.set_tool(Tool::Rectangle);
    local.pointer_down(Point::new(5.0, 5.0));
    local.pointer_move(Point::new(20.0, 15.0));
    assert!(local.state().store.is_empty());

    let queued = local.transport().drain();
    assert!(matches!(queued.as_slice(), [ClientMessage::CursorMove { .. }]));

    local.pointer_up();
    let id = only_stroke(&local).id.clone();
    let sent = local.transport().drain();
    assert_eq!(sent.len(), 3);
    assert!(matches!(
        &sent[0],
        ClientMessage::DrawStart { stroke_id, tool: Tool::Rectangle, x, y, .. }
            if *stroke_id == id && *x == 5.0 && *y == 5.0
    ));
    assert!(matches!(
        &sent[1],
        ClientMessage::DrawMove { x, y, .. } if *x == 20.0 && *y == 15.0
    ));
    assert!(matches!(&sent[2], ClientMessage::DrawEnd { stroke_id } if *stroke_id == id));

    let mut remote = app();
    for message in sent {
        remote.handle_message(relay(message, "alice").unwrap());
    }
    assert_eq!(local.state().raster, remote.state().raster);
    assert_eq!(only_stroke(&remote).points().len(), 5);
}

#[test]
fn leaving_the_canvas_cancels_a_shape_silently() {
    let mut local = app();
    local.set_tool(Tool::Circle);
    local.pointer_down(Point::new(20.0, 20.0));
    local.pointer_move(Point::new(30.0, 30.0));
    local.pointer_leave();

    assert!(local.state().store.is_empty());
    assert!(local.authoring().is_none());
    assert_eq!(local.state().preview.count(|pixel| pixel[3] != 0), 0);
    let sent = local.transport().drain();
    assert!(sent
        .iter()
        .all(|message| matches!(message, ClientMessage::CursorMove { .. })));
}

#[test]
fn leaving_the_canvas_ends_a_freehand_stroke() {
    let mut local = app();
    local.pointer_down(Point::new(20.0, 20.0));
    local.pointer_move(Point::new(30.0, 30.0));
    local.pointer_leave();

    let id = only_stroke(&local).id.clone();
    assert_eq!(local.state().phase(&id), StrokePhase::Committed);
    let sent = local.transport().drain();
    assert!(matches!(sent.last(), Some(ClientMessage::DrawEnd { .. })));
}

#[test]
fn fill_ships_its_pixels_and_replays_verbatim() {
    let mut local = app();
    local.set_tool(Tool::Fill);
    local.set_color(Color::rgb(0, 0, 255));
    local.set_line_width(12.0);
    local.pointer_down(Point::new(3.5, 3.5));

    let sent = local.transport().drain();
    assert_eq!(sent.len(), 2);
    match &sent[0] {
        ClientMessage::DrawStart {
            tool: Tool::Fill,
            line_width,
            fill_pixels: Some(pixels),
            ..
        } => {
            assert_eq!(pixels.len(), 64 * 48);
            assert_eq!(*line_width, FILL_LINE_WIDTH);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(sent[1], ClientMessage::DrawEnd { .. }));

    let mut remote = app();
    for message in sent {
        remote.handle_message(relay(message, "alice").unwrap());
    }
    assert_eq!(local.state().raster, remote.state().raster);
    assert_eq!(only_stroke(&local).body, only_stroke(&remote).body);
    assert_eq!(only_stroke(&remote).line_width, FILL_LINE_WIDTH);
    assert_eq!(
        remote.state().raster.get(63, 47),
        Some(Rgba([0, 0, 255, 255]))
    );
}

#[test]
fn undo_and_redo_follow_the_service() {
    let mut local = app();
    local.pointer_down(Point::new(10.0, 10.0));
    local.pointer_move(Point::new(40.0, 30.0));
    local.pointer_up();
    let drawn = local.state().raster.clone();
    let stroke = only_stroke(&local).clone();
    local.transport().drain();

    local.request_undo();
    assert_eq!(local.transport().drain(), [ClientMessage::Undo]);
    assert_eq!(local.state().store.len(), 1);

    local.handle_message(ServerMessage::UndoApplied {
        stroke_id: stroke.id.clone(),
    });
    assert!(local.state().store.is_empty());
    assert_eq!(local.state().raster, Raster::new(64, 48));

    local.request_redo();
    assert_eq!(local.transport().drain(), [ClientMessage::Redo]);
    local.handle_message(ServerMessage::RedoApplied {
        stroke: stroke.clone(),
    });
    assert_eq!(local.state().raster, drawn);
    assert!(local
        .sink()
        .contains(&CanvasEvent::StrokeRemoved(stroke.id.clone())));
}

#[test]
fn history_snapshot_replaces_local_state() {
    let mut local = app();
    local.pointer_down(Point::new(50.0, 40.0));
    local.pointer_up();
    let stale = only_stroke(&local).id.clone();
    local.sink_mut().clear();

    let text = r##"{"type":"history-snapshot","strokes":[
        {"id":"b","tool":"brush","color":"#000000","lineWidth":3,"points":[{"x":1,"y":1},{"x":20,"y":5}],"userId":"u1"},
        {"id":"t","tool":"triangle","color":"#00FF00","lineWidth":2,"points":[],"start":{"x":10,"y":10},"end":{"x":30,"y":30},"userId":"u2"},
        {"id":"f","tool":"fill","color":"#FF0000","lineWidth":1,"points":[{"x":2,"y":40}],"userId":"u1","fillPixels":[{"x":2,"y":40},{"x":3,"y":40}]}
    ]}"##;
    local.handle_text(text).unwrap();

    let state = local.state();
    assert_eq!(state.store.len(), 2);
    assert!(!state.store.contains(&stale));
    assert_eq!(state.phase(&StrokeId::from("t")), StrokePhase::Active);
    let replaced = local
        .sink()
        .iter()
        .filter(|event| matches!(event, CanvasEvent::HistoryReplaced { .. }))
        .count();
    assert_eq!(replaced, 1);
    assert!(local
        .sink()
        .contains(&CanvasEvent::LayerChanged(Layer::Main)));

    let mut expected = State::new(64, 48);
    expected.store.replace_all(state.store.iter().cloned().collect());
    redraw(&mut expected);
    assert_eq!(state.raster, expected.raster);
    assert_eq!(state.raster.get(3, 40), Some(Rgba([255, 0, 0, 255])));
}

#[test]
fn ghost_ids_and_bad_frames_are_tolerated() {
    let mut local = app();
    local.pointer_down(Point::new(10.0, 10.0));
    local.pointer_up();
    let before = local.state().raster.clone();

    local
        .handle_text(r#"{"type":"draw-move","strokeId":"ghost-id","x":5,"y":5}"#)
        .unwrap();
    local
        .handle_text(r#"{"type":"draw-end","strokeId":"ghost-id"}"#)
        .unwrap();
    assert!(local.handle_text("not json").is_err());

    assert_eq!(local.state().store.len(), 1);
    assert_eq!(local.state().raster, before);
}

#[test]
fn seed_within_threshold_of_fill_color_is_a_noop() {
    let mut state = State::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            state.raster.put(x, y, Rgba([250, 250, 250, 255]));
        }
    }
    let before = state.raster.clone();
    assert!(!fill_stroke(
        &mut state,
        StrokeId::from("f"),
        Color::WHITE,
        Point::new(4.0, 4.0),
        UserId::from("u"),
        None,
    ));
    assert!(state.store.is_empty());
    assert_eq!(state.raster, before);
}

#[test]
fn welcome_assigns_identity_to_new_strokes() {
    let mut local = app();
    local
        .handle_text(r##"{"type":"welcome","userId":"user-7","color":"#FF6B6B"}"##)
        .unwrap();
    assert_eq!(local.user_id(), &UserId::from("user-7"));
    assert_eq!(local.cursor_color(), Some(Color::rgb(0xff, 0x6b, 0x6b)));

    local.pointer_down(Point::new(5.0, 5.0));
    local.pointer_up();
    assert_eq!(only_stroke(&local).user_id, UserId::from("user-7"));
    assert!(matches!(
        only_stroke(&local).body,
        StrokeBody::Freehand { .. }
    ));
}

#[test]
fn remote_cursor_lands_on_the_overlay_only() {
    let mut local = app();
    local
        .handle_text(
            r##"{"type":"cursor-update","userId":"bob","x":30,"y":20,"color":"#4ECDC4"}"##,
        )
        .unwrap();
    assert_eq!(local.state().raster.count(|pixel| pixel[3] != 0), 0);
    assert!(local.state().overlay.count(|pixel| pixel[3] != 0) > 0);
    assert!(local.state().composite().count(|pixel| pixel[3] != 0) > 0);

    local
        .handle_text(r#"{"type":"user-left","userId":"bob"}"#)
        .unwrap();
    assert_eq!(local.state().overlay.count(|pixel| pixel[3] != 0), 0);
}

#[test]
fn late_joiner_continues_a_freehand_stroke_in_flight() {
    let mut author = app();
    let mut early = app();
    author.pointer_down(Point::new(10.0, 10.0));
    for message in relayed(&author) {
        early.handle_message(message);
    }

    let mut late = app();
    late.handle_message(ServerMessage::HistorySnapshot {
        strokes: early.state().store.iter().cloned().collect(),
    });

    author.pointer_move(Point::new(30.0, 10.0));
    author.pointer_move(Point::new(50.0, 40.0));
    author.pointer_up();
    for message in relayed(&author) {
        early.handle_message(message.clone());
        late.handle_message(message);
    }

    let expected = [
        Point::new(10.0, 10.0),
        Point::new(30.0, 10.0),
        Point::new(50.0, 40.0),
    ];
    assert_eq!(only_stroke(&early).points(), &expected);
    assert_eq!(only_stroke(&late).points(), &expected);
    assert_eq!(late.state().raster, early.state().raster);

    let id = only_stroke(&late).id.clone();
    late.handle_message(ServerMessage::DrawMove {
        stroke_id: id,
        x: 60.0,
        y: 5.0,
    });
    assert_eq!(only_stroke(&late).points().len(), 3);
}

#[test]
fn late_joiner_finishes_a_shape_started_before_it_arrived() {
    let mut author = app();
    author.set_tool(Tool::Rectangle);
    author.pointer_down(Point::new(5.0, 5.0));
    author.pointer_move(Point::new(25.0, 20.0));
    author.pointer_up();
    let mut frames = relayed(&author).into_iter();

    let mut early = app();
    early.handle_message(frames.next().unwrap());
    let unexpanded: Vec<Stroke> = early.state().pending.values().cloned().collect();
    assert_eq!(unexpanded.len(), 1);
    assert!(unexpanded[0].points().is_empty());

    let mut late = app();
    late.handle_message(ServerMessage::HistorySnapshot {
        strokes: unexpanded,
    });
    assert!(late.state().store.is_empty());

    for message in frames {
        early.handle_message(message.clone());
        late.handle_message(message);
    }

    assert_eq!(only_stroke(&late).points().len(), 5);
    assert_eq!(only_stroke(&late).points(), only_stroke(&early).points());
    assert_eq!(late.state().raster, early.state().raster);
    assert_eq!(late.state().preview.count(|pixel| pixel[3] != 0), 0);
}
