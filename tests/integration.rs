//! End-to-end present()/diff/emit cycles and input-decoder round-trip
//! properties (§8), exercised against an in-memory sink the way the
//! teacher's old engine-level test exercised the whole pipeline rather
//! than one unit at a time.

use opentui_core::cell::Attr;
use opentui_core::color::Color;
use opentui_core::core::{Core, MockSink};
use opentui_core::frame_pipeline::FramePipeline;
use opentui_core::geometry::Rect;
use opentui_core::input::{DecodedEvent, Decoder, Modifiers};
use opentui_core::renderer::{Renderer, RendererConfig};
use opentui_core::scene::Scene;

fn mock_core() -> Core {
    Core::new(Box::new(MockSink::new()))
}

#[test]
fn full_present_cycle_emits_then_quiesces() {
    let mut pipeline = FramePipeline::new(10, 2, Color::BLACK);
    let mut sink = MockSink::new();
    let mut scene = Scene::new();
    scene.insert(
        None,
        Rect::new(0, 0, 5, 1),
        0,
        Box::new(|buf, rect| {
            buf.draw_text("HELLO", rect.x, rect.y, Color::WHITE, Some(Color::BLACK), Attr::NONE, None);
        }),
    );

    assert!(pipeline.present(&mut scene, &mut sink, false).unwrap());
    let first_frame = sink.take();
    assert!(!first_frame.is_empty());
    assert!(String::from_utf8_lossy(&first_frame).contains("HELLO"));

    // Same scene, nothing changed: second present is silent (§8 property 4).
    let mut scene_again = Scene::new();
    scene_again.insert(
        None,
        Rect::new(0, 0, 5, 1),
        0,
        Box::new(|buf, rect| {
            buf.draw_text("HELLO", rect.x, rect.y, Color::WHITE, Some(Color::BLACK), Attr::NONE, None);
        }),
    );
    assert!(pipeline.present(&mut scene_again, &mut sink, false).unwrap());
    assert!(sink.take().is_empty());
}

#[test]
fn renderer_setup_tick_teardown_end_to_end() {
    let mut renderer = Renderer::new(mock_core(), 20, 5, RendererConfig::default());
    renderer.setup_terminal().unwrap();
    renderer.start();

    renderer.scene_mut().insert(
        None,
        Rect::new(0, 0, 4, 1),
        0,
        Box::new(|buf, rect| buf.fill_rect(rect.x, rect.y, rect.width, rect.height, Color::RED)),
    );
    assert!(renderer.tick().unwrap());
    assert_eq!(renderer.get_stats().frame_count, 1);

    renderer.teardown().unwrap();
}

#[test]
fn backpressure_then_drain_resumes_presenting() {
    let sink = MockSink::new();
    let mut renderer = Renderer::new(Core::new(Box::new(sink)), 8, 2, RendererConfig::default());
    renderer.start();
    renderer.scene_mut().insert(None, Rect::new(0, 0, 3, 1), 0, Box::new(|_, _| {}));
    assert!(renderer.tick().unwrap());
}

/// §8 property 10: for every emitted modifier encoding, the decoder
/// recovers the same (shift, ctrl, meta) triple it was built from.
#[test]
fn input_round_trip_modifier_encoding() {
    let combos = [
        (false, false, false),
        (true, false, false),
        (false, true, false),
        (false, false, true),
        (true, true, false),
        (true, false, true),
        (false, true, true),
        (true, true, true),
    ];

    for (shift, ctrl, meta) in combos {
        let m = 1 + (shift as u32) + (meta as u32) * 2 + (ctrl as u32) * 4;
        let sequence = format!("\x1b[1;{}A", m);

        let mut decoder = Decoder::new();
        let events = decoder.feed(sequence.as_bytes());
        assert_eq!(events.len(), 1, "sequence {:?} should decode to exactly one event", sequence);

        match &events[0] {
            DecodedEvent::Key(key) => {
                assert_eq!(key.name, "up");
                assert_eq!(key.shift, shift, "shift mismatch for m={m}");
                assert_eq!(key.ctrl, ctrl, "ctrl mismatch for m={m}");
                assert_eq!(key.meta, meta, "meta mismatch for m={m}");
            }
            other => panic!("expected key event, got {other:?}"),
        }
    }
}

#[test]
fn bracketed_paste_round_trip_through_renderer() {
    let mut renderer = Renderer::new(mock_core(), 10, 2, RendererConfig::default());
    let mut bytes = b"\x1b[200~".to_vec();
    bytes.extend_from_slice("paste me".as_bytes());
    bytes.extend_from_slice(b"\x1b[201~");

    let events = renderer.handle_input(&bytes);
    assert_eq!(events.len(), 1);
    match &events[0] {
        opentui_core::renderer::Dispatch::Paste(text) => assert_eq!(text, "paste me"),
        other => panic!("expected paste dispatch, got {other:?}"),
    }
}

#[test]
fn modifiers_bitflags_round_trip_all_combinations() {
    for bits in 0u8..8 {
        let m = Modifiers::from_bits_truncate(bits);
        assert_eq!(m.contains(Modifiers::SHIFT), bits & 1 != 0);
        assert_eq!(m.contains(Modifiers::META), bits & 2 != 0);
        assert_eq!(m.contains(Modifiers::CTRL), bits & 4 != 0);
    }
}
