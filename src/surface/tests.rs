//! Tests for the control surface

use super::*;
use crate::columns::{Color, Row, RowGroup};
use crate::error::ControlError;
use crate::transport::{deliver, MemoryTransport};

fn surface() -> ControlSurface {
    ControlSurface::new(
        Arc::new(ControlRegistry::chroma_console()),
        MidiChannel::default(),
    )
}

#[test]
fn test_first_tick_syncs_device() {
    let mut surface = surface();
    let messages = surface.tick();

    assert_eq!(messages.len(), 28);
    assert_eq!(messages[0].encode(), [0xB0, 16, 0]);
    assert_eq!(messages[1].encode(), [0xB0, 17, 22]);
    assert!(surface.tick().is_empty());
}

#[test]
fn test_tick_after_value_change() {
    let mut surface = surface();
    surface.tick();

    assert_eq!(surface.set_value("tilt", 10).unwrap(), None);
    let messages = surface.tick();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].encode(), [0xB0, 64, 10]);
}

#[test]
fn test_header_change_produces_event() {
    let mut surface = surface();
    let event = surface.set_value("dModule", 2).unwrap();
    assert_eq!(event, Some(HeaderValueChanged { column: 2, value: 2 }));

    let update = surface.column_update(event.unwrap());
    let indices: Vec<usize> = update.colors.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![2, 6, 10, 14, 18]);
    assert!(update.colors.iter().all(|r| r.value == Color::Green));
    assert!(update.enabled.iter().all(|r| r.value));
}

#[test]
fn test_texture_header_leaves_mix_and_level_alone() {
    let mut surface = surface();
    let event = surface.set_value("tModule", 5).unwrap().unwrap();
    let update = surface.column_update(event);

    let touched: Vec<usize> = update
        .enabled
        .iter()
        .map(|r| r.index)
        .chain(update.colors.iter().map(|r| r.index))
        .collect();
    assert!(!touched.contains(&15));
    assert!(!touched.contains(&19));

    let disabled: Vec<&str> = update
        .enabled
        .iter()
        .filter(|r| !r.value)
        .filter_map(|r| surface.registry().get(r.index))
        .map(|c| c.identifier.as_str())
        .collect();
    assert_eq!(disabled, vec!["tAmount", "tVol"]);
}

#[test]
fn test_rejected_value_changes_nothing() {
    let mut surface = surface();
    surface.tick();

    assert!(matches!(
        surface.set_value("cModule", 200),
        Err(ControlError::OutOfRange { .. })
    ));
    assert!(matches!(
        surface.set_value("taptempo", 1),
        Err(ControlError::UnknownControl(_))
    ));
    assert!(surface.tick().is_empty());
    assert_eq!(surface.emitter().value("cModule").unwrap(), 0);
}

#[test]
fn test_layout_replays_every_header() {
    let surface = surface();
    let layout = surface.layout();
    assert_eq!(layout.len(), 4);

    // cModule=0 red, mModule=22 neutral, dModule=44 neutral, tModule=0 red
    let header_colors: Vec<Color> = layout
        .iter()
        .map(|u| {
            let header = u.colors.iter().find(|r| r.row == Row::Header).unwrap();
            header.value
        })
        .collect();
    assert_eq!(
        header_colors,
        vec![Color::Red, Color::Neutral, Color::Neutral, Color::Red]
    );

    let texture = &layout[3];
    assert!(texture
        .enabled
        .iter()
        .all(|r| matches!(r.row, Row::Group(RowGroup::First | RowGroup::Second))));
}

#[test]
fn test_channel_change_applies_to_next_messages() {
    let mut surface = surface();
    surface.tick();

    surface.set_channel(10).unwrap();
    surface.set_value("mix", 0).unwrap();
    assert_eq!(surface.tick()[0].encode(), [0xB9, 70, 0]);

    assert_eq!(surface.set_channel(0), Err(ControlError::InvalidChannel(0)));
    assert_eq!(surface.channel().number(), 10);
}

#[test]
fn test_resend_all_then_quiet() {
    let mut surface = surface();
    surface.tick();
    surface.set_value("level", 100).unwrap();

    let messages = surface.resend_all();
    assert_eq!(messages.len(), 28);
    assert!(surface.tick().is_empty());
}

#[test]
fn test_restore_before_first_tick() {
    let mut surface = surface();
    surface.restore([("cModule", 66), ("mix", 12)]).unwrap();

    let messages = surface.tick();
    assert_eq!(messages[0].encode(), [0xB0, 16, 66]);
    assert!(messages.iter().any(|m| m.encode() == [0xB0, 70, 12]));

    let (_, value, text) = surface.describe("cModule").unwrap();
    assert_eq!(value, 66);
    assert_eq!(text, "Howl");
}

#[tokio::test]
async fn test_tick_delivers_through_transport() {
    let mut surface = surface();
    let transport = MemoryTransport::new();

    let delivered = deliver(&transport, &surface.tick()).await;
    assert_eq!(delivered, 28);
    transport.take();

    surface.set_value("rate", 1).unwrap();
    surface.set_value("tilt", 2).unwrap();
    deliver(&transport, &surface.tick()).await;

    let sent: Vec<[u8; 3]> = transport.sent().iter().map(|m| m.encode()).collect();
    assert_eq!(sent, vec![[0xB0, 64, 2], [0xB0, 66, 1]]);
}
