//! Property-based invariant tests for editing sessions.
//!
//! Random command sequences, mixing direct edits, selection changes, pointer
//! gestures, viewport changes and undo/redo, must keep:
//!
//! 1. z-order dense and equal to each element's position in the order list
//! 2. the selection within the document's elements
//! 3. the history within its capacity
//! 4. undo-to-the-start equal to the starting document
//! 5. redo after undo restoring the undone elements

use kurbo::{Point, Vec2};
use proptest::prelude::*;
use slate_core::{
    CanvasDocument, EditorSession, Element, ElementPatch, Modifiers, NewElement, ReorderDirection,
    SessionConfig, ToolKind,
};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    AddRect(f64, f64, f64, f64),
    AddCircle(f64, f64, f64),
    Update(usize, f64),
    Remove(usize),
    RemoveStale,
    Duplicate(usize),
    Reorder(usize, ReorderDirection),
    Select(usize, bool),
    SelectAll,
    ClearSelection,
    DeleteSelected,
    Draw(ToolKind, Point, Point),
    Drag(Point, Point),
    AbandonedDraw(Point, Point),
    Zoom(f64),
    Pan(f64, f64),
    Undo,
    Redo,
}

fn coord() -> impl Strategy<Value = f64> {
    (0u32..400).prop_map(f64::from)
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

fn direction() -> impl Strategy<Value = ReorderDirection> {
    prop_oneof![
        Just(ReorderDirection::Up),
        Just(ReorderDirection::Down),
        Just(ReorderDirection::Top),
        Just(ReorderDirection::Bottom),
    ]
}

fn drawing_tool() -> impl Strategy<Value = ToolKind> {
    prop_oneof![
        Just(ToolKind::Rectangle),
        Just(ToolKind::Circle),
        Just(ToolKind::Line),
        Just(ToolKind::Text),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (coord(), coord(), 0u32..120, 0u32..120)
            .prop_map(|(x, y, w, h)| Op::AddRect(x, y, f64::from(w), f64::from(h))),
        (coord(), coord(), 0u32..80).prop_map(|(x, y, r)| Op::AddCircle(x, y, f64::from(r))),
        (any::<usize>(), 0u32..=10).prop_map(|(i, o)| Op::Update(i, f64::from(o) / 10.0)),
        any::<usize>().prop_map(Op::Remove),
        Just(Op::RemoveStale),
        any::<usize>().prop_map(Op::Duplicate),
        (any::<usize>(), direction()).prop_map(|(i, d)| Op::Reorder(i, d)),
        (any::<usize>(), any::<bool>()).prop_map(|(i, m)| Op::Select(i, m)),
        Just(Op::SelectAll),
        Just(Op::ClearSelection),
        Just(Op::DeleteSelected),
        (drawing_tool(), point(), point()).prop_map(|(t, a, b)| Op::Draw(t, a, b)),
        (point(), point()).prop_map(|(a, b)| Op::Drag(a, b)),
        (point(), point()).prop_map(|(a, b)| Op::AbandonedDraw(a, b)),
        (1u32..60).prop_map(|z| Op::Zoom(f64::from(z) / 10.0)),
        (-50i32..50, -50i32..50).prop_map(|(x, y)| Op::Pan(f64::from(x), f64::from(y))),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

/// Pick an existing element by wrapping `index` over the order list.
fn nth(session: &EditorSession, index: usize) -> Option<slate_core::ElementId> {
    let order = session.document().order();
    (!order.is_empty()).then(|| order[index % order.len()])
}

fn apply(session: &mut EditorSession, op: &Op) {
    match op {
        Op::AddRect(x, y, w, h) => {
            session
                .add_element(NewElement::rectangle(Point::new(*x, *y), *w, *h))
                .unwrap();
        }
        Op::AddCircle(x, y, r) => {
            session
                .add_element(NewElement::circle(Point::new(*x, *y), *r))
                .unwrap();
        }
        Op::Update(i, opacity) => {
            if let Some(id) = nth(session, *i) {
                session
                    .update_element(id, &ElementPatch::new().opacity(*opacity))
                    .unwrap();
            }
        }
        Op::Remove(i) => {
            if let Some(id) = nth(session, *i) {
                session.remove_element(id).unwrap();
            }
        }
        Op::RemoveStale => {
            assert!(session.remove_element(uuid::Uuid::new_v4()).is_err());
        }
        Op::Duplicate(i) => {
            if let Some(id) = nth(session, *i) {
                session.duplicate_element(id).unwrap();
            }
        }
        Op::Reorder(i, direction) => {
            if let Some(id) = nth(session, *i) {
                session.reorder(id, *direction).unwrap();
            }
        }
        Op::Select(i, multi) => {
            if let Some(id) = nth(session, *i) {
                session.select(id, *multi).unwrap();
            }
        }
        Op::SelectAll => session.select_all(),
        Op::ClearSelection => session.clear_selection(),
        Op::DeleteSelected => {
            session.delete_selected();
        }
        Op::Draw(tool, from, to) => {
            session.set_tool(*tool);
            session.pointer_down(*from, Modifiers::NONE);
            session.pointer_move(from.midpoint(*to));
            session.pointer_up(*to);
            session.set_tool(ToolKind::Select);
        }
        Op::Drag(from, to) => {
            session.set_tool(ToolKind::Select);
            session.pointer_down(*from, Modifiers::NONE);
            session.pointer_move(*to);
            session.pointer_up(*to);
        }
        Op::AbandonedDraw(from, to) => {
            session.set_tool(ToolKind::Rectangle);
            session.pointer_down(*from, Modifiers::NONE);
            session.pointer_move(*to);
            session.pointer_cancel();
            session.set_tool(ToolKind::Select);
        }
        Op::Zoom(zoom) => session.set_zoom(*zoom),
        Op::Pan(x, y) => session.pan_by(Vec2::new(*x, *y)),
        Op::Undo => {
            session.undo();
        }
        Op::Redo => {
            session.redo();
        }
    }
}

fn check_invariants(session: &EditorSession) -> Result<(), TestCaseError> {
    let doc = session.document();
    prop_assert!(doc.is_consistent());
    for (rank, id) in doc.order().iter().enumerate() {
        prop_assert_eq!(doc.get(*id).map(Element::z_index), Some(rank));
    }
    for id in doc.selection().ids() {
        prop_assert!(doc.contains(*id));
    }
    let history = session.history();
    prop_assert!(history.len() <= history.capacity());
    prop_assert!(history.index() < history.len());
    Ok(())
}

fn elements_of(doc: &CanvasDocument) -> Vec<Element> {
    doc.elements().cloned().collect()
}

fn roomy_session() -> EditorSession {
    let config = SessionConfig {
        history_capacity: 1_000,
        ..SessionConfig::default()
    };
    EditorSession::with_config(config).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// 1-3. Structural invariants hold after every step
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_invariants_hold_for_every_reachable_state(
        capacity in 1usize..12,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let config = SessionConfig {
            history_capacity: capacity,
            ..SessionConfig::default()
        };
        let mut session = EditorSession::with_config(config).unwrap();
        check_invariants(&session)?;
        for op in &ops {
            apply(&mut session, op);
            check_invariants(&session)?;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Undoing every commit returns to the starting document
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_undo_everything_restores_initial_document(
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let mut session = roomy_session();
        let initial = session.export_document();
        for op in &ops {
            apply(&mut session, op);
        }

        while session.undo() {
            check_invariants(&session)?;
        }
        prop_assert_eq!(session.document(), &initial);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Redo restores what undo took away; a new commit drops redo
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_redo_restores_undone_elements(
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut session = roomy_session();
        for op in &ops {
            apply(&mut session, op);
        }

        let before = elements_of(session.document());
        if session.undo() {
            prop_assert!(session.redo());
            prop_assert_eq!(elements_of(session.document()), before);

            session.undo();
            session
                .add_element(NewElement::rectangle(Point::ZERO, 10.0, 10.0))
                .unwrap();
            prop_assert!(!session.can_redo());
        }
    }
}
