// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end editing scenarios through the public `NodeEditor` API.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use xynode_graph::{
    DragOutcome, EdgeId, EdgeType, EditorConfig, IdMap, NodeEditor, NodeId, Point, Rejection,
    Scene, SceneData, SocketId,
};

fn direct_editor() -> NodeEditor {
    NodeEditor::new(EditorConfig {
        default_edge_type: EdgeType::Direct,
        ..EditorConfig::default()
    })
}

fn first_output(editor: &NodeEditor, node: NodeId) -> SocketId {
    editor.scene().node(node).unwrap().outputs()[0].id
}

fn first_input(editor: &NodeEditor, node: NodeId) -> SocketId {
    editor.scene().node(node).unwrap().inputs()[0].id
}

fn all_ids(data: &SceneData) -> HashSet<u64> {
    let mut ids = HashSet::new();
    for node in &data.nodes {
        ids.insert(node.id.raw());
        ids.extend(node.inputs.iter().chain(node.outputs.iter()).map(|s| s.id.raw()));
    }
    ids.extend(data.edges.iter().map(|e| e.id.raw()));
    ids
}

#[test]
fn test_reconnecting_single_edge_input_replaces_edge() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::new(0.0, 0.0)).unwrap();
    let b = editor.add_node("B", &[0], &[], Point::new(100.0, 0.0)).unwrap();
    let a_out = first_output(&editor, a);
    let b_in = first_input(&editor, b);
    assert!(editor.scene().socket(a_out).unwrap().multi_edges);
    assert!(!editor.scene().socket(b_in).unwrap().multi_edges);

    let DragOutcome::Connected(e1) = editor.connect(a_out, b_in).unwrap() else {
        panic!("first connection failed");
    };
    assert_eq!(editor.scene().socket(b_in).unwrap().edge_count(), 1);

    // Dragging the same wire again from the input side frees B.in first
    let history_len = editor.history().len();
    editor.begin_drag(b_in);
    let DragOutcome::Connected(e2) = editor.complete_drag(Some(a_out)).unwrap() else {
        panic!("second connection failed");
    };

    assert!(!editor.scene().contains_edge(e1));
    assert_eq!(editor.scene().socket(b_in).unwrap().edges(), &[e2]);
    assert_eq!(editor.scene().socket(a_out).unwrap().edges(), &[e2]);
    assert_eq!(editor.scene().edge_count(), 1);
    assert_eq!(editor.history().len(), history_len + 1);
    assert_eq!(editor.history().current_label(), Some("edge created"));
}

#[test]
fn test_same_direction_repeat_is_suppressed() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::new(0.0, 0.0)).unwrap();
    let b = editor.add_node("B", &[0], &[], Point::new(100.0, 0.0)).unwrap();
    let a_out = first_output(&editor, a);
    let b_in = first_input(&editor, b);

    editor.connect(a_out, b_in).unwrap();
    assert_eq!(
        editor.connect(a_out, b_in).unwrap(),
        DragOutcome::Rejected(Rejection::DuplicateEdge)
    );
    assert_eq!(editor.scene().edge_count(), 1);
}

#[test]
fn test_cut_line_removes_only_crossed_edges() {
    let mut editor = direct_editor();
    let mut edges = Vec::new();
    for row in 0..3 {
        let y = row as f64 * 300.0;
        let src = editor.add_node("Src", &[], &[0], Point::new(0.0, y)).unwrap();
        let dst = editor.add_node("Dst", &[0], &[], Point::new(400.0, y)).unwrap();
        let out = first_output(&editor, src);
        let inp = first_input(&editor, dst);
        let DragOutcome::Connected(edge) = editor.connect(out, inp).unwrap() else {
            panic!("connection failed");
        };
        edges.push(edge);
    }
    let history_len = editor.history().len();

    // Down through the first wire, around the right of the sinks' inputs,
    // then back across the third wire
    assert!(editor.begin_cut());
    for (x, y) in [(290.0, 100.0), (290.0, 160.0), (450.0, 160.0), (450.0, 760.0), (290.0, 760.0)] {
        editor.add_cut_point(Point::new(x, y));
    }
    let mut removed = editor.end_cut().unwrap();
    removed.sort();

    let mut expected = vec![edges[0], edges[2]];
    expected.sort();
    assert_eq!(removed, expected);
    assert!(editor.scene().contains_edge(edges[1]));
    assert_eq!(editor.scene().edge_count(), 1);
    assert_eq!(editor.history().len(), history_len + 1);
    assert_eq!(editor.history().current_label(), Some("edges cut"));
}

#[test]
fn test_empty_cut_still_checkpoints_once() {
    let mut editor = direct_editor();
    editor.add_node("A", &[], &[0], Point::ZERO).unwrap();
    let history_len = editor.history().len();

    editor.begin_cut();
    editor.add_cut_point(Point::new(5000.0, 5000.0));
    editor.add_cut_point(Point::new(5100.0, 5100.0));
    assert!(editor.end_cut().unwrap().is_empty());
    assert_eq!(editor.history().len(), history_len + 1);
}

#[test]
fn test_round_trip_preserves_entities() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[0, 2, 3], &[4], Point::new(-350.0, -250.0)).unwrap();
    let b = editor.add_node("B", &[5, 2, 4], &[4], Point::new(-75.0, 0.0)).unwrap();
    let out = first_output(&editor, a);
    let inp = first_input(&editor, b);
    editor.connect(out, inp).unwrap();

    let data = editor.scene().serialize();
    let mut restored = Scene::new();
    restored.deserialize(&data, &mut IdMap::new(), true).unwrap();

    assert_eq!(restored.node_count(), 2);
    assert_eq!(restored.edge_count(), 1);
    for original in editor.scene().nodes() {
        let copy = restored.node(original.id()).unwrap();
        assert_eq!(copy.title, original.title);
        assert_eq!(copy.position(), original.position());
        let types = |n: &xynode_graph::Node| {
            n.sockets().map(|s| (s.id, s.socket_type, s.multi_edges)).collect::<Vec<_>>()
        };
        assert_eq!(types(copy), types(original));
    }
}

#[test]
fn test_idempotent_removal() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::ZERO).unwrap();
    let b = editor.add_node("B", &[0], &[], Point::ZERO).unwrap();
    let out = first_output(&editor, a);
    let inp = first_input(&editor, b);
    let DragOutcome::Connected(edge) = editor.connect(out, inp).unwrap() else {
        panic!("connection failed");
    };

    let scene = editor.scene_mut();
    assert!(scene.remove_edge(edge).is_some());
    assert!(scene.remove_edge(edge).is_none());
    assert_eq!(scene.socket(out).unwrap().edge_count(), 0);
    assert_eq!(scene.socket(inp).unwrap().edge_count(), 0);
}

#[test]
fn test_history_capacity_and_symmetry() {
    let mut editor = NodeEditor::new(EditorConfig {
        history_capacity: 5,
        ..EditorConfig::default()
    });
    for i in 0..8 {
        editor.add_node(&format!("N{i}"), &[], &[], Point::new(i as f64, 0.0)).unwrap();
    }
    assert_eq!(editor.history().len(), 5);
    assert_eq!(editor.history().current_index(), Some(4));

    let before = editor.scene().serialize();
    let mut undone = 0;
    while editor.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(editor.scene().node_count(), 4);

    for _ in 0..undone {
        assert!(editor.redo().unwrap());
    }
    assert!(!editor.redo().unwrap());
    assert_eq!(editor.scene().serialize(), before);
}

#[test]
fn test_paste_never_reuses_ids() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::new(0.0, 0.0)).unwrap();
    let b = editor.add_node("B", &[0], &[], Point::new(200.0, 100.0)).unwrap();
    let out = first_output(&editor, a);
    let inp = first_input(&editor, b);
    editor.connect(out, inp).unwrap();

    let mut selection = xynode_graph::Selection::new();
    selection.select_all(editor.scene());
    *editor.selection_mut() = selection;
    let clipboard = editor.copy();
    let existing = all_ids(&editor.scene().serialize());

    editor.pointer_moved(Point::new(1000.0, 500.0));
    let pasted = editor.paste(&clipboard).unwrap();
    assert_eq!(editor.history().current_label(), Some("paste"));

    let after = editor.scene().serialize();
    let new_nodes: Vec<_> = after.nodes.iter().filter(|n| pasted.nodes.contains(&n.id)).collect();
    let new_edges: Vec<_> = after.edges.iter().filter(|e| pasted.edges.contains(&e.id)).collect();
    assert_eq!(new_nodes.len(), 2);
    assert_eq!(new_edges.len(), 1);
    for node in &new_nodes {
        assert!(!existing.contains(&node.id.raw()));
        for socket in node.inputs.iter().chain(node.outputs.iter()) {
            assert!(!existing.contains(&socket.id.raw()));
        }
    }
    assert!(!existing.contains(&new_edges[0].id.raw()));

    // Same translation for every node: bbox centre (100, 50) lands on the pointer
    let offset = Point::new(900.0, 450.0);
    for (original, copy) in clipboard.nodes.iter().zip(&new_nodes) {
        assert_eq!(copy.pos_x, original.pos_x + offset.x);
        assert_eq!(copy.pos_y, original.pos_y + offset.y);
    }
}

#[test]
fn test_undo_after_paste_removes_pasted_entities() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::ZERO).unwrap();
    editor.selection_mut().select_node(a, false);
    let clipboard = editor.copy();
    let pasted = editor.paste(&clipboard).unwrap();

    assert!(editor.undo().unwrap());
    assert!(!editor.scene().contains_node(pasted.nodes[0]));
    assert!(editor.selection().is_empty());
    assert!(editor.redo().unwrap());
    assert!(editor.scene().contains_node(pasted.nodes[0]));
}

#[test]
fn test_save_load_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[], &[0], Point::new(1.0, 2.0)).unwrap();
    let b = editor.add_node("B", &[0], &[], Point::new(3.0, 4.0)).unwrap();
    let out = first_output(&editor, a);
    let inp = first_input(&editor, b);
    editor.connect(out, inp).unwrap();
    editor.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["edges"][0]["socket_start"], out.raw());

    let mut loaded = NodeEditor::default();
    loaded.load(&path).unwrap();
    assert_eq!(loaded.scene().serialize(), editor.scene().serialize());

    // IDs restored from the file are never handed out again
    let c = loaded.add_node("C", &[], &[], Point::ZERO).unwrap();
    assert!(!all_ids(&editor.scene().serialize()).contains(&c.raw()));
}

#[test]
fn test_unresolved_edge_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");

    let mut source = NodeEditor::default();
    let a = source.add_node("A", &[], &[0], Point::ZERO).unwrap();
    let b = source.add_node("B", &[0], &[], Point::ZERO).unwrap();
    let out = first_output(&source, a);
    let inp = first_input(&source, b);
    source.connect(out, inp).unwrap();
    let mut data = source.scene().serialize();
    data.edges[0].socket_end = SocketId(999_999);
    std::fs::write(&path, data.to_json().unwrap()).unwrap();

    let mut editor = NodeEditor::default();
    editor.add_node("Keep", &[], &[], Point::ZERO).unwrap();
    let before = editor.scene().serialize();

    assert!(editor.load(&path).is_err());
    assert_eq!(editor.scene().serialize(), before);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_modified_flag_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    let mut editor = NodeEditor::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor
        .scene_mut()
        .subscribe_modified(move |modified| sink.borrow_mut().push(modified));

    editor.add_node("A", &[], &[], Point::ZERO).unwrap();
    editor.add_node("B", &[], &[], Point::ZERO).unwrap();
    editor.save(&path).unwrap();

    assert_eq!(*seen.borrow(), vec![true, false]);
    assert!(!editor.is_modified());

    // Rebuilding from history reports the flag flip only once
    assert!(editor.undo().unwrap());
    assert!(editor.redo().unwrap());
    assert_eq!(*seen.borrow(), vec![true, false, true]);
}

#[test]
fn test_edge_ids_are_unique_across_kinds() {
    let mut editor = NodeEditor::default();
    let a = editor.add_node("A", &[0], &[0], Point::ZERO).unwrap();
    let b = editor.add_node("B", &[0], &[0], Point::ZERO).unwrap();
    let out = first_output(&editor, a);
    let inp = first_input(&editor, b);
    let DragOutcome::Connected(edge) = editor.connect(out, inp).unwrap() else {
        panic!("connection failed");
    };

    let ids = all_ids(&editor.scene().serialize());
    // two nodes + four sockets + one edge
    assert_eq!(ids.len(), 7);
    assert!(ids.contains(&EdgeId::raw(edge)));
}
